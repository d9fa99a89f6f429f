//! DashLink scanner CLI — connect to a BLE OBD-II adapter, read the VIN and
//! trouble codes, print the report as JSON.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use dl_ble_uart::hardware::BtleplugDevice;
use dl_scan_agent::config::ScanConfig;
use dl_scan_agent::scan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ScanConfig::from_file(&path)?,
        None => ScanConfig::default(),
    };
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        timeout_ms = config.response_timeout_ms,
        "dl-scan starting"
    );

    let device =
        BtleplugDevice::connect(config.device_name.as_deref(), config.discovery_timeout()).await?;

    let mut session = scan::establish_session(Arc::new(device), &config).await?;
    let report = scan::run_scan(&mut session).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
