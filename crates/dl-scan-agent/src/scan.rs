//! Top-level scan flow: discovery → init → VIN → stored/pending DTCs.

use std::sync::Arc;

use chrono::Utc;

use dl_ble_uart::{GattDevice, resolve_channels};
use dl_elm_protocol::commands::DtcMode;

use crate::config::ScanConfig;
use crate::error::ScanResult;
use crate::report::ScanReport;
use crate::session::AdapterSession;

/// Resolve UART channels on a connected device and build a session over
/// them. The session owns the channels until it is dropped; re-pairing
/// requires establishing a fresh session.
pub async fn establish_session(
    device: Arc<dyn GattDevice>,
    config: &ScanConfig,
) -> ScanResult<AdapterSession> {
    let channels = resolve_channels(device.as_ref()).await?;
    Ok(AdapterSession::new(
        device,
        channels,
        config.response_timeout(),
    ))
}

/// Run one full scan over an established session.
///
/// Every step is terminal on failure. The channels stay open afterwards, so
/// the caller can retry on the same session without re-pairing; nothing
/// retries automatically.
pub async fn run_scan(session: &mut AdapterSession) -> ScanResult<ScanReport> {
    let started_at = Utc::now();

    session.initialize().await?;

    tracing::info!("reading VIN");
    let vin = session.read_vin().await?;
    tracing::info!(wmi = %vin.wmi(), year = ?vin.model_year(), "VIN read");

    tracing::info!("reading stored trouble codes");
    let stored = session.read_dtcs(DtcMode::Stored).await?;
    tracing::info!(count = stored.len(), "stored DTCs read");

    tracing::info!("reading pending trouble codes");
    let pending = session.read_dtcs(DtcMode::Pending).await?;
    tracing::info!(count = pending.len(), "pending DTCs read");

    Ok(ScanReport::new(
        started_at,
        &vin,
        stored,
        pending,
        session.service(),
    ))
}
