//! Shared harness for end-to-end scanner tests.
//!
//! Drives the real discovery, framing, waiter, and session code against a
//! scripted `MockGattDevice` playing the adapter role.

use std::sync::Arc;

use dl_ble_uart::MockGattDevice;
use dl_scan_agent::scan;
use dl_scan_agent::session::AdapterSession;
use dl_scan_agent::ScanConfig;

/// The VIN every scripted adapter reports: a 2003 Honda Accord.
pub const TEST_VIN: &str = "1HGCM82633A004352";

/// Mode 09 PID 02 response carrying [`TEST_VIN`] across three frames.
pub const VIN_REPLY: &str =
    "49 02 01 31 48 47 43 4D\r49 02 02 38 32 36 33 33\r49 02 03 41 30 30 34 33 35 32\r\r>";

/// Queue acks for the four-step init sequence.
pub fn script_init(device: &MockGattDevice) {
    device.queue_reply("ELM327 v1.5\r\r>");
    device.queue_reply("OK\r\r>");
    device.queue_reply("OK\r\r>");
    device.queue_reply("OK\r\r>");
}

/// Queue a full happy-path scan: init acks, the VIN, two stored codes and
/// no pending codes.
pub fn script_full_scan(device: &MockGattDevice) {
    script_init(device);
    device.queue_reply(VIN_REPLY);
    device.queue_reply("43 02 01 33 01 71\r\r>");
    device.queue_reply("47 00\r\r>");
}

/// Resolve channels and build a session with a short response timeout.
pub async fn established_session(device: &Arc<MockGattDevice>) -> AdapterSession {
    let config = ScanConfig {
        response_timeout_ms: 1_000,
        ..ScanConfig::default()
    };
    scan::establish_session(device.clone(), &config)
        .await
        .expect("channels should resolve")
}
