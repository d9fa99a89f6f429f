//! Scan error types.

use thiserror::Error;

use dl_ble_uart::BleError;
use dl_elm_protocol::DecodeError;

/// Errors surfaced to the scan flow. Every one is terminal for the current
/// attempt; retry is always user-triggered, never automatic.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Ble(#[from] BleError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// No line matched the predicate before the deadline.
    #[error("no matching line within {timeout_ms}ms waiting for {predicate}")]
    Timeout { predicate: String, timeout_ms: u64 },

    /// A second wait was registered while one was outstanding. The protocol
    /// is single-in-flight, so this is a programming error, not a runtime
    /// condition.
    #[error("a response wait is already registered for {0}")]
    ConcurrentWait(String),

    /// The notification stream ended while a response was outstanding.
    #[error("BLE link closed while waiting for a response")]
    Disconnected,
}

/// Convenience alias for scan results.
pub type ScanResult<T> = Result<T, ScanError>;
