//! BLE transport error types.

use thiserror::Error;

/// Errors that can occur while discovering or driving the UART channels.
#[derive(Debug, Error)]
pub enum BleError {
    /// No device or service matching a supported UART profile.
    #[error("BLE discovery failed: {0}")]
    DiscoveryFailed(String),

    /// A supported service matched but its channels did not resolve.
    #[error("UART characteristics not found: tx {}, rx {}", found(.tx_found), found(.rx_found))]
    ChannelsNotFound { tx_found: bool, rx_found: bool },

    /// Underlying BLE stack failure.
    #[error("BLE backend error: {0}")]
    Backend(String),
}

fn found(present: &bool) -> &'static str {
    if *present { "yes" } else { "no" }
}

/// Convenience alias for BLE results.
pub type BleResult<T> = Result<T, BleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_not_found_names_both_sides() {
        let err = BleError::ChannelsNotFound {
            tx_found: true,
            rx_found: false,
        };
        assert_eq!(
            err.to_string(),
            "UART characteristics not found: tx yes, rx no"
        );
    }
}
