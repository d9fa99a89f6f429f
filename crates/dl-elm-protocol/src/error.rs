//! Protocol decode error types.

use thiserror::Error;

/// Errors that can occur while decoding adapter responses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The adapter answered but could not reach the vehicle ECU.
    #[error("Can't connect to car. Check connection or start engine")]
    VehicleNotConnected,

    #[error("malformed adapter response: {0}")]
    MalformedResponse(String),
}

/// Convenience alias for decode results.
pub type DecodeResult<T> = Result<T, DecodeError>;
