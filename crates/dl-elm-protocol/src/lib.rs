//! ELM327 text-protocol building blocks shared across DashLink crates.
//!
//! Everything here is pure: no I/O, no async. The transport and session
//! layers live in `dl-ble-uart` and `dl-scan-agent`.

pub mod commands;
pub mod dtc;
pub mod error;
pub mod framer;
pub mod vin;

pub use commands::*;
pub use dtc::*;
pub use error::*;
pub use framer::*;
pub use vin::*;
