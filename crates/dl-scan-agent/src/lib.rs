//! DashLink scan agent — ELM327 session layer and scan flow.
//!
//! Builds on `dl-ble-uart` for transport and `dl-elm-protocol` for the text
//! protocol; everything here is about sequencing: one command in flight,
//! one response batch back, strict order.

pub mod config;
pub mod error;
pub mod report;
pub mod scan;
pub mod session;
pub mod waiter;

pub use config::ScanConfig;
pub use error::{ScanError, ScanResult};
pub use report::ScanReport;
pub use session::{AdapterSession, SessionState};
pub use waiter::{LineMatcher, ResponseWaiter};
