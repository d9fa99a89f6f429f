//! BLE UART transport for DashLink.
//!
//! `GattDevice` abstracts the BLE stack; `resolve_channels` turns a
//! connected device into the one write/notify channel pair the session
//! layer speaks over. Two impls:
//! - `BtleplugDevice` — real hardware, behind the `hardware` feature
//! - `MockGattDevice` — scripted adapter for tests, all platforms

pub mod device;
pub mod discovery;
pub mod error;
pub mod mock;
pub mod profiles;

#[cfg(feature = "hardware")]
pub mod hardware;

pub use device::{GattCharacteristic, GattDevice};
pub use discovery::{ChannelPair, resolve_channels};
pub use error::{BleError, BleResult};
pub use mock::MockGattDevice;
