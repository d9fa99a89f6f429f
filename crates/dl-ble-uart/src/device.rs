//! GATT device abstraction.
//!
//! `GattDevice` is the seam between the scanner and a concrete BLE stack,
//! so the whole protocol layer runs unmodified against scripted hardware
//! in tests.

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::BleResult;

/// A characteristic as seen during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GattCharacteristic {
    pub uuid: Uuid,
    pub can_write: bool,
    pub can_notify: bool,
}

/// Capabilities the scanner needs from a connected BLE peripheral.
#[async_trait]
pub trait GattDevice: Send + Sync {
    /// UUIDs of the primary services the peripheral exposes.
    async fn service_uuids(&self) -> BleResult<Vec<Uuid>>;

    /// Characteristics of one service.
    async fn characteristics(&self, service: Uuid) -> BleResult<Vec<GattCharacteristic>>;

    /// Write a payload to a characteristic.
    async fn write(&self, characteristic: Uuid, payload: &[u8]) -> BleResult<()>;

    /// Enable notifications on a characteristic and stream its payloads,
    /// in arrival order. The stream ends when the link drops.
    async fn subscribe(
        &self,
        characteristic: Uuid,
    ) -> BleResult<mpsc::UnboundedReceiver<Vec<u8>>>;
}
