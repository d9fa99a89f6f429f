//! btleplug-backed `GattDevice` for real adapters.
//!
//! Scans for a peripheral advertising one of the known UART services,
//! connects, and adapts btleplug's GATT API to the `GattDevice` trait.

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    Central, CharPropFlags, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::device::{GattCharacteristic, GattDevice};
use crate::error::{BleError, BleResult};
use crate::profiles::SERVICE_PRIORITY;

/// How often the scan loop re-checks discovered peripherals.
const SCAN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A connected BLE peripheral driven through btleplug.
pub struct BtleplugDevice {
    peripheral: Peripheral,
}

impl BtleplugDevice {
    /// Scan for and connect to the first peripheral advertising a supported
    /// UART service, optionally filtered by advertised name fragment.
    pub async fn connect(name_filter: Option<&str>, timeout: Duration) -> BleResult<Self> {
        let manager = Manager::new().await.map_err(backend)?;
        let central: Adapter = manager
            .adapters()
            .await
            .map_err(backend)?
            .into_iter()
            .next()
            .ok_or_else(|| BleError::DiscoveryFailed("no Bluetooth adapter present".into()))?;

        central
            .start_scan(ScanFilter {
                services: SERVICE_PRIORITY.to_vec(),
            })
            .await
            .map_err(backend)?;

        let deadline = tokio::time::Instant::now() + timeout;
        let peripheral = loop {
            if let Some(found) = matching_peripheral(&central, name_filter).await? {
                break found;
            }
            if tokio::time::Instant::now() >= deadline {
                central.stop_scan().await.ok();
                return Err(BleError::DiscoveryFailed(format!(
                    "no adapter advertising a supported UART service within {}s",
                    timeout.as_secs()
                )));
            }
            tokio::time::sleep(SCAN_POLL_INTERVAL).await;
        };
        central.stop_scan().await.ok();

        peripheral.connect().await.map_err(backend)?;
        peripheral.discover_services().await.map_err(backend)?;
        if let Some(props) = peripheral.properties().await.map_err(backend)? {
            tracing::info!(name = ?props.local_name, "connected to BLE adapter");
        }

        Ok(Self { peripheral })
    }

    fn find_characteristic(&self, uuid: Uuid) -> BleResult<Characteristic> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == uuid)
            .ok_or_else(|| BleError::Backend(format!("characteristic {uuid} not present")))
    }
}

async fn matching_peripheral(
    central: &Adapter,
    name_filter: Option<&str>,
) -> BleResult<Option<Peripheral>> {
    for peripheral in central.peripherals().await.map_err(backend)? {
        let Some(props) = peripheral.properties().await.map_err(backend)? else {
            continue;
        };
        let advertises_uart = props.services.iter().any(|s| SERVICE_PRIORITY.contains(s));
        let name_matches = match name_filter {
            Some(fragment) => props
                .local_name
                .as_deref()
                .is_some_and(|name| name.contains(fragment)),
            None => true,
        };
        if advertises_uart && name_matches {
            return Ok(Some(peripheral));
        }
    }
    Ok(None)
}

fn backend(e: btleplug::Error) -> BleError {
    BleError::Backend(e.to_string())
}

#[async_trait]
impl GattDevice for BtleplugDevice {
    async fn service_uuids(&self) -> BleResult<Vec<Uuid>> {
        Ok(self.peripheral.services().iter().map(|s| s.uuid).collect())
    }

    async fn characteristics(&self, service: Uuid) -> BleResult<Vec<GattCharacteristic>> {
        let service = self
            .peripheral
            .services()
            .into_iter()
            .find(|s| s.uuid == service)
            .ok_or_else(|| BleError::Backend(format!("service {service} not present")))?;

        Ok(service
            .characteristics
            .into_iter()
            .map(|c| GattCharacteristic {
                uuid: c.uuid,
                can_write: c
                    .properties
                    .intersects(CharPropFlags::WRITE | CharPropFlags::WRITE_WITHOUT_RESPONSE),
                can_notify: c.properties.contains(CharPropFlags::NOTIFY),
            })
            .collect())
    }

    async fn write(&self, characteristic: Uuid, payload: &[u8]) -> BleResult<()> {
        let c = self.find_characteristic(characteristic)?;
        let write_type = if c.properties.contains(CharPropFlags::WRITE) {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };
        self.peripheral
            .write(&c, payload, write_type)
            .await
            .map_err(backend)
    }

    async fn subscribe(
        &self,
        characteristic: Uuid,
    ) -> BleResult<mpsc::UnboundedReceiver<Vec<u8>>> {
        let c = self.find_characteristic(characteristic)?;
        self.peripheral.subscribe(&c).await.map_err(backend)?;

        let mut stream = self.peripheral.notifications().await.map_err(backend)?;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(event) = stream.next().await {
                if event.uuid == characteristic && tx.send(event.value).is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }
}
