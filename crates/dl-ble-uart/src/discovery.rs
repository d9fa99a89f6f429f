//! UART channel discovery across the three known profiles.

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::device::{GattCharacteristic, GattDevice};
use crate::error::{BleError, BleResult};
use crate::profiles::{self, SERVICE_PRIORITY};

/// The resolved write/notify channel pair for one connection.
///
/// Owned exclusively by the active session for the lifetime of the BLE
/// connection; dropping it ends the notification stream.
#[derive(Debug)]
pub struct ChannelPair {
    /// Service the channels resolved under.
    pub service: Uuid,
    /// Characteristic commands are written to.
    pub tx: Uuid,
    /// Characteristic the adapter notifies responses on.
    pub rx: Uuid,
    /// Raw notification payloads, in arrival order.
    pub notifications: mpsc::UnboundedReceiver<Vec<u8>>,
}

/// Write channel selection: role UUIDs for NUS/ISSC, write property for the
/// HM-10 data characteristics.
fn is_write_channel(c: &GattCharacteristic) -> bool {
    c.uuid == profiles::nus::TX
        || c.uuid == profiles::issc::TX
        || ((c.uuid == profiles::hm10::DATA || c.uuid == profiles::hm10::DATA_ALT) && c.can_write)
}

/// Notify channel selection: role UUIDs for NUS/ISSC, notify property for
/// the HM-10 data characteristic.
fn is_notify_channel(c: &GattCharacteristic) -> bool {
    c.uuid == profiles::nus::RX
        || c.uuid == profiles::issc::RX
        || (c.uuid == profiles::hm10::DATA && c.can_notify)
}

/// Resolve the UART channel pair on a connected device.
///
/// Services are tried in priority order and the first one present wins.
/// Notifications are enabled on the notify channel before returning, so the
/// caller never misses an early fragment.
pub async fn resolve_channels(device: &dyn GattDevice) -> BleResult<ChannelPair> {
    let available = device.service_uuids().await?;

    let service = SERVICE_PRIORITY
        .into_iter()
        .find(|uuid| available.contains(uuid))
        .ok_or_else(|| BleError::DiscoveryFailed("no supported UART service on device".into()))?;
    tracing::info!(
        profile = profiles::profile_name(service),
        %service,
        "UART service matched"
    );

    let chars = device.characteristics(service).await?;
    let tx = chars.iter().find(|c| is_write_channel(c)).map(|c| c.uuid);
    let rx = chars.iter().find(|c| is_notify_channel(c)).map(|c| c.uuid);

    let (Some(tx), Some(rx)) = (tx, rx) else {
        return Err(BleError::ChannelsNotFound {
            tx_found: tx.is_some(),
            rx_found: rx.is_some(),
        });
    };

    let notifications = device.subscribe(rx).await?;
    tracing::debug!(%tx, %rx, "UART channels resolved, notifications enabled");

    Ok(ChannelPair {
        service,
        tx,
        rx,
        notifications,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGattDevice;
    use crate::profiles::{hm10, issc, nus};

    #[tokio::test]
    async fn nus_resolves_dedicated_channels() {
        let device = MockGattDevice::nus();
        let pair = resolve_channels(&device).await.unwrap();
        assert_eq!(pair.service, nus::SERVICE);
        assert_eq!(pair.tx, nus::TX);
        assert_eq!(pair.rx, nus::RX);
        assert!(device.is_subscribed(nus::RX));
    }

    #[tokio::test]
    async fn hm10_single_characteristic_serves_both_directions() {
        let device = MockGattDevice::hm10();
        let pair = resolve_channels(&device).await.unwrap();
        assert_eq!(pair.service, hm10::SERVICE);
        assert_eq!(pair.tx, hm10::DATA);
        assert_eq!(pair.rx, hm10::DATA);
    }

    #[tokio::test]
    async fn hm10_fallback_write_characteristic() {
        let device = MockGattDevice::with_service(
            hm10::SERVICE,
            vec![
                GattCharacteristic {
                    uuid: hm10::DATA,
                    can_write: false,
                    can_notify: true,
                },
                GattCharacteristic {
                    uuid: hm10::DATA_ALT,
                    can_write: true,
                    can_notify: false,
                },
            ],
        );
        let pair = resolve_channels(&device).await.unwrap();
        assert_eq!(pair.tx, hm10::DATA_ALT);
        assert_eq!(pair.rx, hm10::DATA);
    }

    #[tokio::test]
    async fn issc_resolves_dedicated_channels() {
        let device = MockGattDevice::issc();
        let pair = resolve_channels(&device).await.unwrap();
        assert_eq!(pair.service, issc::SERVICE);
        assert_eq!(pair.tx, issc::TX);
        assert_eq!(pair.rx, issc::RX);
    }

    #[tokio::test]
    async fn nus_wins_when_several_services_present() {
        let device = MockGattDevice::with_services(vec![
            (
                issc::SERVICE,
                vec![
                    GattCharacteristic {
                        uuid: issc::TX,
                        can_write: true,
                        can_notify: false,
                    },
                    GattCharacteristic {
                        uuid: issc::RX,
                        can_write: false,
                        can_notify: true,
                    },
                ],
            ),
            (
                nus::SERVICE,
                vec![
                    GattCharacteristic {
                        uuid: nus::TX,
                        can_write: true,
                        can_notify: false,
                    },
                    GattCharacteristic {
                        uuid: nus::RX,
                        can_write: false,
                        can_notify: true,
                    },
                ],
            ),
        ]);
        let pair = resolve_channels(&device).await.unwrap();
        assert_eq!(pair.service, nus::SERVICE);
    }

    #[tokio::test]
    async fn unsupported_device_fails_discovery() {
        let device = MockGattDevice::unsupported();
        let err = resolve_channels(&device).await.unwrap_err();
        assert!(matches!(err, BleError::DiscoveryFailed(_)));
    }

    #[tokio::test]
    async fn missing_notify_channel_reports_which_side_resolved() {
        let device = MockGattDevice::with_service(
            nus::SERVICE,
            vec![GattCharacteristic {
                uuid: nus::TX,
                can_write: true,
                can_notify: false,
            }],
        );
        let err = resolve_channels(&device).await.unwrap_err();
        assert!(matches!(
            err,
            BleError::ChannelsNotFound {
                tx_found: true,
                rx_found: false,
            }
        ));
    }
}
