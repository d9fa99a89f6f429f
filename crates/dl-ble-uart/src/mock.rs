//! Scripted mock GATT device for testing.
//!
//! Plays the adapter role: each write pops the next scripted reply and
//! delivers it over the notification channel, optionally split into
//! fragments to exercise reassembly. All tests use this instead of real
//! hardware so the suite runs in CI on any platform.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::device::{GattCharacteristic, GattDevice};
use crate::error::{BleError, BleResult};
use crate::profiles;

/// Mock GATT device with scripted replies and write recording.
pub struct MockGattDevice {
    services: Vec<(Uuid, Vec<GattCharacteristic>)>,
    /// Replies delivered one per write (FIFO order).
    replies: Mutex<Vec<String>>,
    /// When set, replies are delivered in chunks of at most this many bytes.
    fragment_size: Mutex<Option<usize>>,
    /// All payloads passed to `write` (for test assertions).
    written: Mutex<Vec<(Uuid, Vec<u8>)>>,
    notify_tx: Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    subscribed: Mutex<Vec<Uuid>>,
}

impl MockGattDevice {
    /// A device exposing the Nordic UART service.
    pub fn nus() -> Self {
        Self::with_service(
            profiles::nus::SERVICE,
            vec![
                GattCharacteristic {
                    uuid: profiles::nus::TX,
                    can_write: true,
                    can_notify: false,
                },
                GattCharacteristic {
                    uuid: profiles::nus::RX,
                    can_write: false,
                    can_notify: true,
                },
            ],
        )
    }

    /// A device exposing an HM-10 style single data characteristic.
    pub fn hm10() -> Self {
        Self::with_service(
            profiles::hm10::SERVICE,
            vec![GattCharacteristic {
                uuid: profiles::hm10::DATA,
                can_write: true,
                can_notify: true,
            }],
        )
    }

    /// A device exposing the legacy ISSC transparent UART.
    pub fn issc() -> Self {
        Self::with_service(
            profiles::issc::SERVICE,
            vec![
                GattCharacteristic {
                    uuid: profiles::issc::TX,
                    can_write: true,
                    can_notify: false,
                },
                GattCharacteristic {
                    uuid: profiles::issc::RX,
                    can_write: false,
                    can_notify: true,
                },
            ],
        )
    }

    /// A device with one arbitrary service layout.
    pub fn with_service(service: Uuid, characteristics: Vec<GattCharacteristic>) -> Self {
        Self::with_services(vec![(service, characteristics)])
    }

    /// A device with several services.
    pub fn with_services(services: Vec<(Uuid, Vec<GattCharacteristic>)>) -> Self {
        Self {
            services,
            replies: Mutex::new(Vec::new()),
            fragment_size: Mutex::new(None),
            written: Mutex::new(Vec::new()),
            notify_tx: Mutex::new(None),
            subscribed: Mutex::new(Vec::new()),
        }
    }

    /// A device advertising no supported UART service.
    pub fn unsupported() -> Self {
        Self::with_service(Uuid::from_u128(0x1234), Vec::new())
    }

    /// Queue the reply delivered after the next unanswered write (FIFO).
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push(text.into());
    }

    /// Deliver scripted replies in fragments of at most `size` bytes.
    pub fn fragment_replies(&self, size: usize) {
        *self.fragment_size.lock().unwrap() = Some(size);
    }

    /// Push an unsolicited notification payload.
    pub fn push_notification(&self, payload: impl AsRef<[u8]>) {
        if let Some(tx) = self.notify_tx.lock().unwrap().as_ref() {
            let _ = tx.send(payload.as_ref().to_vec());
        }
    }

    /// All payloads written so far, as (characteristic, bytes).
    pub fn written(&self) -> Vec<(Uuid, Vec<u8>)> {
        self.written.lock().unwrap().clone()
    }

    /// Commands written so far, CR terminators stripped.
    pub fn written_commands(&self) -> Vec<String> {
        self.written
            .lock()
            .unwrap()
            .iter()
            .map(|(_, bytes)| {
                String::from_utf8_lossy(bytes)
                    .trim_end_matches('\r')
                    .to_string()
            })
            .collect()
    }

    /// Whether notifications were enabled on the characteristic.
    pub fn is_subscribed(&self, characteristic: Uuid) -> bool {
        self.subscribed.lock().unwrap().contains(&characteristic)
    }

    /// Drop the notification sender, ending the subscriber's stream.
    pub fn close_link(&self) {
        *self.notify_tx.lock().unwrap() = None;
    }

    fn deliver(&self, text: &str) {
        let guard = self.notify_tx.lock().unwrap();
        let Some(tx) = guard.as_ref() else { return };
        match *self.fragment_size.lock().unwrap() {
            Some(size) if size > 0 => {
                for chunk in text.as_bytes().chunks(size) {
                    let _ = tx.send(chunk.to_vec());
                }
            }
            _ => {
                let _ = tx.send(text.as_bytes().to_vec());
            }
        }
    }
}

#[async_trait]
impl GattDevice for MockGattDevice {
    async fn service_uuids(&self) -> BleResult<Vec<Uuid>> {
        Ok(self.services.iter().map(|(uuid, _)| *uuid).collect())
    }

    async fn characteristics(&self, service: Uuid) -> BleResult<Vec<GattCharacteristic>> {
        self.services
            .iter()
            .find(|(uuid, _)| *uuid == service)
            .map(|(_, chars)| chars.clone())
            .ok_or_else(|| BleError::Backend(format!("unknown service {service}")))
    }

    async fn write(&self, characteristic: Uuid, payload: &[u8]) -> BleResult<()> {
        self.written
            .lock()
            .unwrap()
            .push((characteristic, payload.to_vec()));

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                None
            } else {
                Some(replies.remove(0))
            }
        };
        if let Some(reply) = reply {
            self.deliver(&reply);
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        characteristic: Uuid,
    ) -> BleResult<mpsc::UnboundedReceiver<Vec<u8>>> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.notify_tx.lock().unwrap() = Some(tx);
        self.subscribed.lock().unwrap().push(characteristic);
        Ok(rx)
    }
}
