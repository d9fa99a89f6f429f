//! Adapter session — initialization sequencing and VIN/DTC reads.
//!
//! One session owns the channel pair for one BLE connection. A pump task
//! reassembles notification fragments into line batches feeding the
//! waiter; protocol steps run strictly sequentially on top.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use dl_ble_uart::{ChannelPair, GattDevice};
use dl_elm_protocol::commands::{self, DtcMode};
use dl_elm_protocol::dtc;
use dl_elm_protocol::framer::LineFramer;
use dl_elm_protocol::vin::{self, Vin};

use crate::error::ScanResult;
use crate::waiter::{LineMatcher, ResponseWaiter};

/// Session lifecycle. `Error` is terminal for the scan attempt; the BLE
/// channels stay open so a user-triggered retry does not re-pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Pairing,
    Initializing,
    Ready,
    Reading,
    Error,
}

/// An ELM327 session over one resolved channel pair.
pub struct AdapterSession {
    device: Arc<dyn GattDevice>,
    service: Uuid,
    tx: Uuid,
    waiter: ResponseWaiter,
    state: SessionState,
    pump: JoinHandle<()>,
}

impl std::fmt::Debug for AdapterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterSession")
            .field("service", &self.service)
            .field("tx", &self.tx)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl AdapterSession {
    /// Build a session over resolved channels and spawn the framer pump.
    pub fn new(
        device: Arc<dyn GattDevice>,
        channels: ChannelPair,
        response_timeout: Duration,
    ) -> Self {
        let ChannelPair {
            service,
            tx,
            rx: _,
            mut notifications,
        } = channels;

        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        let pump = tokio::spawn(async move {
            let mut framer = LineFramer::new();
            while let Some(payload) = notifications.recv().await {
                let text = String::from_utf8_lossy(&payload);
                tracing::trace!(fragment = %text, "rx");
                if let Some(lines) = framer.push(&text) {
                    if batch_tx.send(lines).is_err() {
                        break;
                    }
                }
            }
        });

        Self {
            device,
            service,
            tx,
            waiter: ResponseWaiter::new(batch_rx, response_timeout),
            state: SessionState::Pairing,
            pump,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Service UUID the session's channels resolved under.
    pub fn service(&self) -> Uuid {
        self.service
    }

    /// Write one command, CR-terminated. Does not wait for the response.
    pub async fn send(&self, command: &str) -> ScanResult<()> {
        tracing::debug!(command, "tx");
        let payload = format!("{command}{}", commands::COMMAND_TERMINATOR);
        self.device.write(self.tx, payload.as_bytes()).await?;
        Ok(())
    }

    /// Run the ELM327 initialization sequence: reset, echo off, headers
    /// off, automatic protocol selection. Each step is acknowledged by any
    /// line before the next one is sent.
    pub async fn initialize(&mut self) -> ScanResult<()> {
        self.state = SessionState::Initializing;
        for command in commands::INIT_SEQUENCE {
            if let Err(e) = self.init_step(command).await {
                self.state = SessionState::Error;
                return Err(e);
            }
        }
        self.state = SessionState::Ready;
        tracing::info!("adapter initialized");
        Ok(())
    }

    async fn init_step(&self, command: &str) -> ScanResult<()> {
        self.send(command).await?;
        self.waiter.wait_line(&LineMatcher::any_line()).await?;
        Ok(())
    }

    /// Read the 17-character VIN (mode 09 PID 02).
    pub async fn read_vin(&mut self) -> ScanResult<Vin> {
        self.state = SessionState::Reading;
        match self.read_vin_inner().await {
            Ok(vin) => {
                self.state = SessionState::Ready;
                Ok(vin)
            }
            Err(e) => {
                self.state = SessionState::Error;
                Err(e)
            }
        }
    }

    async fn read_vin_inner(&self) -> ScanResult<Vin> {
        self.send(commands::CMD_READ_VIN).await?;
        let frames = self
            .waiter
            .wait_line(&LineMatcher::regex(vin::VIN_RESPONSE.clone()))
            .await?;
        Ok(vin::decode_vin_frames(&frames)?)
    }

    /// Read stored or pending trouble codes (mode 03 / 07).
    pub async fn read_dtcs(&mut self, mode: DtcMode) -> ScanResult<Vec<String>> {
        self.state = SessionState::Reading;
        match self.read_dtcs_inner(mode).await {
            Ok(codes) => {
                self.state = SessionState::Ready;
                Ok(codes)
            }
            Err(e) => {
                self.state = SessionState::Error;
                Err(e)
            }
        }
    }

    async fn read_dtcs_inner(&self, mode: DtcMode) -> ScanResult<Vec<String>> {
        self.send(mode.command()).await?;
        let batch = self
            .waiter
            .wait_line(&LineMatcher::prefix(mode.response_prefix()))
            .await?;

        let codes = batch
            .iter()
            .find(|line| line.starts_with(mode.response_prefix()))
            .map(|line| dtc::parse_dtc_line(line))
            .unwrap_or_default();
        Ok(codes)
    }
}

impl Drop for AdapterSession {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
