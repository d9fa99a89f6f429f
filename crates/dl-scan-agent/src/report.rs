//! Scan result summary.
//!
//! Field shape follows the scan log uploaded after every session: the VIN
//! with its derived WMI and type-code slices, then the two code lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use dl_elm_protocol::vin::Vin;

/// Outcome of one complete scan. No persistence — this is the value handed
/// to whatever surfaces results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: Uuid,
    pub started_at: DateTime<Utc>,
    /// VIN as reported by the vehicle (17 ASCII characters).
    pub vin: String,
    /// World manufacturer identifier, VIN positions 1–3.
    pub wmi: String,
    /// Vehicle descriptor section, VIN positions 4–10.
    pub vehicle_type_code: String,
    /// Decoded model year, when VIN position 10 maps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_year: Option<i32>,
    /// Stored (confirmed) trouble codes, response order.
    pub stored_dtcs: Vec<String>,
    /// Pending trouble codes, response order.
    pub pending_dtcs: Vec<String>,
    /// BLE service profile the adapter spoke.
    pub ble_service: Uuid,
}

impl ScanReport {
    pub fn new(
        started_at: DateTime<Utc>,
        vin: &Vin,
        stored_dtcs: Vec<String>,
        pending_dtcs: Vec<String>,
        ble_service: Uuid,
    ) -> Self {
        Self {
            scan_id: Uuid::now_v7(),
            started_at,
            vin: vin.as_str().to_string(),
            wmi: vin.wmi(),
            vehicle_type_code: vin.type_code(),
            model_year: vin.model_year(),
            stored_dtcs,
            pending_dtcs,
            ble_service,
        }
    }
}
