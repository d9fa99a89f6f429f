//! The three BLE UART-over-GATT profiles spoken by ELM327 bridges.
//!
//! Tried in priority order: Nordic UART, then HM-10 style, then legacy
//! ISSC. The UUIDs must match the hardware exactly.

use uuid::Uuid;

/// Nordic UART Service — custom 128-bit UUIDs with dedicated TX/RX roles.
pub mod nus {
    use uuid::Uuid;

    pub const SERVICE: Uuid = Uuid::from_u128(0x6e400001_b5a3_f393_e0a9_e50e24dcca9e);
    /// Central writes commands here.
    pub const TX: Uuid = Uuid::from_u128(0x6e400002_b5a3_f393_e0a9_e50e24dcca9e);
    /// Adapter notifies responses here.
    pub const RX: Uuid = Uuid::from_u128(0x6e400003_b5a3_f393_e0a9_e50e24dcca9e);
}

/// HM-10 style modules — one data characteristic for both directions,
/// selected by its write/notify properties rather than by role UUID.
pub mod hm10 {
    use uuid::Uuid;

    pub const SERVICE: Uuid = Uuid::from_u128(0x0000ffe0_0000_1000_8000_00805f9b34fb);
    pub const DATA: Uuid = Uuid::from_u128(0x0000ffe1_0000_1000_8000_00805f9b34fb);
    /// Some clones expose a separate writable characteristic.
    pub const DATA_ALT: Uuid = Uuid::from_u128(0x0000ffe2_0000_1000_8000_00805f9b34fb);
}

/// Legacy ISSC transparent UART.
pub mod issc {
    use uuid::Uuid;

    pub const SERVICE: Uuid = Uuid::from_u128(0x0000fff0_0000_1000_8000_00805f9b34fb);
    /// Adapter notifies responses here.
    pub const RX: Uuid = Uuid::from_u128(0x0000fff1_0000_1000_8000_00805f9b34fb);
    /// Central writes commands here.
    pub const TX: Uuid = Uuid::from_u128(0x0000fff2_0000_1000_8000_00805f9b34fb);
}

/// Candidate service UUIDs in discovery priority order.
pub const SERVICE_PRIORITY: [Uuid; 3] = [nus::SERVICE, hm10::SERVICE, issc::SERVICE];

/// Human-readable profile name for a matched service UUID.
pub fn profile_name(service: Uuid) -> &'static str {
    if service == nus::SERVICE {
        "NUS"
    } else if service == hm10::SERVICE {
        "HM10"
    } else if service == issc::SERVICE {
        "ISSC"
    } else {
        "unknown"
    }
}
