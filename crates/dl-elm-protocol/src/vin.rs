//! VIN decoding — Mode 09 PID 02 responses and the fields derived from them.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;

use crate::error::{DecodeError, DecodeResult};

/// A VIN is 17 characters; responses carrying more are truncated.
pub const VIN_LEN: usize = 17;

/// Matches a line carrying VIN data, or the adapter's explicit rejection
/// when the ECU is unreachable.
pub static VIN_RESPONSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(49 02|UNABLE TO CONNECT)").expect("valid pattern"));

static VIN_DATA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)49 02").expect("valid pattern"));

static HEX_BYTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{2}$").expect("valid pattern"));

/// VIN position-10 model year letters, in order from 1980. The cycle
/// repeats every 30 years.
pub const MODEL_YEAR_CODES: &str = "ABCDEFGHJKLMNPRSTVWXY123456789";

/// A decoded vehicle identification number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vin(String);

impl Vin {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// World manufacturer identifier, VIN positions 1–3.
    pub fn wmi(&self) -> String {
        self.0.chars().take(3).collect()
    }

    /// Vehicle descriptor section, VIN positions 4–10.
    pub fn type_code(&self) -> String {
        self.0.chars().skip(3).take(7).collect()
    }

    /// Model year letter, VIN position 10.
    pub fn year_code(&self) -> Option<char> {
        self.0.chars().nth(9)
    }

    /// Model year resolved against the current calendar year.
    pub fn model_year(&self) -> Option<i32> {
        self.year_code()
            .and_then(|code| decode_model_year(code, Utc::now().year()))
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decode the VIN out of a Mode 09 PID 02 response batch.
///
/// Every line is tokenized into 2-hex-digit bytes (anything else is
/// dropped); frames opening with `49 02` lose their three header bytes
/// (mode/PID/sequence echo), other frames contribute all their bytes. The
/// first 17 bytes across all frames are read as ASCII.
pub fn decode_vin_frames(lines: &[String]) -> DecodeResult<Vin> {
    if !lines.iter().any(|line| VIN_DATA.is_match(line)) {
        return Err(DecodeError::VehicleNotConnected);
    }

    let mut bytes = Vec::with_capacity(VIN_LEN);
    for line in lines {
        let tokens: Vec<&str> = line
            .split_whitespace()
            .filter(|token| HEX_BYTE.is_match(token))
            .collect();

        let data = if tokens.len() >= 2
            && tokens[0].eq_ignore_ascii_case("49")
            && tokens[1].eq_ignore_ascii_case("02")
        {
            &tokens[3.min(tokens.len())..]
        } else {
            &tokens[..]
        };

        for token in data {
            if let Ok(byte) = u8::from_str_radix(token, 16) {
                bytes.push(byte);
            }
        }
    }

    bytes.truncate(VIN_LEN);
    Ok(Vin(bytes.into_iter().map(char::from).collect()))
}

/// Decode a VIN position-10 character against `current_year`.
///
/// Returns the latest year in the 30-year cycle that does not pass
/// `current_year`, or `None` for characters outside the table.
pub fn decode_model_year(code: char, current_year: i32) -> Option<i32> {
    let index = MODEL_YEAR_CODES.find(code.to_ascii_uppercase())?;
    let mut year = 1980 + index as i32;
    while year + 30 < current_year {
        year += 30;
    }
    Some(year)
}
