//! DTC decoding — Mode 03/07 response lines into 5-character code strings.

/// Category letter from the top two bits of the first raw byte.
const CATEGORIES: [char; 4] = ['P', 'C', 'B', 'U'];

/// Decode one raw byte pair into a DTC string (e.g. "P0301").
///
/// An all-zero pair is padding, not "P0000".
pub fn decode_dtc_pair(b1: u8, b2: u8) -> Option<String> {
    if b1 == 0 && b2 == 0 {
        return None;
    }

    let category = CATEGORIES[usize::from(b1 >> 6)];
    let digit = (b1 >> 4) & 0x03;
    let rest = u16::from(b1 & 0x0F) << 8 | u16::from(b2);

    Some(format!("{category}{digit}{rest:03X}"))
}

/// Parse a Mode 03/07 response line into its trouble codes, response order
/// preserved, duplicates kept.
///
/// Layout: two header tokens, then raw DTC bytes as hex pairs. Tokens that
/// do not parse as hex are dropped; a trailing unpaired byte is ignored.
pub fn parse_dtc_line(line: &str) -> Vec<String> {
    let bytes: Vec<u8> = line
        .split_whitespace()
        .skip(2)
        .filter_map(|token| u8::from_str_radix(token, 16).ok())
        .collect();

    bytes
        .chunks_exact(2)
        .filter_map(|pair| decode_dtc_pair(pair[0], pair[1]))
        .collect()
}
