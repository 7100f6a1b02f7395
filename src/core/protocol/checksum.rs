//! NMEA checksum helpers
//!
//! The checksum is the XOR of every byte between `$` and `*`, rendered as two
//! uppercase hex digits.

use std::fmt::Write;

/// XOR checksum - XOR of all bytes
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Checksum of a sentence body (the text after `$`, without `*HH`)
pub fn sentence_checksum(body: &str) -> u8 {
    xor_checksum(body.as_bytes())
}

/// Decode one ASCII hex digit, either case
fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Decode a two-digit hex checksum field
pub fn parse_hex_pair(digits: &[u8]) -> Option<u8> {
    match digits {
        [hi, lo] => Some(hex_value(*hi)? << 4 | hex_value(*lo)?),
        _ => None,
    }
}

/// Frame a body that already starts with `$`: appends `*HH`.
///
/// Returns `None` if `line` does not start with `$`.
pub fn append_checksum(line: &mut String) -> Option<u8> {
    let body = line.strip_prefix('$')?;
    let crc = sentence_checksum(body);
    // Writing to a String cannot fail
    let _ = write!(line, "*{crc:02X}");
    Some(crc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor() {
        assert_eq!(xor_checksum(&[0x01, 0x02, 0x03]), 0x00);
        assert_eq!(xor_checksum(&[0xFF, 0x00]), 0xFF);
    }

    #[test]
    fn test_known_sentence_checksum() {
        let body = "GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";
        assert_eq!(sentence_checksum(body), 0x47);
    }

    #[test]
    fn test_parse_hex_pair_case_insensitive() {
        assert_eq!(parse_hex_pair(b"6A"), Some(0x6A));
        assert_eq!(parse_hex_pair(b"6a"), Some(0x6A));
        assert_eq!(parse_hex_pair(b"6"), None);
        assert_eq!(parse_hex_pair(b"6G"), None);
        assert_eq!(parse_hex_pair(b"6A0"), None);
    }

    #[test]
    fn test_append_checksum() {
        let mut line = String::from("$PMTK000");
        assert_eq!(append_checksum(&mut line), Some(0x32));
        assert_eq!(line, "$PMTK000*32");

        let mut bad = String::from("PMTK000");
        assert_eq!(append_checksum(&mut bad), None);
        assert_eq!(bad, "PMTK000");
    }
}
