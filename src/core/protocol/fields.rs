//! Comma-delimited field scanning
//!
//! A [`FieldScanner`] walks a validated sentence one field at a time. It stops
//! on `*`: once the checksum delimiter is reached every further call yields an
//! empty field.

use super::sentence::NmeaError;
use std::str::FromStr;

/// Cursor over the fields of a sentence
#[derive(Debug, Clone)]
pub struct FieldScanner<'a> {
    rest: &'a str,
}

impl<'a> FieldScanner<'a> {
    /// Start scanning at the beginning of `sentence` (the header is field 0)
    pub fn new(sentence: &'a str) -> Self {
        Self { rest: sentence }
    }

    /// Start scanning after the header field
    pub fn after_header(sentence: &'a str) -> Self {
        let mut scanner = Self::new(sentence);
        scanner.next_field();
        scanner
    }

    /// Return the next field and advance past its delimiter.
    ///
    /// The cursor is left on `*` when the end of the sentence is reached.
    pub fn next_field(&mut self) -> &'a str {
        let end = self.rest.find([',', '*']).unwrap_or(self.rest.len());
        let field = &self.rest[..end];
        self.rest = match self.rest.as_bytes().get(end) {
            Some(b',') => &self.rest[end + 1..],
            _ => &self.rest[end..],
        };
        field
    }

    /// `true` once the cursor sits on `*` or the end of input
    pub fn at_end(&self) -> bool {
        self.rest.is_empty() || self.rest.starts_with('*')
    }

    /// Skip `count` fields
    pub fn skip(&mut self, count: usize) {
        for _ in 0..count {
            self.next_field();
        }
    }

    /// Next field parsed as `T`, `None` when empty
    pub fn optional<T: FromStr>(&mut self) -> Result<Option<T>, NmeaError> {
        parse_optional(self.next_field())
    }

    /// Next field parsed as `T`, zero when empty
    pub fn or_zero<T: FromStr + Default>(&mut self) -> Result<T, NmeaError> {
        Ok(self.optional()?.unwrap_or_default())
    }

    /// Next field's first character, `None` when empty
    pub fn letter(&mut self) -> Option<char> {
        self.next_field().chars().next()
    }

    /// Consume a unit field that must be exactly `unit`
    pub fn expect_unit(&mut self, unit: char) -> Result<(), NmeaError> {
        let field = self.next_field();
        let mut chars = field.chars();
        if chars.next() == Some(unit) && chars.next().is_none() {
            Ok(())
        } else {
            Err(NmeaError::BadUnit {
                expected: unit,
                found: field.to_string(),
            })
        }
    }
}

/// Parse a field, treating an empty one as absent
pub fn parse_optional<T: FromStr>(field: &str) -> Result<Option<T>, NmeaError> {
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse()
        .map(Some)
        .map_err(|_| NmeaError::BadNumber(field.to_string()))
}

/// UTC time of day as carried by the receiver (`HHMMSS[.sss]`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TimeOfDay {
    /// Packed `HHMMSS`
    pub hms: u32,
    /// Millisecond fraction, 0 if the field had none
    pub millis: u16,
}

impl TimeOfDay {
    /// Hours
    pub fn hour(&self) -> u32 {
        self.hms / 10000
    }

    /// Minutes
    pub fn minute(&self) -> u32 {
        (self.hms % 10000) / 100
    }

    /// Seconds
    pub fn second(&self) -> u32 {
        self.hms % 100
    }
}

/// Parse `HHMMSS` with an optional `.fraction`.
///
/// The fraction is a decimal part of a second, so `.5` is 500 ms.
pub fn parse_time(field: &str) -> Result<Option<TimeOfDay>, NmeaError> {
    if field.is_empty() {
        return Ok(None);
    }
    let bad = || NmeaError::BadNumber(field.to_string());
    let (whole, fraction) = match field.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (field, None),
    };
    let hms = whole.parse::<u32>().map_err(|_| bad())?;

    let mut millis = 0u16;
    if let Some(fraction) = fraction {
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        for (i, digit) in fraction.bytes().take(3).enumerate() {
            millis += u16::from(digit - b'0') * [100, 10, 1][i];
        }
    }
    Ok(Some(TimeOfDay { hms, millis }))
}
