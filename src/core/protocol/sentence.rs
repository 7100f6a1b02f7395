//! Sentence framing, validation and classification
//!
//! A raw sentence looks like `$<talker><type>,<field>,...*<HH>\r\n`. Nothing
//! reaches a decoder unless [`validate`] accepts it first.

use super::checksum::{parse_hex_pair, xor_checksum};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum accepted sentence length in bytes, terminator included
pub const MAX_SENTENCE_LEN: usize = 256;

/// NMEA parser errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NmeaError {
    /// Line does not start with `$` or has a malformed checksum trailer
    #[error("invalid sentence framing")]
    InvalidFraming,

    /// No `*` checksum delimiter was found
    #[error("missing checksum delimiter")]
    MissingChecksum,

    /// Stated and computed checksums differ
    #[error("checksum mismatch: sentence says {expected:02X}, computed {computed:02X}")]
    ChecksumMismatch {
        /// Checksum carried by the sentence
        expected: u8,
        /// Checksum computed over the body
        computed: u8,
    },

    /// Line is longer than [`MAX_SENTENCE_LEN`]
    #[error("sentence too long: {0} bytes")]
    TooLong(usize),

    /// Hemisphere letter is not valid for its axis
    #[error("invalid hemisphere '{0}'")]
    BadHemisphere(String),

    /// RMC status letter is neither `A` nor `V`
    #[error("invalid status '{0}'")]
    BadStatus(String),

    /// Unit letter does not match the grammar
    #[error("expected unit '{expected}', found '{found}'")]
    BadUnit {
        /// Unit letter required at this position
        expected: char,
        /// Field content actually found
        found: String,
    },

    /// Satellite PRN does not fit in one byte
    #[error("PRN {0} out of range")]
    PrnOutOfRange(u32),

    /// Non-empty numeric field failed to parse
    #[error("malformed number '{0}'")]
    BadNumber(String),
}

/// Sentence kinds understood by the receiver session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentenceKind {
    /// Geographic position, latitude/longitude and time
    Gll,
    /// Recommended minimum specific GNSS data
    Rmc,
    /// Course over ground and ground speed
    Vtg,
    /// GPS fix data
    Gga,
    /// DOP and active satellites
    Gsa,
    /// Satellites in view
    Gsv,
    /// Time and date
    Zda,
    /// MTK channel status
    #[serde(rename = "PMTKCHN")]
    MtkChannels,
    /// Any other PMTK reply
    #[serde(rename = "PMTK")]
    MtkReply,
    /// Vendor acknowledgement
    #[serde(rename = "PGACK")]
    VendorAck,
    /// Vendor information (antenna status)
    #[serde(rename = "PGTOP")]
    VendorInfo,
    /// Not a recognised sentence
    Invalid,
}

/// Header literals tested in order; `$PMTKCHN,` has to come before `$PMTK`
const HEADERS: [(&str, SentenceKind); 11] = [
    ("$GPRMC,", SentenceKind::Rmc),
    ("$GPGGA,", SentenceKind::Gga),
    ("$GPGLL,", SentenceKind::Gll),
    ("$GPVTG,", SentenceKind::Vtg),
    ("$GPGSA,", SentenceKind::Gsa),
    ("$GPGSV,", SentenceKind::Gsv),
    ("$GPZDA,", SentenceKind::Zda),
    ("$PMTKCHN,", SentenceKind::MtkChannels),
    ("$PMTK", SentenceKind::MtkReply),
    ("$PGTOP,", SentenceKind::VendorInfo),
    ("$PGACK,", SentenceKind::VendorAck),
];

impl SentenceKind {
    /// All decodable kinds, in output-mask bit order
    pub const DECODED: [SentenceKind; 8] = [
        SentenceKind::Gll,
        SentenceKind::Rmc,
        SentenceKind::Vtg,
        SentenceKind::Gga,
        SentenceKind::Gsa,
        SentenceKind::Gsv,
        SentenceKind::Zda,
        SentenceKind::MtkChannels,
    ];

    /// Bit used for this kind in validity and output masks
    pub fn bit(self) -> u32 {
        match self {
            Self::Gll => 0x0001,
            Self::Rmc => 0x0002,
            Self::Vtg => 0x0004,
            Self::Gga => 0x0008,
            Self::Gsa => 0x0010,
            Self::Gsv => 0x0020,
            Self::Zda => 0x0040,
            Self::MtkChannels => 0x0080,
            Self::VendorInfo => 0x2000,
            Self::VendorAck => 0x4000,
            Self::MtkReply => 0x8000,
            Self::Invalid => 0,
        }
    }

    /// Short name as used on the wire
    pub fn name(self) -> &'static str {
        match self {
            Self::Gll => "GLL",
            Self::Rmc => "RMC",
            Self::Vtg => "VTG",
            Self::Gga => "GGA",
            Self::Gsa => "GSA",
            Self::Gsv => "GSV",
            Self::Zda => "ZDA",
            Self::MtkChannels => "PMTKCHN",
            Self::MtkReply => "PMTK",
            Self::VendorAck => "PGACK",
            Self::VendorInfo => "PGTOP",
            Self::Invalid => "INVALID",
        }
    }

    /// Parse a short name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        HEADERS
            .iter()
            .map(|&(_, kind)| kind)
            .find(|kind| kind.name() == upper)
    }
}

impl fmt::Display for SentenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One bit per [`SentenceKind`], set once that kind has decoded successfully
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidityMask(u32);

impl ValidityMask {
    /// Empty mask
    pub fn new() -> Self {
        Self(0)
    }

    /// Mark a kind as populated
    pub fn set(&mut self, kind: SentenceKind) {
        self.0 |= kind.bit();
    }

    /// Check whether a kind has been populated
    pub fn contains(self, kind: SentenceKind) -> bool {
        kind.bit() != 0 && self.0 & kind.bit() != 0
    }

    /// Raw bits
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Mask from raw bits, as used in output-rate configuration
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

impl FromIterator<SentenceKind> for ValidityMask {
    fn from_iter<I: IntoIterator<Item = SentenceKind>>(iter: I) -> Self {
        let mut mask = Self::new();
        for kind in iter {
            mask.set(kind);
        }
        mask
    }
}

/// Verify framing and checksum of a raw line.
///
/// Returns the checksum on success. The two hex digits may be followed by
/// nothing, `\r`, `\n` or `\r\n`.
pub fn validate(line: &str) -> Result<u8, NmeaError> {
    let bytes = line.as_bytes();
    if bytes.len() > MAX_SENTENCE_LEN {
        return Err(NmeaError::TooLong(bytes.len()));
    }
    if bytes.first() != Some(&b'$') {
        return Err(NmeaError::InvalidFraming);
    }

    let star = bytes
        .iter()
        .position(|&b| b == b'*')
        .ok_or(NmeaError::MissingChecksum)?;
    let computed = xor_checksum(&bytes[1..star]);

    let trailer = &bytes[star + 1..];
    if trailer.len() < 2 {
        return Err(NmeaError::InvalidFraming);
    }
    let expected = parse_hex_pair(&trailer[..2]).ok_or(NmeaError::InvalidFraming)?;
    if !matches!(&trailer[2..], b"" | b"\r" | b"\n" | b"\r\n") {
        return Err(NmeaError::InvalidFraming);
    }

    if expected != computed {
        return Err(NmeaError::ChecksumMismatch { expected, computed });
    }
    Ok(computed)
}

/// `true` if [`validate`] accepts the line
pub fn is_valid(line: &str) -> bool {
    validate(line).is_ok()
}

/// Classify a line by its header literal
pub fn classify(line: &str) -> SentenceKind {
    HEADERS
        .iter()
        .find(|(header, _)| line.starts_with(header))
        .map_or(SentenceKind::Invalid, |&(_, kind)| kind)
}

/// Byte-at-a-time line accumulator.
///
/// `$` restarts the line and `\n` completes it. Lines that outgrow
/// [`MAX_SENTENCE_LEN`] are dropped whole when their terminator arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
    overflowed: bool,
    overflows: u64,
}

impl LineBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(MAX_SENTENCE_LEN),
            overflowed: false,
            overflows: 0,
        }
    }

    /// Feed one byte; returns a complete line when `\n` arrives
    pub fn push(&mut self, byte: u8) -> Option<String> {
        match byte {
            b'$' => {
                self.buf.clear();
                self.overflowed = false;
                self.buf.push(byte);
                None
            }
            b'\n' => {
                if self.overflowed {
                    self.overflowed = false;
                    self.overflows += 1;
                    self.buf.clear();
                    tracing::warn!("discarded line longer than {} bytes", MAX_SENTENCE_LEN);
                    return None;
                }
                if self.buf.is_empty() {
                    return None;
                }
                let line = String::from_utf8_lossy(&self.buf).into_owned();
                self.buf.clear();
                Some(line)
            }
            _ => {
                if self.buf.len() < MAX_SENTENCE_LEN {
                    self.buf.push(byte);
                } else {
                    self.overflowed = true;
                }
                None
            }
        }
    }

    /// Discard any partial line
    pub fn clear(&mut self) {
        self.buf.clear();
        self.overflowed = false;
    }

    /// Number of over-long lines discarded so far
    pub fn overflows(&self) -> u64 {
        self.overflows
    }
}
