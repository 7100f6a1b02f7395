//! MediaTek vendor sentences
//!
//! Covers the `$PMTKCHN` channel status report and the `$PMTK<nnn>` replies a
//! receiver sends back to commands.

use super::fields::FieldScanner;
use super::pmtk::codes;
use super::sentence::NmeaError;
use serde::Serialize;

/// Tracking channels reported by `$PMTKCHN`
pub const MTK_MAX_CHN: usize = 32;

/// Offset of the release text in `$PMTK705,...`
const RELEASE_OFFSET: usize = 9;

/// One receiver tracking channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelStatus {
    /// Satellite PRN, 0 when the channel is free
    pub prn: u32,
    /// Signal to noise ratio, dB-Hz
    pub snr: u16,
    /// Tracking state digit, 0 when idle
    pub track: u8,
}

impl ChannelStatus {
    /// Unpack the `PPPSSt` integer the receiver emits
    pub fn unpack(value: u32) -> Self {
        Self {
            prn: value / 1000,
            // Both below 100 after the modulo
            snr: ((value % 1000) / 10) as u16,
            track: (value % 10) as u8,
        }
    }
}

/// Parse a `$PMTKCHN` sentence. A zero or empty slot stays at its default.
pub fn decode_channels(sentence: &str) -> Result<[ChannelStatus; MTK_MAX_CHN], NmeaError> {
    let mut fields = FieldScanner::after_header(sentence);
    let mut channels = [ChannelStatus::default(); MTK_MAX_CHN];
    for channel in &mut channels {
        let value = fields.or_zero::<u32>()?;
        if value != 0 {
            *channel = ChannelStatus::unpack(value);
        }
    }
    Ok(channels)
}

/// Packet type of a `$PMTK` reply.
///
/// Digits after the prefix are the command number, `LOG` is the LOCUS log
/// pseudo type. Anything else has no type.
pub fn reply_type(sentence: &str) -> Option<u16> {
    let header = FieldScanner::new(sentence).next_field();
    let rest = header.strip_prefix("$PMTK")?;
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest, |end| &rest[..end]);
    if !digits.is_empty() {
        return digits.parse().ok();
    }
    if rest == "LOG" {
        return Some(codes::PMTK_DT_LOCUS_LOG);
    }
    None
}

/// Text of a `$PMTK705` firmware release reply, up to the checksum
pub fn release_text(sentence: &str) -> Option<&str> {
    let end = sentence.find('*').unwrap_or(sentence.len());
    if end < RELEASE_OFFSET {
        return None;
    }
    sentence.get(RELEASE_OFFSET..end)
}

/// Result flag of a `$PMTK001` acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AckStatus {
    /// Malformed command
    InvalidPacket,
    /// Command not supported
    Unsupported,
    /// Valid command, action failed
    Failed,
    /// Valid command, action succeeded
    Succeeded,
}

impl AckStatus {
    /// Map the flag digit, `None` for unknown values
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Self::InvalidPacket),
            1 => Some(Self::Unsupported),
            2 => Some(Self::Failed),
            3 => Some(Self::Succeeded),
            _ => None,
        }
    }

    /// Receiver accepted and executed the command
    pub fn is_success(self) -> bool {
        self == Self::Succeeded
    }
}

impl std::fmt::Display for AckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPacket => write!(f, "invalid packet"),
            Self::Unsupported => write!(f, "unsupported packet type"),
            Self::Failed => write!(f, "valid packet, action failed"),
            Self::Succeeded => write!(f, "succeeded"),
        }
    }
}

/// Decoded `$PMTK001,<cmd>,<flag>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AckReport {
    /// Command being acknowledged
    pub command: u16,
    /// Result flag
    pub status: AckStatus,
}

/// Parse a `$PMTK001` acknowledgement
pub fn decode_ack(sentence: &str) -> Result<AckReport, NmeaError> {
    let mut fields = FieldScanner::after_header(sentence);
    let command_field = fields.next_field();
    let command = command_field
        .parse::<u16>()
        .map_err(|_| NmeaError::BadNumber(command_field.to_string()))?;
    let flag_field = fields.next_field();
    let status = flag_field
        .parse::<u8>()
        .ok()
        .and_then(AckStatus::from_flag)
        .ok_or_else(|| NmeaError::BadStatus(flag_field.to_string()))?;
    Ok(AckReport { command, status })
}
