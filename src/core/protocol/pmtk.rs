//! PMTK command encoder
//!
//! Builds checksum-framed `$PMTK<nnn>[,arg]*HH` command sentences and the
//! handful of commands with their own argument grammar (output rates,
//! navigation threshold, easy mode, update rate).

use super::checksum::append_checksum;
use super::sentence::{SentenceKind, ValidityMask};
use thiserror::Error;

/// Command and reply codes understood by MTK3339-class receivers
pub mod codes {
    /// Argument: enable
    pub const PMTK_ARG_ON: u32 = 1;
    /// Argument: disable
    pub const PMTK_ARG_OFF: u32 = 0;

    /// `PMTK251` argument restoring the factory default speed
    pub const PMTK_BR_DEFAULT: u32 = 0;

    /// `PMTK301` DGPS modes
    pub const PMTK_DGPS_NONE: u32 = 0;
    /// RTCM corrections
    pub const PMTK_DGPS_RTCM: u32 = 1;
    /// WAAS corrections
    pub const PMTK_DGPS_WAAS: u32 = 2;

    /// `PMTK302` dynamic modes
    pub const PMTK_DYN_FIXED: u32 = 0;
    /// Slow ground vehicle
    pub const PMTK_DYN_SLOW_GV: u32 = 3;
    /// Fast ground vehicle
    pub const PMTK_DYN_FAST_GV: u32 = 4;
    /// Slow airborne
    pub const PMTK_DYN_SLOW_AB: u32 = 5;

    /// `PMTK319` SBAS modes
    pub const PMTK_SBAS_TESTING: u32 = 0;
    /// SBAS integrity mode
    pub const PMTK_SBAS_INTEGRITY: u32 = 1;

    /// `PGCMD,33` antenna arguments
    pub const PCMD_ANTENNA_OFF: u32 = 0;
    /// Report antenna status
    pub const PCMD_ANTENNA_ON: u32 = 1;
    /// Query antenna status once
    pub const PCMD_ANTENNA_Q: u32 = 2;

    /// Navigation threshold table indices (0.0 to 2.0 m/s)
    pub const PMTK_NAV_THRESHOLD_OFF: u8 = 0;
    /// 0.2 m/s
    pub const PMTK_NAV_THRESHOLD_02: u8 = 1;
    /// 0.4 m/s
    pub const PMTK_NAV_THRESHOLD_04: u8 = 2;
    /// 0.6 m/s
    pub const PMTK_NAV_THRESHOLD_06: u8 = 3;
    /// 0.8 m/s
    pub const PMTK_NAV_THRESHOLD_08: u8 = 4;
    /// 1.0 m/s
    pub const PMTK_NAV_THRESHOLD_10: u8 = 5;
    /// 1.5 m/s
    pub const PMTK_NAV_THRESHOLD_15: u8 = 6;
    /// 2.0 m/s
    pub const PMTK_NAV_THRESHOLD_20: u8 = 7;

    /// Link test, answered with an ack
    pub const PMTK_TEST: u16 = 0;
    /// Acknowledgement reply
    pub const PMTK_ACK: u16 = 1;
    /// System message
    pub const PMTK_SYS_MSG: u16 = 10;
    /// Text message
    pub const PMTK_TXT_MSG: u16 = 11;
    /// Antenna control, framed as `$PGCMD,33,<arg>`
    pub const PCMD_ANTENNA: u16 = 33;
    /// Restart using all stored data
    pub const PMTK_CMD_HOT_START: u16 = 101;
    /// Restart without ephemeris
    pub const PMTK_CMD_WARM_START: u16 = 102;
    /// Restart without almanac or ephemeris
    pub const PMTK_CMD_COLD_START: u16 = 103;
    /// Cold start and wipe settings
    pub const PMTK_CMD_FACTORY_RESET: u16 = 104;
    /// Erase EPO data from flash
    pub const PMTK_CMD_CLEAR_EPO: u16 = 127;
    /// Enter standby (argument 0) or sleep
    pub const PMTK_CMD_STANDBY_MODE: u16 = 161;
    /// Query LOCUS status, reply is `$PMTKLOG`
    pub const PMTK_Q_LOCUS_STATUS: u16 = 183;
    /// Erase the LOCUS log
    pub const PMTK_LOCUS_ERASE_FLASH: u16 = 184;
    /// Start or stop LOCUS logging
    pub const PMTK_LOCUS_LOGGER: u16 = 185;
    /// Write one LOCUS record now
    pub const PMTK_LOG_NOW: u16 = 186;
    /// LOCUS interval and mode
    pub const PMTK_LOCUS_CONFIG: u16 = 187;
    /// Fix interval in milliseconds
    pub const PMTK_SET_NMEA_UPDATE: u16 = 220;
    /// Extended ephemeris download settings
    pub const PMTK_SET_AL_DEE_CFG: u16 = 223;
    /// Periodic power saving mode
    pub const PMTK_CMD_PERIODIC_MODE: u16 = 225;
    /// Serial speed of the NMEA port
    pub const PMTK_SET_NMEA_BAUD_RATE: u16 = 251;
    /// Switch between NMEA and binary output
    pub const PMTK_SET_OUTPUT_FMT: u16 = 253;
    /// Active interference cancellation
    pub const PMTK_SET_AIC_MODE: u16 = 286;
    /// DGPS source
    pub const PMTK_SET_DGPS_MODE: u16 = 301;
    /// Dynamic platform model
    pub const PMTK_SET_DYN_MODE: u16 = 302;
    /// SBAS search on or off
    pub const PMTK_SET_SBAS_ENABLE: u16 = 313;
    /// Per-sentence output rates
    pub const PMTK_SET_NMEA_OUTPUT: u16 = 314;
    /// SBAS testing or integrity mode
    pub const PMTK_SET_SBAS_MODE: u16 = 319;
    /// Select a predefined datum
    pub const PMTK_SET_DATUM: u16 = 330;
    /// User-defined datum
    pub const PMTK_SET_DATUM_ADVANCE: u16 = 331;
    /// Static navigation speed threshold
    pub const PMTK_SET_NAV_THRESHOLD: u16 = 386;
    /// Query fix interval
    pub const PMTK_Q_FIX_INTERVAL: u16 = 400;
    /// Query DGPS source
    pub const PMTK_Q_DGPS_MODE: u16 = 401;
    /// Query dynamic model
    pub const PMTK_Q_DYN_MODE: u16 = 402;
    /// Query SBAS search
    pub const PMTK_Q_SBAS_ENABLE: u16 = 413;
    /// Query output rates
    pub const PMTK_Q_NMEA_OUTPUT: u16 = 414;
    /// Query SBAS mode
    pub const PMTK_Q_SBAS_MODE: u16 = 419;
    /// Query datum
    pub const PMTK_Q_DATUM: u16 = 430;
    /// Query user datum
    pub const PMTK_Q_DATUM_ADVANCE: u16 = 431;
    /// Query navigation threshold
    pub const PMTK_Q_NAV_THRESHOLD: u16 = 447;
    /// Query user options
    pub const PMTK_Q_USER_OPTION: u16 = 490;
    /// Fix interval reply
    pub const PMTK_DT_FIX_INTERVAL: u16 = 500;
    /// DGPS source reply
    pub const PMTK_DT_DGPS_MODE: u16 = 501;
    /// Dynamic model reply
    pub const PMTK_DT_DYN_MODE: u16 = 502;
    /// SBAS search reply
    pub const PMTK_DT_SBAS_ENABLE: u16 = 513;
    /// Output rates reply
    pub const PMTK_DT_NMEA_OUTPUT: u16 = 514;
    /// SBAS mode reply
    pub const PMTK_DT_SBAS_MODE: u16 = 519;
    /// Navigation threshold reply
    pub const PMTK_DT_NAV_THRESHOLD: u16 = 527;
    /// Datum reply
    pub const PMTK_DT_DATUM: u16 = 530;
    /// User options reply
    pub const PMTK_DT_USER_OPTION: u16 = 590;
    /// Query RTCM port speed
    pub const PMTK_Q_RTCM_BAUD_RATE: u16 = 602;
    /// Query firmware release
    pub const PMTK_Q_RELEASE: u16 = 605;
    /// Query EPO status
    pub const PMTK_Q_EPO_INFO: u16 = 607;
    /// 0 full dump, 1 partial
    pub const PMTK_Q_LOCUS_DATA: u16 = 622;
    /// RTCM port speed reply
    pub const PMTK_DT_RTCM_BAUD_RATE: u16 = 702;
    /// Firmware release reply
    pub const PMTK_DT_RELEASE: u16 = 705;
    /// EPO status reply
    pub const PMTK_DT_EPO_INFO: u16 = 707;
    /// EASY self-generated ephemeris
    pub const PMTK_CMD_EASY_ENABLE: u16 = 869;

    /// Pseudo reply code for `$PMTKLOG`
    pub const PMTK_DT_LOCUS_LOG: u16 = 1000;
}

/// Baud rates a receiver will accept, in probe order.
///
/// 14400 is left out: receivers misbehave at that speed.
pub const BAUD_CANDIDATES: [u32; 6] = [4800, 9600, 19200, 38400, 57600, 115200];

/// Binary packet switching the receiver back to NMEA text output
pub const BIN_OFF: [u8; 13] = [
    0x24, 0x0E, 0x00, 0xFD, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF3, 0x0D, 0x0A,
];

/// Priority levels accepted by the output-rate command
pub const MAX_OUTPUT_MASKS: usize = 5;

/// Sentence kind per `PMTK314` slot; `None` slots are reserved
const OUTPUT_SLOTS: [Option<SentenceKind>; 19] = [
    Some(SentenceKind::Gll),
    Some(SentenceKind::Rmc),
    Some(SentenceKind::Vtg),
    Some(SentenceKind::Gga),
    Some(SentenceKind::Gsa),
    Some(SentenceKind::Gsv),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    Some(SentenceKind::Zda),
    Some(SentenceKind::MtkChannels),
];

/// Speed thresholds (m/s) indexed by `PMTK_NAV_THRESHOLD_*`
pub const NAV_THRESHOLD: [f64; 8] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0, 1.5, 2.0];

/// Command encoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Code does not fit in three digits
    #[error("Command code {0} has more than three digits")]
    InvalidCode(u16),

    /// Rate is not one the receiver accepts
    #[error("Unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// Update rate outside 1 to 10 Hz
    #[error("Update rate must be 1-10 Hz, got {0}")]
    InvalidUpdateRate(u8),

    /// More masks than PMTK314 has rate divisors
    #[error("At most {MAX_OUTPUT_MASKS} output masks, got {0}")]
    TooManyMasks(usize),

    /// Only NMEA output is supported
    #[error("Binary NMEA output is not supported")]
    BinaryFormat,

    /// Raw command does not start with `$`
    #[error("Command must start with '$': {0}")]
    MissingPrefix(String),
}

/// Append the checksum to a `$`-prefixed body
pub fn frame(mut body: String) -> Result<String, CommandError> {
    match append_checksum(&mut body) {
        Some(_) => Ok(body),
        None => Err(CommandError::MissingPrefix(body)),
    }
}

/// Encode `$PMTK<code>[,<arg>]`.
///
/// Code 33 is the antenna command and uses the `$PGCMD` form instead.
pub fn command(code: u16, arg: Option<u32>) -> Result<String, CommandError> {
    if code > 999 {
        return Err(CommandError::InvalidCode(code));
    }
    let body = match (code, arg) {
        (codes::PCMD_ANTENNA, Some(arg)) => format!("$PGCMD,{code},{arg}"),
        (codes::PCMD_ANTENNA, None) => format!("$PGCMD,{code}"),
        (_, Some(arg)) => format!("$PMTK{code:03},{arg}"),
        (_, None) => format!("$PMTK{code:03}"),
    };
    frame(body)
}

/// Antenna status reporting, `PCMD_ANTENNA_*`
pub fn antenna(arg: u32) -> Result<String, CommandError> {
    command(codes::PCMD_ANTENNA, Some(arg))
}

/// Encode `PMTK314` from up to five priority masks.
///
/// `masks[0]` means every fix, `masks[4]` every fifth fix. When several masks
/// name the same kind the last one wins. Kinds in no mask are disabled.
pub fn output_rates(masks: &[ValidityMask]) -> Result<String, CommandError> {
    if masks.len() > MAX_OUTPUT_MASKS {
        return Err(CommandError::TooManyMasks(masks.len()));
    }
    let mut body = format!("$PMTK{:03}", codes::PMTK_SET_NMEA_OUTPUT);
    for slot in OUTPUT_SLOTS {
        let freq = slot.map_or(0, |kind| {
            masks
                .iter()
                .rposition(|mask| mask.contains(kind))
                .map_or(0, |m| m + 1)
        });
        body.push(',');
        body.push_str(&freq.to_string());
    }
    frame(body)
}

/// Encode `PMTK386`, clamping the index to the table
pub fn nav_threshold(index: u8) -> Result<String, CommandError> {
    let index = usize::from(index.min(codes::PMTK_NAV_THRESHOLD_20));
    frame(format!(
        "$PMTK{},{:.1}",
        codes::PMTK_SET_NAV_THRESHOLD,
        NAV_THRESHOLD[index]
    ))
}

/// Encode `PMTK869,1,<0|1>`
pub fn easy_mode(enabled: bool) -> Result<String, CommandError> {
    frame(format!(
        "$PMTK{},1,{}",
        codes::PMTK_CMD_EASY_ENABLE,
        u8::from(enabled)
    ))
}

/// Encode `PMTK220` with the fix period for `hz` updates per second
pub fn update_rate(hz: u8) -> Result<String, CommandError> {
    if !(1..=10).contains(&hz) {
        return Err(CommandError::InvalidUpdateRate(hz));
    }
    command(codes::PMTK_SET_NMEA_UPDATE, Some(1000 / u32::from(hz)))
}

/// Reject rates outside [`BAUD_CANDIDATES`]
pub fn check_baud(baud: u32) -> Result<(), CommandError> {
    if BAUD_CANDIDATES.contains(&baud) {
        Ok(())
    } else {
        Err(CommandError::UnsupportedBaudRate(baud))
    }
}

/// Encode `PMTK251` for a supported rate
pub fn baud_rate(baud: u32) -> Result<String, CommandError> {
    check_baud(baud)?;
    command(codes::PMTK_SET_NMEA_BAUD_RATE, Some(baud))
}

/// Human-readable command name, for logs and the CLI
pub fn command_name(code: u16) -> &'static str {
    use codes::*;
    match code {
        PMTK_TEST => "test",
        PMTK_ACK => "ack",
        PMTK_SYS_MSG => "system message",
        PMTK_TXT_MSG => "text message",
        PCMD_ANTENNA => "antenna",
        PMTK_CMD_HOT_START => "hot start",
        PMTK_CMD_WARM_START => "warm start",
        PMTK_CMD_COLD_START => "cold start",
        PMTK_CMD_FACTORY_RESET => "factory reset",
        PMTK_CMD_CLEAR_EPO => "clear EPO",
        PMTK_CMD_STANDBY_MODE => "standby",
        PMTK_Q_LOCUS_STATUS => "query LOCUS status",
        PMTK_LOCUS_ERASE_FLASH => "erase LOCUS flash",
        PMTK_LOCUS_LOGGER => "LOCUS logger",
        PMTK_LOG_NOW => "LOCUS snapshot",
        PMTK_SET_NMEA_UPDATE => "set update rate",
        PMTK_SET_NMEA_BAUD_RATE => "set baud rate",
        PMTK_SET_OUTPUT_FMT => "set output format",
        PMTK_SET_DGPS_MODE => "set DGPS mode",
        PMTK_SET_DYN_MODE => "set dynamic mode",
        PMTK_SET_SBAS_ENABLE => "set SBAS",
        PMTK_SET_NMEA_OUTPUT => "set NMEA output",
        PMTK_SET_DATUM => "set datum",
        PMTK_SET_NAV_THRESHOLD => "set nav threshold",
        PMTK_Q_FIX_INTERVAL => "query fix interval",
        PMTK_Q_NMEA_OUTPUT => "query NMEA output",
        PMTK_Q_RELEASE => "query release",
        PMTK_DT_RELEASE => "release",
        PMTK_CMD_EASY_ENABLE => "easy mode",
        _ => "unknown",
    }
}
