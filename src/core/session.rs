//! Receiver session
//!
//! A [`ReceiverSession`] is the single owner of everything learned from one
//! attached receiver: the latest record of every sentence kind, the validity
//! mask, the derived position and fix time, the firmware release and the
//! port counters. It also turns command parameters into framed sentences and
//! writes them through a [`Transport`].

use crate::core::logger::SentenceLogger;
use crate::core::protocol::mtk::{self, AckReport, ChannelStatus, MTK_MAX_CHN};
use crate::core::protocol::nmea::{
    self, dm_to_degrees, unpack_date, GgaData, GllData, GsaData, GsvTable, RmcData, Satellite,
    VtgData, ZdaData,
};
use crate::core::protocol::pmtk::{self, codes, CommandError, BIN_OFF};
use crate::core::protocol::{
    classify, validate, LineBuffer, NmeaError, SentenceKind, TimeOfDay, ValidityMask, MAX_SENTENCE_LEN,
};
use crate::core::transport::{Transport, TransportError};
use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// Release text reported before any `PMTK705` was seen
pub const UNKNOWN_RELEASE: &str = "<unknown>";

/// Default pause after every write
pub const DEFAULT_WRITE_DELAY: Duration = Duration::from_millis(10);

/// Errors from session operations that encode and perform I/O
#[derive(Error, Debug)]
pub enum ReceiverError {
    /// Command rejected before any I/O
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Link failure
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// What [`ReceiverSession::parse`] did with a valid sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Decoded and stored
    Decoded(SentenceKind),
    /// Valid checksum but nothing to store
    Ignored(SentenceKind),
}

impl ParseOutcome {
    /// Kind of the sentence that was handled
    pub fn kind(self) -> SentenceKind {
        match self {
            Self::Decoded(kind) | Self::Ignored(kind) => kind,
        }
    }
}

/// Port traffic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortStats {
    /// Bytes received
    pub rx: u64,
    /// Bytes written
    pub tx: u64,
    /// Over-long lines discarded
    pub overflows: u64,
}

/// Latest state of one attached receiver
pub struct ReceiverSession {
    gll: GllData,
    gga: GgaData,
    rmc: RmcData,
    vtg: VtgData,
    gsa: GsaData,
    zda: ZdaData,
    gsv: GsvTable,
    channels: [ChannelStatus; MTK_MAX_CHN],
    valid: ValidityMask,

    latitude: f64,
    longitude: f64,
    fix_time: Option<TimeOfDay>,
    fix_date: Option<u32>,

    release: Option<String>,
    last_ack: Option<AckReport>,
    last_command: Option<String>,

    lines: LineBuffer,
    rx: u64,
    tx: u64,
    baud_rate: Option<u32>,
    timezone_minutes: i32,
    write_delay: Duration,
    logger: Option<SentenceLogger>,
}

impl Default for ReceiverSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiverSession {
    /// Fresh session: nothing decoded, UTC, default write delay
    pub fn new() -> Self {
        Self {
            gll: GllData::default(),
            gga: GgaData::default(),
            rmc: RmcData::default(),
            vtg: VtgData::default(),
            gsa: GsaData::default(),
            zda: ZdaData::default(),
            gsv: GsvTable::new(),
            channels: [ChannelStatus::default(); MTK_MAX_CHN],
            valid: ValidityMask::new(),
            latitude: 0.0,
            longitude: 0.0,
            fix_time: None,
            fix_date: None,
            release: None,
            last_ack: None,
            last_command: None,
            lines: LineBuffer::new(),
            rx: 0,
            tx: 0,
            baud_rate: None,
            timezone_minutes: 0,
            write_delay: DEFAULT_WRITE_DELAY,
            logger: None,
        }
    }

    /// Set the timezone offset from UTC in minutes
    #[must_use]
    pub fn with_timezone(mut self, minutes: i32) -> Self {
        self.timezone_minutes = minutes;
        self
    }

    /// Set the pause after each write
    #[must_use]
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = delay;
        self
    }

    /// Change the timezone offset
    pub fn set_timezone(&mut self, minutes: i32) {
        self.timezone_minutes = minutes;
    }

    /// Capture received and sent lines into `logger`
    pub fn attach_logger(&mut self, logger: SentenceLogger) {
        self.logger = Some(logger);
    }

    /// Detach the capture logger
    pub fn take_logger(&mut self) -> Option<SentenceLogger> {
        self.logger.take()
    }

    // ------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------

    /// Validate, classify and decode one line.
    ///
    /// Fails without touching any state when the checksum is bad or a
    /// decoder rejects the fields.
    pub fn parse(&mut self, line: &str) -> Result<ParseOutcome, NmeaError> {
        if let Err(e) = validate(line) {
            debug!("discarded sentence: {}", e);
            return Err(e);
        }
        let sentence = line.trim_end_matches(['\r', '\n']);
        let kind = classify(sentence);

        match kind {
            SentenceKind::Gll => {
                self.gll = nmea::decode_gll(sentence)?;
                self.refresh_time(self.gll.time, None);
            }
            SentenceKind::Gga => {
                self.gga = nmea::decode_gga(sentence)?;
                self.refresh_time(self.gga.time, None);
            }
            SentenceKind::Rmc => {
                self.rmc = nmea::decode_rmc(sentence)?;
                self.refresh_time(self.rmc.time, self.rmc.date);
                if let Some(lat) = self.rmc.latitude {
                    self.latitude = dm_to_degrees(lat, self.rmc.flags.lat_south);
                }
                if let Some(lon) = self.rmc.longitude {
                    self.longitude = dm_to_degrees(lon, self.rmc.flags.lon_west);
                }
            }
            SentenceKind::Vtg => self.vtg = nmea::decode_vtg(sentence)?,
            SentenceKind::Gsa => self.gsa = nmea::decode_gsa(sentence)?,
            SentenceKind::Zda => {
                self.zda = nmea::decode_zda(sentence)?;
                self.refresh_time(self.zda.time, self.zda.date);
            }
            SentenceKind::Gsv => self.gsv.decode(sentence)?,
            SentenceKind::MtkChannels => self.channels = mtk::decode_channels(sentence)?,
            SentenceKind::MtkReply => {
                if !self.apply_reply(sentence)? {
                    return Ok(ParseOutcome::Ignored(kind));
                }
            }
            SentenceKind::VendorAck | SentenceKind::VendorInfo | SentenceKind::Invalid => {
                trace!("no decoder for {}", sentence);
                return Ok(ParseOutcome::Ignored(kind));
            }
        }

        self.valid.set(kind);
        trace!("decoded {}", kind);
        Ok(ParseOutcome::Decoded(kind))
    }

    /// Handle a `$PMTK` reply; `false` when the type has no handler
    fn apply_reply(&mut self, sentence: &str) -> Result<bool, NmeaError> {
        match mtk::reply_type(sentence) {
            Some(codes::PMTK_DT_RELEASE) => {
                if let Some(text) = mtk::release_text(sentence) {
                    self.release = Some(text.to_string());
                }
                Ok(true)
            }
            Some(codes::PMTK_ACK) => {
                let ack = mtk::decode_ack(sentence)?;
                debug!(
                    "PMTK{:03} ({}) acknowledged: {}",
                    ack.command,
                    pmtk::command_name(ack.command),
                    ack.status
                );
                self.last_ack = Some(ack);
                Ok(true)
            }
            other => {
                debug!("unhandled PMTK reply type {:?}", other);
                Ok(false)
            }
        }
    }

    fn refresh_time(&mut self, time: Option<TimeOfDay>, date: Option<u32>) {
        if time.is_some() {
            self.fix_time = time;
        }
        if date.is_some() {
            self.fix_date = date;
        }
    }

    // ------------------------------------------------------------------
    // Receiving
    // ------------------------------------------------------------------

    /// Drain available bytes until a line completes.
    ///
    /// Returns `None` once the transport has nothing more waiting, or after
    /// [`MAX_SENTENCE_LEN`] bytes without a complete line. The partial line
    /// is kept for the next call.
    pub fn poll(&mut self, transport: &mut dyn Transport) -> Result<Option<String>, TransportError> {
        for _ in 0..MAX_SENTENCE_LEN {
            let Some(byte) = transport.next_byte()? else {
                break;
            };
            self.rx += 1;
            if let Some(line) = self.lines.push(byte) {
                if let Some(logger) = self.logger.as_mut() {
                    logger.log_rx(&line, classify(&line));
                }
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// Discard any partially received line
    pub fn discard_partial(&mut self) {
        self.lines.clear();
    }

    // ------------------------------------------------------------------
    // Sending
    // ------------------------------------------------------------------

    /// Configure the link at a supported rate and remember it
    pub fn begin(&mut self, transport: &mut dyn Transport, baud: u32) -> Result<(), ReceiverError> {
        pmtk::check_baud(baud)?;
        transport.configure(baud)?;
        self.pause();
        self.baud_rate = Some(baud);
        Ok(())
    }

    /// Write raw bytes, counting them
    pub fn write_raw(&mut self, transport: &mut dyn Transport, data: &[u8]) -> Result<usize, ReceiverError> {
        let written = transport.write(data)?;
        self.tx += written as u64;
        if let Some(logger) = self.logger.as_mut() {
            logger.log_tx(data);
        }
        Ok(written)
    }

    /// Frame a `$`-prefixed body with its checksum and send it
    pub fn send_str(&mut self, transport: &mut dyn Transport, body: &str) -> Result<String, ReceiverError> {
        let line = pmtk::frame(body.to_string())?;
        self.transmit(transport, line)
    }

    fn transmit(&mut self, transport: &mut dyn Transport, line: String) -> Result<String, ReceiverError> {
        let mut wire = Vec::with_capacity(line.len() + 2);
        wire.extend_from_slice(line.as_bytes());
        wire.extend_from_slice(b"\r\n");
        self.write_raw(transport, &wire)?;
        self.pause();
        debug!("sent {}", line);
        self.last_command = Some(line.clone());
        Ok(line)
    }

    fn pause(&self) {
        if !self.write_delay.is_zero() {
            std::thread::sleep(self.write_delay);
        }
    }

    /// Send `$PMTK<code>[,arg]`
    pub fn send_command(
        &mut self,
        transport: &mut dyn Transport,
        code: u16,
        arg: Option<u32>,
    ) -> Result<String, ReceiverError> {
        let line = pmtk::command(code, arg)?;
        self.transmit(transport, line)
    }

    /// Configure which sentences are emitted and how often
    pub fn set_output(&mut self, transport: &mut dyn Transport, masks: &[ValidityMask]) -> Result<String, ReceiverError> {
        let line = pmtk::output_rates(masks)?;
        self.transmit(transport, line)
    }

    /// Set the fix rate, 1 to 10 Hz
    pub fn set_update_rate(&mut self, transport: &mut dyn Transport, hz: u8) -> Result<String, ReceiverError> {
        let line = pmtk::update_rate(hz)?;
        self.transmit(transport, line)
    }

    /// Set the static navigation threshold, `PMTK_NAV_THRESHOLD_*`
    pub fn set_nav_threshold(&mut self, transport: &mut dyn Transport, index: u8) -> Result<String, ReceiverError> {
        let line = pmtk::nav_threshold(index)?;
        self.transmit(transport, line)
    }

    /// Enable or disable EASY assisted mode
    pub fn set_easy_mode(&mut self, transport: &mut dyn Transport, enabled: bool) -> Result<String, ReceiverError> {
        let line = pmtk::easy_mode(enabled)?;
        self.transmit(transport, line)
    }

    /// Antenna status reporting, `PCMD_ANTENNA_*`
    pub fn set_antenna(&mut self, transport: &mut dyn Transport, arg: u32) -> Result<String, ReceiverError> {
        let line = pmtk::antenna(arg)?;
        self.transmit(transport, line)
    }

    /// Ask the receiver to switch its own speed; the link is not touched
    pub fn set_nmea_baud_rate(&mut self, transport: &mut dyn Transport, baud: u32) -> Result<String, ReceiverError> {
        let line = pmtk::baud_rate(baud)?;
        self.transmit(transport, line)
    }

    /// Select text output; binary output is rejected
    pub fn set_nmea_format(&mut self, transport: &mut dyn Transport, text: bool) -> Result<(), ReceiverError> {
        if !text {
            return Err(CommandError::BinaryFormat.into());
        }
        self.write_raw(transport, &BIN_OFF)?;
        Ok(())
    }

    /// Request the firmware release, answered by `PMTK705`
    pub fn query_release(&mut self, transport: &mut dyn Transport) -> Result<String, ReceiverError> {
        self.send_command(transport, codes::PMTK_Q_RELEASE, None)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Latest GLL record
    pub fn gll(&self) -> &GllData {
        &self.gll
    }

    /// Latest GGA record
    pub fn gga(&self) -> &GgaData {
        &self.gga
    }

    /// Latest RMC record
    pub fn rmc(&self) -> &RmcData {
        &self.rmc
    }

    /// Latest VTG record
    pub fn vtg(&self) -> &VtgData {
        &self.vtg
    }

    /// Latest GSA record
    pub fn gsa(&self) -> &GsaData {
        &self.gsa
    }

    /// Latest ZDA record
    pub fn zda(&self) -> &ZdaData {
        &self.zda
    }

    /// GSV reassembly table
    pub fn gsv(&self) -> &GsvTable {
        &self.gsv
    }

    /// Satellites in view
    pub fn satellites(&self) -> &[Satellite] {
        self.gsv.in_view()
    }

    /// Channel status table from `PMTKCHN`
    pub fn channels(&self) -> &[ChannelStatus; MTK_MAX_CHN] {
        &self.channels
    }

    /// Kinds decoded at least once
    pub fn validity(&self) -> ValidityMask {
        self.valid
    }

    /// `true` once `kind` has decoded successfully
    pub fn is_valid(&self, kind: SentenceKind) -> bool {
        self.valid.contains(kind)
    }

    /// Signed decimal (latitude, longitude), from RMC only
    pub fn position(&self) -> Option<(f64, f64)> {
        self.is_valid(SentenceKind::Rmc)
            .then_some((self.latitude, self.longitude))
    }

    /// Latest fix date and time, shifted by the timezone offset.
    ///
    /// `None` until a date (RMC or ZDA) and a time have been decoded, or if
    /// they do not form a calendar timestamp.
    pub fn fix_time(&self) -> Option<NaiveDateTime> {
        let time = self.fix_time?;
        let (day, month, year) = unpack_date(self.fix_date?);
        let date = NaiveDate::from_ymd_opt(2000 + year as i32, month, day)?;
        let clock = NaiveTime::from_hms_milli_opt(
            time.hour(),
            time.minute(),
            time.second(),
            u32::from(time.millis),
        )?;
        let stamp = date.and_time(clock);
        if self.timezone_minutes == 0 {
            return Some(stamp);
        }
        stamp.checked_add_signed(ChronoDuration::minutes(i64::from(self.timezone_minutes)))
    }

    /// Latest time of day with the timezone offset, wrapping at midnight
    pub fn fix_time_of_day(&self) -> Option<NaiveTime> {
        let time = self.fix_time?;
        let clock = NaiveTime::from_hms_milli_opt(
            time.hour(),
            time.minute(),
            time.second(),
            u32::from(time.millis),
        )?;
        let (shifted, _) =
            clock.overflowing_add_signed(ChronoDuration::minutes(i64::from(self.timezone_minutes)));
        Some(shifted)
    }

    /// Millisecond part of the latest fix time
    pub fn fix_millis(&self) -> u16 {
        self.fix_time.map_or(0, |t| t.millis)
    }

    /// Firmware release text, `<unknown>` until reported
    pub fn firmware_release(&self) -> &str {
        self.release.as_deref().unwrap_or(UNKNOWN_RELEASE)
    }

    /// Most recent `PMTK001` acknowledgement
    pub fn last_ack(&self) -> Option<AckReport> {
        self.last_ack
    }

    /// Last framed command sent
    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    /// Fix quality from the latest GGA
    pub fn fix_quality_name(&self) -> &'static str {
        self.gga.fix_quality().name()
    }

    /// Traffic counters
    pub fn port_stats(&self) -> PortStats {
        PortStats {
            rx: self.rx,
            tx: self.tx,
            overflows: self.lines.overflows(),
        }
    }

    /// Rate set by the last [`begin`](Self::begin), if any
    pub fn baud_rate(&self) -> Option<u32> {
        self.baud_rate
    }

    /// Timezone offset in minutes
    pub fn timezone(&self) -> i32 {
        self.timezone_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::MockTransport;
    use mockall::predicate::eq;

    const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    fn session() -> ReceiverSession {
        ReceiverSession::new().with_write_delay(Duration::ZERO)
    }

    #[test]
    fn test_parse_gga_sets_validity() {
        let mut s = session();
        assert_eq!(s.parse(GGA), Ok(ParseOutcome::Decoded(SentenceKind::Gga)));
        assert!(s.is_valid(SentenceKind::Gga));
        assert!(!s.is_valid(SentenceKind::Rmc));
        assert_eq!(s.gga().satellites_used, 8);
        assert_eq!(s.fix_quality_name(), "GPS fix (SPS)");
        // No RMC yet
        assert_eq!(s.position(), None);
        assert_eq!(s.fix_time(), None);
    }

    #[test]
    fn test_parse_rmc_derives_position_and_time() {
        let mut s = session();
        s.parse(&format!("{RMC}\r\n")).unwrap();
        let (lat, lon) = s.position().unwrap();
        assert!((lat - 48.1173).abs() < 1e-4);
        assert!((lon - 11.516_67).abs() < 1e-4);
        let stamp = s.fix_time().unwrap();
        assert_eq!(stamp.to_string(), "2094-03-23 12:35:19");
    }

    #[test]
    fn test_failed_decode_keeps_last_good() {
        let mut s = session();
        s.parse(GGA).unwrap();
        let before = s.gga().clone();
        let bad = "$GPGGA,123520,4807.038,X,01131.000,E,1,09,0.9,545.4,M,46.9,M,,*5A";
        assert!(matches!(s.parse(bad), Err(NmeaError::BadHemisphere(_))));
        assert_eq!(s.gga(), &before);
        assert!(s.is_valid(SentenceKind::Gga));
    }

    #[test]
    fn test_checksum_failure_is_rejected() {
        let mut s = session();
        assert!(matches!(
            s.parse("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*46"),
            Err(NmeaError::ChecksumMismatch { .. })
        ));
        assert_eq!(s.validity(), ValidityMask::new());
    }

    #[test]
    fn test_release_and_ack_replies() {
        let mut s = session();
        assert_eq!(s.firmware_release(), UNKNOWN_RELEASE);
        s.parse("$PMTK705*30").unwrap();
        assert_eq!(s.firmware_release(), UNKNOWN_RELEASE);
        s.parse("$PMTK705,AXN_2.10_3339_2012072601,5223,PA6H,1.0*6A").unwrap();
        assert_eq!(s.firmware_release(), "AXN_2.10_3339_2012072601,5223,PA6H,1.0");
        s.parse("$PMTK705,AXN_2.31_3339_13101700,5632,PA6H,1.0*6B").unwrap();
        assert_eq!(s.firmware_release(), "AXN_2.31_3339_13101700,5632,PA6H,1.0");

        assert_eq!(
            s.parse("$PMTK001,314,3*36"),
            Ok(ParseOutcome::Decoded(SentenceKind::MtkReply))
        );
        assert_eq!(s.last_ack().map(|a| a.command), Some(314));
    }

    #[test]
    fn test_unhandled_replies_are_ignored() {
        let mut s = session();
        assert_eq!(
            s.parse("$PMTK010,002*2D"),
            Ok(ParseOutcome::Ignored(SentenceKind::MtkReply))
        );
        assert_eq!(
            s.parse("$PGTOP,11,3*6F"),
            Ok(ParseOutcome::Ignored(SentenceKind::VendorInfo))
        );
        assert_eq!(
            s.parse("$GNGSA,A,1*2C"),
            Ok(ParseOutcome::Ignored(SentenceKind::Invalid))
        );
        assert_eq!(s.validity(), ValidityMask::new());
    }

    #[test]
    fn test_timezone_carries_into_date() {
        let mut s = session().with_timezone(60);
        s.parse("$GPZDA,233000.000,31,12,2013,,*55").unwrap();
        assert_eq!(s.fix_time().unwrap().to_string(), "2014-01-01 00:30:00");
        assert_eq!(s.fix_time_of_day().unwrap().to_string(), "00:30:00");

        s.set_timezone(-90);
        // Replace the time only; date is still from ZDA
        s.parse("$GPGGA,003000.250,,,,,0,0,,,M,,M,,*4C").unwrap();
        assert_eq!(s.fix_millis(), 250);
        assert_eq!(s.fix_time().unwrap().to_string(), "2013-12-30 23:00:00.250");
    }

    #[test]
    fn test_poll_assembles_lines() {
        let mut bytes: Vec<u8> = b"garbage$PMTK000*32\r\n".to_vec();
        bytes.reverse();
        let mut transport = MockTransport::new();
        transport
            .expect_next_byte()
            .returning(move || Ok(bytes.pop()));

        let mut s = session();
        assert_eq!(s.poll(&mut transport).unwrap().as_deref(), Some("$PMTK000*32\r"));
        assert_eq!(s.poll(&mut transport).unwrap(), None);
        assert_eq!(s.port_stats().rx, 20);
    }

    #[test]
    fn test_poll_bounds_bytes_per_call_on_noise() {
        let mut transport = MockTransport::new();
        transport
            .expect_next_byte()
            .times(MAX_SENTENCE_LEN)
            .returning(|| Ok(Some(0xFE)));

        let mut s = session();
        assert_eq!(s.poll(&mut transport).unwrap(), None);
        assert_eq!(s.port_stats().rx, MAX_SENTENCE_LEN as u64);
    }

    #[test]
    fn test_poll_keeps_partial_line_between_calls() {
        let mut bytes: Vec<u8> = vec![0xFE; MAX_SENTENCE_LEN];
        bytes.extend_from_slice(b"$PMTK000*32\r\n");
        bytes.reverse();
        let mut transport = MockTransport::new();
        transport
            .expect_next_byte()
            .returning(move || Ok(bytes.pop()));

        let mut s = session();
        assert_eq!(s.poll(&mut transport).unwrap(), None);
        assert_eq!(s.poll(&mut transport).unwrap().as_deref(), Some("$PMTK000*32\r"));
    }

    #[test]
    fn test_zda_with_oversized_day_is_rejected() {
        let mut s = session();
        assert_eq!(
            s.parse("$GPZDA,172809,999999,07,1996,,*4D"),
            Err(NmeaError::BadNumber("999999".into()))
        );
        assert_eq!(s.validity(), ValidityMask::new());
        assert_eq!(s.fix_time(), None);
    }

    #[test]
    fn test_send_command_frames_and_counts() {
        let mut transport = MockTransport::new();
        transport
            .expect_write()
            .withf(|data: &[u8]| data == b"$PMTK605*31\r\n")
            .times(1)
            .returning(|data| Ok(data.len()));

        let mut s = session();
        let line = s.query_release(&mut transport).unwrap();
        assert_eq!(line, "$PMTK605*31");
        assert_eq!(s.last_command(), Some("$PMTK605*31"));
        assert_eq!(s.port_stats().tx, 13);
    }

    #[test]
    fn test_rejected_commands_do_no_io() {
        let mut transport = MockTransport::new();
        transport.expect_write().never();
        transport.expect_configure().never();

        let mut s = session();
        assert!(matches!(
            s.send_command(&mut transport, 1000, None),
            Err(ReceiverError::Command(CommandError::InvalidCode(1000)))
        ));
        assert!(s.set_nmea_baud_rate(&mut transport, 14400).is_err());
        assert!(s.begin(&mut transport, 300).is_err());
        assert!(s.set_update_rate(&mut transport, 0).is_err());
        assert!(matches!(
            s.set_nmea_format(&mut transport, false),
            Err(ReceiverError::Command(CommandError::BinaryFormat))
        ));
        assert_eq!(s.port_stats().tx, 0);
        assert_eq!(s.last_command(), None);
        assert_eq!(s.baud_rate(), None);
    }

    #[test]
    fn test_begin_configures_transport() {
        let mut transport = MockTransport::new();
        transport
            .expect_configure()
            .with(eq(9600))
            .times(1)
            .returning(|_| Ok(()));

        let mut s = session();
        s.begin(&mut transport, 9600).unwrap();
        assert_eq!(s.baud_rate(), Some(9600));
    }

    #[test]
    fn test_text_format_sends_bin_off() {
        let mut transport = MockTransport::new();
        transport
            .expect_write()
            .withf(|data: &[u8]| data == BIN_OFF)
            .times(1)
            .returning(|data| Ok(data.len()));

        let mut s = session();
        s.set_nmea_format(&mut transport, true).unwrap();
        assert_eq!(s.port_stats().tx, 13);
    }
}
