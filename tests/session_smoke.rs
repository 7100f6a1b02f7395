//! End-to-end checks of the receiver session over a simulated link

use mtkgps_core::core::logger::{LogFormat, SentenceLogger};
use mtkgps_core::core::probe::{detect, ProbeConfig, ProbeOutcome};
use mtkgps_core::core::protocol::pmtk::{self, codes, NAV_THRESHOLD};
use mtkgps_core::core::protocol::{is_valid, validate, SentenceKind, ValidityMask, BAUD_CANDIDATES};
use mtkgps_core::core::session::{ParseOutcome, ReceiverSession};
use mtkgps_core::core::transport::{Transport, TransportError};
use std::collections::VecDeque;
use std::time::Duration;

const GGA: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
const RMC: &str = "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";
const GSV_1: &str = "$GPGSV,2,1,07,07,79,048,42,02,51,062,43,26,36,256,42,27,27,138,42*71";
const GSV_2: &str = "$GPGSV,2,2,07,09,23,313,42,04,19,159,41,15,12,041,00*47";

/// Receiver on the far end of a serial line that only answers at one speed
struct SimulatedReceiver {
    answers_at: u32,
    baud: Option<u32>,
    rx: VecDeque<u8>,
    written: Vec<String>,
}

impl SimulatedReceiver {
    fn new(answers_at: u32) -> Self {
        Self {
            answers_at,
            baud: None,
            rx: VecDeque::new(),
            written: Vec::new(),
        }
    }

    fn queue(&mut self, line: &str) {
        self.rx.extend(line.as_bytes());
        self.rx.extend(b"\r\n");
    }
}

impl Transport for SimulatedReceiver {
    fn configure(&mut self, baud: u32) -> Result<(), TransportError> {
        self.baud = Some(baud);
        self.rx.clear();
        Ok(())
    }

    fn next_byte(&mut self) -> Result<Option<u8>, TransportError> {
        Ok(self.rx.pop_front())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        self.written.push(String::from_utf8_lossy(data).into_owned());
        if data.starts_with(b"$PMTK000*") {
            if self.baud == Some(self.answers_at) {
                self.queue(GGA);
            } else {
                self.rx.extend(b"\xe0\x1c$G\xfe\x80*\x7f\r\n");
            }
        }
        Ok(data.len())
    }
}

fn session() -> ReceiverSession {
    ReceiverSession::new().with_write_delay(Duration::ZERO)
}

fn corrupt(line: &str) -> String {
    let (body, hex) = line.split_at(line.len() - 2);
    let value = u8::from_str_radix(hex, 16).unwrap() ^ 0x01;
    format!("{}{:02X}", body, value)
}

#[test]
fn test_encoded_commands_validate() {
    let mut lines = Vec::new();
    for code in [
        codes::PMTK_TEST,
        codes::PMTK_CMD_HOT_START,
        codes::PMTK_CMD_WARM_START,
        codes::PMTK_CMD_COLD_START,
        codes::PMTK_CMD_STANDBY_MODE,
        codes::PMTK_Q_RELEASE,
    ] {
        lines.push(pmtk::command(code, None).unwrap());
    }
    lines.push(pmtk::command(codes::PMTK_CMD_STANDBY_MODE, Some(0)).unwrap());
    lines.push(pmtk::antenna(codes::PCMD_ANTENNA_ON).unwrap());
    for hz in 1..=10 {
        lines.push(pmtk::update_rate(hz).unwrap());
    }
    for &baud in &BAUD_CANDIDATES {
        lines.push(pmtk::baud_rate(baud).unwrap());
    }
    for index in 0..NAV_THRESHOLD.len() as u8 + 2 {
        lines.push(pmtk::nav_threshold(index).unwrap());
    }
    lines.push(pmtk::easy_mode(true).unwrap());
    lines.push(pmtk::easy_mode(false).unwrap());

    let every_fix: ValidityMask = [SentenceKind::Rmc, SentenceKind::Gga].into_iter().collect();
    let fifth: ValidityMask = [SentenceKind::Gsv].into_iter().collect();
    let empty = ValidityMask::new();
    lines.push(pmtk::output_rates(&[every_fix, empty, empty, empty, fifth]).unwrap());

    for line in &lines {
        assert!(validate(line).is_ok(), "encoder output rejected: {}", line);
    }
}

#[test]
fn test_gga_literal() {
    let mut s = session();
    assert_eq!(s.parse(GGA), Ok(ParseOutcome::Decoded(SentenceKind::Gga)));

    let gga = s.gga();
    assert_eq!(gga.quality, 1);
    assert_eq!(gga.satellites_used, 8);
    assert_eq!(gga.latitude, Some(4807.038));
    assert_eq!(gga.longitude, Some(1131.000));
    assert!(!gga.flags.lat_south);
    assert!(!gga.flags.lon_west);
    assert_eq!(gga.altitude, Some(545.4));
    assert!(s.is_valid(SentenceKind::Gga));
}

#[test]
fn test_rmc_derives_decimal_position() {
    let mut s = session();
    s.parse(RMC).unwrap();

    let (lat, lon) = s.position().unwrap();
    assert!((lat - 48.1173).abs() < 1e-4);
    assert!((lon - 11.5167).abs() < 1e-4);
    assert!(s.rmc().flags.valid);
}

#[test]
fn test_gsv_pages_fill_contiguously() {
    let mut s = session();
    s.parse(GSV_1).unwrap();
    assert_eq!(s.satellites().len(), 4);
    s.parse(GSV_2).unwrap();

    let prns: Vec<u16> = s.satellites().iter().map(|sat| sat.prn).collect();
    assert_eq!(prns, vec![7, 2, 26, 27, 9, 4, 15]);
    assert_eq!(s.satellites()[0].elevation, 79);
    assert_eq!(s.satellites()[6].snr, 0);
    assert!(s.gsv().is_complete());
}

#[test]
fn test_corrupted_checksum_leaves_state_alone() {
    let mut s = session();
    let bad = corrupt(GGA);
    assert!(!is_valid(&bad));
    assert!(s.parse(&bad).is_err());
    assert_eq!(s.validity(), ValidityMask::new());
    assert_eq!(s.gga().satellites_used, 0);

    s.parse(GGA).unwrap();
    let before = s.gga().clone();
    assert!(s.parse(&corrupt(GGA)).is_err());
    assert_eq!(s.gga(), &before);
}

#[test]
fn test_probe_finds_38400_and_restores_rate() {
    let mut link = SimulatedReceiver::new(38400);
    let mut s = session();
    s.begin(&mut link, 4800).unwrap();

    let config = ProbeConfig::default()
        .window(Duration::from_millis(40))
        .without_delays();
    let outcome = detect(&mut s, &mut link, &config).unwrap();

    assert_eq!(outcome, ProbeOutcome::Detected(38400));
    assert_eq!(link.baud, Some(4800));
    assert_eq!(s.baud_rate(), Some(4800));
    assert!(s.is_valid(SentenceKind::Gga));
}

#[test]
fn test_same_sentence_twice_is_idempotent() {
    let mut s = session();
    s.parse(RMC).unwrap();
    s.parse(GGA).unwrap();
    let snapshot = (
        s.rmc().clone(),
        s.gga().clone(),
        s.validity(),
        s.position(),
        s.fix_time(),
    );

    s.parse(GGA).unwrap();
    assert_eq!(
        (s.rmc().clone(), s.gga().clone(), s.validity(), s.position(), s.fix_time()),
        snapshot
    );
}

#[test]
fn test_poll_reassembles_lines_from_bytes() {
    let mut link = SimulatedReceiver::new(9600);
    link.queue(RMC);
    link.queue(GSV_1);

    let mut s = session();
    let first = s.poll(&mut link).unwrap().unwrap();
    assert_eq!(s.parse(&first), Ok(ParseOutcome::Decoded(SentenceKind::Rmc)));
    let second = s.poll(&mut link).unwrap().unwrap();
    assert_eq!(s.parse(&second), Ok(ParseOutcome::Decoded(SentenceKind::Gsv)));
    assert_eq!(s.poll(&mut link).unwrap(), None);
    assert_eq!(s.port_stats().rx, (RMC.len() + GSV_1.len() + 4) as u64);
}

#[test]
fn test_rejected_command_writes_nothing() {
    let mut link = SimulatedReceiver::new(9600);
    let mut s = session();
    assert!(s.send_command(&mut link, 1000, None).is_err());
    assert!(s.set_nmea_baud_rate(&mut link, 14400).is_err());
    assert!(link.written.is_empty());
    assert_eq!(s.last_command(), None);

    let line = s.send_command(&mut link, codes::PMTK_Q_RELEASE, None).unwrap();
    assert_eq!(link.written, vec![format!("{}\r\n", line)]);
}

#[test]
fn test_capture_log_records_traffic() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.log");

    let mut link = SimulatedReceiver::new(9600);
    link.queue(GGA);
    let mut s = session();
    s.attach_logger(SentenceLogger::to_file(&path, LogFormat::Text).unwrap());
    s.send_command(&mut link, codes::PMTK_TEST, None).unwrap();
    s.poll(&mut link).unwrap();

    let mut logger = s.take_logger().unwrap();
    assert_eq!(logger.lines_logged(), 2);
    logger.stop();

    let captured = std::fs::read_to_string(&path).unwrap();
    assert!(captured.contains("$PMTK000*32"));
    assert!(captured.contains(GGA));
}
