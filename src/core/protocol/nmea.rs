//! NMEA 0183 sentence decoders
//!
//! Parses the standard sentences emitted by MTK receivers:
//! - GGA: Global Positioning System Fix Data
//! - RMC: Recommended Minimum Navigation Information
//! - GSV: Satellites in View (reassembled across messages)
//! - GSA: GPS DOP and Active Satellites
//! - VTG: Track Made Good and Ground Speed
//! - GLL: Geographic Position - Latitude/Longitude
//! - ZDA: Time & Date
//!
//! Decoders expect a sentence that already passed checksum validation. They
//! build a fresh record and hand it back only on success, so a failed decode
//! never touches previously stored data.

use super::fields::{parse_time, FieldScanner, TimeOfDay};
use super::sentence::NmeaError;
use serde::Serialize;

/// Size of the satellites-in-view table
pub const MAX_GSV: usize = 32;

/// Active satellite slots in a GSA sentence
pub const GSA_MAX_PRN: usize = 12;

/// GPS fix quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GpsFixQuality {
    /// No fix
    #[default]
    Invalid = 0,
    /// Autonomous GPS fix
    GpsFix = 1,
    /// Differential fix
    DgpsFix = 2,
    /// PPS fix
    PpsFix = 3,
    /// Real-time kinematic, fixed integers
    Rtk = 4,
    /// Real-time kinematic, float
    FloatRtk = 5,
    /// Dead reckoning
    Estimated = 6,
    /// Manual input
    Manual = 7,
    /// Simulator output
    Simulation = 8,
    /// Any other code
    Unknown = 9,
}

impl From<u8> for GpsFixQuality {
    fn from(v: u8) -> Self {
        match v {
            0 => Self::Invalid,
            1 => Self::GpsFix,
            2 => Self::DgpsFix,
            3 => Self::PpsFix,
            4 => Self::Rtk,
            5 => Self::FloatRtk,
            6 => Self::Estimated,
            7 => Self::Manual,
            8 => Self::Simulation,
            _ => Self::Unknown,
        }
    }
}

impl GpsFixQuality {
    /// Human-readable description
    pub fn name(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::GpsFix => "GPS fix (SPS)",
            Self::DgpsFix => "DGPS fix",
            Self::PpsFix => "PPS fix",
            Self::Rtk => "Real Time Kinematic",
            Self::FloatRtk => "Float RTK",
            Self::Estimated => "estimated (dead reckoning)",
            Self::Manual => "Manual input mode",
            Self::Simulation => "Simulation mode",
            Self::Unknown => "unknown",
        }
    }
}

/// GPS fix mode reported by GSA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GpsFixMode {
    /// No fix
    #[default]
    NotAvailable,
    /// Two-dimensional fix
    Fix2D,
    /// Three-dimensional fix
    Fix3D,
}

/// Hemisphere and status bits shared by the position sentences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FixFlags {
    /// Receiver reported an active (`A`) fix
    pub valid: bool,
    /// Latitude is south of the equator
    pub lat_south: bool,
    /// Longitude is west of Greenwich
    pub lon_west: bool,
    /// Magnetic variation is westerly
    pub var_west: bool,
}

/// Convert `DDMM.MMMM` / `DDDMM.MMMM` into decimal degrees.
///
/// The minutes fraction is scaled by 1/0.6, turning minutes-of-60 into a
/// fraction of a degree.
pub fn dm_to_degrees(value: f64, negative: bool) -> f64 {
    let scaled = value / 100.0;
    let whole = scaled.trunc();
    let degrees = whole + (scaled - whole) / 0.6;
    if negative {
        -degrees
    } else {
        degrees
    }
}

/// Split packed `DDMMYY` into `(day, month, two-digit year)`
pub fn unpack_date(date: u32) -> (u32, u32, u32) {
    (date / 10000, (date % 10000) / 100, date % 100)
}

/// Parse a coordinate value followed by its hemisphere letter.
///
/// Returns the raw `DDMM.MMMM` value and whether the hemisphere is the
/// negative one. Both fields empty means "not present".
fn coordinate(
    fields: &mut FieldScanner<'_>,
    positive: char,
    negative: char,
) -> Result<(Option<f64>, bool), NmeaError> {
    let value = fields.optional::<f64>()?;
    let hemisphere = fields.next_field();
    match hemisphere.chars().next() {
        None if value.is_none() => Ok((None, false)),
        Some(c) if hemisphere.len() == 1 && c == positive => Ok((value, false)),
        Some(c) if hemisphere.len() == 1 && c == negative => Ok((value, true)),
        _ => Err(NmeaError::BadHemisphere(hemisphere.to_string())),
    }
}

/// Parsed GLL sentence (Geographic Position)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GllData {
    /// Latitude, `DDMM.MMMM`
    pub latitude: Option<f64>,
    /// Longitude, `DDDMM.MMMM`
    pub longitude: Option<f64>,
    /// Hemispheres and status
    pub flags: FixFlags,
    /// UTC time of the fix
    pub time: Option<TimeOfDay>,
}

/// Parsed GGA sentence (Fix Data)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GgaData {
    /// UTC time of the fix
    pub time: Option<TimeOfDay>,
    /// Latitude, `DDMM.MMMM`
    pub latitude: Option<f64>,
    /// Longitude, `DDDMM.MMMM`
    pub longitude: Option<f64>,
    /// Hemispheres and status
    pub flags: FixFlags,
    /// Raw fix quality code, see [`GgaData::fix_quality`]
    pub quality: u8,
    /// Satellites used in the solution
    pub satellites_used: u8,
    /// Horizontal dilution of precision
    pub hdop: Option<f64>,
    /// Antenna altitude above mean sea level, metres
    pub altitude: Option<f64>,
    /// Geoid separation, metres
    pub geoid_separation: Option<f64>,
    /// Age of differential data, seconds
    pub dgps_age: Option<f64>,
    /// Differential reference station
    pub dgps_station_id: Option<u16>,
}

impl GgaData {
    /// Decoded fix quality
    pub fn fix_quality(&self) -> GpsFixQuality {
        self.quality.into()
    }
}

/// Parsed RMC sentence (Recommended Minimum)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RmcData {
    /// UTC time of the fix
    pub time: Option<TimeOfDay>,
    /// Hemispheres and status
    pub flags: FixFlags,
    /// Latitude, `DDMM.MMMM`
    pub latitude: Option<f64>,
    /// Longitude, `DDDMM.MMMM`
    pub longitude: Option<f64>,
    /// Speed over ground, knots
    pub speed_knots: Option<f64>,
    /// Course over ground, degrees true
    pub course: Option<f64>,
    /// Packed `DDMMYY`
    pub date: Option<u32>,
    /// Magnetic variation, degrees
    pub magnetic_variation: Option<f64>,
}

/// Parsed VTG sentence (Track and Ground Speed)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VtgData {
    /// Track, degrees true
    pub track_true: Option<f64>,
    /// Track, degrees magnetic
    pub track_magnetic: Option<f64>,
    /// Speed over ground, knots
    pub speed_knots: Option<f64>,
    /// Speed over ground, km/h
    pub speed_kmh: Option<f64>,
}

/// Parsed GSA sentence (DOP and Active Satellites)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GsaData {
    /// `A`uto or `M`anual
    pub selection: Option<char>,
    /// `1` no fix, `2` 2D, `3` 3D
    pub fix: Option<char>,
    /// PRNs used for the fix, 0 marks an unused slot
    pub prns: [u8; GSA_MAX_PRN],
    /// Position dilution of precision
    pub pdop: Option<f64>,
    /// Horizontal dilution of precision
    pub hdop: Option<f64>,
    /// Vertical dilution of precision
    pub vdop: Option<f64>,
}

impl GsaData {
    /// Fix mode from the fix-type letter
    pub fn fix_mode(&self) -> GpsFixMode {
        match self.fix {
            Some('2') => GpsFixMode::Fix2D,
            Some('3') => GpsFixMode::Fix3D,
            _ => GpsFixMode::NotAvailable,
        }
    }

    /// Non-empty PRN slots
    pub fn active_prns(&self) -> impl Iterator<Item = u8> + '_ {
        self.prns.iter().copied().filter(|&prn| prn != 0)
    }
}

/// Parsed ZDA sentence (Time and Date)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZdaData {
    /// UTC time of the fix
    pub time: Option<TimeOfDay>,
    /// Packed `DDMMYY`
    pub date: Option<u32>,
    /// Local zone offset, hours
    pub local_zone_hours: Option<i16>,
    /// Local zone offset, minutes
    pub local_zone_minutes: Option<u8>,
}

/// One satellite-in-view record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Satellite {
    /// Satellite PRN number
    pub prn: u16,
    /// Elevation, 0-90 degrees
    pub elevation: i16,
    /// Azimuth from true north, 0-359 degrees
    pub azimuth: i16,
    /// 0-99 dB, 0 if not tracking
    pub snr: u16,
}

/// Satellites-in-view table rebuilt from a GSV message sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GsvTable {
    satellites: [Satellite; MAX_GSV],
    expected: u16,
    fill: u16,
    total_messages: u8,
    message_index: u8,
}

impl GsvTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one GSV sentence.
    ///
    /// Message index 1 restarts the table. Each sentence appends four records
    /// at the fill index, whatever its own index says.
    pub fn decode(&mut self, sentence: &str) -> Result<(), NmeaError> {
        let mut fields = FieldScanner::after_header(sentence);
        let total_messages = fields.or_zero::<u8>()?;
        let message_index = fields.or_zero::<u8>()?;
        let in_view = fields.or_zero::<u16>()?;

        let mut batch = [Satellite::default(); 4];
        for sat in &mut batch {
            sat.prn = fields.or_zero()?;
            sat.elevation = fields.or_zero()?;
            sat.azimuth = fields.or_zero()?;
            sat.snr = fields.or_zero()?;
        }

        if message_index == 1 {
            self.expected = in_view;
            self.fill = 0;
        }
        self.total_messages = total_messages;
        self.message_index = message_index;

        let start = usize::from(self.fill).min(MAX_GSV);
        let end = (start + batch.len()).min(MAX_GSV);
        self.satellites[start..end].copy_from_slice(&batch[..end - start]);
        // end <= MAX_GSV, which fits in u16
        self.fill = end as u16;
        Ok(())
    }

    /// Satellites collected so far, bounded by the expected count
    pub fn in_view(&self) -> &[Satellite] {
        let len = usize::from(self.fill.min(self.expected)).min(MAX_GSV);
        &self.satellites[..len]
    }

    /// All 32 slots, including unfilled ones
    pub fn slots(&self) -> &[Satellite; MAX_GSV] {
        &self.satellites
    }

    /// Satellite count announced by the first message of the sequence
    pub fn expected(&self) -> u16 {
        self.expected
    }

    /// Next slot to be written
    pub fn fill_index(&self) -> u16 {
        self.fill
    }

    /// `true` when the last message seen closed its sequence
    pub fn is_complete(&self) -> bool {
        self.total_messages != 0 && self.message_index == self.total_messages
    }
}

/// Parse a GLL sentence
pub fn decode_gll(sentence: &str) -> Result<GllData, NmeaError> {
    let mut fields = FieldScanner::after_header(sentence);
    let mut gll = GllData::default();

    (gll.latitude, gll.flags.lat_south) = coordinate(&mut fields, 'N', 'S')?;
    (gll.longitude, gll.flags.lon_west) = coordinate(&mut fields, 'E', 'W')?;
    gll.time = parse_time(fields.next_field())?;
    gll.flags.valid = fields.letter() == Some('A');

    Ok(gll)
}

/// Parse a GGA sentence
pub fn decode_gga(sentence: &str) -> Result<GgaData, NmeaError> {
    let mut fields = FieldScanner::after_header(sentence);
    let mut gga = GgaData::default();

    gga.time = parse_time(fields.next_field())?;
    (gga.latitude, gga.flags.lat_south) = coordinate(&mut fields, 'N', 'S')?;
    (gga.longitude, gga.flags.lon_west) = coordinate(&mut fields, 'E', 'W')?;
    gga.quality = fields.or_zero()?;
    gga.satellites_used = fields.or_zero()?;
    gga.hdop = fields.optional()?;
    gga.altitude = fields.optional()?;
    fields.expect_unit('M')?;
    gga.geoid_separation = fields.optional()?;
    fields.expect_unit('M')?;
    gga.dgps_age = fields.optional()?;
    gga.dgps_station_id = fields.optional()?;
    gga.flags.valid = gga.quality != 0;

    Ok(gga)
}

/// Parse a RMC sentence
pub fn decode_rmc(sentence: &str) -> Result<RmcData, NmeaError> {
    let mut fields = FieldScanner::after_header(sentence);
    let mut rmc = RmcData::default();

    rmc.time = parse_time(fields.next_field())?;
    match fields.next_field() {
        "A" => rmc.flags.valid = true,
        "V" => {}
        other => return Err(NmeaError::BadStatus(other.to_string())),
    }
    (rmc.latitude, rmc.flags.lat_south) = coordinate(&mut fields, 'N', 'S')?;
    (rmc.longitude, rmc.flags.lon_west) = coordinate(&mut fields, 'E', 'W')?;
    rmc.speed_knots = fields.optional()?;
    rmc.course = fields.optional()?;
    rmc.date = fields.optional()?;
    rmc.magnetic_variation = fields.optional()?;
    rmc.flags.var_west = fields.letter() == Some('W');

    Ok(rmc)
}

/// Parse a VTG sentence; every unit letter is mandatory
pub fn decode_vtg(sentence: &str) -> Result<VtgData, NmeaError> {
    let mut fields = FieldScanner::after_header(sentence);
    let mut vtg = VtgData::default();

    vtg.track_true = fields.optional()?;
    fields.expect_unit('T')?;
    vtg.track_magnetic = fields.optional()?;
    fields.expect_unit('M')?;
    vtg.speed_knots = fields.optional()?;
    fields.expect_unit('N')?;
    vtg.speed_kmh = fields.optional()?;
    fields.expect_unit('K')?;

    Ok(vtg)
}

/// Parse a GSA sentence
pub fn decode_gsa(sentence: &str) -> Result<GsaData, NmeaError> {
    let mut fields = FieldScanner::after_header(sentence);
    let mut gsa = GsaData {
        selection: fields.letter(),
        fix: fields.letter(),
        ..GsaData::default()
    };

    for slot in &mut gsa.prns {
        let prn = fields.or_zero::<u32>()?;
        *slot = u8::try_from(prn).map_err(|_| NmeaError::PrnOutOfRange(prn))?;
    }
    gsa.pdop = fields.optional()?;
    gsa.hdop = fields.optional()?;
    gsa.vdop = fields.optional()?;

    Ok(gsa)
}

/// Parse a ZDA sentence
pub fn decode_zda(sentence: &str) -> Result<ZdaData, NmeaError> {
    let mut fields = FieldScanner::after_header(sentence);
    let mut zda = ZdaData {
        time: parse_time(fields.next_field())?,
        ..ZdaData::default()
    };

    let day = bounded(fields.optional::<u32>()?, 31)?;
    let month = bounded(fields.optional::<u32>()?, 12)?;
    let year = fields.optional::<u32>()?;
    if day.is_some() || month.is_some() || year.is_some() {
        zda.date = Some(
            day.unwrap_or(0) * 10000 + month.unwrap_or(0) * 100 + year.unwrap_or(0) % 100,
        );
    }
    zda.local_zone_hours = fields.optional()?;
    zda.local_zone_minutes = fields.optional()?;

    Ok(zda)
}

/// Reject calendar fields above `max`
fn bounded(value: Option<u32>, max: u32) -> Result<Option<u32>, NmeaError> {
    match value {
        Some(v) if v > max => Err(NmeaError::BadNumber(v.to_string())),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gga_parse() {
        let gga =
            decode_gga("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47").unwrap();
        assert_eq!(gga.quality, 1);
        assert_eq!(gga.fix_quality(), GpsFixQuality::GpsFix);
        assert_eq!(gga.satellites_used, 8);
        assert_eq!(gga.latitude, Some(4807.038));
        assert_eq!(gga.longitude, Some(1131.0));
        assert!(!gga.flags.lat_south && !gga.flags.lon_west);
        assert_eq!(gga.hdop, Some(0.9));
        assert_eq!(gga.altitude, Some(545.4));
        assert_eq!(gga.geoid_separation, Some(46.9));
        assert_eq!(gga.dgps_age, None);
        assert_eq!(gga.dgps_station_id, None);
        assert_eq!(gga.time.map(|t| t.hms), Some(123519));
    }

    #[test]
    fn test_gga_without_fix() {
        let gga = decode_gga("$GPGGA,064951.000,,,,,0,0,,,M,,M,,*47").unwrap();
        assert_eq!(gga.latitude, None);
        assert_eq!(gga.fix_quality(), GpsFixQuality::Invalid);
        assert_eq!(gga.time.map(|t| t.millis), Some(0));
    }

    #[test]
    fn test_gga_rejects_bad_unit_and_hemisphere() {
        assert!(matches!(
            decode_gga("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,F,46.9,M,,*00"),
            Err(NmeaError::BadUnit { expected: 'M', .. })
        ));
        assert_eq!(
            decode_gga("$GPGGA,123519,4807.038,X,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*00"),
            Err(NmeaError::BadHemisphere("X".into()))
        );
        assert_eq!(
            decode_gga("$GPGGA,123519,4807.038,,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*00"),
            Err(NmeaError::BadHemisphere(String::new()))
        );
    }

    #[test]
    fn test_rmc_parse() {
        let rmc =
            decode_rmc("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A")
                .unwrap();
        assert!(rmc.flags.valid);
        assert!(rmc.flags.var_west);
        assert_eq!(rmc.speed_knots, Some(22.4));
        assert_eq!(rmc.course, Some(84.4));
        assert_eq!(rmc.date, Some(230394));
        assert_eq!(unpack_date(230394), (23, 3, 94));
        assert_eq!(rmc.magnetic_variation, Some(3.1));
    }

    #[test]
    fn test_rmc_southwest_with_millis() {
        let rmc = decode_rmc(
            "$GPRMC,064951.250,A,3342.6618,S,11751.3858,W,0.06,31.66,280511,,,A*58",
        )
        .unwrap();
        assert!(rmc.flags.lat_south);
        assert!(rmc.flags.lon_west);
        assert!(!rmc.flags.var_west);
        assert_eq!(rmc.time.map(|t| t.millis), Some(250));
        assert_eq!(rmc.magnetic_variation, None);
    }

    #[test]
    fn test_rmc_bad_status() {
        assert_eq!(
            decode_rmc("$GPRMC,123519,X,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*00"),
            Err(NmeaError::BadStatus("X".into()))
        );
    }

    #[test]
    fn test_dm_to_degrees() {
        assert!((dm_to_degrees(4807.038, false) - 48.1173).abs() < 1e-4);
        assert!((dm_to_degrees(1131.000, true) + 11.516_666).abs() < 1e-4);
        assert_eq!(dm_to_degrees(0.0, true), 0.0);
    }

    #[test]
    fn test_gll_parse() {
        let gll = decode_gll("$GPGLL,4916.45,N,12311.12,W,225444.120,A*2C").unwrap();
        assert_eq!(gll.latitude, Some(4916.45));
        assert!(gll.flags.lon_west);
        assert!(gll.flags.valid);
        let time = gll.time.unwrap();
        assert_eq!((time.hms, time.millis), (225444, 120));
    }

    #[test]
    fn test_vtg_parse() {
        let vtg = decode_vtg("$GPVTG,165.48,T,,M,0.03,N,0.06,K,A*36").unwrap();
        assert_eq!(vtg.track_true, Some(165.48));
        assert_eq!(vtg.track_magnetic, None);
        assert_eq!(vtg.speed_knots, Some(0.03));
        assert_eq!(vtg.speed_kmh, Some(0.06));

        assert_eq!(
            decode_vtg("$GPVTG,165.48,T,,M,0.03,K,0.06,K,A*00"),
            Err(NmeaError::BadUnit { expected: 'N', found: "K".into() })
        );
    }

    #[test]
    fn test_gsa_parse() {
        let gsa = decode_gsa("$GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1*39").unwrap();
        assert_eq!(gsa.selection, Some('A'));
        assert_eq!(gsa.fix_mode(), GpsFixMode::Fix3D);
        assert_eq!(gsa.active_prns().collect::<Vec<_>>(), vec![4, 5, 9, 12, 24]);
        assert_eq!(gsa.prns[2], 0);
        assert_eq!(gsa.pdop, Some(2.5));
        assert_eq!(gsa.vdop, Some(2.1));

        assert_eq!(
            decode_gsa("$GPGSA,A,3,256,,,,,,,,,,,,2.5,1.3,2.1*00"),
            Err(NmeaError::PrnOutOfRange(256))
        );
    }

    #[test]
    fn test_zda_parse() {
        let zda = decode_zda("$GPZDA,172809.456,12,07,1996,00,00*57").unwrap();
        let time = zda.time.unwrap();
        assert_eq!((time.hms, time.millis), (172809, 456));
        assert_eq!(zda.date, Some(120796));
        assert_eq!(zda.local_zone_hours, Some(0));
        assert_eq!(zda.local_zone_minutes, Some(0));

        let bare = decode_zda("$GPZDA,172809.456,12,07,1996,,*57").unwrap();
        assert_eq!(bare.local_zone_hours, None);
    }

    #[test]
    fn test_zda_rejects_out_of_range_date() {
        assert_eq!(
            decode_zda("$GPZDA,172809,999999,07,1996,,*00"),
            Err(NmeaError::BadNumber("999999".into()))
        );
        assert_eq!(
            decode_zda("$GPZDA,172809,12,13,1996,,*00"),
            Err(NmeaError::BadNumber("13".into()))
        );
        let edge = decode_zda("$GPZDA,172809,31,12,4294967295,,*00").unwrap();
        assert_eq!(edge.date, Some(311295));
    }

    #[test]
    fn test_gsv_reassembly() {
        let mut table = GsvTable::new();
        table
            .decode("$GPGSV,2,1,07,07,79,048,42,02,51,062,43,26,36,256,42,27,27,138,42*71")
            .unwrap();
        assert_eq!(table.expected(), 7);
        assert_eq!(table.fill_index(), 4);
        assert!(!table.is_complete());

        table
            .decode("$GPGSV,2,2,07,09,23,313,42,04,19,159,41,15,12,041,00*47")
            .unwrap();
        assert!(table.is_complete());
        let prns: Vec<u16> = table.in_view().iter().map(|s| s.prn).collect();
        assert_eq!(prns, vec![7, 2, 26, 27, 9, 4, 15]);
        assert_eq!(table.in_view()[6].snr, 0);
        assert_eq!(table.fill_index(), 8);

        // A new sequence starts over
        table
            .decode("$GPGSV,1,1,02,11,10,100,30,12,20,200,31*79")
            .unwrap();
        assert_eq!(table.in_view().len(), 2);
        assert_eq!(table.in_view()[0].prn, 11);
    }

    #[test]
    fn test_gsv_never_overruns_table() {
        let mut table = GsvTable::new();
        table.decode("$GPGSV,9,1,40,01,1,1,1,02,2,2,2,03,3,3,3,04,4,4,4*00").unwrap();
        for _ in 0..10 {
            table.decode("$GPGSV,9,2,40,05,5,5,5,06,6,6,6,07,7,7,7,08,8,8,8*00").unwrap();
        }
        assert_eq!(usize::from(table.fill_index()), MAX_GSV);
        assert_eq!(table.in_view().len(), MAX_GSV);
    }
}
