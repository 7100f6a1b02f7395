//! Protocol implementations
//!
//! NMEA 0183 and the MediaTek PMTK extension:
//! - Checksum and framing validation
//! - Field scanning and per-sentence decoders
//! - GSV satellite table reassembly
//! - PMTK command encoding

pub mod checksum;
pub mod fields;
pub mod mtk;
pub mod nmea;
pub mod pmtk;
pub mod sentence;

pub use checksum::{append_checksum, sentence_checksum, xor_checksum};
pub use fields::{FieldScanner, TimeOfDay};
pub use mtk::{AckReport, AckStatus, ChannelStatus, MTK_MAX_CHN};
pub use nmea::{
    dm_to_degrees, FixFlags, GllData, GgaData, GpsFixMode, GpsFixQuality, GsaData, GsvTable,
    RmcData, Satellite, VtgData, ZdaData, MAX_GSV,
};
pub use pmtk::{codes, CommandError, BAUD_CANDIDATES, BIN_OFF};
pub use sentence::{
    classify, is_valid, validate, LineBuffer, NmeaError, SentenceKind, ValidityMask,
    MAX_SENTENCE_LEN,
};
