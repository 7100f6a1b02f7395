//! # MtkGps Core Library
//!
//! Protocol engine for MediaTek (MTK) GPS receivers speaking NMEA 0183:
//! - Sentence validation (framing and XOR checksum)
//! - Decoders for GLL, GGA, RMC, VTG, GSA, GSV, ZDA and PMTKCHN
//! - PMTK reply handling (firmware release, acknowledgements)
//! - PMTK command encoding
//! - Baud-rate auto-detection over any [`Transport`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use mtkgps_core::{ReceiverSession, SerialConfig, SerialTransport};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut link = SerialTransport::new(SerialConfig::new("/dev/ttyUSB0"));
//!     let mut session = ReceiverSession::new();
//!     session.begin(&mut link, 9600)?;
//!
//!     loop {
//!         if let Some(line) = session.poll(&mut link)? {
//!             if session.parse(&line).is_ok() {
//!                 if let Some((lat, lon)) = session.position() {
//!                     println!("{:.6}, {:.6}", lat, lon);
//!                 }
//!             }
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::cli::{CliResult, ExitCodes};
pub use crate::config::AppConfig;
pub use crate::core::logger::{LogEntry, LogFormat, SentenceLogger};
pub use crate::core::probe::{detect, ProbeConfig, ProbeOutcome};
pub use crate::core::protocol::{
    validate, CommandError, NmeaError, SentenceKind, ValidityMask, BAUD_CANDIDATES,
};
pub use crate::core::session::{ParseOutcome, ReceiverError, ReceiverSession};
pub use crate::core::transport::{SerialConfig, SerialTransport, Transport, TransportError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
