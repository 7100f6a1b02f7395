//! Core module containing the receiver protocol engine
//!
//! This module provides:
//! - NMEA 0183 and PMTK protocol handling (validation, decoding, encoding)
//! - Transport layer for the serial link
//! - Receiver session state
//! - Baud-rate auto-detection
//! - Sentence capture logging

pub mod logger;
pub mod probe;
pub mod protocol;
pub mod session;
pub mod transport;

pub use logger::{LogEntry, LogFormat, SentenceLogger};
pub use probe::{detect, ProbeConfig, ProbeOutcome};
pub use session::{ParseOutcome, PortStats, ReceiverError, ReceiverSession};
pub use transport::{SerialConfig, SerialTransport, Transport, TransportError};
