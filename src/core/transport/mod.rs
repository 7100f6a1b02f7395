//! Transport layer
//!
//! The protocol engine only ever needs three things from a byte link:
//! reconfigure its speed, poll one byte, write a buffer. [`Transport`] is
//! that seam; [`SerialTransport`] implements it over a serial port.

mod serial;

pub use serial::{list_ports, SerialConfig, SerialFlowControl, SerialParity, SerialTransport};

use thiserror::Error;

/// Transport error types
#[derive(Error, Debug)]
pub enum TransportError {
    /// Opening the port failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Port not found
    #[error("Port not found: {0}")]
    PortNotFound(String),

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// No port opened yet
    #[error("Not connected")]
    NotConnected,

    /// Device went away
    #[error("Disconnected")]
    Disconnected,
}

/// Byte link to a receiver
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// (Re)configure the link at `baud`
    fn configure(&mut self, baud: u32) -> Result<(), TransportError>;

    /// Next received byte, `None` when nothing is waiting. Never blocks.
    fn next_byte(&mut self) -> Result<Option<u8>, TransportError>;

    /// Write `data`, returning the number of bytes accepted
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;
}
