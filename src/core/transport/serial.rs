//! Serial port transport implementation

use super::{Transport, TransportError};
use serde::{Deserialize, Serialize};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::collections::VecDeque;
use std::io::{Read, Write};
use std::time::Duration;

/// Bytes pulled from the driver per read
const READ_CHUNK: usize = 256;

/// Serial port flow control type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialFlowControl {
    /// No flow control
    #[default]
    None,
    /// Hardware flow control (RTS/CTS)
    Hardware,
    /// Software flow control (XON/XOFF)
    Software,
}

/// Serial port parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerialParity {
    /// No parity
    #[default]
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

impl std::str::FromStr for SerialParity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "n" => Ok(Self::None),
            "odd" | "o" => Ok(Self::Odd),
            "even" | "e" => Ok(Self::Even),
            other => Err(format!("unknown parity '{other}'")),
        }
    }
}

/// Serial port configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port name (e.g., COM3, /dev/ttyUSB0)
    pub port: String,
    /// Data bits (5, 6, 7, 8)
    pub data_bits: u8,
    /// Stop bits (1, 2)
    pub stop_bits: u8,
    /// Parity
    pub parity: SerialParity,
    /// Flow control
    pub flow_control: SerialFlowControl,
    /// Driver read timeout in milliseconds
    pub timeout_ms: u64,
}

impl SerialConfig {
    /// 8N1 without flow control on `port`
    pub fn new(port: &str) -> Self {
        Self {
            port: port.to_string(),
            data_bits: 8,
            stop_bits: 1,
            parity: SerialParity::None,
            flow_control: SerialFlowControl::None,
            timeout_ms: 10,
        }
    }

    /// Set data bits
    #[must_use]
    pub fn data_bits(mut self, bits: u8) -> Self {
        self.data_bits = bits;
        self
    }

    /// Set stop bits
    #[must_use]
    pub fn stop_bits(mut self, bits: u8) -> Self {
        self.stop_bits = bits;
        self
    }

    /// Set parity
    #[must_use]
    pub fn parity(mut self, parity: SerialParity) -> Self {
        self.parity = parity;
        self
    }

    /// Set flow control
    #[must_use]
    pub fn flow_control(mut self, flow: SerialFlowControl) -> Self {
        self.flow_control = flow;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::new(if cfg!(windows) { "COM1" } else { "/dev/ttyUSB0" })
    }
}

/// Serial port transport.
///
/// The port is opened on the first [`Transport::configure`] call and reused
/// afterwards; later calls only change the speed.
pub struct SerialTransport {
    config: SerialConfig,
    port: Option<Box<dyn SerialPort>>,
    baud_rate: Option<u32>,
    pending: VecDeque<u8>,
}

impl SerialTransport {
    /// Create a transport; nothing is opened yet
    pub fn new(config: SerialConfig) -> Self {
        Self {
            config,
            port: None,
            baud_rate: None,
            pending: VecDeque::with_capacity(READ_CHUNK),
        }
    }

    /// `true` once the port has been opened
    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Close the port; the next `configure` reopens it
    pub fn close(&mut self) {
        self.port = None;
        self.baud_rate = None;
        self.pending.clear();
    }

    /// Connection summary such as `/dev/ttyUSB0 @ 9600 baud (8N1 No FC)`
    pub fn connection_info(&self) -> String {
        let baud = self
            .baud_rate
            .map_or_else(|| "?".to_string(), |b| b.to_string());
        format!(
            "{} @ {} baud ({}{}{} {})",
            self.config.port,
            baud,
            self.config.data_bits,
            match self.config.parity {
                SerialParity::None => "N",
                SerialParity::Odd => "O",
                SerialParity::Even => "E",
            },
            self.config.stop_bits,
            match self.config.flow_control {
                SerialFlowControl::None => "No FC",
                SerialFlowControl::Hardware => "HW FC",
                SerialFlowControl::Software => "SW FC",
            }
        )
    }

    fn open(&self, baud: u32) -> Result<Box<dyn SerialPort>, TransportError> {
        let data_bits = match self.config.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            _ => DataBits::Eight,
        };

        let stop_bits = match self.config.stop_bits {
            2 => StopBits::Two,
            _ => StopBits::One,
        };

        let parity = match self.config.parity {
            SerialParity::Odd => Parity::Odd,
            SerialParity::Even => Parity::Even,
            SerialParity::None => Parity::None,
        };

        let flow_control = match self.config.flow_control {
            SerialFlowControl::Hardware => FlowControl::Hardware,
            SerialFlowControl::Software => FlowControl::Software,
            SerialFlowControl::None => FlowControl::None,
        };

        serialport::new(&self.config.port, baud)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .flow_control(flow_control)
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .open()
            .map_err(|e| self.map_open_error(e))
    }

    fn map_open_error(&self, e: serialport::Error) -> TransportError {
        match e.kind() {
            serialport::ErrorKind::NoDevice => TransportError::PortNotFound(self.config.port.clone()),
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
                TransportError::PermissionDenied(self.config.port.clone())
            }
            serialport::ErrorKind::InvalidInput => {
                TransportError::InvalidConfiguration(e.to_string())
            }
            _ => TransportError::ConnectionFailed(e.to_string()),
        }
    }

    fn fill(&mut self) -> Result<(), TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::NotConnected)?;
        let waiting = port
            .bytes_to_read()
            .map_err(|e| TransportError::IoError(e.into()))?;
        if waiting == 0 {
            return Ok(());
        }

        let mut buffer = [0u8; READ_CHUNK];
        let want = (waiting as usize).min(READ_CHUNK);
        match port.read(&mut buffer[..want]) {
            Ok(0) => Err(TransportError::Disconnected),
            Ok(n) => {
                self.pending.extend(&buffer[..n]);
                Ok(())
            }
            // No data available
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(()),
            Err(e) => Err(TransportError::IoError(e)),
        }
    }
}

impl Transport for SerialTransport {
    fn configure(&mut self, baud: u32) -> Result<(), TransportError> {
        match self.port.as_mut() {
            Some(port) => port
                .set_baud_rate(baud)
                .map_err(|e| TransportError::IoError(e.into()))?,
            None => self.port = Some(self.open(baud)?),
        }
        self.baud_rate = Some(baud);
        self.pending.clear();
        tracing::debug!("{}", self.connection_info());
        Ok(())
    }

    fn next_byte(&mut self) -> Result<Option<u8>, TransportError> {
        if self.pending.is_empty() {
            self.fill()?;
        }
        Ok(self.pending.pop_front())
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::NotConnected)?;
        let written = port.write(data)?;
        port.flush()?;
        Ok(written)
    }
}

/// List available serial ports
pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>, TransportError> {
    serialport::available_ports().map_err(|e| TransportError::IoError(e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SerialConfig::new("/dev/ttyS1")
            .data_bits(7)
            .stop_bits(2)
            .parity(SerialParity::Even)
            .flow_control(SerialFlowControl::Hardware);
        assert_eq!(config.port, "/dev/ttyS1");
        assert_eq!(config.data_bits, 7);
        assert_eq!(config.stop_bits, 2);
        assert_eq!(config.parity, SerialParity::Even);
        assert_eq!(config.flow_control, SerialFlowControl::Hardware);
    }

    #[test]
    fn test_parity_from_str() {
        assert_eq!("N".parse::<SerialParity>(), Ok(SerialParity::None));
        assert_eq!("odd".parse::<SerialParity>(), Ok(SerialParity::Odd));
        assert!("mark".parse::<SerialParity>().is_err());
    }

    #[test]
    fn test_io_before_configure() {
        let mut transport = SerialTransport::new(SerialConfig::new("/dev/null-port"));
        assert!(!transport.is_open());
        assert!(matches!(transport.write(b"$"), Err(TransportError::NotConnected)));
        assert!(matches!(transport.next_byte(), Err(TransportError::NotConnected)));
        assert_eq!(
            transport.connection_info(),
            "/dev/null-port @ ? baud (8N1 No FC)"
        );
    }
}
