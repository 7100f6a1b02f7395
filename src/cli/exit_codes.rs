//! CLI Exit Codes
//!
//! Stable exit codes for scripted use of the receiver tool.

use crate::config::ConfigError;
use crate::core::protocol::{CommandError, NmeaError};
use crate::core::session::ReceiverError;
use crate::core::transport::TransportError;
use std::process::ExitCode;

/// Exit code constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes;

impl ExitCodes {
    /// Success
    pub const SUCCESS: u8 = 0;

    /// General error
    pub const ERROR: u8 = 1;

    /// Invalid arguments
    pub const INVALID_ARGS: u8 = 2;

    /// Opening or using the port failed
    pub const CONNECTION_FAILED: u8 = 3;

    /// Probe exhausted every candidate rate
    pub const NO_RECEIVER: u8 = 4;

    /// File not found
    pub const FILE_NOT_FOUND: u8 = 5;

    /// Permission denied
    pub const PERMISSION_DENIED: u8 = 6;

    /// Configuration error
    pub const CONFIG_ERROR: u8 = 7;

    /// Sentence failed validation or decoding
    pub const PROTOCOL_ERROR: u8 = 8;

    /// Command rejected before sending
    pub const COMMAND_REJECTED: u8 = 9;

    /// User cancelled
    pub const CANCELLED: u8 = 10;

    /// Port not found
    pub const PORT_NOT_FOUND: u8 = 11;

    /// No reply within the wait
    pub const TIMEOUT: u8 = 12;

    /// Internal error
    pub const INTERNAL_ERROR: u8 = 127;
}

/// CLI operation result
#[derive(Debug)]
pub enum CliResult {
    /// Success with optional message
    Success(Option<String>),

    /// Error with code and message
    Error(u8, String),
}

impl CliResult {
    /// Plain success
    pub fn success() -> Self {
        Self::Success(None)
    }

    /// Success with a note for stderr
    pub fn success_with_message(msg: impl Into<String>) -> Self {
        Self::Success(Some(msg.into()))
    }

    /// Failure with an explicit exit code
    pub fn error(code: u8, msg: impl Into<String>) -> Self {
        Self::Error(code, msg.into())
    }

    /// Nothing answered on the port
    pub fn no_receiver(port: &str) -> Self {
        Self::Error(
            ExitCodes::NO_RECEIVER,
            format!("No receiver detected on {}", port),
        )
    }

    /// Reply did not arrive in time
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Error(ExitCodes::TIMEOUT, msg.into())
    }

    /// Input file is missing
    pub fn file_not_found(path: &str) -> Self {
        Self::Error(ExitCodes::FILE_NOT_FOUND, format!("File not found: {}", path))
    }

    /// Get exit code
    pub fn code(&self) -> u8 {
        match self {
            Self::Success(_) => ExitCodes::SUCCESS,
            Self::Error(code, _) => *code,
        }
    }

    /// Get message
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(Some(msg)) => Some(msg),
            Self::Error(_, msg) => Some(msg),
            _ => None,
        }
    }

    /// Convert to ExitCode
    pub fn to_exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    /// Is success?
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl From<std::io::Error> for CliResult {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let code = match err.kind() {
            ErrorKind::NotFound => ExitCodes::FILE_NOT_FOUND,
            ErrorKind::PermissionDenied => ExitCodes::PERMISSION_DENIED,
            ErrorKind::TimedOut => ExitCodes::TIMEOUT,
            _ => ExitCodes::ERROR,
        };

        Self::Error(code, err.to_string())
    }
}

impl From<TransportError> for CliResult {
    fn from(err: TransportError) -> Self {
        let code = match err {
            TransportError::PortNotFound(_) => ExitCodes::PORT_NOT_FOUND,
            TransportError::PermissionDenied(_) => ExitCodes::PERMISSION_DENIED,
            TransportError::InvalidConfiguration(_) => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::CONNECTION_FAILED,
        };
        Self::Error(code, err.to_string())
    }
}

impl From<CommandError> for CliResult {
    fn from(err: CommandError) -> Self {
        Self::Error(ExitCodes::COMMAND_REJECTED, err.to_string())
    }
}

impl From<NmeaError> for CliResult {
    fn from(err: NmeaError) -> Self {
        Self::Error(ExitCodes::PROTOCOL_ERROR, err.to_string())
    }
}

impl From<ReceiverError> for CliResult {
    fn from(err: ReceiverError) -> Self {
        match err {
            ReceiverError::Command(e) => e.into(),
            ReceiverError::Transport(e) => e.into(),
        }
    }
}

impl From<ConfigError> for CliResult {
    fn from(err: ConfigError) -> Self {
        Self::Error(ExitCodes::CONFIG_ERROR, err.to_string())
    }
}

/// Exit code description
pub fn exit_code_description(code: u8) -> &'static str {
    match code {
        0 => "Success",
        1 => "General error",
        2 => "Invalid arguments",
        3 => "Connection failed",
        4 => "No receiver detected",
        5 => "File not found",
        6 => "Permission denied",
        7 => "Configuration error",
        8 => "Protocol error",
        9 => "Command rejected",
        10 => "Operation cancelled",
        11 => "Port not found",
        12 => "Timed out",
        127 => "Internal error",
        _ => "Unknown error",
    }
}

/// Print exit code table
pub fn print_exit_codes() {
    println!("Exit Codes:");
    for code in [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 127] {
        println!("  {:>3}  {}", code, exit_code_description(code));
    }
}
