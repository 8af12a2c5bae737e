//! # Error Types
//!
//! Custom error types for onyx-signal-info using `thiserror`.
//!
//! Every variant falls into one [`ErrorKind`], and each kind owns a distinct
//! process exit code so that cron jobs and shell scripts can tell a typo in
//! `-i` apart from an unplugged dongle or an unreachable metadata service.

use thiserror::Error;

/// Main error type for onyx-signal-info
#[derive(Debug, Error)]
pub enum SignalInfoError {
    /// A requested field name is not part of the field table
    #[error("Unknown field name: {0:?} (use '-i any' to list every field)")]
    UnknownField(String),

    /// `-i` was given but named nothing
    #[error("No fields requested")]
    NoFieldsRequested,

    /// Configuration file could not be parsed or failed validation
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serial device could not be opened
    #[error("Cannot open serial device {device}: {reason}")]
    PortOpen { device: String, reason: String },

    /// Serial I/O failed after the port was opened
    #[error("Serial error: {0}")]
    Serial(String),

    /// The modem did not terminate a response in time
    #[error("AT command timeout ({command:?} after {timeout_ms} ms)")]
    Timeout { command: String, timeout_ms: u64 },

    /// The modem answered a command with ERROR
    #[error("AT command {command:?} rejected by modem: {response}")]
    CommandRejected { command: String, response: String },

    /// The expected response line never showed up
    #[error("Cannot find line starting with {prefix:?} in response to {command:?}")]
    ResponseMissing { command: String, prefix: String },

    /// The HTTP client for the metadata service could not be set up
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Writing to the metadata service failed
    #[error("Metadata upload failed: {0}")]
    Upload(String),

    /// Sending the UDP datagram failed
    #[error("Network error: {0}")]
    Network(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error classes, one per exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad command line input; nothing was sent to the modem
    Input,
    /// Serial access or modem communication failed
    Device,
    /// Metadata or UDP delivery failed
    Delivery,
    /// Configuration or anything else
    Config,
}

impl ErrorKind {
    /// Process exit code for this class.
    ///
    /// `2` matches the code clap uses for usage errors.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config => 1,
            ErrorKind::Input => 2,
            ErrorKind::Device => 3,
            ErrorKind::Delivery => 4,
        }
    }
}

impl SignalInfoError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SignalInfoError::UnknownField(_) | SignalInfoError::NoFieldsRequested => {
                ErrorKind::Input
            }
            SignalInfoError::PortOpen { .. }
            | SignalInfoError::Serial(_)
            | SignalInfoError::Timeout { .. }
            | SignalInfoError::CommandRejected { .. }
            | SignalInfoError::ResponseMissing { .. } => ErrorKind::Device,
            SignalInfoError::Upload(_) | SignalInfoError::Network(_) => ErrorKind::Delivery,
            SignalInfoError::Config(_)
            | SignalInfoError::HttpClient(_)
            | SignalInfoError::Io(_) => ErrorKind::Config,
        }
    }

    /// Shorthand for `self.kind().exit_code()`
    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}

/// Result type alias for onyx-signal-info
pub type Result<T> = std::result::Result<T, SignalInfoError>;
