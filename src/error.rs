//! Error types for message encoding and device access.

use thiserror::Error;

/// Boxed error raised by a platform backend that has no dedicated variant.
pub type PlatformFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI output is not supported on this platform")]
    NotSupported,

    #[error("MIDI access was denied by the user")]
    AccessDenied,

    #[error("MIDI device with id \"{0}\" not found")]
    DeviceNotFound(String),

    #[error("Invalid MIDI channel: {0}. Must be 0-15")]
    InvalidChannel(u8),

    #[error("Invalid {name}: {value}. Must be 0-127")]
    InvalidValue { name: &'static str, value: u8 },

    #[error("Invalid MIDI bank: {0}. Must be 0-16383")]
    InvalidBank(u16),

    #[error("Invalid pitch bend value: {0}. Must be -8192 to 8191")]
    InvalidPitchBend(i16),

    /// Unclassified platform failure, passed through with its own message.
    #[error(transparent)]
    Platform(PlatformFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(String),
}

impl Error {
    /// True for the caller-side range violations raised by the encoder.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidChannel(_)
                | Error::InvalidValue { .. }
                | Error::InvalidBank(_)
                | Error::InvalidPitchBend(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
