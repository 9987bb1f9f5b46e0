//! Controller error types

use simpad_transport::TransportError;
use thiserror::Error;

/// Errors from LED controller operations
///
/// None of these are fatal: a missing or failing keypad only means the LEDs
/// are not updated.
#[derive(Error, Debug)]
pub enum LedError {
    /// No enumerated interface matched, or none exposed the LED interface
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// A matching interface was found but could not be opened
    #[error("Failed to open device: {0}")]
    OpenFailed(String),

    /// A single LED command could not be written
    #[error("Write failed for key {key}: {source}")]
    WriteFailed {
        key: usize,
        #[source]
        source: TransportError,
    },

    /// Other transport layer error (enumeration, HID context)
    #[error("Transport error: {0}")]
    Transport(TransportError),

    /// The sync worker thread could not be spawned
    #[error("Failed to spawn sync worker: {0}")]
    Spawn(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Invalid config: {0}")]
    Config(String),
}

impl From<TransportError> for LedError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::DeviceNotFound(msg) => LedError::DeviceNotFound(msg),
            TransportError::OpenFailed { path, reason } => {
                LedError::OpenFailed(format!("{path}: {reason}"))
            }
            other => LedError::Transport(other),
        }
    }
}
