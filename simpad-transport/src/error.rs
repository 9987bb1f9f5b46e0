//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open {path}: {reason}")]
    OpenFailed { path: String, reason: String },

    #[error("Device disconnected")]
    Disconnected,

    // HID-specific errors
    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),

    #[error("Short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            TransportError::HidPermissionDenied(msg)
        } else if msg.contains("No such device") || msg.contains("ENODEV") {
            TransportError::Disconnected
        } else {
            TransportError::HidError(msg)
        }
    }
}
