//! Transport layer for SimPad keypad LEDs
//!
//! This crate provides:
//!
//! - Device discovery over hidapi (`HidDiscovery`), behind the `HidBackend` trait
//! - An output-report transport for the LED interface (`HidLedTransport`)
//! - The LED command format (`SetLed`) and report framing

pub mod command;
pub mod device_registry;
pub mod error;
pub mod protocol;
pub mod types;

mod discovery;
mod hid_led;

pub use command::{HidCommand, ParseError, Rgb, SetLed};
pub use device_registry::{LED_COUNT, LED_INTERFACE, PID_SIMPAD_V2_AE, VENDOR_ID};
pub use discovery::{select_interface, HidBackend, HidDiscovery};
pub use error::TransportError;
pub use hid_led::HidLedTransport;
pub use protocol::{COMMAND_SIZE, REPORT_SIZE};
pub use types::DeviceDescriptor;

/// Write side of an opened LED interface
///
/// Writes block until the HID layer accepts the report, which can take long
/// enough to stall a render loop; callers keep them off latency-sensitive
/// threads.
pub trait LedTransport: Send {
    /// Write one framed output report, returning the number of bytes written
    fn write_report(&mut self, report: &[u8]) -> Result<usize, TransportError>;

    /// Get device information
    fn device_info(&self) -> &DeviceDescriptor;
}

/// Type alias for a boxed transport
pub type BoxedTransport = Box<dyn LedTransport>;
