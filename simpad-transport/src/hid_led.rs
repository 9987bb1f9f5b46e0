//! HID output transport for the LED interface

use hidapi::HidDevice;
use tracing::debug;

use crate::error::TransportError;
use crate::protocol::cmd;
use crate::types::DeviceDescriptor;
use crate::LedTransport;

/// Open LED interface of a SimPad
///
/// Writes are plain output reports. The handle is closed when the transport
/// is dropped.
pub struct HidLedTransport {
    device: HidDevice,
    info: DeviceDescriptor,
}

impl HidLedTransport {
    /// Wrap an opened HID device
    pub fn new(device: HidDevice, info: DeviceDescriptor) -> Self {
        Self { device, info }
    }
}

impl LedTransport for HidLedTransport {
    fn write_report(&mut self, report: &[u8]) -> Result<usize, TransportError> {
        let written = self.device.write(report)?;
        if let [_, class, subcommand, ..] = report {
            debug!(
                "{}: wrote {} bytes: {:02X?}",
                cmd::name(*class, *subcommand),
                written,
                report
            );
        }
        if written < report.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: report.len(),
            });
        }
        Ok(written)
    }

    fn device_info(&self) -> &DeviceDescriptor {
        &self.info
    }
}

impl Drop for HidLedTransport {
    fn drop(&mut self) {
        debug!("Closing LED interface {}", self.info.path);
    }
}
