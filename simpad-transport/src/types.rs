//! Common types for transport layer

use serde::Serialize;

/// One HID interface returned by enumeration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// USB interface number (-1 when the platform does not report it)
    pub interface_number: i32,
    /// Platform device path used to open the interface
    pub path: String,
    /// Serial number if available
    pub serial: Option<String>,
    /// Product name if available
    pub product_name: Option<String>,
}

impl DeviceDescriptor {
    /// Whether this interface accepts LED writes
    pub fn is_interface(&self, interface_number: i32) -> bool {
        self.interface_number == interface_number
    }
}
