//! Device discovery for SimPad keypads

use std::ffi::CString;

use hidapi::HidApi;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::hid_led::HidLedTransport;
use crate::types::DeviceDescriptor;
use crate::BoxedTransport;

/// Enumerate/open primitives of a HID library
///
/// `HidDiscovery` is the hidapi-backed implementation; tests substitute an
/// in-memory backend.
pub trait HidBackend: Send + Sync {
    /// List all interfaces matching a VID/PID pair
    fn enumerate(&self, vid: u16, pid: u16) -> Result<Vec<DeviceDescriptor>, TransportError>;

    /// Open one enumerated interface for writing
    fn open(&self, device: &DeviceDescriptor) -> Result<BoxedTransport, TransportError>;
}

/// HID device discovery through hidapi
///
/// A fresh `HidApi` context is created per call and dropped afterwards, so no
/// enumeration state outlives the call.
#[derive(Debug, Default)]
pub struct HidDiscovery;

impl HidDiscovery {
    /// Create a new HID discovery instance
    pub fn new() -> Self {
        Self
    }

    fn api() -> Result<HidApi, TransportError> {
        HidApi::new_without_enumerate().map_err(TransportError::from)
    }
}

impl HidBackend for HidDiscovery {
    fn enumerate(&self, vid: u16, pid: u16) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let mut api = Self::api()?;
        api.add_devices(vid, pid)?;

        let devices: Vec<DeviceDescriptor> = api
            .device_list()
            .filter(|d| d.vendor_id() == vid && d.product_id() == pid)
            .map(|d| {
                let path = d.path().to_string_lossy().to_string();
                debug!(
                    "Found interface: VID={:04X} PID={:04X} if={} path={}",
                    vid,
                    pid,
                    d.interface_number(),
                    path
                );
                DeviceDescriptor {
                    vid,
                    pid,
                    interface_number: d.interface_number(),
                    path,
                    serial: d.serial_number().map(|s| s.to_string()),
                    product_name: d.product_string().map(|s| s.to_string()),
                }
            })
            .collect();

        debug!("Found {} interfaces for {:04X}:{:04X}", devices.len(), vid, pid);
        Ok(devices)
    }

    fn open(&self, device: &DeviceDescriptor) -> Result<BoxedTransport, TransportError> {
        let api = Self::api()?;
        let path = CString::new(device.path.as_str()).map_err(|e| TransportError::OpenFailed {
            path: device.path.clone(),
            reason: e.to_string(),
        })?;

        let handle = api
            .open_path(&path)
            .map_err(|e| TransportError::OpenFailed {
                path: device.path.clone(),
                reason: e.to_string(),
            })?;

        info!(
            "Opened LED interface {} of {:04X}:{:04X}",
            device.interface_number, device.vid, device.pid
        );
        Ok(Box::new(HidLedTransport::new(handle, device.clone())))
    }
}

/// Pick the interface that accepts LED writes among enumerated entries
///
/// Fails with `DeviceNotFound` both when nothing matched the VID/PID pair and
/// when matches exist but none expose `interface_number`.
pub fn select_interface(
    devices: &[DeviceDescriptor],
    interface_number: i32,
) -> Result<&DeviceDescriptor, TransportError> {
    if devices.is_empty() {
        return Err(TransportError::DeviceNotFound(
            "No matching HID devices".into(),
        ));
    }

    devices
        .iter()
        .find(|d| d.is_interface(interface_number))
        .ok_or_else(|| {
            TransportError::DeviceNotFound(format!(
                "{} matching interfaces, none with interface number {}",
                devices.len(),
                interface_number
            ))
        })
}
