//! Device registry - identifiers of supported SimPad models
//!
//! The keypad exposes several HID interfaces under one VID/PID pair. Only one
//! of them accepts LED output reports; the others carry key input and the
//! configuration channel.

/// SimPad vendor ID
pub const VENDOR_ID: u16 = 0x8088;

/// SimPad v2 Anniversary Edition product ID
pub const PID_SIMPAD_V2_AE: u16 = 0x0006;

/// USB interface number that accepts LED commands
pub const LED_INTERFACE: i32 = 1;

/// Number of illuminated keys
pub const LED_COUNT: usize = 2;

/// Known VID/PID pairs with an LED interface
pub const SUPPORTED_DEVICES: &[(u16, u16)] = &[(VENDOR_ID, PID_SIMPAD_V2_AE)];

/// Check if a VID/PID pair is a known SimPad
#[inline]
pub fn is_supported(vid: u16, pid: u16) -> bool {
    SUPPORTED_DEVICES.contains(&(vid, pid))
}
