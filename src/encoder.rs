//! Key color → device command
//!
//! Alpha is not transmitted: it is baked into RGB by premultiplication, which
//! is how a fade reaches zero brightness without a separate dim command.

use simpad_transport::{HidCommand, SetLed, REPORT_SIZE};

use crate::color::LinearColor;

/// Build the LED command for a zero-based key
///
/// Returns `None` for a key the wire format cannot address.
pub fn encode(key: usize, color: LinearColor) -> Option<SetLed> {
    let index = u8::try_from(key).ok()?;
    SetLed::for_key(index, color.premultiplied())
}

/// Build the framed output report for a zero-based key
pub fn encode_report(key: usize, color: LinearColor) -> Option<[u8; REPORT_SIZE]> {
    encode(key, color).map(|cmd| cmd.build())
}
