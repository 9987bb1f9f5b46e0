//! Protocol constants and framing for the SimPad LED interface

/// Report ID prepended to every output report (the interface has no numbered reports)
pub const REPORT_ID: u8 = 0x00;

/// Command body size, without report ID
pub const COMMAND_SIZE: usize = 6;

/// Output report size including report ID
pub const REPORT_SIZE: usize = COMMAND_SIZE + 1;

/// Command classes and subcommands
pub mod cmd {
    /// "Special" command class (device control, not key configuration)
    pub const SPECIAL: u8 = 0x00;

    /// Subcommands of the special class
    pub mod special {
        /// Set the color of one LED
        pub const SET_LED: u8 = 0x03;
    }

    /// Get human-readable name for a class/subcommand pair
    pub fn name(class: u8, subcommand: u8) -> &'static str {
        match (class, subcommand) {
            (SPECIAL, special::SET_LED) => "SET_LED",
            (SPECIAL, _) => "SPECIAL_UNKNOWN",
            _ => "UNKNOWN",
        }
    }
}

/// Prefix a command body with the report ID
pub fn frame_report(body: &[u8; COMMAND_SIZE]) -> [u8; REPORT_SIZE] {
    let mut buf = [0u8; REPORT_SIZE];
    buf[0] = REPORT_ID;
    buf[1..].copy_from_slice(body);
    buf
}
