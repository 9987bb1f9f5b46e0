//! Type-safe HID command builders and parsers
//!
//! Commands are fixed-size 6-byte bodies; `HidCommand::build` adds the
//! report ID framing expected by the device.

use std::fmt;

use crate::protocol::{self, cmd, COMMAND_SIZE, REPORT_SIZE};

// =============================================================================
// Core Traits
// =============================================================================

/// A command that can be serialized to HID bytes
pub trait HidCommand: Sized {
    /// Command class byte
    const CLASS: u8;

    /// Subcommand byte
    const SUBCOMMAND: u8;

    /// Serialize the command body (excluding report ID)
    fn to_bytes(&self) -> [u8; COMMAND_SIZE];

    /// Build the complete output report (report ID + body)
    fn build(&self) -> [u8; REPORT_SIZE] {
        protocol::frame_report(&self.to_bytes())
    }
}

/// Parse error for command bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    TooShort { expected: usize, got: usize },
    CommandMismatch { class: u8, subcommand: u8 },
    InvalidValue { field: &'static str, value: u8 },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { expected, got } => {
                write!(f, "Command too short: expected {expected} bytes, got {got}")
            }
            Self::CommandMismatch { class, subcommand } => {
                write!(
                    f,
                    "Unexpected command: class 0x{class:02X}, subcommand 0x{subcommand:02X}"
                )
            }
            Self::InvalidValue { field, value } => {
                write!(f, "Invalid value for {field}: 0x{value:02X}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

// =============================================================================
// LED
// =============================================================================

/// RGB triple as sent on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Set one LED to a fixed color
///
/// The device numbers its LEDs from 1; `led` holds the wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetLed {
    pub led: u8,
    pub color: Rgb,
}

impl SetLed {
    /// Build the command for a zero-based key index
    ///
    /// `None` if the index has no wire number (255).
    pub fn for_key(key_index: u8, color: Rgb) -> Option<Self> {
        let led = key_index.checked_add(1)?;
        Some(Self { led, color })
    }

    /// Zero-based key index this command targets, `None` for LED 0
    pub fn key_index(&self) -> Option<u8> {
        self.led.checked_sub(1)
    }

    /// Parse a command body (no report ID)
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        if data.len() < COMMAND_SIZE {
            return Err(ParseError::TooShort {
                expected: COMMAND_SIZE,
                got: data.len(),
            });
        }
        if data[0] != Self::CLASS || data[1] != Self::SUBCOMMAND {
            return Err(ParseError::CommandMismatch {
                class: data[0],
                subcommand: data[1],
            });
        }
        if data[2] == 0 {
            return Err(ParseError::InvalidValue {
                field: "led",
                value: data[2],
            });
        }
        Ok(Self {
            led: data[2],
            color: Rgb::new(data[3], data[4], data[5]),
        })
    }

    /// Parse a framed output report (report ID + body)
    pub fn parse_report(report: &[u8]) -> Result<Self, ParseError> {
        if report.len() < REPORT_SIZE {
            return Err(ParseError::TooShort {
                expected: REPORT_SIZE,
                got: report.len(),
            });
        }
        Self::parse(&report[1..])
    }
}

impl HidCommand for SetLed {
    const CLASS: u8 = cmd::SPECIAL;
    const SUBCOMMAND: u8 = cmd::special::SET_LED;

    fn to_bytes(&self) -> [u8; COMMAND_SIZE] {
        [
            Self::CLASS,
            Self::SUBCOMMAND,
            self.led,
            self.color.r,
            self.color.g,
            self.color.b,
        ]
    }
}
