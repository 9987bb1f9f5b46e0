//! RGBA colors and the conversions applied on the way to the device

use simpad_transport::Rgb;

/// Exponent of the sRGB -> linear approximation
pub const GAMMA: f32 = 2.2;

/// 8-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Create a color with explicit alpha
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Convert RGB from sRGB to linear space, keeping alpha
    ///
    /// Without this, mid-range colors look washed out on the LEDs.
    pub fn to_linear(self) -> LinearColor {
        LinearColor {
            r: srgb_to_linear(self.r),
            g: srgb_to_linear(self.g),
            b: srgb_to_linear(self.b),
            a: self.a,
        }
    }

    /// Parse a color string: "#RRGGBB", "#RRGGBBAA", "red", "green", etc.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(hex) = s.strip_prefix('#') {
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            return match hex.len() {
                6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
                8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
                _ => None,
            };
        }
        match s.to_ascii_lowercase().as_str() {
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            "yellow" => Some(Self::rgb(255, 255, 0)),
            "cyan" => Some(Self::rgb(0, 255, 255)),
            "magenta" | "pink" => Some(Self::rgb(255, 0, 255)),
            "white" => Some(Self::WHITE),
            "orange" => Some(Self::rgb(255, 165, 0)),
            "purple" => Some(Self::rgb(128, 0, 255)),
            "off" | "black" => Some(Self::BLACK),
            _ => None,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Color with linear-space RGB kept at full precision
///
/// Channels are on the 0..=255 scale but not yet quantized, so the only
/// rounding on the way to the device happens in `premultiplied`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: u8,
}

impl LinearColor {
    pub const WHITE: Self = Self {
        r: 255.0,
        g: 255.0,
        b: 255.0,
        a: 255,
    };

    /// Alpha as a factor in [0, 1]
    pub fn alpha(self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Same RGB with alpha multiplied by `factor`
    pub fn fade(self, factor: f32) -> Self {
        Self {
            a: unit_to_byte(self.alpha() * factor),
            ..self
        }
    }

    /// RGB scaled by this color's own alpha, rounded to bytes
    pub fn premultiplied(self) -> Rgb {
        let alpha = self.alpha();
        Rgb::new(
            quantize(self.r * alpha),
            quantize(self.g * alpha),
            quantize(self.b * alpha),
        )
    }

    /// Nearest 8-bit color, for display
    pub fn to_color(self) -> Color {
        Color::rgba(
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            self.a,
        )
    }
}

impl Default for LinearColor {
    fn default() -> Self {
        Self::WHITE
    }
}

fn unit_to_byte(v: f32) -> u8 {
    quantize(v.clamp(0.0, 1.0) * 255.0)
}

fn quantize(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn srgb_to_linear(c: u8) -> f32 {
    (c as f32 / 255.0).powf(GAMMA).clamp(0.0, 1.0) * 255.0
}
