//! Canonical color type
//!
//! Every layer above the adapter works in [`Color`], a format-independent
//! 24-bit RGB value. Conversion to the adapter's native bits happens in
//! [`crate::codec`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single pixel in canonical RGB888 form (`0x00RRGGBB`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Color(u32);

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0xFF, 0x00);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xFF);
    pub const YELLOW: Color = Color::rgb(0xFF, 0xFF, 0x00);
    pub const CYAN: Color = Color::rgb(0x00, 0xFF, 0xFF);
    pub const MAGENTA: Color = Color::rgb(0xFF, 0x00, 0xFF);
    pub const GRAY: Color = Color::rgb(0x80, 0x80, 0x80);

    /// Build a color from its 8-bit channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Build a color from a `0xRRGGBB` value
    ///
    /// Bits above the low 24 are discarded.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw & 0x00FF_FFFF)
    }

    /// The `0x00RRGGBB` value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Red channel
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green channel
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue channel
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Perceptual luminance (0-255)
    ///
    /// Weights sum to 256, so gray inputs map to themselves exactly.
    pub const fn luma(self) -> u8 {
        ((self.r() as u32 * 77 + self.g() as u32 * 150 + self.b() as u32 * 29) >> 8) as u8
    }
}

impl From<u32> for Color {
    fn from(raw: u32) -> Self {
        Color::from_raw(raw)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.raw()
    }
}
