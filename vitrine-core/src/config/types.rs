//! Configuration types

use heapless::String;
use serde::{Deserialize, Serialize};
use vitrine_drivers::Ge8Config;
use vitrine_hal::{ChannelLayout, Color, Orientation, PixelFormat};
use vitrine_image::DecodeLimits;

use crate::error::ConfigError;

/// Maximum driver name length
pub const MAX_NAME_LEN: usize = 24;

/// Driver name selecting the Nokia 6610 GE8 adapter
pub const GE8_DRIVER: &str = Ge8Config::DEFAULT.capabilities().name;

/// Panel and adapter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct DisplayConfig {
    /// Driver name (e.g. "Nokia6610GE8")
    pub driver: String<MAX_NAME_LEN>,
    /// Native channel layout
    pub layout: ChannelLayout,
    /// Consecutive pixels share bytes
    pub packed_pixels: bool,
    /// Lines continue in the byte the previous line ended in
    pub packed_lines: bool,
    /// Adapter exposes orientation control and windowed primitives
    pub orientation_control: bool,
    /// Orientation applied after init
    pub orientation: Orientation,
    /// Contrast (0-100%)
    pub contrast: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let mut driver = String::new();
        // Fits MAX_NAME_LEN
        let _ = driver.push_str(GE8_DRIVER);
        Self {
            driver,
            layout: ChannelLayout::Rgb444,
            packed_pixels: false,
            packed_lines: false,
            orientation_control: true,
            orientation: Orientation::Deg0,
            contrast: 50,
        }
    }
}

impl DisplayConfig {
    /// Native pixel format described by this config
    pub fn format(&self) -> PixelFormat {
        PixelFormat::new(self.layout)
            .with_packed_pixels(self.packed_pixels)
            .with_packed_lines(self.packed_lines)
    }

    /// Settings for the Nokia 6610 GE8 adapter
    ///
    /// Fails with [`ConfigError::Invalid`] if the config names another
    /// driver or a layout the panel cannot take.
    pub fn ge8(&self) -> Result<Ge8Config, ConfigError> {
        if self.driver.as_str() != GE8_DRIVER {
            return Err(ConfigError::Invalid);
        }
        let config = Ge8Config {
            orientation_control: self.orientation_control,
            packed_pixels: self.packed_pixels,
            packed_lines: self.packed_lines,
            contrast: self.contrast,
        };
        if config.format() != self.format() {
            return Err(ConfigError::Invalid);
        }
        Ok(config)
    }
}

/// Image decoding and widget defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct ImageConfig {
    /// Background for transparent and uncovered pixels
    pub background: Color,
    pub max_width: u16,
    pub max_height: u16,
    /// Bound on width x height of a decoded frame
    pub max_pixels: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        let limits = DecodeLimits::default();
        Self {
            background: Color::BLACK,
            max_width: limits.max_width,
            max_height: limits.max_height,
            max_pixels: limits.max_pixels,
        }
    }
}

impl ImageConfig {
    /// Decode limits described by this config
    pub fn limits(&self) -> DecodeLimits {
        DecodeLimits {
            max_width: self.max_width,
            max_height: self.max_height,
            max_pixels: self.max_pixels,
        }
    }
}
