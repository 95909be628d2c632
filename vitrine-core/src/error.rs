//! Error types for the widget and configuration layers

use vitrine_display::DisplayError;
use vitrine_image::ImageError;

/// Code reported for a display failure during a draw
pub const CODE_HARDWARE: u8 = 7;

/// Errors from [`crate::ImageWidget::draw`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DrawError {
    /// The frame could not be made resident
    Image(ImageError),
    /// The surface failed to put pixels on the panel
    Hardware(DisplayError),
}

impl DrawError {
    /// Integer code: the image error's code, or [`CODE_HARDWARE`]
    pub fn code(self) -> u8 {
        match self {
            DrawError::Image(e) => e.code(),
            DrawError::Hardware(_) => CODE_HARDWARE,
        }
    }
}

impl From<ImageError> for DrawError {
    fn from(e: ImageError) -> Self {
        DrawError::Image(e)
    }
}

impl From<DisplayError> for DrawError {
    fn from(e: DisplayError) -> Self {
        DrawError::Hardware(e)
    }
}

/// Configuration loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML parsing failed
    TomlParse,
    /// Binary form could not be decoded
    Deserialize,
    /// Binary form could not be encoded
    Serialize,
    /// A value is out of range
    Invalid,
}
