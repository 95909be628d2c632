//! Configuration
//!
//! The text form is TOML (`toml` feature):
//!
//! ```toml
//! [display]
//! driver = "Nokia6610GE8"
//! layout = "Rgb444"
//! packed_pixels = true
//!
//! [image]
//! background = 0x00FF00
//! max_width = 130
//! ```
//!
//! Missing keys take their defaults. The binary form stored in flash is
//! postcard.

mod types;

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

pub use types::{DisplayConfig, ImageConfig, GE8_DRIVER, MAX_NAME_LEN};

use crate::error::ConfigError;

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(default)]
pub struct VitrineConfig {
    pub display: DisplayConfig,
    pub image: ImageConfig,
}

impl VitrineConfig {
    /// Parse and validate TOML text
    #[cfg(feature = "toml")]
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|_| {
            warn!("config TOML rejected");
            ConfigError::TomlParse
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Decode and validate the postcard form
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }

    /// Encode as postcard
    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|_| ConfigError::Serialize)
    }

    /// Check value ranges and that the display settings fit the driver
    pub fn validate(&self) -> Result<(), ConfigError> {
        let display = &self.display;
        let image = &self.image;
        if display.contrast > 100 {
            return Err(ConfigError::Invalid);
        }
        display.ge8()?;
        if image.max_width == 0 || image.max_height == 0 || image.max_pixels == 0 {
            return Err(ConfigError::Invalid);
        }
        Ok(())
    }
}
