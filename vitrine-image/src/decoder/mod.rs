//! Image decoders
//!
//! A decoder turns the bytes of an [`ImageSource`] into frame metadata
//! and, on request, one [`DecodedFrame`] at a time. The format is picked
//! by sniffing the first bytes of the source.
//!
//! | Signature | Format |
//! |-----------|--------|
//! | `BM` | [`BmpDecoder`] |
//! | `NI` | [`NativeDecoder`] |

mod bmp;
mod native;

use alloc::boxed::Box;

pub use bmp::BmpDecoder;
pub use native::NativeDecoder;

use crate::error::ImageError;
use crate::frame::DecodedFrame;
use crate::source::ImageSource;

/// Known image encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageFormat {
    Bmp,
    Native,
}

impl ImageFormat {
    /// Match a signature against the known formats
    pub fn from_signature(signature: &[u8]) -> Option<Self> {
        match signature.get(..2)? {
            b"BM" => Some(ImageFormat::Bmp),
            b"NI" => Some(ImageFormat::Native),
            _ => None,
        }
    }

    /// Sniff the format of `source`, leaving it positioned at the start
    ///
    /// Unknown signatures (and sources shorter than a signature) are
    /// [`ImageError::Unsupported`].
    pub fn detect(source: &mut ImageSource<'_>) -> Result<Self, ImageError> {
        source.seek(0)?;
        let mut signature = [0u8; 2];
        let n = source.read(&mut signature)?;
        source.seek(0)?;
        Self::from_signature(&signature[..n]).ok_or(ImageError::Unsupported)
    }

    /// A fresh decoder for this format
    pub fn decoder(self) -> Box<dyn ImageDecoder> {
        match self {
            ImageFormat::Bmp => Box::new(BmpDecoder::new()),
            ImageFormat::Native => Box::new(NativeDecoder::new()),
        }
    }
}

/// Frame metadata read from the image header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageHeader {
    pub width: u16,
    pub height: u16,
    pub frame_count: u16,
    pub has_transparency: bool,
}

/// Upper bounds checked before a frame buffer is allocated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeLimits {
    pub max_width: u16,
    pub max_height: u16,
    /// Bound on width x height
    pub max_pixels: u32,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_width: 1024,
            max_height: 1024,
            max_pixels: 256 * 1024,
        }
    }
}

impl DecodeLimits {
    /// Reject zero or oversized dimensions with [`ImageError::BadDimensions`]
    pub fn check(&self, width: u16, height: u16) -> Result<(), ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::BadDimensions);
        }
        if width > self.max_width
            || height > self.max_height
            || width as u32 * height as u32 > self.max_pixels
        {
            warn!("image {}x{} above decode limits", width, height);
            return Err(ImageError::BadDimensions);
        }
        Ok(())
    }
}

/// Decoder for one image encoding
///
/// Decoders may keep state parsed by [`ImageDecoder::read_header`]
/// (offsets, palettes) for later [`ImageDecoder::decode_frame`] calls on
/// the same source.
pub trait ImageDecoder {
    /// Encoding handled by this decoder
    fn format(&self) -> ImageFormat;

    /// Parse the header at the start of `source`
    ///
    /// Reads only as far as needed for the metadata.
    fn read_header(&mut self, source: &mut ImageSource<'_>) -> Result<ImageHeader, ImageError>;

    /// Decode frame `index`
    ///
    /// Dimensions are checked against `limits` before any pixel memory
    /// is allocated.
    fn decode_frame(
        &mut self,
        source: &mut ImageSource<'_>,
        index: u16,
        limits: &DecodeLimits,
    ) -> Result<DecodedFrame, ImageError>;
}
