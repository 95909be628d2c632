//! Decoded frames

use alloc::vec::Vec;

use vitrine_hal::Color;

use crate::error::ImageError;

/// How transparency is recorded for a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transparency {
    /// Every pixel is opaque
    Opaque,
    /// One bit per pixel, row-major, MSB first; set means transparent
    Mask(Vec<u8>),
}

/// A frame in canonical color units
///
/// Frames are only handed out fully decoded: a decoder either returns a
/// complete frame or an error, never a partially filled one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    width: u16,
    height: u16,
    pixels: Vec<Color>,
    transparency: Transparency,
}

impl DecodedFrame {
    /// Allocate a frame filled with black
    ///
    /// With `transparent` set, a mask is allocated too (all pixels start
    /// opaque). Allocation failure is [`ImageError::OutOfMemory`].
    pub fn new(width: u16, height: u16, transparent: bool) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::BadDimensions);
        }
        let count = width as usize * height as usize;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(count)
            .map_err(|_| ImageError::OutOfMemory)?;
        pixels.resize(count, Color::BLACK);

        let transparency = if transparent {
            let mut mask = Vec::new();
            mask.try_reserve_exact(count.div_ceil(8))
                .map_err(|_| ImageError::OutOfMemory)?;
            mask.resize(count.div_ceil(8), 0);
            Transparency::Mask(mask)
        } else {
            Transparency::Opaque
        };

        Ok(Self {
            width,
            height,
            pixels,
            transparency,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Row-major pixels; transparent pixels hold whatever the decoder
    /// stored (usually black)
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn transparency(&self) -> &Transparency {
        &self.transparency
    }

    /// Whether any pixel can be transparent
    pub fn has_transparency(&self) -> bool {
        matches!(self.transparency, Transparency::Mask(_))
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Color at (`x`, `y`), or `None` if the pixel is transparent or
    /// outside the frame
    pub fn get(&self, x: u16, y: u16) -> Option<Color> {
        let i = self.index(x, y)?;
        match &self.transparency {
            Transparency::Mask(mask) if mask[i / 8] & (0x80 >> (i % 8)) != 0 => None,
            _ => Some(self.pixels[i]),
        }
    }

    /// Whether the pixel at (`x`, `y`) is transparent
    pub fn is_transparent(&self, x: u16, y: u16) -> bool {
        self.index(x, y).is_some() && self.get(x, y).is_none()
    }

    /// Color at (`x`, `y`) with transparent pixels replaced by `background`
    pub fn composite(&self, x: u16, y: u16, background: Color) -> Color {
        self.get(x, y).unwrap_or(background)
    }

    /// Store an opaque color
    pub fn set(&mut self, x: u16, y: u16, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
            if let Transparency::Mask(mask) = &mut self.transparency {
                mask[i / 8] &= !(0x80 >> (i % 8));
            }
        }
    }

    /// Mark a pixel transparent; frames without a mask ignore this
    pub fn set_transparent(&mut self, x: u16, y: u16) {
        if let Some(i) = self.index(x, y) {
            if let Transparency::Mask(mask) = &mut self.transparency {
                mask[i / 8] |= 0x80 >> (i % 8);
            }
        }
    }
}
