//! Native pixel format descriptors
//!
//! A [`PixelFormat`] tells the codec how many bits a pixel occupies on the
//! wire, how the channels are laid out inside those bits, and whether
//! pixels and lines are packed or padded to byte boundaries.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Channel layout of a native pixel
///
/// Bits are listed most significant first, so `Rgb444` is `RRRRGGGGBBBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ChannelLayout {
    /// 1-bit monochrome, set bit is white
    Mono1 = 1,
    /// 8-bit grayscale
    Gray8 = 2,
    /// 8-bit `RRRGGGBB`
    Rgb332 = 3,
    /// 12-bit `RRRRGGGGBBBB`
    Rgb444 = 4,
    /// 16-bit `RRRRRGGGGGGBBBBB`
    Rgb565 = 5,
    /// 16-bit `BBBBBGGGGGGRRRRR`
    Bgr565 = 6,
    /// 24-bit `RRRRRRRRGGGGGGGGBBBBBBBB`
    Rgb888 = 7,
}

impl ChannelLayout {
    /// All layouts, in code order
    pub const ALL: [ChannelLayout; 7] = [
        ChannelLayout::Mono1,
        ChannelLayout::Gray8,
        ChannelLayout::Rgb332,
        ChannelLayout::Rgb444,
        ChannelLayout::Rgb565,
        ChannelLayout::Bgr565,
        ChannelLayout::Rgb888,
    ];

    /// Significant bits per pixel
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            ChannelLayout::Mono1 => 1,
            ChannelLayout::Gray8 | ChannelLayout::Rgb332 => 8,
            ChannelLayout::Rgb444 => 12,
            ChannelLayout::Rgb565 | ChannelLayout::Bgr565 => 16,
            ChannelLayout::Rgb888 => 24,
        }
    }

    /// Mask covering the significant bits of a native value
    pub const fn mask(self) -> u32 {
        (1u32 << self.bits_per_pixel()) - 1
    }

    /// Get the layout as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a layout from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(ChannelLayout::Mono1),
            2 => Some(ChannelLayout::Gray8),
            3 => Some(ChannelLayout::Rgb332),
            4 => Some(ChannelLayout::Rgb444),
            5 => Some(ChannelLayout::Rgb565),
            6 => Some(ChannelLayout::Bgr565),
            7 => Some(ChannelLayout::Rgb888),
            _ => None,
        }
    }
}

/// Pixel format descriptor for a display adapter
///
/// - `packed_pixels = true`: consecutive pixels share bytes, no padding
///   between them. `false`: each pixel starts on a byte boundary and is
///   right-aligned in the smallest whole number of bytes.
/// - `packed_lines = true`: a new line continues in the same byte as the
///   previous one ended. `false`: every line starts on a byte boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelFormat {
    /// Channel layout of a single pixel
    pub layout: ChannelLayout,
    /// Pixels share byte boundaries
    pub packed_pixels: bool,
    /// Lines share byte boundaries
    pub packed_lines: bool,
}

impl PixelFormat {
    /// Byte-aligned pixels and lines
    pub const fn new(layout: ChannelLayout) -> Self {
        Self {
            layout,
            packed_pixels: false,
            packed_lines: false,
        }
    }

    /// Same layout with pixel packing set
    pub const fn with_packed_pixels(mut self, packed: bool) -> Self {
        self.packed_pixels = packed;
        self
    }

    /// Same layout with line packing set
    pub const fn with_packed_lines(mut self, packed: bool) -> Self {
        self.packed_lines = packed;
        self
    }

    /// Significant bits per pixel
    pub const fn bits_per_pixel(&self) -> u32 {
        self.layout.bits_per_pixel()
    }

    /// Bits one pixel occupies in the byte stream (including padding)
    pub const fn slot_bits(&self) -> u32 {
        let bpp = self.layout.bits_per_pixel();
        if self.packed_pixels {
            bpp
        } else {
            (bpp + 7) / 8 * 8
        }
    }

    /// Bytes needed for one line of `width` pixels
    ///
    /// With packed lines this is the rounded-up size of the line on its
    /// own; a run of lines can be shorter than `height * line_bytes`.
    pub const fn line_bytes(&self, width: usize) -> usize {
        (width * self.slot_bits() as usize + 7) / 8
    }

    /// Bytes needed for a `width` x `height` block
    pub const fn block_bytes(&self, width: usize, height: usize) -> usize {
        if self.packed_lines {
            (width * height * self.slot_bits() as usize + 7) / 8
        } else {
            self.line_bytes(width) * height
        }
    }
}
