//! Pixel codec
//!
//! Pure conversion between [`Color`] and a native pixel value, plus bit
//! packing of native values into the byte stream an adapter expects.
//!
//! Conversion rules:
//! - Going to a narrower format truncates each channel (drops low bits).
//!   No rounding, so the same color always yields the same bits.
//! - Going back to [`Color`] replicates the high bits into the low bits,
//!   so full-scale native values map to full-scale colors.
//! - `to_native(from_native(x)) == x` for every native value `x`.
//!
//! Bit packing is MSB-first: the first pixel lands in the high bits of
//! the first byte.

use crate::color::Color;
use crate::format::{ChannelLayout, PixelFormat};

/// Widen an `bits`-wide channel to 8 bits by bit replication
const fn expand(value: u32, bits: u32) -> u8 {
    let value = value & ((1 << bits) - 1);
    let mut out = 0u32;
    let mut shift = 8 - bits as i32;
    while shift > -(bits as i32) {
        if shift >= 0 {
            out |= value << shift;
        } else {
            out |= value >> -shift;
        }
        shift -= bits as i32;
    }
    out as u8
}

/// Narrow an 8-bit channel to its top `bits` bits
const fn truncate(channel: u8, bits: u32) -> u32 {
    (channel as u32) >> (8 - bits)
}

/// Convert a canonical color to the native value of `layout`
pub const fn to_native(color: Color, layout: ChannelLayout) -> u32 {
    let (r, g, b) = (color.r(), color.g(), color.b());
    match layout {
        ChannelLayout::Mono1 => (color.luma() >= 0x80) as u32,
        ChannelLayout::Gray8 => color.luma() as u32,
        ChannelLayout::Rgb332 => (truncate(r, 3) << 5) | (truncate(g, 3) << 2) | truncate(b, 2),
        ChannelLayout::Rgb444 => (truncate(r, 4) << 8) | (truncate(g, 4) << 4) | truncate(b, 4),
        ChannelLayout::Rgb565 => (truncate(r, 5) << 11) | (truncate(g, 6) << 5) | truncate(b, 5),
        ChannelLayout::Bgr565 => (truncate(b, 5) << 11) | (truncate(g, 6) << 5) | truncate(r, 5),
        ChannelLayout::Rgb888 => color.raw(),
    }
}

/// Convert a native value of `layout` to a canonical color
///
/// Bits outside the layout's width are ignored.
pub const fn from_native(bits: u32, layout: ChannelLayout) -> Color {
    let v = bits & layout.mask();
    match layout {
        ChannelLayout::Mono1 => {
            if v != 0 {
                Color::WHITE
            } else {
                Color::BLACK
            }
        }
        ChannelLayout::Gray8 => Color::rgb(v as u8, v as u8, v as u8),
        ChannelLayout::Rgb332 => Color::rgb(expand(v >> 5, 3), expand(v >> 2, 3), expand(v, 2)),
        ChannelLayout::Rgb444 => Color::rgb(expand(v >> 8, 4), expand(v >> 4, 4), expand(v, 4)),
        ChannelLayout::Rgb565 => Color::rgb(expand(v >> 11, 5), expand(v >> 5, 6), expand(v, 5)),
        ChannelLayout::Bgr565 => Color::rgb(expand(v, 5), expand(v >> 5, 6), expand(v >> 11, 5)),
        ChannelLayout::Rgb888 => Color::from_raw(v),
    }
}

/// Color conversion and packing for one native pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelCodec {
    format: PixelFormat,
}

impl PixelCodec {
    /// Create a codec for the given format
    pub const fn new(format: PixelFormat) -> Self {
        Self { format }
    }

    /// The format this codec packs for
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Convert a color to this format's native value
    pub const fn to_native(&self, color: Color) -> u32 {
        to_native(color, self.format.layout)
    }

    /// Convert a native value of this format to a color
    pub const fn from_native(&self, bits: u32) -> Color {
        from_native(bits, self.format.layout)
    }

    /// Start a new packed byte stream
    pub fn packer(&self) -> Packer {
        Packer::new(self.format)
    }

    /// Pack a `width` x `height` block into `out`
    ///
    /// `pixel(x, y)` supplies each color in row-major order. Returns the
    /// number of bytes written, or `None` if `out` is shorter than
    /// [`PixelFormat::block_bytes`].
    pub fn encode_block<F>(&self, width: usize, height: usize, mut pixel: F, out: &mut [u8]) -> Option<usize>
    where
        F: FnMut(usize, usize) -> Color,
    {
        let needed = self.format.block_bytes(width, height);
        let out = out.get_mut(..needed)?;
        let mut packer = self.packer();
        let mut pos = 0;
        for y in 0..height {
            for x in 0..width {
                pos += packer.push(self.to_native(pixel(x, y)), &mut out[pos..]);
            }
            pos += packer.end_line(&mut out[pos..]);
        }
        pos += packer.finish(&mut out[pos..]);
        Some(pos)
    }

    /// Pack a single line of colors into `out`
    pub fn encode_row(&self, colors: &[Color], out: &mut [u8]) -> Option<usize> {
        self.encode_block(colors.len(), 1, |x, _| colors[x], out)
    }

    /// Bit offset of pixel (`x`, `y`) in a block `width` pixels wide
    pub const fn bit_offset(&self, width: usize, x: usize, y: usize) -> usize {
        let slot = self.format.slot_bits() as usize;
        if self.format.packed_lines {
            (y * width + x) * slot
        } else {
            y * self.format.line_bytes(width) * 8 + x * slot
        }
    }

    /// Read the native value whose slot starts at `bit_offset`
    pub fn read_native(&self, data: &[u8], bit_offset: usize) -> Option<u32> {
        let slot = self.format.slot_bits() as usize;
        let mut value = 0u32;
        for i in 0..slot {
            let bit = bit_offset + i;
            let byte = *data.get(bit / 8)?;
            value = (value << 1) | ((byte >> (7 - bit % 8)) & 1) as u32;
        }
        Some(value & self.format.layout.mask())
    }

    /// Write a native value into the slot starting at `bit_offset`
    ///
    /// Returns `false` (and writes nothing) if the slot runs past `data`.
    pub fn write_native(&self, data: &mut [u8], bit_offset: usize, native: u32) -> bool {
        let slot = self.format.slot_bits() as usize;
        if (bit_offset + slot + 7) / 8 > data.len() {
            return false;
        }
        let value = native & self.format.layout.mask();
        for i in 0..slot {
            let bit = bit_offset + i;
            let mask = 1u8 << (7 - bit % 8);
            if (value >> (slot - 1 - i)) & 1 != 0 {
                data[bit / 8] |= mask;
            } else {
                data[bit / 8] &= !mask;
            }
        }
        true
    }
}

/// Incremental MSB-first bit packer
///
/// Carries partial bytes between calls so a long run of pixels can be
/// emitted through a small scratch buffer in several pieces. Each `push`
/// writes at most [`Packer::MAX_EMIT`] bytes to the front of `out`.
#[derive(Debug, Clone)]
pub struct Packer {
    slot_bits: u32,
    mask: u32,
    packed_lines: bool,
    acc: u32,
    pending: u32,
}

impl Packer {
    /// Upper bound of bytes a single `push` can emit
    pub const MAX_EMIT: usize = 4;

    /// Create a packer for the given format
    pub const fn new(format: PixelFormat) -> Self {
        Self {
            slot_bits: format.slot_bits(),
            mask: format.layout.mask(),
            packed_lines: format.packed_lines,
            acc: 0,
            pending: 0,
        }
    }

    /// Whether a partial byte is waiting for more bits
    pub const fn has_pending(&self) -> bool {
        self.pending > 0
    }

    /// Append one native value; returns the number of bytes completed
    pub fn push(&mut self, native: u32, out: &mut [u8]) -> usize {
        self.acc = (self.acc << self.slot_bits) | (native & self.mask);
        self.pending += self.slot_bits;

        let mut n = 0;
        while self.pending >= 8 {
            self.pending -= 8;
            out[n] = (self.acc >> self.pending) as u8;
            n += 1;
        }
        self.acc &= (1 << self.pending) - 1;
        n
    }

    /// Mark the end of a line
    ///
    /// Pads to a byte boundary unless lines are packed.
    pub fn end_line(&mut self, out: &mut [u8]) -> usize {
        if self.packed_lines {
            0
        } else {
            self.finish(out)
        }
    }

    /// Flush any partial byte, zero-padding the low bits
    pub fn finish(&mut self, out: &mut [u8]) -> usize {
        if self.pending == 0 {
            return 0;
        }
        out[0] = (self.acc << (8 - self.pending)) as u8;
        self.acc = 0;
        self.pending = 0;
        1
    }
}

/// Incremental MSB-first bit reader, the inverse of [`Packer`]
#[derive(Debug, Clone)]
pub struct Unpacker<'a> {
    data: &'a [u8],
    pos: usize,
    slot_bits: u32,
    mask: u32,
    packed_lines: bool,
    acc: u32,
    pending: u32,
}

impl<'a> Unpacker<'a> {
    /// Read native values of `format` from `data`
    pub fn new(format: PixelFormat, data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            slot_bits: format.slot_bits(),
            mask: format.layout.mask(),
            packed_lines: format.packed_lines,
            acc: 0,
            pending: 0,
        }
    }

    /// Next native value, or `None` once the data runs out
    pub fn next_native(&mut self) -> Option<u32> {
        while self.pending < self.slot_bits {
            let byte = *self.data.get(self.pos)?;
            self.pos += 1;
            self.acc = (self.acc << 8) | byte as u32;
            self.pending += 8;
        }
        self.pending -= self.slot_bits;
        let value = (self.acc >> self.pending) & self.mask;
        self.acc &= (1 << self.pending) - 1;
        Some(value)
    }

    /// Skip the padding at the end of a line
    pub fn end_line(&mut self) {
        if !self.packed_lines {
            self.acc = 0;
            self.pending = 0;
        }
    }
}
