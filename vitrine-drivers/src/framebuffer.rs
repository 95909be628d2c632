//! In-RAM framebuffer adapter
//!
//! Stores pixels in the packed native representation of its format, the
//! same bytes a panel would receive, so simulations exercise the codec
//! exactly as hardware would. The advertised primitive set is chosen by
//! the caller; primitives outside it answer `Unsupported`.

use alloc::vec;
use alloc::vec::Vec;

use vitrine_hal::{
    AdapterError, Color, Control, DisplayAdapter, DriverCapabilities, Orientation, PixelCodec,
    PixelFormat, PowerMode, Primitive, PrimitiveSet, Unpacker,
};

/// Number of primitive calls served, per primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Counters {
    pub pixels: u32,
    pub fills: u32,
    pub blocks: u32,
    pub stream_writes: u32,
    pub controls: u32,
}

/// Open stream window and the next pixel position inside it
#[derive(Debug, Clone, Copy)]
struct Window {
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

/// RAM-backed display adapter
pub struct Framebuffer {
    caps: DriverCapabilities,
    codec: PixelCodec,
    width: u16,
    height: u16,
    data: Vec<u8>,
    window: Option<Window>,
    pending: Vec<u8>,
    counters: Counters,
    power: PowerMode,
    orientation: Orientation,
    contrast: u8,
    inverted: bool,
}

impl Framebuffer {
    /// Create a blank framebuffer
    pub fn new(primitives: PrimitiveSet, format: PixelFormat, width: u16, height: u16) -> Self {
        let len = format.block_bytes(width as usize, height as usize);
        Self {
            caps: DriverCapabilities::new("framebuffer", format, primitives),
            codec: PixelCodec::new(format),
            width,
            height,
            data: vec![0; len],
            window: None,
            pending: Vec::new(),
            counters: Counters::default(),
            power: PowerMode::On,
            orientation: Orientation::Deg0,
            contrast: 50,
            inverted: false,
        }
    }

    /// Raw packed contents, row-major
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Native value at (`x`, `y`)
    pub fn native(&self, x: u16, y: u16) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.codec.bit_offset(self.width as usize, x as usize, y as usize);
        self.codec.read_native(&self.data, offset)
    }

    /// Color at (`x`, `y`) after conversion back from the native value
    pub fn color(&self, x: u16, y: u16) -> Option<Color> {
        self.native(x, y).map(|n| self.codec.from_native(n))
    }

    /// Primitive call counts since creation or the last reset
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Zero the primitive call counts
    pub fn reset_counters(&mut self) {
        self.counters = Counters::default();
    }

    pub fn power(&self) -> PowerMode {
        self.power
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    fn require(&self, primitive: Primitive) -> Result<(), AdapterError> {
        if self.caps.supports(primitive) {
            Ok(())
        } else {
            Err(AdapterError::Unsupported)
        }
    }

    fn check_area(&self, x: u16, y: u16, width: u16, height: u16) -> Result<(), AdapterError> {
        let right = x as u32 + width as u32;
        let bottom = y as u32 + height as u32;
        if right > self.width as u32 || bottom > self.height as u32 {
            return Err(AdapterError::OutOfBounds);
        }
        Ok(())
    }

    fn put(&mut self, x: u16, y: u16, native: u32) {
        let offset = self.codec.bit_offset(self.width as usize, x as usize, y as usize);
        self.codec.write_native(&mut self.data, offset, native);
    }

    fn unpack_into(&mut self, window: Window, bytes: &[u8]) {
        let mut reader = Unpacker::new(self.caps.format, bytes);
        for dy in 0..window.height {
            for dx in 0..window.width {
                match reader.next_native() {
                    Some(native) => self.put(window.x + dx, window.y + dy, native),
                    None => return,
                }
            }
            reader.end_line();
        }
    }
}

impl DisplayAdapter for Framebuffer {
    fn capabilities(&self) -> &DriverCapabilities {
        &self.caps
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn draw_pixel(&mut self, x: u16, y: u16, native: u32) -> Result<(), AdapterError> {
        self.require(Primitive::DrawPixel)?;
        self.check_area(x, y, 1, 1)?;
        self.put(x, y, native);
        self.counters.pixels += 1;
        Ok(())
    }

    fn fill_area(&mut self, x: u16, y: u16, width: u16, height: u16, native: u32) -> Result<(), AdapterError> {
        self.require(Primitive::FillArea)?;
        self.check_area(x, y, width, height)?;
        for dy in 0..height {
            for dx in 0..width {
                self.put(x + dx, y + dy, native);
            }
        }
        self.counters.fills += 1;
        Ok(())
    }

    fn block_transfer(&mut self, x: u16, y: u16, width: u16, height: u16, data: &[u8]) -> Result<(), AdapterError> {
        self.require(Primitive::BlockTransfer)?;
        self.check_area(x, y, width, height)?;
        if data.len() != self.caps.format.block_bytes(width as usize, height as usize) {
            return Err(AdapterError::DataLength);
        }
        self.unpack_into(Window { x, y, width, height }, data);
        self.counters.blocks += 1;
        Ok(())
    }

    fn stream_start(&mut self, x: u16, y: u16, width: u16, height: u16) -> Result<(), AdapterError> {
        self.require(Primitive::StreamWrite)?;
        self.check_area(x, y, width, height)?;
        self.window = Some(Window { x, y, width, height });
        self.pending.clear();
        Ok(())
    }

    fn stream_write(&mut self, data: &[u8]) -> Result<(), AdapterError> {
        self.require(Primitive::StreamWrite)?;
        if self.window.is_none() {
            return Err(AdapterError::OutOfBounds);
        }
        self.pending.extend_from_slice(data);
        self.counters.stream_writes += 1;
        Ok(())
    }

    fn stream_stop(&mut self) -> Result<(), AdapterError> {
        self.require(Primitive::StreamWrite)?;
        if let Some(window) = self.window.take() {
            let bytes = core::mem::take(&mut self.pending);
            self.unpack_into(window, &bytes);
        }
        Ok(())
    }

    fn control(&mut self, request: Control) -> Result<(), AdapterError> {
        self.require(Primitive::Control)?;
        match request {
            Control::Power(mode) => self.power = mode,
            Control::Orientation(orientation) => {
                if orientation.is_rotated() != self.orientation.is_rotated() {
                    // Width and height swap; the stored rows no longer line up
                    core::mem::swap(&mut self.width, &mut self.height);
                    let len = self
                        .caps
                        .format
                        .block_bytes(self.width as usize, self.height as usize);
                    self.data = vec![0; len];
                }
                self.orientation = orientation;
            }
            Control::Contrast(percent) => self.contrast = percent.min(100),
            Control::Invert(on) => self.inverted = on,
        }
        self.counters.controls += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_hal::ChannelLayout;

    fn all() -> PrimitiveSet {
        PrimitiveSet::of(&Primitive::ALL)
    }

    #[test]
    fn test_blank_and_sized() {
        let fb = Framebuffer::new(all(), PixelFormat::new(ChannelLayout::Rgb565), 4, 3);
        assert_eq!(fb.as_bytes().len(), 24);
        assert_eq!(fb.color(3, 2), Some(Color::BLACK));
        assert_eq!(fb.native(4, 0), None);
    }

    #[test]
    fn test_pixel_and_fill() {
        let mut fb = Framebuffer::new(all(), PixelFormat::new(ChannelLayout::Rgb888), 4, 4);
        fb.fill_area(1, 1, 2, 2, 0x123456).unwrap();
        fb.draw_pixel(0, 0, 0xFFFFFF).unwrap();
        assert_eq!(fb.native(1, 2), Some(0x123456));
        assert_eq!(fb.native(0, 1), Some(0));
        assert_eq!(fb.color(0, 0), Some(Color::WHITE));
        assert_eq!(
            fb.counters(),
            Counters {
                pixels: 1,
                fills: 1,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_unadvertised_primitive_rejected() {
        let mut fb = Framebuffer::new(
            PrimitiveSet::of(&[Primitive::DrawPixel]),
            PixelFormat::new(ChannelLayout::Gray8),
            2,
            2,
        );
        assert_eq!(fb.fill_area(0, 0, 1, 1, 1), Err(AdapterError::Unsupported));
        assert_eq!(fb.control(Control::Invert(true)), Err(AdapterError::Unsupported));
    }

    #[test]
    fn test_packed_mono_layout() {
        let format = PixelFormat::new(ChannelLayout::Mono1).with_packed_pixels(true);
        let mut fb = Framebuffer::new(all(), format, 10, 2);
        // Lines are padded to whole bytes
        assert_eq!(fb.as_bytes().len(), 4);
        fb.draw_pixel(9, 1, 1).unwrap();
        assert_eq!(fb.as_bytes(), &[0, 0, 0, 0x40]);
    }

    #[test]
    fn test_block_and_stream_agree() {
        let format = PixelFormat::new(ChannelLayout::Rgb444).with_packed_pixels(true);
        let data = [0xF0, 0x00, 0xF0];
        let mut a = Framebuffer::new(all(), format, 2, 1);
        a.block_transfer(0, 0, 2, 1, &data).unwrap();

        let mut b = Framebuffer::new(all(), format, 2, 1);
        b.stream_start(0, 0, 2, 1).unwrap();
        b.stream_write(&data[..2]).unwrap();
        b.stream_write(&data[2..]).unwrap();
        b.stream_stop().unwrap();

        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(a.native(0, 0), Some(0xF00));
        assert_eq!(a.native(1, 0), Some(0x0F0));
    }

    #[test]
    fn test_block_length_checked() {
        let mut fb = Framebuffer::new(all(), PixelFormat::new(ChannelLayout::Rgb565), 4, 4);
        assert_eq!(
            fb.block_transfer(0, 0, 2, 2, &[0; 6]),
            Err(AdapterError::DataLength)
        );
        assert_eq!(
            fb.block_transfer(3, 3, 2, 1, &[0; 4]),
            Err(AdapterError::OutOfBounds)
        );
    }

    #[test]
    fn test_rotation_swaps_size() {
        let mut fb = Framebuffer::new(all(), PixelFormat::new(ChannelLayout::Gray8), 8, 4);
        fb.control(Control::Orientation(Orientation::Deg90)).unwrap();
        assert_eq!(fb.size(), (4, 8));
        fb.control(Control::Orientation(Orientation::Deg270)).unwrap();
        assert_eq!(fb.size(), (4, 8));
        fb.control(Control::Orientation(Orientation::Deg0)).unwrap();
        assert_eq!(fb.size(), (8, 4));
    }
}
