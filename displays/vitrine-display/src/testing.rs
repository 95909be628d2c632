//! Recording adapter shared by the unit tests

use vitrine_hal::{
    AdapterError, ChannelLayout, Control, DisplayAdapter, DriverCapabilities, PixelFormat,
    Primitive, PrimitiveSet, Unpacker,
};

use crate::geom::Rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Pixel { x: u16, y: u16, native: u32 },
    Fill { rect: Rect, native: u32 },
    Block { rect: Rect, len: usize },
    StreamStart { rect: Rect },
    StreamWrite { len: usize },
    StreamStop,
    Control(Control),
}

/// Adapter that logs every primitive and models the panel contents
///
/// Primitives outside `caps` answer `Unsupported`, so a wrong route shows
/// up as a test failure instead of silently working.
pub struct Recorder {
    pub caps: DriverCapabilities,
    pub width: u16,
    pub height: u16,
    pub ops: Vec<Op>,
    pub pixels: Vec<Option<u32>>,
    pub writes: Vec<u32>,
    /// Fail every primitive with `Bus` once this many ops were logged
    pub fail_after: Option<usize>,
    window: Option<(Rect, Vec<u8>)>,
}

impl Recorder {
    pub fn new(primitives: &[Primitive], format: PixelFormat, width: u16, height: u16) -> Self {
        let count = width as usize * height as usize;
        Self {
            caps: DriverCapabilities::new("recorder", format, PrimitiveSet::of(primitives)),
            width,
            height,
            ops: Vec::new(),
            pixels: vec![None; count],
            writes: vec![0; count],
            fail_after: None,
            window: None,
        }
    }

    pub fn rgb888(primitives: &[Primitive], width: u16, height: u16) -> Self {
        Self::new(primitives, PixelFormat::new(ChannelLayout::Rgb888), width, height)
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<u32> {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    fn log(&mut self, primitive: Primitive, op: Op) -> Result<(), AdapterError> {
        if !self.caps.supports(primitive) {
            return Err(AdapterError::Unsupported);
        }
        if let Some(limit) = self.fail_after {
            if self.ops.len() >= limit {
                return Err(AdapterError::Bus);
            }
        }
        self.ops.push(op);
        Ok(())
    }

    fn put(&mut self, x: u16, y: u16, native: u32) {
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = Some(native);
        self.writes[idx] += 1;
    }

    fn unpack(&mut self, rect: Rect, data: &[u8]) {
        let mut reader = Unpacker::new(self.caps.format, data);
        for y in 0..rect.height {
            for x in 0..rect.width {
                if let Some(native) = reader.next_native() {
                    self.put(rect.x + x, rect.y + y, native);
                }
            }
            reader.end_line();
        }
    }
}

impl DisplayAdapter for Recorder {
    fn capabilities(&self) -> &DriverCapabilities {
        &self.caps
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn draw_pixel(&mut self, x: u16, y: u16, native: u32) -> Result<(), AdapterError> {
        self.log(Primitive::DrawPixel, Op::Pixel { x, y, native })?;
        self.put(x, y, native);
        Ok(())
    }

    fn fill_area(&mut self, x: u16, y: u16, width: u16, height: u16, native: u32) -> Result<(), AdapterError> {
        let rect = Rect::new(x, y, width, height);
        self.log(Primitive::FillArea, Op::Fill { rect, native })?;
        for dy in 0..height {
            for dx in 0..width {
                self.put(x + dx, y + dy, native);
            }
        }
        Ok(())
    }

    fn block_transfer(&mut self, x: u16, y: u16, width: u16, height: u16, data: &[u8]) -> Result<(), AdapterError> {
        let rect = Rect::new(x, y, width, height);
        self.log(Primitive::BlockTransfer, Op::Block { rect, len: data.len() })?;
        if data.len() != self.caps.format.block_bytes(width as usize, height as usize) {
            return Err(AdapterError::DataLength);
        }
        self.unpack(rect, data);
        Ok(())
    }

    fn stream_start(&mut self, x: u16, y: u16, width: u16, height: u16) -> Result<(), AdapterError> {
        let rect = Rect::new(x, y, width, height);
        self.log(Primitive::StreamWrite, Op::StreamStart { rect })?;
        self.window = Some((rect, Vec::new()));
        Ok(())
    }

    fn stream_write(&mut self, data: &[u8]) -> Result<(), AdapterError> {
        self.log(Primitive::StreamWrite, Op::StreamWrite { len: data.len() })?;
        match self.window.as_mut() {
            Some((_, bytes)) => {
                bytes.extend_from_slice(data);
                Ok(())
            }
            None => Err(AdapterError::OutOfBounds),
        }
    }

    fn stream_stop(&mut self) -> Result<(), AdapterError> {
        self.log(Primitive::StreamWrite, Op::StreamStop)?;
        if let Some((rect, bytes)) = self.window.take() {
            self.unpack(rect, &bytes);
        }
        Ok(())
    }

    fn control(&mut self, request: Control) -> Result<(), AdapterError> {
        self.log(Primitive::Control, Op::Control(request))
    }
}
