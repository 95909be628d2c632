//! Drawing surface
//!
//! [`DisplaySurface`] owns an adapter and exposes uniform drawing
//! operations. Colors are converted to the adapter's native format once
//! per operation (once per pixel for blits), then routed according to
//! the [`DispatchTable`] resolved at construction.
//!
//! Rectangles are clipped to the panel. Pixel data that does not fit the
//! scratch buffer is sent in several chunks: bands of whole lines when a
//! line fits, otherwise line segments.

use vitrine_hal::{Color, Control, DisplayAdapter, DriverCapabilities, Packer, PixelCodec, Primitive};

use crate::dispatch::{BlitRoute, DispatchTable, FillRoute, PixelRoute};
use crate::error::DisplayError;
use crate::geom::Rect;

/// Default scratch buffer size in bytes
pub const DEFAULT_SCRATCH_BYTES: usize = 256;

/// Uniform drawing API over a [`DisplayAdapter`]
///
/// `SCRATCH` bounds the bytes handed to the adapter in one block
/// transfer or stream write.
pub struct DisplaySurface<A, const SCRATCH: usize = DEFAULT_SCRATCH_BYTES> {
    adapter: A,
    codec: PixelCodec,
    table: DispatchTable,
    scratch: [u8; SCRATCH],
}

impl<A: DisplayAdapter, const SCRATCH: usize> DisplaySurface<A, SCRATCH> {
    const SCRATCH_FITS: () = assert!(
        SCRATCH >= 2 * Packer::MAX_EMIT,
        "scratch buffer must hold at least two packed pixels"
    );

    /// Build a surface, resolving the dispatch table from the adapter's
    /// capabilities
    ///
    /// Fails with [`DisplayError::NoDrawingPrimitive`] if the adapter
    /// cannot put pixels on the panel at all.
    pub fn new(adapter: A) -> Result<Self, DisplayError> {
        #[allow(clippy::let_unit_value)]
        let () = Self::SCRATCH_FITS;

        let caps = *adapter.capabilities();
        let table = match DispatchTable::resolve(&caps) {
            Ok(table) => table,
            Err(e) => {
                warn!("adapter {} has no drawing primitive", caps.name);
                return Err(e);
            }
        };
        debug!(
            "surface on {}: pixel={} fill={} blit={}",
            caps.name,
            table.pixel,
            table.fill,
            table.blit
        );

        Ok(Self {
            adapter,
            codec: PixelCodec::new(caps.format),
            table,
            scratch: [0; SCRATCH],
        })
    }

    /// The adapter's capability descriptor
    pub fn capabilities(&self) -> &DriverCapabilities {
        self.adapter.capabilities()
    }

    /// The resolved routes
    pub fn dispatch(&self) -> DispatchTable {
        self.table
    }

    /// Codec for the adapter's native format
    pub fn codec(&self) -> PixelCodec {
        self.codec
    }

    /// Current panel size as (width, height)
    pub fn size(&self) -> (u16, u16) {
        self.adapter.size()
    }

    /// The whole panel as a rectangle
    pub fn bounds(&self) -> Rect {
        let (width, height) = self.adapter.size();
        Rect::with_size(width, height)
    }

    /// Borrow the adapter
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Mutably borrow the adapter
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// Give the adapter back
    pub fn release(self) -> A {
        self.adapter
    }

    /// Set a single pixel; pixels off the panel are ignored
    pub fn set_pixel(&mut self, x: u16, y: u16, color: Color) -> Result<(), DisplayError> {
        if !self.bounds().contains(x, y) {
            return Ok(());
        }
        let native = self.codec.to_native(color);
        self.put_native(x, y, native)
    }

    /// Fill a rectangle with one color
    pub fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), DisplayError> {
        let clip = rect.intersect(&self.bounds());
        if clip.is_empty() {
            return Ok(());
        }
        let native = self.codec.to_native(color);
        trace!("fill {} via {}", clip, self.table.fill);

        match self.table.fill {
            FillRoute::Native => {
                self.adapter
                    .fill_area(clip.x, clip.y, clip.width, clip.height, native)?;
            }
            FillRoute::Block => self.transfer_blocks(clip, false, |_, _| native)?,
            FillRoute::Stream => self.stream_window(clip, |_, _| native)?,
            FillRoute::Pixels => {
                for dy in 0..clip.height {
                    for dx in 0..clip.width {
                        self.put_native(clip.x + dx, clip.y + dy, native)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Fill the whole panel
    pub fn clear(&mut self, color: Color) -> Result<(), DisplayError> {
        self.fill_rect(self.bounds(), color)
    }

    /// Transfer a row-major pixel buffer into `rect`
    ///
    /// `pixels` must hold exactly `rect.area()` colors. Parts of `rect`
    /// off the panel are clipped.
    pub fn blit(&mut self, rect: Rect, pixels: &[Color]) -> Result<(), DisplayError> {
        if pixels.len() != rect.area() {
            return Err(DisplayError::BufferSize);
        }
        let width = rect.width as usize;
        self.blit_with(rect, |x, y| pixels[y * width + x])
    }

    /// Transfer pixels produced by `pixel(x, y)` into `rect`
    ///
    /// Coordinates passed to `pixel` are relative to `rect`. Only visible
    /// pixels are requested.
    pub fn blit_with<F>(&mut self, rect: Rect, mut pixel: F) -> Result<(), DisplayError>
    where
        F: FnMut(usize, usize) -> Color,
    {
        let clip = rect.intersect(&self.bounds());
        if clip.is_empty() {
            return Ok(());
        }
        let dx = (clip.x - rect.x) as usize;
        let dy = (clip.y - rect.y) as usize;
        let codec = self.codec;
        trace!("blit {} via {}", clip, self.table.blit);

        self.route_blit(clip, false, |x, y| codec.to_native(pixel(x + dx, y + dy)))
    }

    /// Stream a run of pixels into `rect`, row-major
    ///
    /// The iterator is consumed strictly in order, so the whole of `rect`
    /// must lie on the panel and the run must cover it exactly.
    pub fn write_pixels<I>(&mut self, rect: Rect, pixels: I) -> Result<(), DisplayError>
    where
        I: IntoIterator<Item = Color>,
        I::IntoIter: ExactSizeIterator,
    {
        if !self.bounds().contains_rect(&rect) {
            return Err(DisplayError::OutOfBounds);
        }
        let mut pixels = pixels.into_iter();
        if pixels.len() != rect.area() {
            return Err(DisplayError::BufferSize);
        }
        if rect.is_empty() {
            return Ok(());
        }
        let codec = self.codec;
        self.route_blit(rect, true, move |_, _| {
            codec.to_native(pixels.next().unwrap_or_default())
        })
    }

    /// Apply a control request
    pub fn control(&mut self, request: Control) -> Result<(), DisplayError> {
        if !self.capabilities().supports(Primitive::Control) {
            return Err(DisplayError::Unsupported);
        }
        debug!("control {}", request);
        self.adapter.control(request)?;
        Ok(())
    }

    fn put_native(&mut self, x: u16, y: u16, native: u32) -> Result<(), DisplayError> {
        match self.table.pixel {
            PixelRoute::Native => self.adapter.draw_pixel(x, y, native)?,
            PixelRoute::Fill => self.adapter.fill_area(x, y, 1, 1, native)?,
            PixelRoute::Block => {
                let len = self.pack_one(native);
                self.adapter.block_transfer(x, y, 1, 1, &self.scratch[..len])?;
            }
            PixelRoute::Stream => {
                let len = self.pack_one(native);
                self.adapter.stream_start(x, y, 1, 1)?;
                let written = self.adapter.stream_write(&self.scratch[..len]);
                let stopped = self.adapter.stream_stop();
                written?;
                stopped?;
            }
        }
        Ok(())
    }

    fn pack_one(&mut self, native: u32) -> usize {
        let mut packer = self.codec.packer();
        let mut len = packer.push(native, &mut self.scratch);
        len += packer.finish(&mut self.scratch[len..]);
        len
    }

    fn route_blit<F>(&mut self, clip: Rect, sequential: bool, mut native: F) -> Result<(), DisplayError>
    where
        F: FnMut(usize, usize) -> u32,
    {
        match self.table.blit {
            BlitRoute::Block => self.transfer_blocks(clip, sequential, native),
            BlitRoute::Stream => self.stream_window(clip, native),
            BlitRoute::Pixels => {
                for y in 0..clip.height {
                    for x in 0..clip.width {
                        let value = native(x as usize, y as usize);
                        self.put_native(clip.x + x, clip.y + y, value)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Chunk shape for block transfers of a `width` x `height` area
    ///
    /// Returns (segment width, band height). With `sequential` set, bands
    /// are one line high so pixels are requested in row-major order.
    fn band_shape(&self, width: usize, height: usize, sequential: bool) -> (usize, usize) {
        let format = self.codec.format();
        let slot = format.slot_bits() as usize;
        if format.line_bytes(width) > SCRATCH {
            return ((SCRATCH * 8 / slot).max(1), 1);
        }
        if sequential {
            return (width, 1);
        }
        let rows = if format.packed_lines {
            SCRATCH * 8 / (width * slot)
        } else {
            SCRATCH / format.line_bytes(width)
        };
        (width, rows.clamp(1, height))
    }

    fn transfer_blocks<F>(&mut self, clip: Rect, sequential: bool, mut native: F) -> Result<(), DisplayError>
    where
        F: FnMut(usize, usize) -> u32,
    {
        let width = clip.width as usize;
        let height = clip.height as usize;
        let (seg_width, band_height) = self.band_shape(width, height, sequential);

        let mut y0 = 0;
        while y0 < height {
            let bh = band_height.min(height - y0);
            let mut x0 = 0;
            while x0 < width {
                let bw = seg_width.min(width - x0);
                let mut packer = self.codec.packer();
                let mut len = 0;
                for y in 0..bh {
                    for x in 0..bw {
                        len += packer.push(native(x0 + x, y0 + y), &mut self.scratch[len..]);
                    }
                    len += packer.end_line(&mut self.scratch[len..]);
                }
                len += packer.finish(&mut self.scratch[len..]);

                self.adapter.block_transfer(
                    clip.x + x0 as u16,
                    clip.y + y0 as u16,
                    bw as u16,
                    bh as u16,
                    &self.scratch[..len],
                )?;
                x0 += bw;
            }
            y0 += bh;
        }
        Ok(())
    }

    fn stream_window<F>(&mut self, clip: Rect, native: F) -> Result<(), DisplayError>
    where
        F: FnMut(usize, usize) -> u32,
    {
        self.adapter
            .stream_start(clip.x, clip.y, clip.width, clip.height)?;
        let written = self.stream_lines(clip, native);
        let stopped = self.adapter.stream_stop();
        written?;
        stopped?;
        Ok(())
    }

    /// Emit one stream write per scanline (more if a line overflows the
    /// scratch buffer). Partial bytes of packed lines carry into the next
    /// write.
    fn stream_lines<F>(&mut self, clip: Rect, mut native: F) -> Result<(), DisplayError>
    where
        F: FnMut(usize, usize) -> u32,
    {
        let mut packer = self.codec.packer();
        let mut len = 0;
        for y in 0..clip.height as usize {
            for x in 0..clip.width as usize {
                if SCRATCH - len < Packer::MAX_EMIT {
                    self.adapter.stream_write(&self.scratch[..len])?;
                    len = 0;
                }
                len += packer.push(native(x, y), &mut self.scratch[len..]);
            }
            if SCRATCH - len < Packer::MAX_EMIT {
                self.adapter.stream_write(&self.scratch[..len])?;
                len = 0;
            }
            len += packer.end_line(&mut self.scratch[len..]);
            if len > 0 {
                self.adapter.stream_write(&self.scratch[..len])?;
                len = 0;
            }
        }
        len += packer.finish(&mut self.scratch[len..]);
        if len > 0 {
            self.adapter.stream_write(&self.scratch[..len])?;
        }
        Ok(())
    }
}
