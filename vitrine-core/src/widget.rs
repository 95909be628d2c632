//! Image widget
//!
//! An [`ImageWidget`] places one open image in a screen rectangle. It owns
//! the image (and through it the source and the cached frame), so a new
//! open always drops the previous source before the next one is touched.
//!
//! Drawing makes the current frame resident, then blits the part of the
//! rectangle the frame covers with transparent pixels replaced by the
//! background color. Whatever the frame does not cover is filled with the
//! background.

use alloc::boxed::Box;

use vitrine_display::{DisplaySurface, Rect};
use vitrine_hal::{Color, DisplayAdapter};
use vitrine_image::{
    ByteStream, DecodeLimits, DecodedFrame, Image, ImageDecoder, ImageError, ImageSource,
};

use crate::config::ImageConfig;
use crate::error::DrawError;

/// An image drawn into a rectangle of a display surface
pub struct ImageWidget<'a> {
    area: Rect,
    background: Color,
    frame: u16,
    limits: DecodeLimits,
    image: Option<Image<'a>>,
}

impl<'a> ImageWidget<'a> {
    /// Create an empty widget covering `area`
    pub fn new(area: Rect, config: &ImageConfig) -> Self {
        Self {
            area,
            background: config.background,
            frame: 0,
            limits: config.limits(),
            image: None,
        }
    }

    /// Create an empty widget with default background and limits
    pub fn with_defaults(area: Rect) -> Self {
        Self::new(area, &ImageConfig::default())
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn set_area(&mut self, area: Rect) {
        self.area = area;
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Color used for transparent pixels and for the part of the area the
    /// frame does not cover
    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Open an image held in memory
    pub fn open_memory(&mut self, data: &'a [u8]) -> Result<(), ImageError> {
        self.close();
        self.attach(ImageSource::from_memory(data))
    }

    /// Open an image file
    #[cfg(feature = "std")]
    pub fn open_file<P: AsRef<std::path::Path>>(&mut self, path: P) -> Result<(), ImageError> {
        self.close();
        let source = ImageSource::from_file(path)?;
        self.attach(source)
    }

    /// Open an image read from a byte stream
    pub fn open_stream<S: ByteStream + 'a>(&mut self, stream: S) -> Result<(), ImageError> {
        self.close();
        self.attach(ImageSource::from_stream(stream))
    }

    /// Open an image from an already constructed source
    pub fn open_source(&mut self, source: ImageSource<'a>) -> Result<(), ImageError> {
        self.close();
        self.attach(source)
    }

    /// Open an image with an explicit decoder instead of sniffing
    pub fn open_with(
        &mut self,
        source: ImageSource<'a>,
        decoder: Box<dyn ImageDecoder + 'a>,
    ) -> Result<(), ImageError> {
        self.close();
        let image = Image::open_with(source, decoder, self.limits)?;
        self.install(image);
        Ok(())
    }

    fn attach(&mut self, source: ImageSource<'a>) -> Result<(), ImageError> {
        let image = Image::open(source, self.limits)?;
        self.install(image);
        Ok(())
    }

    fn install(&mut self, image: Image<'a>) {
        debug!(
            "widget image {}x{}, {} frame(s)",
            image.width(),
            image.height(),
            image.frame_count()
        );
        self.frame = 0;
        self.image = Some(image);
    }

    /// Close the image, releasing its source and cached frame
    pub fn close(&mut self) {
        if self.image.take().is_some() {
            debug!("widget image closed");
        }
        self.frame = 0;
    }

    pub fn is_open(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&Image<'a>> {
        self.image.as_ref()
    }

    /// Index of the frame `draw` shows
    pub fn frame(&self) -> u16 {
        self.frame
    }

    /// Select the frame `draw` shows
    ///
    /// Decoding is deferred to the next `draw` or `cache`.
    pub fn set_frame(&mut self, index: u16) -> Result<(), ImageError> {
        let image = self.image.as_ref().ok_or(ImageError::NoSuchFrame)?;
        if index >= image.frame_count() {
            return Err(ImageError::NoSuchFrame);
        }
        self.frame = index;
        Ok(())
    }

    /// Advance to the next frame, wrapping after the last, and decode it
    pub fn next_frame(&mut self) -> Result<&DecodedFrame, ImageError> {
        let image = self.image.as_mut().ok_or(ImageError::NoSuchFrame)?;
        let next = (self.frame + 1) % image.frame_count();
        self.frame = next;
        image.ensure_cached(next)
    }

    /// Make the current frame resident without drawing
    pub fn cache(&mut self) -> Result<&DecodedFrame, ImageError> {
        let image = self.image.as_mut().ok_or(ImageError::SourceUnavailable)?;
        image.ensure_cached(self.frame)
    }

    /// Free the cached frame; the next draw decodes again
    pub fn invalidate(&mut self) {
        if let Some(image) = self.image.as_mut() {
            image.invalidate();
        }
    }

    /// Draw the current frame into the widget's area
    ///
    /// Nothing is drawn if the frame cannot be made resident. With no
    /// image open the area is cleared to the background.
    pub fn draw<A, const N: usize>(
        &mut self,
        surface: &mut DisplaySurface<A, N>,
    ) -> Result<(), DrawError>
    where
        A: DisplayAdapter,
    {
        let area = self.area;
        let background = self.background;
        let Some(image) = self.image.as_mut() else {
            surface.fill_rect(area, background)?;
            return Ok(());
        };

        let frame = image.ensure_cached(self.frame)?;
        let covered = Rect::new(
            area.x,
            area.y,
            frame.width().min(area.width),
            frame.height().min(area.height),
        );
        trace!("widget draw {} of {}", covered, area);
        surface.blit_with(covered, |x, y| {
            frame.composite(x as u16, y as u16, background)
        })?;

        if covered.width < area.width {
            let right = Rect::new(
                area.x.saturating_add(covered.width),
                area.y,
                area.width - covered.width,
                covered.height,
            );
            surface.fill_rect(right, background)?;
        }
        if covered.height < area.height {
            let below = Rect::new(
                area.x,
                area.y.saturating_add(covered.height),
                area.width,
                area.height - covered.height,
            );
            surface.fill_rect(below, background)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use vitrine_drivers::{Counters, Framebuffer};
    use vitrine_hal::{ChannelLayout, PixelFormat, Primitive, PrimitiveSet};

    /// NATIVE RGB888 image header followed by `pixels`
    fn native(width: u16, height: u16, pixels: &[Color]) -> alloc::vec::Vec<u8> {
        let mut data = vec![b'N', b'I'];
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[0, 7]);
        for c in pixels {
            data.extend_from_slice(&[c.r(), c.g(), c.b()]);
        }
        data
    }

    fn surface(primitives: PrimitiveSet) -> DisplaySurface<Framebuffer> {
        let format = PixelFormat::new(ChannelLayout::Rgb888);
        DisplaySurface::new(Framebuffer::new(primitives, format, 8, 6)).unwrap()
    }

    #[test]
    fn test_draw_without_image_clears_area() {
        let mut surface = surface(PrimitiveSet::of(&Primitive::ALL));
        let mut widget = ImageWidget::with_defaults(Rect::new(1, 1, 3, 2));
        widget.set_background(Color::CYAN);
        widget.draw(&mut surface).unwrap();

        let fb = surface.release();
        assert_eq!(fb.color(1, 1), Some(Color::CYAN));
        assert_eq!(fb.color(3, 2), Some(Color::CYAN));
        assert_eq!(fb.color(0, 0), Some(Color::BLACK));
        assert_eq!(fb.color(4, 1), Some(Color::BLACK));
    }

    #[test]
    fn test_draw_fills_uncovered_area() {
        let data = native(2, 1, &[Color::RED, Color::BLUE]);
        let mut surface = surface(PrimitiveSet::of(&Primitive::ALL));
        let mut widget = ImageWidget::with_defaults(Rect::new(0, 0, 4, 3));
        widget.set_background(Color::YELLOW);
        widget.open_memory(&data).unwrap();
        widget.draw(&mut surface).unwrap();

        let fb = surface.release();
        assert_eq!(fb.color(0, 0), Some(Color::RED));
        assert_eq!(fb.color(1, 0), Some(Color::BLUE));
        assert_eq!(fb.color(2, 0), Some(Color::YELLOW));
        assert_eq!(fb.color(3, 0), Some(Color::YELLOW));
        assert_eq!(fb.color(0, 2), Some(Color::YELLOW));
        assert_eq!(fb.color(4, 0), Some(Color::BLACK));
    }

    #[test]
    fn test_draw_crops_to_area() {
        let pixels = [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE];
        let data = native(2, 2, &pixels);
        let mut surface = surface(PrimitiveSet::of(&Primitive::ALL));
        let mut widget = ImageWidget::with_defaults(Rect::new(5, 5, 1, 1));
        widget.open_memory(&data).unwrap();
        widget.draw(&mut surface).unwrap();

        let fb = surface.release();
        assert_eq!(fb.color(5, 5), Some(Color::RED));
        assert_eq!(fb.color(6, 5), Some(Color::BLACK));
        assert_eq!(fb.color(5, 6), Some(Color::BLACK));
    }

    #[test]
    fn test_draw_error_leaves_panel_untouched() {
        let mut data = native(2, 2, &[Color::RED; 4]);
        data.truncate(12);
        let mut surface = surface(PrimitiveSet::of(&Primitive::ALL));
        let mut widget = ImageWidget::with_defaults(Rect::new(0, 0, 2, 2));
        widget.open_memory(&data).unwrap();

        let err = widget.draw(&mut surface).unwrap_err();
        assert_eq!(err, DrawError::Image(ImageError::Corrupted));
        assert_eq!(err.code(), 2);
        assert_eq!(surface.adapter().counters(), Counters::default());
    }

    #[test]
    fn test_draw_off_panel_is_clipped() {
        let data = native(2, 1, &[Color::RED, Color::GREEN]);
        let mut surface = surface(PrimitiveSet::of(&[Primitive::DrawPixel]));
        let mut widget = ImageWidget::with_defaults(Rect::new(7, 5, 2, 1));
        widget.open_memory(&data).unwrap();
        widget.draw(&mut surface).unwrap();

        let fb = surface.release();
        assert_eq!(fb.counters().pixels, 1);
        assert_eq!(fb.color(7, 5), Some(Color::RED));
    }

    #[test]
    fn test_frame_selection() {
        let data = native(1, 1, &[Color::RED]);
        let mut widget = ImageWidget::with_defaults(Rect::with_size(1, 1));
        assert_eq!(widget.set_frame(0), Err(ImageError::NoSuchFrame));
        assert_eq!(widget.cache().unwrap_err(), ImageError::SourceUnavailable);

        widget.open_memory(&data).unwrap();
        assert_eq!(widget.set_frame(0), Ok(()));
        assert_eq!(widget.set_frame(1), Err(ImageError::NoSuchFrame));
        // Single frame wraps onto itself
        assert_eq!(widget.next_frame().unwrap().get(0, 0), Some(Color::RED));
        assert_eq!(widget.frame(), 0);
    }

    #[test]
    fn test_close_and_failed_open() {
        let data = native(1, 1, &[Color::RED]);
        let mut widget = ImageWidget::with_defaults(Rect::with_size(1, 1));
        widget.open_memory(&data).unwrap();
        widget.cache().unwrap();
        assert!(widget.is_open());

        // A failed open still drops the previous image
        assert_eq!(widget.open_memory(&[0u8; 4]), Err(ImageError::Unsupported));
        assert!(!widget.is_open());

        widget.open_memory(&data).unwrap();
        widget.close();
        assert!(widget.image().is_none());
    }

    #[test]
    fn test_limits_from_config() {
        let data = native(4, 4, &[Color::RED; 16]);
        let config = ImageConfig {
            max_pixels: 8,
            ..Default::default()
        };
        let mut widget = ImageWidget::new(Rect::with_size(4, 4), &config);
        assert_eq!(widget.open_memory(&data), Err(ImageError::BadDimensions));
    }
}
