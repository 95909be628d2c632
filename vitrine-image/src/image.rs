//! Open images
//!
//! An [`Image`] owns its source, the decoder chosen for it, the parsed
//! header and the single-frame cache. Dropping the image closes the
//! source and frees the cached frame.

use alloc::boxed::Box;

use crate::cache::ImageCache;
use crate::decoder::{DecodeLimits, ImageDecoder, ImageFormat, ImageHeader};
use crate::error::ImageError;
use crate::frame::DecodedFrame;
use crate::source::{ImageSource, SourceKind};

/// An open image
pub struct Image<'a> {
    source: ImageSource<'a>,
    decoder: Box<dyn ImageDecoder + 'a>,
    header: ImageHeader,
    cache: ImageCache,
    limits: DecodeLimits,
}

impl<'a> Image<'a> {
    /// Open an image, picking the decoder by sniffing the source
    ///
    /// Fails with [`ImageError::BadDimensions`] if the header is outside
    /// `limits`.
    pub fn open(mut source: ImageSource<'a>, limits: DecodeLimits) -> Result<Self, ImageError> {
        let format = ImageFormat::detect(&mut source)?;
        Self::open_with(source, format.decoder(), limits)
    }

    /// Open an image with an explicit decoder
    pub fn open_with(
        mut source: ImageSource<'a>,
        mut decoder: Box<dyn ImageDecoder + 'a>,
        limits: DecodeLimits,
    ) -> Result<Self, ImageError> {
        let header = decoder.read_header(&mut source)?;
        limits.check(header.width, header.height)?;
        if header.frame_count == 0 {
            return Err(ImageError::Corrupted);
        }
        debug!(
            "opened {} image {}x{}, {} frame(s)",
            decoder.format(),
            header.width,
            header.height,
            header.frame_count
        );
        Ok(Self {
            source,
            decoder,
            header,
            cache: ImageCache::new(),
            limits,
        })
    }

    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    pub fn format(&self) -> ImageFormat {
        self.decoder.format()
    }

    pub fn width(&self) -> u16 {
        self.header.width
    }

    pub fn height(&self) -> u16 {
        self.header.height
    }

    pub fn frame_count(&self) -> u16 {
        self.header.frame_count
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// Make frame `index` resident
    ///
    /// Indices past the last frame are [`ImageError::NoSuchFrame`]. A
    /// frame that is already cached is returned without decoding.
    pub fn ensure_cached(&mut self, index: u16) -> Result<&DecodedFrame, ImageError> {
        if index >= self.header.frame_count {
            return Err(ImageError::NoSuchFrame);
        }
        let Self {
            source,
            decoder,
            cache,
            limits,
            ..
        } = self;
        cache.ensure_cached(index, || decoder.decode_frame(source, index, limits))
    }

    /// The resident frame, if any
    pub fn cached(&self) -> Option<&DecodedFrame> {
        self.cache.get()
    }

    /// Index of the resident frame
    pub fn cached_index(&self) -> Option<u16> {
        self.cache.index()
    }

    /// Free the resident frame
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }
}
