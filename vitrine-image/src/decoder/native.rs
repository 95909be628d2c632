//! NATIVE raw image decoder
//!
//! Layout:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 2 | `"NI"` |
//! | 2 | 2 | width, big-endian |
//! | 4 | 2 | height, big-endian |
//! | 6 | 2 | channel layout code, big-endian |
//! | 8 | ... | rows of byte-aligned pixels in that layout |
//!
//! Images are always opaque and have a single frame.

use alloc::vec::Vec;

use vitrine_hal::{ChannelLayout, PixelCodec, PixelFormat, Unpacker};

use super::{DecodeLimits, ImageDecoder, ImageFormat, ImageHeader};
use crate::error::ImageError;
use crate::frame::DecodedFrame;
use crate::source::ImageSource;

/// Offset of the first pixel row
const DATA_OFFSET: u64 = 8;

#[derive(Debug, Clone, Copy)]
struct NativeLayout {
    width: u16,
    height: u16,
    layout: ChannelLayout,
}

/// NATIVE decoder
#[derive(Debug, Default)]
pub struct NativeDecoder {
    parsed: Option<NativeLayout>,
}

impl NativeDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageDecoder for NativeDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Native
    }

    fn read_header(&mut self, source: &mut ImageSource<'_>) -> Result<ImageHeader, ImageError> {
        source.seek(0)?;
        let header = source.read_array::<8>()?;
        if &header[..2] != b"NI" {
            return Err(ImageError::Unsupported);
        }
        let width = u16::from_be_bytes([header[2], header[3]]);
        let height = u16::from_be_bytes([header[4], header[5]]);
        let code = u16::from_be_bytes([header[6], header[7]]);
        let layout = u8::try_from(code)
            .ok()
            .and_then(ChannelLayout::from_u8)
            .ok_or(ImageError::Unsupported)?;
        if width == 0 || height == 0 {
            return Err(ImageError::BadDimensions);
        }

        self.parsed = Some(NativeLayout {
            width,
            height,
            layout,
        });
        Ok(ImageHeader {
            width,
            height,
            frame_count: 1,
            has_transparency: false,
        })
    }

    fn decode_frame(
        &mut self,
        source: &mut ImageSource<'_>,
        index: u16,
        limits: &DecodeLimits,
    ) -> Result<DecodedFrame, ImageError> {
        let parsed = match self.parsed {
            Some(parsed) => parsed,
            None => {
                self.read_header(source)?;
                self.parsed.ok_or(ImageError::Corrupted)?
            }
        };
        if index != 0 {
            return Err(ImageError::NoSuchFrame);
        }
        limits.check(parsed.width, parsed.height)?;

        let format = PixelFormat::new(parsed.layout);
        let codec = PixelCodec::new(format);
        let line = format.line_bytes(parsed.width as usize);

        let mut frame = DecodedFrame::new(parsed.width, parsed.height, false)?;
        let mut row = Vec::new();
        row.try_reserve_exact(line)
            .map_err(|_| ImageError::OutOfMemory)?;
        row.resize(line, 0);

        source.seek(DATA_OFFSET)?;
        for y in 0..parsed.height {
            source.read_exact(&mut row)?;
            let mut reader = Unpacker::new(format, &row);
            for x in 0..parsed.width {
                let native = reader.next_native().ok_or(ImageError::Corrupted)?;
                frame.set(x, y, codec.from_native(native));
            }
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use vitrine_hal::Color;

    fn native_image(width: u16, height: u16, layout: u16, pixels: &[u8]) -> Vec<u8> {
        let mut out = b"NI".to_vec();
        out.extend_from_slice(&width.to_be_bytes());
        out.extend_from_slice(&height.to_be_bytes());
        out.extend_from_slice(&layout.to_be_bytes());
        out.extend_from_slice(pixels);
        out
    }

    #[test]
    fn test_rgb565_pixels() {
        let data = native_image(2, 1, 5, &[0xF8, 0x00, 0x00, 0x1F]);
        let mut source = ImageSource::from_memory(&data);
        let mut decoder = NativeDecoder::new();
        let header = decoder.read_header(&mut source).unwrap();
        assert_eq!((header.width, header.height, header.frame_count), (2, 1, 1));
        assert!(!header.has_transparency);

        let frame = decoder
            .decode_frame(&mut source, 0, &DecodeLimits::default())
            .unwrap();
        assert_eq!(frame.get(0, 0), Some(Color::RED));
        assert_eq!(frame.get(1, 0), Some(Color::BLUE));
    }

    #[test]
    fn test_mono_is_byte_aligned() {
        let data = native_image(3, 1, 1, &[1, 0, 1]);
        let mut source = ImageSource::from_memory(&data);
        let frame = NativeDecoder::new()
            .decode_frame(&mut source, 0, &DecodeLimits::default())
            .unwrap();
        assert_eq!(frame.get(0, 0), Some(Color::WHITE));
        assert_eq!(frame.get(1, 0), Some(Color::BLACK));
        assert_eq!(frame.get(2, 0), Some(Color::WHITE));
    }

    #[test]
    fn test_unknown_layout_unsupported() {
        let data = native_image(1, 1, 0x0105, &[0, 0]);
        let mut source = ImageSource::from_memory(&data);
        assert_eq!(
            NativeDecoder::new().read_header(&mut source),
            Err(ImageError::Unsupported)
        );
    }

    #[test]
    fn test_zero_height_bad_dimensions() {
        let data = native_image(4, 0, 7, &[]);
        let mut source = ImageSource::from_memory(&data);
        assert_eq!(
            NativeDecoder::new().read_header(&mut source),
            Err(ImageError::BadDimensions)
        );
    }

    #[test]
    fn test_truncated_rows_corrupted() {
        let data = native_image(2, 2, 7, &[0; 9]);
        let mut source = ImageSource::from_memory(&data);
        assert_eq!(
            NativeDecoder::new().decode_frame(&mut source, 0, &DecodeLimits::default()),
            Err(ImageError::Corrupted)
        );
    }

    proptest! {
        #[test]
        fn prop_rgb888_decodes_within_limits(
            width in 1u16..12,
            height in 1u16..12,
            max_pixels in 1u32..160,
            seed in any::<u32>(),
        ) {
            let count = width as usize * height as usize;
            let colors: Vec<Color> = (0..count as u32)
                .map(|i| Color::from_raw(seed.wrapping_mul(i.wrapping_add(1)).wrapping_mul(2654435761)))
                .collect();
            let bytes: Vec<u8> = colors.iter().flat_map(|c| [c.r(), c.g(), c.b()]).collect();
            let data = native_image(width, height, 7, &bytes);
            let limits = DecodeLimits { max_pixels, ..Default::default() };

            let mut source = ImageSource::from_memory(&data);
            let result = NativeDecoder::new().decode_frame(&mut source, 0, &limits);
            if count as u32 > max_pixels {
                prop_assert_eq!(result, Err(ImageError::BadDimensions));
            } else {
                let frame = result.unwrap();
                prop_assert_eq!(frame.pixels(), &colors[..]);
            }
        }
    }
}
