//! Windows BMP decoder
//!
//! Supports uncompressed 1/4/8-bit palette images, 16/24/32-bit direct
//! color, and `BI_BITFIELDS`/`BI_ALPHABITFIELDS` channel masks. Rows may
//! be stored bottom-up (positive height) or top-down (negative height).
//! An alpha mask, when present, makes pixels with alpha below 128
//! transparent. RLE compression is not supported.

use alloc::vec::Vec;

use vitrine_hal::Color;

use super::{DecodeLimits, ImageDecoder, ImageFormat, ImageHeader};
use crate::error::ImageError;
use crate::frame::DecodedFrame;
use crate::source::ImageSource;

const FILE_HEADER_LEN: u64 = 14;
const CORE_HEADER_LEN: u32 = 12;
const INFO_HEADER_LEN: u32 = 40;
/// Largest header (BITMAPV5HEADER) whose fields are parsed
const MAX_HEADER_LEN: usize = 124;

/// Compression values
const BI_RGB: u32 = 0;
const BI_RLE8: u32 = 1;
const BI_RLE4: u32 = 2;
const BI_BITFIELDS: u32 = 3;
const BI_ALPHABITFIELDS: u32 = 6;

fn le16(b: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([b[at], b[at + 1]])
}

fn le32(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([b[at], b[at + 1], b[at + 2], b[at + 3]])
}

/// One color channel described by a bit mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Channel {
    mask: u32,
    shift: u32,
    bits: u32,
}

impl Channel {
    fn from_mask(mask: u32) -> Result<Self, ImageError> {
        if mask == 0 {
            return Ok(Self::default());
        }
        let shift = mask.trailing_zeros();
        let run = mask >> shift;
        // Masks must be one contiguous run of bits
        if run & run.wrapping_add(1) != 0 {
            return Err(ImageError::Corrupted);
        }
        Ok(Self {
            mask,
            shift,
            bits: run.count_ones(),
        })
    }

    fn is_present(&self) -> bool {
        self.bits > 0
    }

    /// Extract the channel and scale it to 8 bits
    fn extract(&self, value: u32) -> u8 {
        if self.bits == 0 {
            return 0;
        }
        let v = (value & self.mask) >> self.shift;
        if self.bits >= 8 {
            return (v >> (self.bits - 8)) as u8;
        }
        let mut out = 0u32;
        let mut filled = 0;
        while filled < 8 {
            out = (out << self.bits) | v;
            filled += self.bits;
        }
        (out >> (filled - 8)) as u8
    }
}

/// Layout parsed from the headers
#[derive(Debug, Clone, Copy)]
struct BmpLayout {
    width: u16,
    height: u16,
    top_down: bool,
    bits_per_pixel: u16,
    data_offset: u32,
    palette_offset: u64,
    palette_len: u16,
    palette_entry: u8,
    channels: [Channel; 4],
}

impl BmpLayout {
    fn has_alpha(&self) -> bool {
        matches!(self.bits_per_pixel, 16 | 32) && self.channels[3].is_present()
    }

    fn stride(&self) -> usize {
        (self.width as usize * self.bits_per_pixel as usize).div_ceil(32) * 4
    }
}

/// BMP decoder; always a single frame
#[derive(Debug, Default)]
pub struct BmpDecoder {
    layout: Option<BmpLayout>,
}

impl BmpDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse(source: &mut ImageSource<'_>) -> Result<BmpLayout, ImageError> {
        source.seek(0)?;
        let file = source.read_array::<14>()?;
        if &file[..2] != b"BM" {
            return Err(ImageError::Unsupported);
        }
        let data_offset = le32(&file, 10);

        let dib_len = u32::from_le_bytes(source.read_array::<4>()?);
        let mut dib = [0u8; MAX_HEADER_LEN];
        let (width, height, planes, bits_per_pixel, compression, colors_used, entry) =
            if dib_len == CORE_HEADER_LEN {
                source.read_exact(&mut dib[4..12])?;
                let height = le16(&dib, 6) as i16 as i64;
                (le16(&dib, 4) as i64, height, le16(&dib, 8), le16(&dib, 10), BI_RGB, 0, 3)
            } else if dib_len >= INFO_HEADER_LEN {
                let parsed = (dib_len as usize).min(MAX_HEADER_LEN);
                source.read_exact(&mut dib[4..parsed])?;
                if dib_len as usize > MAX_HEADER_LEN {
                    source.seek(FILE_HEADER_LEN + dib_len as u64)?;
                }
                (
                    le32(&dib, 4) as i32 as i64,
                    le32(&dib, 8) as i32 as i64,
                    le16(&dib, 12),
                    le16(&dib, 14),
                    le32(&dib, 16),
                    le32(&dib, 32),
                    4,
                )
            } else {
                return Err(ImageError::Corrupted);
            };

        if planes != 1 {
            return Err(ImageError::Corrupted);
        }
        if !matches!(bits_per_pixel, 1 | 4 | 8 | 16 | 24 | 32) {
            return Err(ImageError::Unsupported);
        }
        if width <= 0 || height == 0 || width > u16::MAX as i64 || height.abs() > u16::MAX as i64 {
            return Err(ImageError::BadDimensions);
        }

        let masks = match compression {
            BI_RGB => match bits_per_pixel {
                16 => [0x7C00, 0x03E0, 0x001F, 0],
                _ => {
                    // V3+ headers may still carry an alpha mask; only
                    // 32-bit pixels have bits left for it
                    let alpha = if dib_len >= 56 && bits_per_pixel == 32 {
                        le32(&dib, 52)
                    } else {
                        0
                    };
                    [0x00FF_0000, 0x0000_FF00, 0x0000_00FF, alpha]
                }
            },
            BI_BITFIELDS | BI_ALPHABITFIELDS => {
                if !matches!(bits_per_pixel, 16 | 32) {
                    return Err(ImageError::Corrupted);
                }
                if dib_len >= 52 {
                    let alpha = if dib_len >= 56 { le32(&dib, 52) } else { 0 };
                    [le32(&dib, 40), le32(&dib, 44), le32(&dib, 48), alpha]
                } else {
                    // Masks follow a 40-byte header
                    let mut m = [0u8; 16];
                    let count = if compression == BI_ALPHABITFIELDS { 16 } else { 12 };
                    source.read_exact(&mut m[..count])?;
                    [le32(&m, 0), le32(&m, 4), le32(&m, 8), le32(&m, 12)]
                }
            }
            BI_RLE8 | BI_RLE4 => {
                debug!("bmp RLE compression not supported");
                return Err(ImageError::Unsupported);
            }
            _ => return Err(ImageError::Unsupported),
        };

        let palette_len = if bits_per_pixel <= 8 {
            let max = 1u32 << bits_per_pixel;
            match colors_used {
                0 => max,
                n if n <= max => n,
                _ => return Err(ImageError::Corrupted),
            }
        } else {
            0
        };
        let palette_offset = source.position();
        let palette_end = palette_offset + palette_len as u64 * entry as u64;
        if (data_offset as u64) < palette_end {
            return Err(ImageError::Corrupted);
        }

        Ok(BmpLayout {
            width: width as u16,
            height: height.unsigned_abs() as u16,
            top_down: height < 0,
            bits_per_pixel,
            data_offset,
            palette_offset,
            palette_len: palette_len as u16,
            palette_entry: entry,
            channels: [
                Channel::from_mask(masks[0])?,
                Channel::from_mask(masks[1])?,
                Channel::from_mask(masks[2])?,
                Channel::from_mask(masks[3])?,
            ],
        })
    }

    fn read_palette(
        source: &mut ImageSource<'_>,
        layout: &BmpLayout,
        palette: &mut [Color; 256],
    ) -> Result<(), ImageError> {
        source.seek(layout.palette_offset)?;
        let mut entry = [0u8; 4];
        for color in palette.iter_mut().take(layout.palette_len as usize) {
            source.read_exact(&mut entry[..layout.palette_entry as usize])?;
            *color = Color::rgb(entry[2], entry[1], entry[0]);
        }
        Ok(())
    }
}

impl ImageDecoder for BmpDecoder {
    fn format(&self) -> ImageFormat {
        ImageFormat::Bmp
    }

    fn read_header(&mut self, source: &mut ImageSource<'_>) -> Result<ImageHeader, ImageError> {
        let layout = Self::parse(source)?;
        self.layout = Some(layout);
        debug!(
            "bmp {}x{} {}bpp",
            layout.width,
            layout.height,
            layout.bits_per_pixel
        );
        Ok(ImageHeader {
            width: layout.width,
            height: layout.height,
            frame_count: 1,
            has_transparency: layout.has_alpha(),
        })
    }

    fn decode_frame(
        &mut self,
        source: &mut ImageSource<'_>,
        index: u16,
        limits: &DecodeLimits,
    ) -> Result<DecodedFrame, ImageError> {
        let layout = match self.layout {
            Some(layout) => layout,
            None => {
                self.read_header(source)?;
                self.layout.ok_or(ImageError::Corrupted)?
            }
        };
        if index != 0 {
            return Err(ImageError::NoSuchFrame);
        }
        limits.check(layout.width, layout.height)?;

        let mut palette = [Color::BLACK; 256];
        if layout.palette_len > 0 {
            Self::read_palette(source, &layout, &mut palette)?;
        }

        let mut frame = DecodedFrame::new(layout.width, layout.height, layout.has_alpha())?;
        let stride = layout.stride();
        let mut row = Vec::new();
        row.try_reserve_exact(stride)
            .map_err(|_| ImageError::OutOfMemory)?;
        row.resize(stride, 0);

        let [red, green, blue, alpha] = layout.channels;
        let bpp = layout.bits_per_pixel as usize;
        source.seek(layout.data_offset as u64)?;

        for r in 0..layout.height {
            source.read_exact(&mut row)?;
            let y = if layout.top_down {
                r
            } else {
                layout.height - 1 - r
            };

            for x in 0..layout.width {
                let xi = x as usize;
                let value = match bpp {
                    1 | 4 | 8 => {
                        let bit = xi * bpp;
                        let index = (row[bit / 8] >> (8 - bpp - bit % 8)) & ((1u16 << bpp) - 1) as u8;
                        if index as u16 >= layout.palette_len {
                            return Err(ImageError::Corrupted);
                        }
                        frame.set(x, y, palette[index as usize]);
                        continue;
                    }
                    16 => le16(&row, xi * 2) as u32,
                    24 => {
                        let p = &row[xi * 3..xi * 3 + 3];
                        frame.set(x, y, Color::rgb(p[2], p[1], p[0]));
                        continue;
                    }
                    _ => le32(&row, xi * 4),
                };

                if alpha.is_present() && alpha.extract(value) < 0x80 {
                    frame.set_transparent(x, y);
                } else {
                    let color = Color::rgb(red.extract(value), green.extract(value), blue.extract(value));
                    frame.set(x, y, color);
                }
            }
        }

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal BMP writer for tests
    struct Bmp {
        header_len: u32,
        width: i32,
        height: i32,
        bpp: u16,
        compression: u32,
        masks: [u32; 4],
        palette: Vec<[u8; 4]>,
        /// Rows in file order, already padded
        rows: Vec<Vec<u8>>,
    }

    impl Bmp {
        fn new(width: i32, height: i32, bpp: u16, rows: Vec<Vec<u8>>) -> Self {
            Self {
                header_len: 40,
                width,
                height,
                bpp,
                compression: BI_RGB,
                masks: [0; 4],
                palette: Vec::new(),
                rows,
            }
        }

        fn encode(&self) -> Vec<u8> {
            let extra = match (self.header_len, self.compression) {
                (40, BI_BITFIELDS) => 12,
                (40, BI_ALPHABITFIELDS) => 16,
                _ => 0,
            };
            let pixels: Vec<u8> = self.rows.concat();
            let offset = 14 + self.header_len + extra + self.palette.len() as u32 * 4;

            let mut out = Vec::new();
            out.extend_from_slice(b"BM");
            out.extend_from_slice(&(offset + pixels.len() as u32).to_le_bytes());
            out.extend_from_slice(&[0; 4]);
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&self.header_len.to_le_bytes());
            out.extend_from_slice(&self.width.to_le_bytes());
            out.extend_from_slice(&self.height.to_le_bytes());
            out.extend_from_slice(&1u16.to_le_bytes());
            out.extend_from_slice(&self.bpp.to_le_bytes());
            out.extend_from_slice(&self.compression.to_le_bytes());
            out.extend_from_slice(&(pixels.len() as u32).to_le_bytes());
            out.extend_from_slice(&2835u32.to_le_bytes());
            out.extend_from_slice(&2835u32.to_le_bytes());
            out.extend_from_slice(&(self.palette.len() as u32).to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            if self.header_len >= 56 {
                for mask in self.masks {
                    out.extend_from_slice(&mask.to_le_bytes());
                }
                out.resize(14 + self.header_len as usize, 0);
            }
            for mask in &self.masks[..extra as usize / 4] {
                out.extend_from_slice(&mask.to_le_bytes());
            }
            for entry in &self.palette {
                out.extend_from_slice(entry);
            }
            out.extend_from_slice(&pixels);
            out
        }
    }

    fn decode(data: &[u8]) -> Result<(ImageHeader, DecodedFrame), ImageError> {
        let mut source = ImageSource::from_memory(data);
        let mut decoder = BmpDecoder::new();
        let header = decoder.read_header(&mut source)?;
        let frame = decoder.decode_frame(&mut source, 0, &DecodeLimits::default())?;
        Ok((header, frame))
    }

    #[test]
    fn test_24bit_bottom_up_with_padding() {
        // Bottom row first; 2 px x 3 bytes = 6, padded to 8
        let rows = vec![
            vec![0xFF, 0, 0, 0xFF, 0xFF, 0xFF, 0, 0],
            vec![0, 0, 0xFF, 0, 0xFF, 0, 0, 0],
        ];
        let (header, frame) = decode(&Bmp::new(2, 2, 24, rows).encode()).unwrap();
        assert_eq!(
            header,
            ImageHeader {
                width: 2,
                height: 2,
                frame_count: 1,
                has_transparency: false
            }
        );
        assert_eq!(frame.get(0, 0), Some(Color::RED));
        assert_eq!(frame.get(1, 0), Some(Color::GREEN));
        assert_eq!(frame.get(0, 1), Some(Color::BLUE));
        assert_eq!(frame.get(1, 1), Some(Color::WHITE));
    }

    #[test]
    fn test_32bit_top_down_alpha() {
        let mut bmp = Bmp::new(
            2,
            -1,
            32,
            vec![vec![0x00, 0x00, 0xFF, 0xFF, 0x00, 0xFF, 0x00, 0x10]],
        );
        bmp.header_len = 56;
        bmp.compression = BI_BITFIELDS;
        bmp.masks = [0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000];
        let (header, frame) = decode(&bmp.encode()).unwrap();
        assert!(header.has_transparency);
        assert_eq!(frame.get(0, 0), Some(Color::RED));
        assert!(frame.is_transparent(1, 0));
    }

    #[test]
    fn test_24bit_ignores_alpha_mask_in_v4_header() {
        let mut bmp = Bmp::new(1, 1, 24, vec![vec![0x00, 0x00, 0xFF, 0x00]]);
        bmp.header_len = 108;
        bmp.masks = [0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000];
        let (header, frame) = decode(&bmp.encode()).unwrap();
        assert!(!header.has_transparency);
        assert!(!frame.has_transparency());
        assert_eq!(frame.get(0, 0), Some(Color::RED));
    }

    #[test]
    fn test_32bit_rgb_v4_alpha_mask_applies() {
        let mut bmp = Bmp::new(2, 1, 32, vec![vec![0x00, 0x00, 0xFF, 0xFF, 0x00, 0xFF, 0x00, 0x00]]);
        bmp.header_len = 108;
        bmp.masks = [0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000];
        let (header, frame) = decode(&bmp.encode()).unwrap();
        assert!(header.has_transparency);
        assert_eq!(frame.get(0, 0), Some(Color::RED));
        assert!(frame.is_transparent(1, 0));
    }

    #[test]
    fn test_alphabitfields_after_info_header() {
        let mut bmp = Bmp::new(1, 1, 32, vec![vec![0xFF, 0x00, 0x00, 0x00]]);
        bmp.compression = BI_ALPHABITFIELDS;
        bmp.masks = [0x0000_00FF, 0x0000_FF00, 0x00FF_0000, 0xFF00_0000];
        let (_, frame) = decode(&bmp.encode()).unwrap();
        assert!(frame.is_transparent(0, 0));
    }

    #[test]
    fn test_16bit_masks() {
        // Default 5-5-5 and explicit 5-6-5
        let (_, frame) = decode(&Bmp::new(1, 1, 16, vec![vec![0x00, 0x7C, 0, 0]]).encode()).unwrap();
        assert_eq!(frame.get(0, 0), Some(Color::RED));

        let mut bmp = Bmp::new(1, 1, 16, vec![vec![0xE0, 0x07, 0, 0]]);
        bmp.compression = BI_BITFIELDS;
        bmp.masks = [0xF800, 0x07E0, 0x001F, 0];
        let (_, frame) = decode(&bmp.encode()).unwrap();
        assert_eq!(frame.get(0, 0), Some(Color::GREEN));
    }

    #[test]
    fn test_1bit_palette() {
        let mut bmp = Bmp::new(10, 1, 1, vec![vec![0b1000_0000, 0b0100_0000, 0, 0]]);
        bmp.palette = vec![[0, 0, 0, 0], [0xFF, 0xFF, 0xFF, 0]];
        let (_, frame) = decode(&bmp.encode()).unwrap();
        assert_eq!(frame.get(0, 0), Some(Color::WHITE));
        assert_eq!(frame.get(1, 0), Some(Color::BLACK));
        assert_eq!(frame.get(9, 0), Some(Color::WHITE));
    }

    #[test]
    fn test_4bit_palette_odd_width() {
        let mut bmp = Bmp::new(3, 1, 4, vec![vec![0x01, 0x20, 0, 0]]);
        bmp.palette = vec![[0, 0, 0xFF, 0], [0xFF, 0, 0, 0], [0, 0xFF, 0, 0]];
        let (_, frame) = decode(&bmp.encode()).unwrap();
        assert_eq!(frame.get(0, 0), Some(Color::RED));
        assert_eq!(frame.get(1, 0), Some(Color::BLUE));
        assert_eq!(frame.get(2, 0), Some(Color::GREEN));
    }

    #[test]
    fn test_palette_index_out_of_range() {
        let mut bmp = Bmp::new(1, 1, 8, vec![vec![5, 0, 0, 0]]);
        bmp.palette = vec![[0, 0, 0, 0]; 2];
        assert_eq!(decode(&bmp.encode()).unwrap_err(), ImageError::Corrupted);
    }

    #[test]
    fn test_rle_unsupported() {
        let mut bmp = Bmp::new(1, 1, 8, vec![vec![0, 0, 0, 0]]);
        bmp.compression = BI_RLE8;
        bmp.palette = vec![[0, 0, 0, 0]];
        assert_eq!(decode(&bmp.encode()).unwrap_err(), ImageError::Unsupported);
    }

    #[test]
    fn test_zero_width_bad_dimensions() {
        let bmp = Bmp::new(0, 1, 24, vec![]);
        assert_eq!(decode(&bmp.encode()).unwrap_err(), ImageError::BadDimensions);
    }

    #[test]
    fn test_oversized_rejected_before_reading_pixels() {
        // Header claims 4000 rows but carries no pixel data
        let bmp = Bmp::new(4, 4000, 24, vec![]);
        let data = bmp.encode();
        let mut source = ImageSource::from_memory(&data);
        let mut decoder = BmpDecoder::new();
        assert_eq!(decoder.read_header(&mut source).unwrap().height, 4000);
        assert_eq!(
            decoder.decode_frame(&mut source, 0, &DecodeLimits::default()),
            Err(ImageError::BadDimensions)
        );
    }

    #[test]
    fn test_truncated_pixels_corrupted() {
        let bmp = Bmp::new(2, 2, 24, vec![vec![0; 8]]);
        assert_eq!(decode(&bmp.encode()).unwrap_err(), ImageError::Corrupted);
    }

    #[test]
    fn test_single_frame_only() {
        let data = Bmp::new(1, 1, 24, vec![vec![0; 4]]).encode();
        let mut source = ImageSource::from_memory(&data);
        let mut decoder = BmpDecoder::new();
        decoder.read_header(&mut source).unwrap();
        assert_eq!(
            decoder.decode_frame(&mut source, 1, &DecodeLimits::default()),
            Err(ImageError::NoSuchFrame)
        );
    }

    #[test]
    fn test_not_a_bmp() {
        let data = [b'N', b'I', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let mut source = ImageSource::from_memory(&data);
        assert_eq!(
            BmpDecoder::new().read_header(&mut source),
            Err(ImageError::Unsupported)
        );
    }

    #[test]
    fn test_channel_scaling() {
        let five = Channel::from_mask(0x1F).unwrap();
        assert_eq!(five.extract(0x1F), 0xFF);
        assert_eq!(five.extract(0x10), 0x84);
        assert!(Channel::from_mask(0b1011).is_err());
    }
}
