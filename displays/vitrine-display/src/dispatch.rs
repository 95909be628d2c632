//! Capability dispatch table
//!
//! The table is resolved once from an adapter's capabilities when the
//! surface is built. Resolution is pure: it looks only at the primitive
//! set and never touches the hardware.
//!
//! Fallback chains, first match wins:
//!
//! | Operation | Chain |
//! |-----------|-------|
//! | pixel | DrawPixel → 1x1 FillArea → 1x1 BlockTransfer → 1-pixel stream |
//! | fill  | FillArea → chunked BlockTransfer → stream → per-pixel |
//! | blit  | BlockTransfer → stream per scanline → per-pixel |
//!
//! FillArea never serves a blit: it only paints one color.

use vitrine_hal::{DriverCapabilities, Primitive};

use crate::error::DisplayError;

/// How a single pixel is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelRoute {
    /// Native DrawPixel
    Native,
    /// 1x1 FillArea
    Fill,
    /// 1x1 BlockTransfer
    Block,
    /// One-pixel window stream
    Stream,
}

/// How a solid rectangle is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FillRoute {
    /// Native FillArea
    Native,
    /// Solid block transfers, chunked to the scratch buffer
    Block,
    /// A window streamed with one color
    Stream,
    /// Row-by-row single pixels
    Pixels,
}

/// How a block of distinct pixels is transferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlitRoute {
    /// Native BlockTransfer, chunked to the scratch buffer
    Block,
    /// A window streamed one scanline per write
    Stream,
    /// One pixel at a time
    Pixels,
}

/// Resolved routes for every drawing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchTable {
    pub pixel: PixelRoute,
    pub fill: FillRoute,
    pub blit: BlitRoute,
}

impl DispatchTable {
    /// Resolve routes from a capability descriptor
    ///
    /// Fails if the adapter has no primitive that produces pixels.
    pub const fn resolve(caps: &DriverCapabilities) -> Result<Self, DisplayError> {
        let set = caps.primitives;
        if !set.has_drawing() {
            return Err(DisplayError::NoDrawingPrimitive);
        }

        let pixel = if set.contains(Primitive::DrawPixel) {
            PixelRoute::Native
        } else if set.contains(Primitive::FillArea) {
            PixelRoute::Fill
        } else if set.contains(Primitive::BlockTransfer) {
            PixelRoute::Block
        } else {
            PixelRoute::Stream
        };

        let fill = if set.contains(Primitive::FillArea) {
            FillRoute::Native
        } else if set.contains(Primitive::BlockTransfer) {
            FillRoute::Block
        } else if set.contains(Primitive::StreamWrite) {
            FillRoute::Stream
        } else {
            FillRoute::Pixels
        };

        let blit = if set.contains(Primitive::BlockTransfer) {
            BlitRoute::Block
        } else if set.contains(Primitive::StreamWrite) {
            BlitRoute::Stream
        } else {
            BlitRoute::Pixels
        };

        Ok(Self { pixel, fill, blit })
    }
}
