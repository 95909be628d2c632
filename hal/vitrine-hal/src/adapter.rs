//! Display adapter trait
//!
//! An adapter is the lowest software layer above a display controller.
//! It receives pixels already converted to its native format: single
//! values for pixel and fill operations, packed bytes for block transfers
//! and streams.
//!
//! Only the primitives listed in [`DisplayAdapter::capabilities`] are ever
//! called by the drawing layer. The remaining methods keep their default
//! bodies, which report [`AdapterError::Unsupported`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::caps::DriverCapabilities;

/// Errors reported by adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdapterError {
    /// Transport (bus, port, pin) failure
    Bus,
    /// Operation not implemented by this adapter
    Unsupported,
    /// Coordinates or sizes outside the panel
    OutOfBounds,
    /// Data length does not match the addressed area
    DataLength,
}

/// Panel power state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerMode {
    /// Display and controller off
    Off,
    /// Controller asleep, RAM retained
    Sleep,
    /// Normal operation
    On,
}

/// Panel orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Orientation {
    /// Whether width and height swap relative to the native panel
    pub const fn is_rotated(self) -> bool {
        matches!(self, Orientation::Deg90 | Orientation::Deg270)
    }
}

/// Control requests for adapters advertising [`crate::Primitive::Control`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Control {
    /// Change power state
    Power(PowerMode),
    /// Rotate the addressing window
    Orientation(Orientation),
    /// Contrast / electronic volume (0-100%)
    Contrast(u8),
    /// Invert all pixels on the panel
    Invert(bool),
}

/// Low-level display adapter
///
/// Coordinates are in panel pixels for the current orientation.
/// Implementations never retry failed transfers; the error is returned
/// to the caller as-is.
pub trait DisplayAdapter {
    /// Static capability descriptor for this adapter
    fn capabilities(&self) -> &DriverCapabilities;

    /// Current panel size as (width, height)
    fn size(&self) -> (u16, u16);

    /// Set one pixel to a native value
    fn draw_pixel(&mut self, x: u16, y: u16, native: u32) -> Result<(), AdapterError> {
        let _ = (x, y, native);
        Err(AdapterError::Unsupported)
    }

    /// Fill a rectangle with a native value
    fn fill_area(&mut self, x: u16, y: u16, width: u16, height: u16, native: u32) -> Result<(), AdapterError> {
        let _ = (x, y, width, height, native);
        Err(AdapterError::Unsupported)
    }

    /// Transfer a block of packed pixels
    ///
    /// `data` holds exactly `format.block_bytes(width, height)` bytes in
    /// row-major order.
    fn block_transfer(&mut self, x: u16, y: u16, width: u16, height: u16, data: &[u8]) -> Result<(), AdapterError> {
        let _ = (x, y, width, height, data);
        Err(AdapterError::Unsupported)
    }

    /// Open an addressing window for streamed pixels
    ///
    /// Pixels written afterwards fill the window row-major, top to bottom,
    /// left to right.
    fn stream_start(&mut self, x: u16, y: u16, width: u16, height: u16) -> Result<(), AdapterError> {
        let _ = (x, y, width, height);
        Err(AdapterError::Unsupported)
    }

    /// Write packed pixel bytes into the open window
    fn stream_write(&mut self, data: &[u8]) -> Result<(), AdapterError> {
        let _ = data;
        Err(AdapterError::Unsupported)
    }

    /// Close the addressing window
    fn stream_stop(&mut self) -> Result<(), AdapterError> {
        Err(AdapterError::Unsupported)
    }

    /// Apply a control request
    fn control(&mut self, request: Control) -> Result<(), AdapterError> {
        let _ = request;
        Err(AdapterError::Unsupported)
    }
}

impl<T: DisplayAdapter + ?Sized> DisplayAdapter for &mut T {
    fn capabilities(&self) -> &DriverCapabilities {
        (**self).capabilities()
    }

    fn size(&self) -> (u16, u16) {
        (**self).size()
    }

    fn draw_pixel(&mut self, x: u16, y: u16, native: u32) -> Result<(), AdapterError> {
        (**self).draw_pixel(x, y, native)
    }

    fn fill_area(&mut self, x: u16, y: u16, width: u16, height: u16, native: u32) -> Result<(), AdapterError> {
        (**self).fill_area(x, y, width, height, native)
    }

    fn block_transfer(&mut self, x: u16, y: u16, width: u16, height: u16, data: &[u8]) -> Result<(), AdapterError> {
        (**self).block_transfer(x, y, width, height, data)
    }

    fn stream_start(&mut self, x: u16, y: u16, width: u16, height: u16) -> Result<(), AdapterError> {
        (**self).stream_start(x, y, width, height)
    }

    fn stream_write(&mut self, data: &[u8]) -> Result<(), AdapterError> {
        (**self).stream_write(data)
    }

    fn stream_stop(&mut self) -> Result<(), AdapterError> {
        (**self).stream_stop()
    }

    fn control(&mut self, request: Control) -> Result<(), AdapterError> {
        (**self).control(request)
    }
}
