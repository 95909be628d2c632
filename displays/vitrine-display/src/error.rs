//! Drawing errors

use vitrine_hal::AdapterError;

/// Errors from the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// The adapter advertises no pixel-producing primitive
    NoDrawingPrimitive,
    /// The adapter failed while executing a primitive
    Hardware(AdapterError),
    /// The requested control is not available on this adapter
    Unsupported,
    /// Pixel buffer length does not match the target rectangle
    BufferSize,
    /// Target rectangle does not lie within the panel
    OutOfBounds,
}

impl From<AdapterError> for DisplayError {
    fn from(e: AdapterError) -> Self {
        DisplayError::Hardware(e)
    }
}
