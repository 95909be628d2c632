//! Image errors
//!
//! Every error has a stable integer code for callers that cannot match
//! on Rust enums. Code 0 is reserved for success.

/// Code reported for a successful operation
pub const CODE_OK: u8 = 0;

/// Errors from opening, decoding and caching images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ImageError {
    /// No decoder recognizes the data, or the data uses a feature the
    /// decoder does not implement
    Unsupported = 1,
    /// Data is malformed or truncated
    Corrupted = 2,
    /// The source cannot be opened, read or repositioned
    SourceUnavailable = 3,
    /// A frame buffer could not be allocated
    OutOfMemory = 4,
    /// Width or height is zero or above the configured limit
    BadDimensions = 5,
    /// The requested frame index is past the last frame
    NoSuchFrame = 6,
}

impl ImageError {
    /// Integer code for this error
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Error for a non-zero code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ImageError::Unsupported),
            2 => Some(ImageError::Corrupted),
            3 => Some(ImageError::SourceUnavailable),
            4 => Some(ImageError::OutOfMemory),
            5 => Some(ImageError::BadDimensions),
            6 => Some(ImageError::NoSuchFrame),
            _ => None,
        }
    }
}

/// Integer code for a result: [`CODE_OK`] or the error's code
pub fn result_code<T>(result: &Result<T, ImageError>) -> u8 {
    match result {
        Ok(_) => CODE_OK,
        Err(e) => e.code(),
    }
}
