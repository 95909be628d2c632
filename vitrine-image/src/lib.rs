//! Image subsystem for Vitrine
//!
//! This crate provides:
//! - [`ImageSource`], a positioned byte cursor over memory, a file (with
//!   the `std` feature) or any byte stream
//! - [`ImageDecoder`] implementations for BMP and the raw NATIVE format,
//!   selected by sniffing the first bytes of the source
//! - [`DecodedFrame`], a frame in canonical [`vitrine_hal::Color`] units
//!   with optional per-pixel transparency
//! - [`ImageCache`], a single-slot cache holding at most one decoded
//!   frame
//! - [`Image`], an open image tying the pieces together
//!
//! Everything runs to completion on the calling thread. Decoding never
//! retries; errors go back to the caller as [`ImageError`].

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod fmt;

pub mod cache;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod image;
pub mod source;

pub use cache::ImageCache;
pub use decoder::{BmpDecoder, DecodeLimits, ImageDecoder, ImageFormat, ImageHeader, NativeDecoder};
pub use error::{result_code, ImageError, CODE_OK};
pub use frame::{DecodedFrame, Transparency};
pub use image::Image;
pub use source::{ByteStream, ImageSource, Reader, Seekable, SourceKind, HEAD_BYTES};
