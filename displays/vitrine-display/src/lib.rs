//! Capability-driven drawing surface for Vitrine
//!
//! This crate provides:
//! - [`DisplaySurface`], one uniform drawing API (set pixel, fill, blit,
//!   pixel streams) over any [`vitrine_hal::DisplayAdapter`]
//! - [`DispatchTable`], the fallback chain resolved once from the
//!   adapter's [`vitrine_hal::DriverCapabilities`]
//! - [`Rect`] geometry with clipping
//!
//! # Architecture
//!
//! Operations the adapter implements natively are passed straight
//! through after color conversion. Everything else is synthesized from
//! what the adapter does support:
//!
//! - block transfers from stream writes
//! - fills from chunked block transfers, streams or single pixels
//! - single pixels from 1x1 fills, blocks or streams
//!
//! Primitives are issued strictly one after another; a surface is a
//! single exclusive owner of its adapter's transport.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

mod fmt;

pub mod dispatch;
pub mod error;
pub mod geom;
pub mod surface;

#[cfg(test)]
mod testing;

// Re-export key types
pub use dispatch::{BlitRoute, DispatchTable, FillRoute, PixelRoute};
pub use error::DisplayError;
pub use geom::Rect;
pub use surface::{DisplaySurface, DEFAULT_SCRATCH_BYTES};
