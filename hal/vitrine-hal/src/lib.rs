//! Vitrine Hardware Abstraction Layer
//!
//! This crate defines the contract between the drawing layer and a concrete
//! display controller. An adapter advertises which primitives it implements
//! natively and which pixel format it expects on the wire; everything above
//! the adapter works in the canonical [`Color`] and lets the
//! [`codec::PixelCodec`] pack pixels into the adapter's native layout.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  vitrine-core (widgets, configuration)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  vitrine-display (DisplaySurface)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  vitrine-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  Nokia6610    │       │  framebuffer  │
//! │     GE8       │       │  (RAM)        │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`color`] - canonical 24-bit color
//! - [`format`] - native pixel format descriptors
//! - [`codec`] - color conversion and bit packing
//! - [`caps`] - driver capability descriptors
//! - [`adapter`] - the [`DisplayAdapter`] trait
//! - [`bus`] - command/data bus for serial display controllers

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod adapter;
pub mod bus;
pub mod caps;
pub mod codec;
pub mod color;
pub mod format;

// Re-export key types at crate root for convenience
pub use adapter::{AdapterError, Control, DisplayAdapter, Orientation, PowerMode};
pub use bus::CommandBus;
pub use caps::{DriverCapabilities, Primitive, PrimitiveSet};
pub use codec::{Packer, PixelCodec, Unpacker};
pub use color::Color;
pub use format::{ChannelLayout, PixelFormat};
