//! Board-agnostic core of Vitrine
//!
//! This crate provides:
//! - [`config`]: display and image configuration, parsed from TOML and
//!   persisted as postcard bytes
//! - [`ImageWidget`]: an image placed in a screen rectangle, drawn
//!   through a [`vitrine_display::DisplaySurface`] with transparent
//!   pixels composited against a background color
//! - [`DrawError`] and [`ConfigError`]

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod fmt;

pub mod config;
pub mod error;
pub mod widget;

pub use config::{DisplayConfig, ImageConfig, VitrineConfig};
pub use error::{ConfigError, DrawError, CODE_HARDWARE};
pub use widget::ImageWidget;
