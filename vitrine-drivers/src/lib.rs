//! Display adapter implementations
//!
//! This crate provides concrete [`vitrine_hal::DisplayAdapter`]s:
//!
//! - Nokia 6610 GE8 panel (Epson S1D15G00 controller) over a 9-bit
//!   command bus
//! - In-RAM framebuffer with caller-chosen capabilities, for simulation
//!   and tests

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod fmt;

pub mod framebuffer;
pub mod nokia6610;

pub use framebuffer::{Counters, Framebuffer};
pub use nokia6610::{Ge8, Ge8Config};
