//! Nokia 6610 color LCD
//!
//! The "GE8" variant of the panel uses an Epson S1D15G00 controller
//! behind a 9-bit SPI link. The visible area is 130x130 pixels inside a
//! 132x132 RAM.

mod ge8;

pub use ge8::{Ge8, Ge8Config, HEIGHT, WIDTH};
