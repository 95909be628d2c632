//! Driver capability descriptors
//!
//! Each adapter type publishes one immutable [`DriverCapabilities`]
//! describing its native primitives and pixel format. The drawing layer
//! reads it once to decide how every operation is carried out.

use crate::format::PixelFormat;

/// A primitive operation an adapter may implement natively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Primitive {
    /// Set a single pixel
    DrawPixel = 0,
    /// Fill a rectangle with one color
    FillArea = 1,
    /// Transfer a rectangular block of packed pixels
    BlockTransfer = 2,
    /// Open a window and stream pixels into it
    StreamWrite = 3,
    /// Power, orientation, contrast and similar controls
    Control = 4,
}

impl Primitive {
    /// All primitives, in bit order
    pub const ALL: [Primitive; 5] = [
        Primitive::DrawPixel,
        Primitive::FillArea,
        Primitive::BlockTransfer,
        Primitive::StreamWrite,
        Primitive::Control,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }

    /// Whether this primitive puts pixels on the panel
    pub const fn is_drawing(self) -> bool {
        !matches!(self, Primitive::Control)
    }
}

/// A set of [`Primitive`]s, stored as a bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrimitiveSet(u8);

impl PrimitiveSet {
    /// No primitives
    pub const EMPTY: PrimitiveSet = PrimitiveSet(0);

    /// Build a set from a list of primitives
    pub const fn of(primitives: &[Primitive]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < primitives.len() {
            bits |= primitives[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Same set with `primitive` added
    pub const fn with(self, primitive: Primitive) -> Self {
        Self(self.0 | primitive.bit())
    }

    /// Same set with `primitive` removed
    pub const fn without(self, primitive: Primitive) -> Self {
        Self(self.0 & !primitive.bit())
    }

    /// Check membership
    pub const fn contains(self, primitive: Primitive) -> bool {
        self.0 & primitive.bit() != 0
    }

    /// Whether at least one pixel-producing primitive is present
    pub const fn has_drawing(self) -> bool {
        self.without(Primitive::Control).0 != 0
    }

    /// Raw bitmask
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Iterate the primitives in the set
    pub fn iter(self) -> impl Iterator<Item = Primitive> {
        Primitive::ALL.into_iter().filter(move |p| self.contains(*p))
    }
}

/// Static description of a display adapter
///
/// Immutable once constructed; one instance per adapter type (or per
/// configured variant of an adapter type).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverCapabilities {
    /// Human-readable driver name
    pub name: &'static str,
    /// Native pixel format on the wire
    pub format: PixelFormat,
    /// Natively implemented primitives
    pub primitives: PrimitiveSet,
}

impl DriverCapabilities {
    /// Create a capability descriptor
    pub const fn new(name: &'static str, format: PixelFormat, primitives: PrimitiveSet) -> Self {
        Self {
            name,
            format,
            primitives,
        }
    }

    /// Check if a primitive is implemented natively
    pub const fn supports(&self, primitive: Primitive) -> bool {
        self.primitives.contains(primitive)
    }

    /// Whether block transfers can be carried out, natively or via
    /// stream writes
    pub const fn can_transfer_blocks(&self) -> bool {
        self.supports(Primitive::BlockTransfer) || self.supports(Primitive::StreamWrite)
    }
}
