//! Glyph Identifiers
//!
//! Although these are treated as u16s in font files, we choose to represent
//! them as a distinct type.

/// A 16-bit glyph identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlyphId16(u16);

impl GlyphId16 {
    /// The identifier reserved for unknown glyphs
    pub const NOTDEF: GlyphId16 = GlyphId16(0);

    /// Construct a new `GlyphId16`.
    pub const fn new(raw: u16) -> Self {
        GlyphId16(raw)
    }

    /// The identifier as a u16.
    pub const fn to_u16(self) -> u16 {
        self.0
    }

    /// The identifier as a usize, for indexing.
    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u16> for GlyphId16 {
    fn from(value: u16) -> Self {
        GlyphId16(value)
    }
}

impl std::fmt::Display for GlyphId16 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GID_{}", self.0)
    }
}

crate::newtype_scalar!(GlyphId16, u16);
