//! The lookup flag type.
//!
//! Besides single bits this packs a mark attachment class into the high
//! byte, so it is implemented by hand rather than with a flags macro.

use std::ops::{BitOr, BitOrAssign};

/// The [LookupFlag](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#lookupFlag) field of a lookup.
///
/// Flags are carried through a round trip but not interpreted when
/// applying lookups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LookupFlag(u16);

impl BitOr for LookupFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LookupFlag {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl LookupFlag {
    pub const RIGHT_TO_LEFT: Self = LookupFlag(0x0001);
    pub const IGNORE_BASE_GLYPHS: Self = LookupFlag(0x0002);
    pub const IGNORE_LIGATURES: Self = LookupFlag(0x0004);
    pub const IGNORE_MARKS: Self = LookupFlag(0x0008);
    /// The lookup header ends with a `markFilteringSet` index.
    pub const USE_MARK_FILTERING_SET: Self = LookupFlag(0x0010);

    const FLAG_MASK: u16 = 0x1F;

    pub fn empty() -> Self {
        Self(0)
    }

    /// Construct a flag from a raw value, discarding reserved bits.
    pub fn from_bits_truncate(bits: u16) -> Self {
        const VALID_BITS: u16 = !0x00E0;
        Self(bits & VALID_BITS)
    }

    pub fn to_bits(self) -> u16 {
        self.0
    }

    /// `true` if every flag bit of `other` is set in `self`.
    pub const fn contains(&self, other: Self) -> bool {
        let other = other.0 & Self::FLAG_MASK;
        (self.0 & other) == other
    }

    /// If not zero, skips over all marks of attachment type different from specified.
    pub fn mark_attachment_class(self) -> Option<u16> {
        let val = self.0 & 0xff00;
        (val != 0).then_some(val >> 8)
    }

    pub fn set_mark_attachment_class(&mut self, val: u16) {
        let val = (val & 0xff) << 8;
        self.0 = (self.0 & 0xff) | val;
    }
}

font_types::newtype_scalar!(LookupFlag, u16);

impl From<LookupFlag> for crate::write::FieldValue {
    fn from(src: LookupFlag) -> Self {
        src.0.into()
    }
}
