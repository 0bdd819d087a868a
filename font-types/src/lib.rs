//! Common [scalar data types][data types] used in font files
//!
//! These are the leaf values of every OpenType structure: big-endian
//! integers, tags, fixed-point numbers, glyph identifiers and offsets.
//! Everything here is `Copy` and knows how to round-trip through its raw
//! big-endian representation via the [`Scalar`] trait.
//!
//! [data types]: https://docs.microsoft.com/en-us/typography/opentype/spec/otff#data-types

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod bbox;
mod fixed;
mod glyph_id;
mod offset;
mod pen;
mod raw;
mod tag;

pub use bbox::BoundingBox;
pub use fixed::{F2Dot14, Fixed};
pub use glyph_id::GlyphId16;
pub use offset::{Offset16, Offset32};
pub use pen::{OutlinePen, PenCommand};
pub use raw::Scalar;
pub use tag::{InvalidTag, Tag};

/// The SFNT version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: u32 = 0x00010000;
/// The SFNT version for fonts containing CFF outlines (`OTTO`).
pub const CFF_SFNT_VERSION: u32 = 0x4F54544F;
/// The signature of a WOFF 1.0 file (`wOFF`).
pub const WOFF_SIGNATURE: u32 = 0x774F4646;
/// The signature of a WOFF 2.0 file (`wOF2`).
pub const WOFF2_SIGNATURE: u32 = 0x774F4632;
