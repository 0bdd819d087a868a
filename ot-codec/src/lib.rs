//! Decoding and re-encoding OpenType fonts
//!
//! This crate reads an sfnt (or a WOFF 1.0 file wrapping one) into an owned
//! graph: the table directory, horizontal metrics, TrueType outlines and the
//! OpenType layout tables. Offsets are resolved while reading, so the graph
//! can be queried and modified freely and then laid out again with
//! [`encode_font`].
//!
//! The layers, from the bottom up:
//!
//! - [`FontData`] and [`Cursor`] do bounds checked big-endian reads.
//! - [`write`] holds the generic table model used to encode everything,
//!   resolving offsets by laying subtables out after their parent.
//! - [`tables`] has a module per supported table.
//! - [`glyph_set`] decodes outlines on demand and resolves composites.
//! - [`Font`] ties the tables together.
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use ot_codec::{font_types::{GlyphId16, Tag}, Font};
//! let font_bytes = std::fs::read(path_to_my_font_file).unwrap();
//! let font = Font::decode(&font_bytes).expect("failed to read font data");
//! let glyphs = [GlyphId16::new(36), GlyphId16::new(37)];
//! let substituted = font.apply_lookups(Tag::new(b"latn"), None, &[Tag::new(b"liga")], &glyphs);
//! println!("{substituted:?}, kerning {}", font.kern(glyphs[0], glyphs[1]));
//! ```

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

mod error;
mod font;
mod font_data;
pub mod glyph_set;
mod read;
pub mod tables;
pub mod write;

pub use error::{EncodeError, Error, InvariantViolation};
pub use font::{decode_font, encode_font, DecodeOptions, Font, Glyph, Outlines};
pub use font_data::{Cursor, FontData};
pub use glyph_set::{GlyphLoading, GlyphSet};
pub use read::{FontRead, FontReadWithArgs, ReadError};
pub use write::{dump_table, FontWrite};

pub extern crate font_types;
