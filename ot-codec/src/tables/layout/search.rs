//! Binary searches over the sorted arrays of layout tables
//!
//! Searches return `Ok(index)` on a match and `Err(insertion_point)`
//! otherwise, where inserting at `insertion_point` keeps the array sorted.

use font_types::{GlyphId16, Tag};

/// A record keyed by a tag: script, language system and feature records.
pub trait Tagged {
    fn tag(&self) -> Tag;
}

/// A record covering an inclusive range of glyphs.
pub trait GlyphRange {
    fn start(&self) -> GlyphId16;
    fn end(&self) -> GlyphId16;
}

/// Find `tag` in a list of records sorted by tag.
pub fn search_tag<T: Tagged>(records: &[T], tag: Tag) -> Result<usize, usize> {
    records.binary_search_by_key(&tag, Tagged::tag)
}

/// Find `value` in a sorted list.
pub fn bin_search<T: Ord>(sorted: &[T], value: &T) -> Result<usize, usize> {
    sorted.binary_search(value)
}

/// Find the range containing `glyph` in a list of ranges sorted by start.
pub fn search_range<R: GlyphRange>(ranges: &[R], glyph: GlyphId16) -> Option<&R> {
    match ranges.binary_search_by_key(&glyph, GlyphRange::start) {
        Ok(index) => ranges.get(index),
        Err(0) => None,
        Err(index) => ranges.get(index - 1).filter(|range| glyph <= range.end()),
    }
}
