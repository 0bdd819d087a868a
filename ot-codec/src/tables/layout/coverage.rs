//! [Coverage tables](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#coverage-table)

use font_types::GlyphId16;

use super::search::{search_range, GlyphRange};
use crate::{
    read::{FontRead, ReadError},
    write::{FontWrite, TableWriter},
    FontData,
};

/// The set of glyphs a subtable applies to, with each glyph's position in
/// that set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoverageTable {
    /// Glyphs sorted ascending; the coverage index is the list position.
    Format1 { glyphs: Vec<GlyphId16> },
    Format2 { ranges: Vec<RangeRecord> },
}

/// A run of consecutive covered glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeRecord {
    pub start_glyph_id: GlyphId16,
    pub end_glyph_id: GlyphId16,
    /// The coverage index of `start_glyph_id`.
    pub start_coverage_index: u16,
}

impl GlyphRange for RangeRecord {
    fn start(&self) -> GlyphId16 {
        self.start_glyph_id
    }

    fn end(&self) -> GlyphId16 {
        self.end_glyph_id
    }
}

impl CoverageTable {
    /// Build the smaller of the two formats from a set of glyphs.
    pub fn from_glyphs(glyphs: impl IntoIterator<Item = GlyphId16>) -> Self {
        let mut glyphs = glyphs.into_iter().collect::<Vec<_>>();
        glyphs.sort_unstable();
        glyphs.dedup();
        let mut ranges: Vec<RangeRecord> = Vec::new();
        for (i, glyph) in glyphs.iter().enumerate() {
            match ranges.last_mut() {
                Some(range) if range.end_glyph_id.to_u16().checked_add(1) == Some(glyph.to_u16()) => {
                    range.end_glyph_id = *glyph;
                }
                _ => ranges.push(RangeRecord {
                    start_glyph_id: *glyph,
                    end_glyph_id: *glyph,
                    start_coverage_index: i as u16,
                }),
            }
        }
        if ranges.len() * 3 < glyphs.len() {
            CoverageTable::Format2 { ranges }
        } else {
            CoverageTable::Format1 { glyphs }
        }
    }

    /// The coverage index of `glyph`, or `None` if it is not covered.
    pub fn get(&self, glyph: GlyphId16) -> Option<u16> {
        match self {
            CoverageTable::Format1 { glyphs } => {
                glyphs.binary_search(&glyph).ok().map(|index| index as u16)
            }
            CoverageTable::Format2 { ranges } => search_range(ranges, glyph).map(|range| {
                range
                    .start_coverage_index
                    .wrapping_add(glyph.to_u16() - range.start_glyph_id.to_u16())
            }),
        }
    }

    /// Every covered glyph, in coverage index order.
    pub fn iter(&self) -> impl Iterator<Item = GlyphId16> + '_ {
        // all one expression so that we have a single return type
        let (iter1, iter2) = match self {
            CoverageTable::Format1 { glyphs } => (Some(glyphs.iter().copied()), None),
            CoverageTable::Format2 { ranges } => {
                let iter = ranges.iter().flat_map(|range| {
                    (range.start_glyph_id.to_u16()..=range.end_glyph_id.to_u16()).map(GlyphId16::new)
                });
                (None, Some(iter))
            }
        };

        iter1
            .into_iter()
            .flatten()
            .chain(iter2.into_iter().flatten())
    }
}

impl FontRead for CoverageTable {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        match cursor.read::<u16>()? {
            1 => {
                let count = cursor.read::<u16>()? as usize;
                cursor.read_list(count).map(|glyphs| CoverageTable::Format1 { glyphs })
            }
            2 => {
                let count = cursor.read::<u16>()? as usize;
                let ranges = cursor.read_records(count, |cursor| {
                    Ok(RangeRecord {
                        start_glyph_id: cursor.read()?,
                        end_glyph_id: cursor.read()?,
                        start_coverage_index: cursor.read()?,
                    })
                })?;
                Ok(CoverageTable::Format2 { ranges })
            }
            other => Err(cursor.invalid_format(0, "coverage format", other, &[1, 2])),
        }
    }
}

impl FontWrite for CoverageTable {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            CoverageTable::Format1 { glyphs } => {
                writer.write("coverageFormat", 1u16);
                writer.write_count("glyphCount", glyphs.len());
                writer.write_array("glyphArray", glyphs.iter().copied());
            }
            CoverageTable::Format2 { ranges } => {
                writer.write("coverageFormat", 2u16);
                writer.write_count("rangeCount", ranges.len());
                for range in ranges {
                    writer.write("startGlyphID", range.start_glyph_id);
                    writer.write("endGlyphID", range.end_glyph_id);
                    writer.write("startCoverageIndex", range.start_coverage_index);
                }
            }
        }
    }
}
