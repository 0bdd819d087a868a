//! [Class definition tables](https://learn.microsoft.com/en-us/typography/opentype/spec/chapter2#class-definition-table)

use font_types::GlyphId16;

use super::search::{search_range, GlyphRange};
use crate::{
    read::{FontRead, ReadError},
    write::{FontWrite, TableWriter},
    FontData,
};

/// Assigns glyphs to classes; unlisted glyphs are in class 0.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassDef {
    Format1 {
        start_glyph_id: GlyphId16,
        class_value_array: Vec<u16>,
    },
    Format2 { ranges: Vec<ClassRangeRecord> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassRangeRecord {
    pub start_glyph_id: GlyphId16,
    pub end_glyph_id: GlyphId16,
    pub class: u16,
}

impl GlyphRange for ClassRangeRecord {
    fn start(&self) -> GlyphId16 {
        self.start_glyph_id
    }

    fn end(&self) -> GlyphId16 {
        self.end_glyph_id
    }
}

impl ClassDef {
    /// The class of `glyph`; 0 if the table does not assign one.
    pub fn get(&self, glyph: GlyphId16) -> u16 {
        match self {
            ClassDef::Format1 {
                start_glyph_id,
                class_value_array,
            } => glyph
                .to_u16()
                .checked_sub(start_glyph_id.to_u16())
                .and_then(|index| class_value_array.get(index as usize))
                .copied()
                .unwrap_or(0),
            ClassDef::Format2 { ranges } => search_range(ranges, glyph)
                .map(|range| range.class)
                .unwrap_or(0),
        }
    }
}

impl FontRead for ClassDef {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        match cursor.read::<u16>()? {
            1 => {
                let start_glyph_id = cursor.read()?;
                let count = cursor.read::<u16>()? as usize;
                Ok(ClassDef::Format1 {
                    start_glyph_id,
                    class_value_array: cursor.read_list(count)?,
                })
            }
            2 => {
                let count = cursor.read::<u16>()? as usize;
                let ranges = cursor.read_records(count, |cursor| {
                    Ok(ClassRangeRecord {
                        start_glyph_id: cursor.read()?,
                        end_glyph_id: cursor.read()?,
                        class: cursor.read()?,
                    })
                })?;
                Ok(ClassDef::Format2 { ranges })
            }
            other => Err(cursor.invalid_format(0, "class definition format", other, &[1, 2])),
        }
    }
}

impl FontWrite for ClassDef {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            ClassDef::Format1 {
                start_glyph_id,
                class_value_array,
            } => {
                writer.write("classFormat", 1u16);
                writer.write("startGlyphID", *start_glyph_id);
                writer.write_u16_list("glyphCount", "classValueArray", class_value_array);
            }
            ClassDef::Format2 { ranges } => {
                writer.write("classFormat", 2u16);
                writer.write_count("classRangeCount", ranges.len());
                for range in ranges {
                    writer.write("startGlyphID", range.start_glyph_id);
                    writer.write("endGlyphID", range.end_glyph_id);
                    writer.write("class", range.class);
                }
            }
        }
    }
}
