//! The [maxp (Maximum Profile)](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table

use font_types::Tag;

use crate::{
    read::{FontRead, ReadError},
    write::{FieldType, FontWrite, TableData, TableWriter},
    FontData,
};

/// 'maxp'
pub const TAG: Tag = Tag::new(b"maxp");

const VERSION_0_5: u32 = 0x0000_5000;
const VERSION_1_0: u32 = 0x0001_0000;

const SCHEMA_0_5: &[(&str, FieldType)] = &[("version", FieldType::U32), ("numGlyphs", FieldType::U16)];

const SCHEMA_1_0: &[(&str, FieldType)] = &[
    ("version", FieldType::U32),
    ("numGlyphs", FieldType::U16),
    ("maxPoints", FieldType::U16),
    ("maxContours", FieldType::U16),
    ("maxCompositePoints", FieldType::U16),
    ("maxCompositeContours", FieldType::U16),
    ("maxZones", FieldType::U16),
    ("maxTwilightPoints", FieldType::U16),
    ("maxStorage", FieldType::U16),
    ("maxFunctionDefs", FieldType::U16),
    ("maxInstructionDefs", FieldType::U16),
    ("maxStackElements", FieldType::U16),
    ("maxSizeOfInstructions", FieldType::U16),
    ("maxComponentElements", FieldType::U16),
    ("maxComponentDepth", FieldType::U16),
];

/// The maximum profile; version 0.5 carries only the glyph count.
#[derive(Clone, Debug, PartialEq)]
pub struct Maxp {
    fields: TableData,
}

impl Maxp {
    pub fn fields(&self) -> &TableData {
        &self.fields
    }

    pub fn num_glyphs(&self) -> u16 {
        self.fields.get_u16("numGlyphs").unwrap_or_default()
    }
}

impl FontRead for Maxp {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let version: u32 = data.read_at(0)?;
        let schema = match version {
            VERSION_0_5 => SCHEMA_0_5,
            VERSION_1_0 => SCHEMA_1_0,
            // only the high word is checked by most readers
            _ if version >> 16 == 1 => SCHEMA_1_0,
            _ => {
                return Err(ReadError::MalformedData {
                    offset: data.absolute_pos(0),
                    what: "maxp version",
                })
            }
        };
        TableData::read_with_schema(data, "maxp", schema).map(|fields| Maxp { fields })
    }
}

impl FontWrite for Maxp {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_fields(&self.fields)
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::fonts;

    use super::*;

    #[test]
    fn both_versions() {
        let v1 = fonts::maxp(12);
        let v05 = fonts::maxp_cff(7);
        assert_eq!(Maxp::read(FontData::new(&v1)).unwrap().num_glyphs(), 12);
        assert_eq!(Maxp::read(FontData::new(&v05)).unwrap().num_glyphs(), 7);
        assert_eq!(Maxp::read(FontData::new(&v05)).unwrap().fields().header_size(), 6);
    }
}
