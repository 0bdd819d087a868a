//! The [head (Font Header)](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use font_types::Tag;

use crate::{
    read::{FontRead, ReadError},
    write::{FieldType, FontWrite, TableData, TableWriter},
    FontData,
};

/// 'head'
pub const TAG: Tag = Tag::new(b"head");

/// The value `checksumAdjustment` is computed against.
pub const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

const SCHEMA: &[(&str, FieldType)] = &[
    ("version", FieldType::Fixed),
    ("fontRevision", FieldType::Fixed),
    ("checksumAdjustment", FieldType::U32),
    ("magicNumber", FieldType::U32),
    ("flags", FieldType::U16),
    ("unitsPerEm", FieldType::U16),
    ("created", FieldType::I64),
    ("modified", FieldType::I64),
    ("xMin", FieldType::I16),
    ("yMin", FieldType::I16),
    ("xMax", FieldType::I16),
    ("yMax", FieldType::I16),
    ("macStyle", FieldType::U16),
    ("lowestRecPPEM", FieldType::U16),
    ("fontDirectionHint", FieldType::I16),
    ("indexToLocFormat", FieldType::I16),
    ("glyphDataFormat", FieldType::I16),
];

/// The font header, read field-by-field through the generic table model.
#[derive(Clone, Debug, PartialEq)]
pub struct Head {
    fields: TableData,
}

impl Head {
    /// All fields, by name.
    pub fn fields(&self) -> &TableData {
        &self.fields
    }

    pub fn units_per_em(&self) -> u16 {
        self.fields.get_u16("unitsPerEm").unwrap_or_default()
    }

    /// `true` if `loca` stores 32-bit offsets.
    pub fn long_loca(&self) -> bool {
        self.fields.get_i16("indexToLocFormat") == Some(1)
    }

    pub fn set_index_to_loc_format(&mut self, long: bool) {
        self.fields.set("indexToLocFormat", long as i16);
    }

    pub fn set_checksum_adjustment(&mut self, value: u32) {
        self.fields.set("checksumAdjustment", value);
    }
}

impl FontRead for Head {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        TableData::read_with_schema(data, "head", SCHEMA).map(|fields| Head { fields })
    }
}

impl FontWrite for Head {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_fields(&self.fields)
    }
}

/// The byte position of `checksumAdjustment` within the table.
pub(crate) const CHECKSUM_ADJUSTMENT_POS: usize = 8;

#[cfg(test)]
mod tests {
    use font_test_data::fonts;

    use super::*;
    use crate::write::dump_table;

    #[test]
    fn read_and_patch() {
        let bytes = fonts::head(2048, 0);
        let mut head = Head::read(FontData::new(&bytes)).unwrap();
        assert_eq!(head.units_per_em(), 2048);
        assert!(!head.long_loca());
        head.set_index_to_loc_format(true);
        assert!(head.long_loca());
        let out = dump_table(&head).unwrap();
        assert_eq!(out.len(), 54);
        assert_eq!(&out[50..52], &[0, 1]);
        assert_eq!(&out[..50], &bytes[..50]);
    }
}
