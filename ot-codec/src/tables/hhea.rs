//! The [hhea (Horizontal Header)](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table

use font_types::Tag;

use crate::{
    read::{FontRead, ReadError},
    write::{FieldType, FontWrite, TableData, TableWriter},
    FontData,
};

/// 'hhea'
pub const TAG: Tag = Tag::new(b"hhea");

const SCHEMA: &[(&str, FieldType)] = &[
    ("version", FieldType::Fixed),
    ("ascender", FieldType::I16),
    ("descender", FieldType::I16),
    ("lineGap", FieldType::I16),
    ("advanceWidthMax", FieldType::U16),
    ("minLeftSideBearing", FieldType::I16),
    ("minRightSideBearing", FieldType::I16),
    ("xMaxExtent", FieldType::I16),
    ("caretSlopeRise", FieldType::I16),
    ("caretSlopeRun", FieldType::I16),
    ("caretOffset", FieldType::I16),
    ("reserved1", FieldType::I16),
    ("reserved2", FieldType::I16),
    ("reserved3", FieldType::I16),
    ("reserved4", FieldType::I16),
    ("metricDataFormat", FieldType::I16),
    ("numberOfHMetrics", FieldType::U16),
];

#[derive(Clone, Debug, PartialEq)]
pub struct Hhea {
    fields: TableData,
}

impl Hhea {
    pub fn fields(&self) -> &TableData {
        &self.fields
    }

    pub fn ascender(&self) -> i16 {
        self.fields.get_i16("ascender").unwrap_or_default()
    }

    pub fn descender(&self) -> i16 {
        self.fields.get_i16("descender").unwrap_or_default()
    }

    pub fn number_of_h_metrics(&self) -> u16 {
        self.fields.get_u16("numberOfHMetrics").unwrap_or_default()
    }
}

impl FontRead for Hhea {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        TableData::read_with_schema(data, "hhea", SCHEMA).map(|fields| Hhea { fields })
    }
}

impl FontWrite for Hhea {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_fields(&self.fields)
    }
}
