//! The generic table model, used for encoding and for schema-driven reads
//!
//! Every table is written as a tree of [`TableData`] nodes: an ordered list
//! of named fields, where offset fields own the subtable they point to.
//! Offsets are relative to the start of the node that holds them.
//!
//! Encoding flattens the tree into a graph in which identical subtables are
//! shared, then orders the graph so that every offset fits its field. See
//! the `graph` module for the packing strategy.

use font_types::{F2Dot14, Fixed, Scalar, Tag};

use crate::error::EncodeError;

mod graph;

use graph::Graph;
use crate::font_data::FontData;
use crate::read::ReadError;

/// A type that that can be written out as part of a font file.
///
/// This both handles writing big-endian fields and describing the
/// relationship between tables and their subtables.
pub trait FontWrite {
    /// Write our fields and subtables into this [`TableWriter`].
    fn write_into(&self, writer: &mut TableWriter);
}

/// Builds a [`TableData`] tree from [`FontWrite`] implementations.
#[derive(Debug)]
pub struct TableWriter {
    /// Tables currently being written; subtables are pushed as they are
    /// encountered.
    stack: Vec<TableData>,
    error: Option<EncodeError>,
}

/// A named-field record: one node of an encoded table tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableData {
    name: &'static str,
    fields: Vec<Field>,
}

/// A single named field of a [`TableData`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub value: FieldValue,
}

/// The value of a field.
///
/// Offsets own the table they point to; `None` is written as a null offset.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    I64(i64),
    Tag(Tag),
    F2Dot14(F2Dot14),
    Fixed(Fixed),
    Bytes(Vec<u8>),
    Offset16(Option<Box<TableData>>),
    Offset32(Option<Box<TableData>>),
}

/// The type of a scalar field, used to describe a table layout for
/// [`TableData::read_with_schema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    I64,
    Tag,
    F2Dot14,
    Fixed,
}

/// Attempt to serialize a table.
pub fn dump_table<T: FontWrite>(table: &T) -> Result<Vec<u8>, EncodeError> {
    let data = TableWriter::write_table(table, short_type_name::<T>())?;
    let bytes = data.encode()?;
    log::debug!("encoded {} ({} bytes)", data.name, bytes.len());
    Ok(bytes)
}

impl TableWriter {
    fn new(name: &'static str) -> Self {
        TableWriter {
            stack: vec![TableData::new(name)],
            error: None,
        }
    }

    /// Build the tree for a table, without encoding it.
    pub fn write_table<T: FontWrite>(
        table: &T,
        name: &'static str,
    ) -> Result<TableData, EncodeError> {
        let mut writer = TableWriter::new(name);
        table.write_into(&mut writer);
        writer.finish()
    }

    fn finish(mut self) -> Result<TableData, EncodeError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        debug_assert_eq!(self.stack.len(), 1);
        Ok(self.stack.pop().unwrap_or_default())
    }

    fn current(&mut self) -> &mut TableData {
        if self.stack.is_empty() {
            self.stack.push(TableData::default());
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn subtable<T: FontWrite>(&mut self, table: &T) -> Box<TableData> {
        self.stack.push(TableData::new(short_type_name::<T>()));
        table.write_into(self);
        Box::new(self.stack.pop().unwrap_or_default())
    }

    fn record_error(&mut self, error: EncodeError) {
        self.error.get_or_insert(error);
    }

    fn table_name(&self) -> &'static str {
        self.stack.last().map(|t| t.name).unwrap_or_default()
    }

    /// Write a single scalar field.
    pub fn write(&mut self, name: &'static str, value: impl Into<FieldValue>) {
        self.current().push(name, value);
    }

    /// Write a u16 count, recording an error if `count` does not fit.
    pub fn write_count(&mut self, name: &'static str, count: usize) {
        match u16::try_from(count) {
            Ok(count) => self.write(name, count),
            Err(_) => {
                let table = self.table_name();
                self.record_error(EncodeError::CountOverflow {
                    table,
                    field: name,
                    count,
                });
                self.write(name, u16::MAX);
            }
        }
    }

    /// Write an array of scalars, without a count.
    pub fn write_array<T: Scalar>(&mut self, name: &'static str, items: impl IntoIterator<Item = T>) {
        let mut bytes = Vec::new();
        for item in items {
            bytes.extend_from_slice(item.to_raw().as_ref());
        }
        self.write(name, FieldValue::Bytes(bytes));
    }

    /// Write a u16 count followed by the values.
    pub fn write_u16_list(&mut self, count_name: &'static str, name: &'static str, items: &[u16]) {
        self.write_count(count_name, items.len());
        self.write_array(name, items.iter().copied());
    }

    /// Write raw bytes.
    pub fn write_bytes(&mut self, name: &'static str, bytes: &[u8]) {
        self.write(name, FieldValue::Bytes(bytes.to_vec()));
    }

    /// Write a 16-bit offset to `table`, which is laid out after this table.
    pub fn write_offset16<T: FontWrite>(&mut self, name: &'static str, table: Option<&T>) {
        let value = table.map(|table| self.subtable(table));
        self.write(name, FieldValue::Offset16(value));
    }

    /// Write a 32-bit offset to `table`.
    pub fn write_offset32<T: FontWrite>(&mut self, name: &'static str, table: Option<&T>) {
        let value = table.map(|table| self.subtable(table));
        self.write(name, FieldValue::Offset32(value));
    }

    /// Write a u16 count followed by a 16-bit offset to each table.
    pub fn write_offset16_list<T: FontWrite>(
        &mut self,
        count_name: &'static str,
        name: &'static str,
        tables: &[T],
    ) {
        self.write_count(count_name, tables.len());
        for table in tables {
            self.write_offset16(name, Some(table));
        }
    }

    /// Write every field of an existing node into the current table.
    pub fn write_fields(&mut self, data: &TableData) {
        self.current().fields.extend(data.fields.iter().cloned());
    }
}

impl TableData {
    /// Create an empty node with this name.
    pub fn new(name: &'static str) -> Self {
        TableData {
            name,
            fields: Vec::new(),
        }
    }

    /// The name of the table, used in error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Append a field.
    pub fn push(&mut self, name: &'static str, value: impl Into<FieldValue>) {
        self.fields.push(Field {
            name,
            value: value.into(),
        });
    }

    /// The value of the first field with this name.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Replace the value of the first field with this name.
    ///
    /// Returns `false` if there is no such field.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn get_u16(&self, name: &str) -> Option<u16> {
        match self.get(name)? {
            FieldValue::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_i16(&self, name: &str) -> Option<i16> {
        match self.get(name)? {
            FieldValue::I16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn get_u32(&self, name: &str) -> Option<u32> {
        match self.get(name)? {
            FieldValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// Populate a node by reading each field of `schema` in order.
    pub fn read_with_schema(
        data: FontData,
        name: &'static str,
        schema: &[(&'static str, FieldType)],
    ) -> Result<TableData, ReadError> {
        let mut cursor = data.cursor();
        let mut table = TableData::new(name);
        for (field, ty) in schema {
            let value = match ty {
                FieldType::U8 => FieldValue::U8(cursor.read()?),
                FieldType::I8 => FieldValue::I8(cursor.read()?),
                FieldType::U16 => FieldValue::U16(cursor.read()?),
                FieldType::I16 => FieldValue::I16(cursor.read()?),
                FieldType::U32 => FieldValue::U32(cursor.read()?),
                FieldType::I32 => FieldValue::I32(cursor.read()?),
                FieldType::I64 => FieldValue::I64(cursor.read()?),
                FieldType::Tag => FieldValue::Tag(cursor.read()?),
                FieldType::F2Dot14 => FieldValue::F2Dot14(cursor.read()?),
                FieldType::Fixed => FieldValue::Fixed(cursor.read()?),
            };
            table.push(field, value);
        }
        Ok(table)
    }

    /// The size of the fields of this node, excluding subtables.
    pub fn header_size(&self) -> usize {
        self.fields.iter().map(|field| field.value.size()).sum()
    }

    /// The size of this node and all of its subtables, counting shared
    /// subtables once per offset.
    ///
    /// This is an upper bound on the encoded length.
    pub fn size(&self) -> usize {
        self.header_size()
            + self
                .subtables()
                .map(|table| table.size())
                .sum::<usize>()
    }

    fn subtables(&self) -> impl Iterator<Item = &TableData> {
        self.fields.iter().filter_map(|field| match &field.value {
            FieldValue::Offset16(Some(table)) | FieldValue::Offset32(Some(table)) => {
                Some(table.as_ref())
            }
            _ => None,
        })
    }

    /// Serialize this node and its subtables.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut graph = Graph::new(self);
        graph.pack()?;
        Ok(graph.serialize())
    }
}

impl FontWrite for TableData {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_fields(self)
    }
}

impl FieldValue {
    /// The number of bytes this field occupies in its table's header.
    pub fn size(&self) -> usize {
        match self {
            FieldValue::U8(_) | FieldValue::I8(_) => 1,
            FieldValue::U16(_)
            | FieldValue::I16(_)
            | FieldValue::F2Dot14(_)
            | FieldValue::Offset16(_) => 2,
            FieldValue::U32(_)
            | FieldValue::I32(_)
            | FieldValue::Tag(_)
            | FieldValue::Fixed(_)
            | FieldValue::Offset32(_) => 4,
            FieldValue::I64(_) => 8,
            FieldValue::Bytes(bytes) => bytes.len(),
        }
    }

    fn write_scalar(&self, out: &mut Vec<u8>) {
        match self {
            FieldValue::U8(v) => out.push(*v),
            FieldValue::I8(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::U16(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::I16(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::U32(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::I32(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::I64(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::Tag(v) => out.extend_from_slice(&v.to_be_bytes()),
            FieldValue::F2Dot14(v) => out.extend_from_slice(&v.to_raw()),
            FieldValue::Fixed(v) => out.extend_from_slice(&v.to_raw()),
            FieldValue::Bytes(bytes) => out.extend_from_slice(bytes),
            FieldValue::Offset16(_) => out.extend_from_slice(&[0, 0]),
            FieldValue::Offset32(_) => out.extend_from_slice(&[0, 0, 0, 0]),
        }
    }
}

macro_rules! field_value_from {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for FieldValue {
            fn from(src: $ty) -> FieldValue {
                FieldValue::$variant(src)
            }
        }
    };
}

field_value_from!(u8, U8);
field_value_from!(i8, I8);
field_value_from!(u16, U16);
field_value_from!(i16, I16);
field_value_from!(u32, U32);
field_value_from!(i32, I32);
field_value_from!(i64, I64);
field_value_from!(Tag, Tag);
field_value_from!(F2Dot14, F2Dot14);
field_value_from!(Fixed, Fixed);

impl From<font_types::GlyphId16> for FieldValue {
    fn from(src: font_types::GlyphId16) -> FieldValue {
        FieldValue::U16(src.to_u16())
    }
}

/// `ot_codec::tables::layout::CoverageTable` -> `CoverageTable`
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Leaf(u16);

    impl FontWrite for Leaf {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write("value", self.0);
        }
    }

    struct Parent {
        tag: Tag,
        first: Leaf,
        second: Option<Leaf>,
        third: Leaf,
    }

    impl FontWrite for Parent {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write("tag", self.tag);
            writer.write_offset16("first", Some(&self.first));
            writer.write_offset16("second", self.second.as_ref());
            writer.write_offset32("third", Some(&self.third));
        }
    }

    #[test]
    fn subtables_follow_header() {
        let table = Parent {
            tag: Tag::new(b"test"),
            first: Leaf(0xaaaa),
            second: None,
            third: Leaf(0xbbbb),
        };
        let bytes = dump_table(&table).unwrap();
        assert_eq!(
            bytes,
            vec![
                b't', b'e', b's', b't', // tag
                0, 12, // first
                0, 0, // second (null)
                0, 0, 0, 14, // third
                0xaa, 0xaa, //
                0xbb, 0xbb,
            ]
        );
    }

    #[test]
    fn size_includes_subtables() {
        let table = Parent {
            tag: Tag::new(b"test"),
            first: Leaf(1),
            second: Some(Leaf(2)),
            third: Leaf(3),
        };
        let data = TableWriter::write_table(&table, "Parent").unwrap();
        assert_eq!(data.header_size(), 12);
        assert_eq!(data.size(), 18);
        assert_eq!(data.encode().unwrap().len(), data.size());
    }

    struct Big(Vec<u8>);

    impl FontWrite for Big {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write_bytes("payload", &self.0);
        }
    }

    struct TwoBig(Big, Big);

    impl FontWrite for TwoBig {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write_offset16("a", Some(&self.0));
            writer.write_offset16("b", Some(&self.1));
        }
    }

    #[test]
    fn offset16_overflow() {
        let table = TwoBig(Big(vec![0; 0x10000]), Big(vec![1; 0x10000]));
        let err = dump_table(&table).unwrap_err();
        assert_eq!(
            err,
            EncodeError::OffsetOverflow {
                table: "TwoBig",
                field: "b",
                offset: 0x10004,
            }
        );
    }

    struct Counted(usize);

    impl FontWrite for Counted {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write_count("count", self.0);
        }
    }

    #[test]
    fn count_overflow() {
        assert!(dump_table(&Counted(70_000)).is_err());
        assert_eq!(dump_table(&Counted(7)).unwrap(), vec![0, 7]);
    }

    #[test]
    fn schema_read_and_reencode() {
        let bytes = [0x00, 0x01, 0x00, 0x00, 0x03, 0xe8, 0xff, 0x38];
        let schema = [
            ("version", FieldType::Fixed),
            ("unitsPerEm", FieldType::U16),
            ("descender", FieldType::I16),
        ];
        let mut table = TableData::read_with_schema(FontData::new(&bytes), "test", &schema).unwrap();
        assert_eq!(table.get_u16("unitsPerEm"), Some(1000));
        assert_eq!(table.get_i16("descender"), Some(-200));
        assert_eq!(table.encode().unwrap(), bytes);
        assert!(table.set("unitsPerEm", 2048u16));
        assert!(!table.set("missing", 0u16));
        assert_eq!(&table.encode().unwrap()[4..6], &[0x08, 0x00]);
    }

    #[test]
    fn short_names() {
        assert_eq!(short_type_name::<Parent>(), "Parent");
        assert_eq!(short_type_name::<Vec<u8>>(), "Vec");
    }
}
