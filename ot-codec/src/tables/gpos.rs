//! The [GPOS](https://learn.microsoft.com/en-us/typography/opentype/spec/gpos) table
//!
//! Single and pair adjustment, the contextual types and extensions are
//! modelled. Cursive and mark attachment subtables are kept as opaque
//! [`PositioningSubtable::Unsupported`] entries; a table holding any of them
//! cannot be re-encoded from the model.

mod value_record;

use font_types::{GlyphId16, Tag};

use super::layout::{
    format_label, ChainedSequenceContext, ClassDef, CoverageTable, Layout, Lookup,
    LookupSubtable, SequenceContext,
};
use crate::{
    read::{FontRead, FontReadWithArgs, ReadError},
    write::{FontWrite, TableWriter},
    FontData,
};

pub use value_record::ValueRecord;
use value_record::common_format;

/// 'GPOS'
pub const TAG: Tag = Tag::new(b"GPOS");

/// The `kern` feature tag.
pub const KERN: Tag = Tag::new(b"kern");

const PAIR_ADJUSTMENT: u16 = 2;

/// The glyph positioning table.
pub type Gpos = Layout<PositioningSubtable>;

bitflags::bitflags! {
    /// Which fields a [`ValueRecord`] stores.
    #[derive(Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ValueFormat: u16 {
        const X_PLACEMENT = 0x0001;
        const Y_PLACEMENT = 0x0002;
        const X_ADVANCE = 0x0004;
        const Y_ADVANCE = 0x0008;
        const X_PLACEMENT_DEVICE = 0x0010;
        const Y_PLACEMENT_DEVICE = 0x0020;
        const X_ADVANCE_DEVICE = 0x0040;
        const Y_ADVANCE_DEVICE = 0x0080;
        const RESERVED = 0xFF00;
    }
}

flags_scalar!(ValueFormat, u16);

impl ValueFormat {
    /// A mask with all the device/variation index bits set
    pub const ANY_DEVICE_OR_VARIDX: Self = Self::from_bits_truncate(0x00F0);

    /// The number of bytes a [`ValueRecord`] in this format occupies.
    pub fn record_byte_len(self) -> usize {
        self.bits().count_ones() as usize * 2
    }
}

/// A subtable of any GPOS lookup type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PositioningSubtable {
    Single(SinglePos),
    Pair(PairPos),
    Contextual(SequenceContext),
    ChainContextual(ChainedSequenceContext),
    Extension(ExtensionPos),
    /// A cursive or mark attachment subtable, not decoded.
    Unsupported { lookup_type: u16, format: u16 },
}

/// Lookup type 1: adjust the position of one glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SinglePos {
    /// One adjustment for every covered glyph.
    Format1 {
        coverage: CoverageTable,
        value_record: ValueRecord,
    },
    /// One adjustment per coverage index.
    Format2 {
        coverage: CoverageTable,
        value_records: Vec<ValueRecord>,
    },
}

/// Lookup type 2: adjust the positions of a pair of glyphs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairPos {
    /// Explicit pairs, grouped by first glyph.
    Format1 {
        coverage: CoverageTable,
        /// One set per coverage index.
        pair_sets: Vec<PairSet>,
    },
    /// Adjustments indexed by the classes of both glyphs.
    Format2 {
        coverage: CoverageTable,
        class_def1: ClassDef,
        class_def2: ClassDef,
        /// `class1_records[class1][class2]`
        class1_records: Vec<Vec<Class2Record>>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairSet {
    pub records: Vec<PairValueRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairValueRecord {
    pub second_glyph: GlyphId16,
    pub value_record1: ValueRecord,
    pub value_record2: ValueRecord,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Class2Record {
    pub value_record1: ValueRecord,
    pub value_record2: ValueRecord,
}

/// Lookup type 9: a subtable of another type behind a 32-bit offset.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtensionPos {
    pub extension_lookup_type: u16,
    pub subtable: Box<PositioningSubtable>,
}

impl PositioningSubtable {
    /// The subtable this one redirects to, or itself.
    pub fn resolve(&self) -> &PositioningSubtable {
        match self {
            PositioningSubtable::Extension(ext) => ext.subtable.resolve(),
            other => other,
        }
    }

    /// `true` if this subtable, or the one it redirects to, is opaque.
    pub fn is_unsupported(&self) -> bool {
        matches!(self.resolve(), PositioningSubtable::Unsupported { .. })
    }
}

impl LookupSubtable for PositioningSubtable {
    const LOOKUP_TYPES: &'static [u16] = &[1, 2, 3, 4, 5, 6, 7, 8, 9];
    const LOOKUP_TYPE_LABEL: &'static str = "GPOS lookup type";

    fn effective_type(&self) -> u16 {
        match self {
            PositioningSubtable::Single(_) => 1,
            PositioningSubtable::Pair(_) => 2,
            PositioningSubtable::Contextual(_) => 7,
            PositioningSubtable::ChainContextual(_) => 8,
            PositioningSubtable::Extension(ext) => ext.extension_lookup_type,
            PositioningSubtable::Unsupported { lookup_type, .. } => *lookup_type,
        }
    }
}

impl PairPos {
    pub fn coverage(&self) -> &CoverageTable {
        match self {
            PairPos::Format1 { coverage, .. } | PairPos::Format2 { coverage, .. } => coverage,
        }
    }

    /// The value records for this pair.
    ///
    /// `None` if `left` is not covered, or if a format 1 subtable has no
    /// record for `right`.
    pub fn get(&self, left: GlyphId16, right: GlyphId16) -> Option<(ValueRecord, ValueRecord)> {
        let index = self.coverage().get(left)?;
        match self {
            PairPos::Format1 { pair_sets, .. } => pair_sets
                .get(index as usize)?
                .records
                .iter()
                .find(|record| record.second_glyph == right)
                .map(|record| (record.value_record1, record.value_record2)),
            PairPos::Format2 {
                class_def1,
                class_def2,
                class1_records,
                ..
            } => {
                let class1 = class_def1.get(left) as usize;
                let class2 = class_def2.get(right) as usize;
                let record = class1_records
                    .get(class1)
                    .and_then(|row| row.get(class2))
                    .cloned()
                    .unwrap_or_default();
                Some((record.value_record1, record.value_record2))
            }
        }
    }
}

impl Gpos {
    /// The pair adjustment lookups of the `kern` feature.
    pub fn kerning_lookups(
        &self,
        script: Tag,
        language: Option<Tag>,
    ) -> Vec<&Lookup<PositioningSubtable>> {
        self.lookups(script, language, KERN, Some(PAIR_ADJUSTMENT))
    }

    /// `true` if any lookup holds a subtable that was not decoded.
    pub fn has_unsupported_subtables(&self) -> bool {
        self.lookup_list
            .lookups
            .iter()
            .flat_map(|lookup| &lookup.subtables)
            .any(PositioningSubtable::is_unsupported)
    }
}

/// The horizontal kerning between two glyphs.
///
/// Subtables are searched in lookup order. The first format 1 subtable
/// with a record for the pair decides; a format 1 subtable that covers
/// `left` but has no record for `right` passes to the next subtable. The
/// first format 2 subtable covering `left` always decides, with 0 for an
/// empty class pair.
pub fn kerning(lookups: &[&Lookup<PositioningSubtable>], left: GlyphId16, right: GlyphId16) -> i16 {
    for lookup in lookups {
        for subtable in &lookup.subtables {
            let PositioningSubtable::Pair(pair) = subtable.resolve() else {
                continue;
            };
            if let Some((value1, _)) = pair.get(left, right) {
                return value1.x_advance.unwrap_or_default();
            }
        }
    }
    0
}

impl FontReadWithArgs for PositioningSubtable {
    type Args = u16;

    fn read_with_args(data: FontData<'_>, lookup_type: &u16) -> Result<Self, ReadError> {
        match *lookup_type {
            1 => SinglePos::read(data).map(Self::Single),
            2 => PairPos::read(data).map(Self::Pair),
            7 => SequenceContext::read_with_args(data, lookup_type).map(Self::Contextual),
            8 => ChainedSequenceContext::read_with_args(data, lookup_type)
                .map(Self::ChainContextual),
            9 => ExtensionPos::read(data).map(Self::Extension),
            3..=6 => {
                let format: u16 = data.read_at(0)?;
                log::warn!("GPOS lookup type {lookup_type} format {format} kept opaque");
                Ok(PositioningSubtable::Unsupported {
                    lookup_type: *lookup_type,
                    format,
                })
            }
            other => Err(data.invalid_format(
                0,
                Self::LOOKUP_TYPE_LABEL,
                other,
                Self::LOOKUP_TYPES,
            )),
        }
    }
}

impl FontRead for SinglePos {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        match cursor.read::<u16>()? {
            1 => {
                let coverage = cursor.read_required_offset16("coverage")?;
                let format = cursor.read()?;
                Ok(SinglePos::Format1 {
                    coverage,
                    value_record: ValueRecord::read(&mut cursor, format)?,
                })
            }
            2 => {
                let coverage = cursor.read_required_offset16("coverage")?;
                let format = cursor.read()?;
                let count = cursor.read::<u16>()? as usize;
                Ok(SinglePos::Format2 {
                    coverage,
                    value_records: cursor
                        .read_records(count, |cursor| ValueRecord::read(cursor, format))?,
                })
            }
            other => Err(cursor.invalid_format(0, format_label(1), other, &[1, 2])),
        }
    }
}

impl FontRead for PairPos {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if !matches!(format, 1 | 2) {
            return Err(cursor.invalid_format(0, format_label(2), format, &[1, 2]));
        }
        let coverage = cursor.read_required_offset16("coverage")?;
        let formats: (ValueFormat, ValueFormat) = (cursor.read()?, cursor.read()?);
        if format == 1 {
            let count = cursor.read::<u16>()? as usize;
            let pair_sets = cursor.read_records(count, |cursor| {
                let offset = cursor.read::<u16>()? as usize;
                PairSet::read_with_args(data.split_off_checked(offset)?, &formats)
            })?;
            return Ok(PairPos::Format1 {
                coverage,
                pair_sets,
            });
        }
        let class_def1 = cursor.read_required_offset16("class definition")?;
        let class_def2 = cursor.read_required_offset16("class definition")?;
        let class1_count = cursor.read::<u16>()? as usize;
        let class2_count = cursor.read::<u16>()? as usize;
        let class1_records = cursor.read_records(class1_count, |cursor| {
            cursor.read_records(class2_count, |cursor| {
                Ok(Class2Record {
                    value_record1: ValueRecord::read(cursor, formats.0)?,
                    value_record2: ValueRecord::read(cursor, formats.1)?,
                })
            })
        })?;
        Ok(PairPos::Format2 {
            coverage,
            class_def1,
            class_def2,
            class1_records,
        })
    }
}

impl FontReadWithArgs for PairSet {
    /// The value formats of the first and second glyph.
    type Args = (ValueFormat, ValueFormat);

    fn read_with_args(data: FontData<'_>, args: &Self::Args) -> Result<Self, ReadError> {
        let (format1, format2) = *args;
        let mut cursor = data.cursor();
        let count = cursor.read::<u16>()? as usize;
        let records = cursor.read_records(count, |cursor| {
            Ok(PairValueRecord {
                second_glyph: cursor.read()?,
                value_record1: ValueRecord::read(cursor, format1)?,
                value_record2: ValueRecord::read(cursor, format2)?,
            })
        })?;
        Ok(PairSet { records })
    }
}

impl FontRead for ExtensionPos {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 1 {
            return Err(cursor.invalid_format(0, format_label(9), format, &[1]));
        }
        let extension_lookup_type: u16 = cursor.read()?;
        if !matches!(extension_lookup_type, 1..=8) {
            return Err(cursor.invalid_format(
                2,
                "GPOS extension lookup type",
                extension_lookup_type,
                &[1, 2, 3, 4, 5, 6, 7, 8],
            ));
        }
        let offset = cursor.read::<u32>()? as usize;
        let subtable = PositioningSubtable::read_with_args(
            data.split_off_checked(offset)?,
            &extension_lookup_type,
        )?;
        Ok(ExtensionPos {
            extension_lookup_type,
            subtable: Box::new(subtable),
        })
    }
}

impl FontWrite for PositioningSubtable {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            PositioningSubtable::Single(table) => table.write_into(writer),
            PositioningSubtable::Pair(table) => table.write_into(writer),
            PositioningSubtable::Contextual(table) => table.write_into(writer),
            PositioningSubtable::ChainContextual(table) => table.write_into(writer),
            PositioningSubtable::Extension(table) => table.write_into(writer),
            // only the format is known; the font re-emits the source table
            PositioningSubtable::Unsupported { format, .. } => writer.write("format", *format),
        }
    }
}

impl FontWrite for SinglePos {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            SinglePos::Format1 {
                coverage,
                value_record,
            } => {
                let format = value_record.format();
                writer.write("format", 1u16);
                writer.write_offset16("coverageOffset", Some(coverage));
                writer.write("valueFormat", format);
                value_record.write(writer, format);
            }
            SinglePos::Format2 {
                coverage,
                value_records,
            } => {
                let format = common_format(value_records);
                writer.write("format", 2u16);
                writer.write_offset16("coverageOffset", Some(coverage));
                writer.write("valueFormat", format);
                writer.write_count("valueCount", value_records.len());
                for record in value_records {
                    record.write(writer, format);
                }
            }
        }
    }
}

/// A pair set with the value formats of its parent subtable.
struct PairSetWriter<'a> {
    set: &'a PairSet,
    formats: (ValueFormat, ValueFormat),
}

impl FontWrite for PairSetWriter<'_> {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_count("pairValueCount", self.set.records.len());
        for record in &self.set.records {
            writer.write("secondGlyph", record.second_glyph);
            record.value_record1.write(writer, self.formats.0);
            record.value_record2.write(writer, self.formats.1);
        }
    }
}

impl FontWrite for PairPos {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            PairPos::Format1 {
                coverage,
                pair_sets,
            } => {
                let records = || pair_sets.iter().flat_map(|set| &set.records);
                let formats = (
                    common_format(records().map(|record| &record.value_record1)),
                    common_format(records().map(|record| &record.value_record2)),
                );
                writer.write("format", 1u16);
                writer.write_offset16("coverageOffset", Some(coverage));
                writer.write("valueFormat1", formats.0);
                writer.write("valueFormat2", formats.1);
                writer.write_count("pairSetCount", pair_sets.len());
                for set in pair_sets {
                    writer.write_offset16("pairSetOffsets", Some(&PairSetWriter { set, formats }));
                }
            }
            PairPos::Format2 {
                coverage,
                class_def1,
                class_def2,
                class1_records,
            } => {
                let records = || class1_records.iter().flatten();
                let formats = (
                    common_format(records().map(|record| &record.value_record1)),
                    common_format(records().map(|record| &record.value_record2)),
                );
                let class2_count = class1_records.first().map(Vec::len).unwrap_or_default();
                writer.write("format", 2u16);
                writer.write_offset16("coverageOffset", Some(coverage));
                writer.write("valueFormat1", formats.0);
                writer.write("valueFormat2", formats.1);
                writer.write_offset16("classDef1Offset", Some(class_def1));
                writer.write_offset16("classDef2Offset", Some(class_def2));
                writer.write_count("class1Count", class1_records.len());
                writer.write_count("class2Count", class2_count);
                for row in class1_records {
                    // every row must have class2Count entries
                    let padding = class2_count.saturating_sub(row.len());
                    let filler = Class2Record::default();
                    for record in row
                        .iter()
                        .take(class2_count)
                        .chain(std::iter::repeat(&filler).take(padding))
                    {
                        record.value_record1.write(writer, formats.0);
                        record.value_record2.write(writer, formats.1);
                    }
                }
            }
        }
    }
}

impl FontWrite for ExtensionPos {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write("format", 1u16);
        writer.write("extensionLookupType", self.extension_lookup_type);
        writer.write_offset32("extensionOffset", Some(self.subtable.as_ref()));
    }
}

impl From<ValueFormat> for crate::write::FieldValue {
    fn from(src: ValueFormat) -> Self {
        src.bits().into()
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::layout::{self, FeatureDef, LookupDef, ScriptDef};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::write::dump_table;

    fn gid(raw: u16) -> GlyphId16 {
        GlyphId16::new(raw)
    }

    fn gpos(lookups: Vec<LookupDef>) -> Gpos {
        let indices: Vec<u16> = (0..lookups.len() as u16).collect();
        let bytes = layout::layout_table(
            &[ScriptDef {
                tag: b"DFLT",
                features: &[0],
                languages: &[],
            }],
            &[FeatureDef {
                tag: b"kern",
                lookups: &indices,
            }],
            &lookups,
        );
        Gpos::read(FontData::new(&bytes)).unwrap()
    }

    fn kern_table() -> Gpos {
        gpos(vec![LookupDef::new(
            2,
            vec![
                layout::pair_pos_format1(&[(10, &[(11, -50), (12, -20)]), (13, &[(10, 15)])]),
                layout::pair_pos_format1(&[(10, &[(14, -70)])]),
                layout::pair_pos_format2(
                    &[20, 21],
                    &[(20, 21, 1)],
                    &[(30, 31, 1), (32, 32, 2)],
                    &[&[0, 0, 0], &[-5, -30, 40]],
                ),
            ],
        )])
    }

    #[rstest]
    #[case::first_subtable(10, 11, -50)]
    #[case::second_pair(10, 12, -20)]
    #[case::falls_through_to_next_subtable(10, 14, -70)]
    #[case::no_pair_anywhere(10, 99, 0)]
    #[case::other_first_glyph(13, 10, 15)]
    #[case::class_pair(21, 32, 40)]
    #[case::class_zero_second(20, 99, -5)]
    #[case::not_covered(5, 11, 0)]
    fn kerning_pairs(#[case] left: u16, #[case] right: u16, #[case] expected: i16) {
        let table = kern_table();
        let lookups = table.kerning_lookups(Tag::new(b"DFLT"), None);
        assert_eq!(lookups.len(), 1);
        assert_eq!(kerning(&lookups, gid(left), gid(right)), expected);
    }

    #[test]
    fn kerning_through_extension() {
        let pair = layout::pair_pos_format1(&[(1, &[(2, -25)])]);
        let table = gpos(vec![LookupDef::new(9, vec![layout::extension(2, &pair)])]);
        let lookups = table.kerning_lookups(Tag::new(b"DFLT"), None);
        assert_eq!(lookups.len(), 1);
        assert_eq!(kerning(&lookups, gid(1), gid(2)), -25);
    }

    #[test]
    fn pair_pos_round_trip() {
        let bytes = layout::pair_pos_format1(&[(10, &[(11, -50), (12, -20)]), (13, &[(10, 15)])]);
        let table = PairPos::read(FontData::new(&bytes)).unwrap();
        assert_eq!(dump_table(&table).unwrap(), bytes);

        let bytes = layout::pair_pos_format2(
            &[20, 21],
            &[(20, 21, 1)],
            &[(30, 31, 1)],
            &[&[0, 0], &[-5, -30]],
        );
        let table = PairPos::read(FontData::new(&bytes)).unwrap();
        let PairPos::Format2 { class1_records, .. } = &table else {
            panic!("expected format 2");
        };
        assert_eq!(class1_records[1][1].value_record1, ValueRecord::x_advance(-30));
        assert_eq!(dump_table(&table).unwrap(), bytes);
    }

    #[test]
    fn single_pos_formats() {
        let table = SinglePos::Format2 {
            coverage: CoverageTable::from_glyphs([gid(3), gid(4)]),
            value_records: vec![
                ValueRecord::x_advance(10),
                ValueRecord {
                    y_placement: Some(-3),
                    ..Default::default()
                },
            ],
        };
        let bytes = dump_table(&table).unwrap();
        // valueFormat is the union: Y_PLACEMENT | X_ADVANCE
        assert_eq!(&bytes[4..6], &[0, 0x06]);
        let reread = SinglePos::read(FontData::new(&bytes)).unwrap();
        let SinglePos::Format2 { value_records, .. } = reread else {
            panic!("expected format 2");
        };
        assert_eq!(value_records[0].y_placement, Some(0));
        assert_eq!(value_records[0].x_advance, Some(10));
        assert_eq!(value_records[1].y_placement, Some(-3));
    }

    #[test]
    fn mark_attachment_is_opaque() {
        let table = gpos(vec![LookupDef::new(4, vec![vec![0, 1, 0, 0]])]);
        assert!(table.has_unsupported_subtables());
        assert_eq!(
            table.lookup_list.lookups[0].subtables[0],
            PositioningSubtable::Unsupported {
                lookup_type: 4,
                format: 1
            }
        );
    }
}
