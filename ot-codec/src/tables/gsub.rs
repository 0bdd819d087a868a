//! The [GSUB](https://learn.microsoft.com/en-us/typography/opentype/spec/gsub) table

mod apply;

use font_types::{GlyphId16, Tag};

use super::layout::{
    format_label, ChainedSequenceContext, CoverageTable, Layout, LookupSubtable,
    SequenceContext,
};
use crate::{
    read::{FontRead, FontReadWithArgs, ReadError},
    write::{FontWrite, TableWriter},
    Cursor, FontData,
};

/// 'GSUB'
pub const TAG: Tag = Tag::new(b"GSUB");

/// The glyph substitution table.
pub type Gsub = Layout<SubstitutionSubtable>;

/// A subtable of any GSUB lookup type.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubstitutionSubtable {
    Single(SingleSubst),
    Multiple(MultipleSubst),
    Alternate(AlternateSubst),
    Ligature(LigatureSubst),
    Contextual(SequenceContext),
    ChainContextual(ChainedSequenceContext),
    Extension(ExtensionSubst),
    Reverse(ReverseChainSingleSubst),
}

/// Lookup type 1: replace one glyph with one glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SingleSubst {
    /// Add a delta (modulo 65536) to the glyph id.
    Format1 {
        coverage: CoverageTable,
        delta_glyph_id: i16,
    },
    /// One substitute per coverage index.
    Format2 {
        coverage: CoverageTable,
        substitute_glyph_ids: Vec<GlyphId16>,
    },
}

/// Lookup type 2: replace one glyph with a sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultipleSubst {
    pub coverage: CoverageTable,
    pub sequences: Vec<Vec<GlyphId16>>,
}

/// Lookup type 3: replace one glyph with one of a set of alternates.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlternateSubst {
    pub coverage: CoverageTable,
    pub alternate_sets: Vec<Vec<GlyphId16>>,
}

/// Lookup type 4: replace a sequence of glyphs with one glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LigatureSubst {
    /// Covers the first glyph of each ligature.
    pub coverage: CoverageTable,
    pub ligature_sets: Vec<LigatureSet>,
}

/// Ligatures sharing a first glyph, in order of preference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LigatureSet {
    pub ligatures: Vec<Ligature>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ligature {
    pub ligature_glyph: GlyphId16,
    /// The components after the first.
    pub component_glyph_ids: Vec<GlyphId16>,
}

/// Lookup type 7: a subtable of another type behind a 32-bit offset.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtensionSubst {
    pub extension_lookup_type: u16,
    pub subtable: Box<SubstitutionSubtable>,
}

/// Lookup type 8: single substitution in context, applied from the end of
/// the sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReverseChainSingleSubst {
    pub coverage: CoverageTable,
    /// Nearest glyph first.
    pub backtrack_coverages: Vec<CoverageTable>,
    pub lookahead_coverages: Vec<CoverageTable>,
    pub substitute_glyph_ids: Vec<GlyphId16>,
}

impl SubstitutionSubtable {
    /// The lookup type of this subtable; 7 for an extension.
    pub fn lookup_type(&self) -> u16 {
        match self {
            SubstitutionSubtable::Single(_) => 1,
            SubstitutionSubtable::Multiple(_) => 2,
            SubstitutionSubtable::Alternate(_) => 3,
            SubstitutionSubtable::Ligature(_) => 4,
            SubstitutionSubtable::Contextual(_) => 5,
            SubstitutionSubtable::ChainContextual(_) => 6,
            SubstitutionSubtable::Extension(_) => 7,
            SubstitutionSubtable::Reverse(_) => 8,
        }
    }
}

impl LookupSubtable for SubstitutionSubtable {
    const LOOKUP_TYPES: &'static [u16] = &[1, 2, 3, 4, 5, 6, 7, 8];
    const LOOKUP_TYPE_LABEL: &'static str = "GSUB lookup type";

    fn effective_type(&self) -> u16 {
        match self {
            SubstitutionSubtable::Extension(ext) => ext.extension_lookup_type,
            other => other.lookup_type(),
        }
    }
}

impl SingleSubst {
    pub fn coverage(&self) -> &CoverageTable {
        match self {
            SingleSubst::Format1 { coverage, .. } | SingleSubst::Format2 { coverage, .. } => {
                coverage
            }
        }
    }

    /// The substitute for `glyph`, if it is covered.
    pub fn get(&self, glyph: GlyphId16) -> Option<GlyphId16> {
        let index = self.coverage().get(glyph)?;
        match self {
            SingleSubst::Format1 { delta_glyph_id, .. } => Some(GlyphId16::new(
                glyph.to_u16().wrapping_add(*delta_glyph_id as u16),
            )),
            SingleSubst::Format2 {
                substitute_glyph_ids,
                ..
            } => substitute_glyph_ids.get(index as usize).copied(),
        }
    }
}

impl FontReadWithArgs for SubstitutionSubtable {
    type Args = u16;

    fn read_with_args(data: FontData<'_>, lookup_type: &u16) -> Result<Self, ReadError> {
        match *lookup_type {
            1 => SingleSubst::read(data).map(Self::Single),
            2 => MultipleSubst::read(data).map(Self::Multiple),
            3 => AlternateSubst::read(data).map(Self::Alternate),
            4 => LigatureSubst::read(data).map(Self::Ligature),
            5 => SequenceContext::read_with_args(data, lookup_type).map(Self::Contextual),
            6 => ChainedSequenceContext::read_with_args(data, lookup_type)
                .map(Self::ChainContextual),
            7 => ExtensionSubst::read(data).map(Self::Extension),
            8 => ReverseChainSingleSubst::read(data).map(Self::Reverse),
            other => Err(data.invalid_format(
                0,
                Self::LOOKUP_TYPE_LABEL,
                other,
                Self::LOOKUP_TYPES,
            )),
        }
    }
}

/// Read the format word, failing unless it is 1.
fn expect_format1(cursor: &mut Cursor<'_>, lookup_type: u16) -> Result<(), ReadError> {
    match cursor.read::<u16>()? {
        1 => Ok(()),
        other => Err(cursor.invalid_format(0, format_label(lookup_type), other, &[1])),
    }
}

fn to_glyph_lists(lists: Vec<Vec<u16>>) -> Vec<Vec<GlyphId16>> {
    lists
        .into_iter()
        .map(|list| list.into_iter().map(GlyphId16::new).collect())
        .collect()
}

impl FontRead for SingleSubst {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        match cursor.read::<u16>()? {
            1 => Ok(SingleSubst::Format1 {
                coverage: cursor.read_required_offset16("coverage")?,
                delta_glyph_id: cursor.read()?,
            }),
            2 => {
                let coverage = cursor.read_required_offset16("coverage")?;
                let count = cursor.read::<u16>()? as usize;
                Ok(SingleSubst::Format2 {
                    coverage,
                    substitute_glyph_ids: cursor.read_list(count)?,
                })
            }
            other => Err(cursor.invalid_format(0, format_label(1), other, &[1, 2])),
        }
    }
}

impl FontRead for MultipleSubst {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        expect_format1(&mut cursor, 2)?;
        Ok(MultipleSubst {
            coverage: cursor.read_required_offset16("coverage")?,
            sequences: to_glyph_lists(cursor.read_list_of_lists()?),
        })
    }
}

impl FontRead for AlternateSubst {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        expect_format1(&mut cursor, 3)?;
        Ok(AlternateSubst {
            coverage: cursor.read_required_offset16("coverage")?,
            alternate_sets: to_glyph_lists(cursor.read_list_of_lists()?),
        })
    }
}

impl FontRead for LigatureSubst {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        expect_format1(&mut cursor, 4)?;
        Ok(LigatureSubst {
            coverage: cursor.read_required_offset16("coverage")?,
            ligature_sets: cursor.read_offset16_list("ligature set")?,
        })
    }
}

impl FontRead for LigatureSet {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let ligatures = data.cursor().read_offset16_list("ligature")?;
        Ok(LigatureSet { ligatures })
    }
}

impl FontRead for Ligature {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let ligature_glyph = cursor.read()?;
        let component_count = cursor.read::<u16>()? as usize;
        Ok(Ligature {
            ligature_glyph,
            component_glyph_ids: cursor.read_list(component_count.saturating_sub(1))?,
        })
    }
}

impl FontRead for ExtensionSubst {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        expect_format1(&mut cursor, 7)?;
        let extension_lookup_type: u16 = cursor.read()?;
        if !matches!(extension_lookup_type, 1..=6 | 8) {
            return Err(cursor.invalid_format(
                2,
                "GSUB extension lookup type",
                extension_lookup_type,
                &[1, 2, 3, 4, 5, 6, 8],
            ));
        }
        let offset = cursor.read::<u32>()? as usize;
        let subtable = SubstitutionSubtable::read_with_args(
            data.split_off_checked(offset)?,
            &extension_lookup_type,
        )?;
        Ok(ExtensionSubst {
            extension_lookup_type,
            subtable: Box::new(subtable),
        })
    }
}

impl FontRead for ReverseChainSingleSubst {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        expect_format1(&mut cursor, 8)?;
        let coverage = cursor.read_required_offset16("coverage")?;
        let backtrack_coverages = cursor.read_offset16_list("coverage")?;
        let lookahead_coverages = cursor.read_offset16_list("coverage")?;
        let count = cursor.read::<u16>()? as usize;
        Ok(ReverseChainSingleSubst {
            coverage,
            backtrack_coverages,
            lookahead_coverages,
            substitute_glyph_ids: cursor.read_list(count)?,
        })
    }
}

impl FontWrite for SubstitutionSubtable {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            SubstitutionSubtable::Single(table) => table.write_into(writer),
            SubstitutionSubtable::Multiple(table) => table.write_into(writer),
            SubstitutionSubtable::Alternate(table) => table.write_into(writer),
            SubstitutionSubtable::Ligature(table) => table.write_into(writer),
            SubstitutionSubtable::Contextual(table) => table.write_into(writer),
            SubstitutionSubtable::ChainContextual(table) => table.write_into(writer),
            SubstitutionSubtable::Extension(table) => table.write_into(writer),
            SubstitutionSubtable::Reverse(table) => table.write_into(writer),
        }
    }
}

impl FontWrite for SingleSubst {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            SingleSubst::Format1 {
                coverage,
                delta_glyph_id,
            } => {
                writer.write("format", 1u16);
                writer.write_offset16("coverageOffset", Some(coverage));
                writer.write("deltaGlyphID", *delta_glyph_id);
            }
            SingleSubst::Format2 {
                coverage,
                substitute_glyph_ids,
            } => {
                writer.write("format", 2u16);
                writer.write_offset16("coverageOffset", Some(coverage));
                writer.write_count("glyphCount", substitute_glyph_ids.len());
                writer.write_array("substituteGlyphIDs", substitute_glyph_ids.iter().copied());
            }
        }
    }
}

/// A counted glyph list behind an offset: Sequence and AlternateSet.
struct GlyphSequence<'a>(&'a [GlyphId16]);

impl FontWrite for GlyphSequence<'_> {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_count("glyphCount", self.0.len());
        writer.write_array("glyphIDs", self.0.iter().copied());
    }
}

fn write_sequences(
    writer: &mut TableWriter,
    count_name: &'static str,
    name: &'static str,
    lists: &[Vec<GlyphId16>],
) {
    writer.write_count(count_name, lists.len());
    for list in lists {
        writer.write_offset16(name, Some(&GlyphSequence(list)));
    }
}

impl FontWrite for MultipleSubst {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write("format", 1u16);
        writer.write_offset16("coverageOffset", Some(&self.coverage));
        write_sequences(writer, "sequenceCount", "sequenceOffsets", &self.sequences);
    }
}

impl FontWrite for AlternateSubst {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write("format", 1u16);
        writer.write_offset16("coverageOffset", Some(&self.coverage));
        write_sequences(
            writer,
            "alternateSetCount",
            "alternateSetOffsets",
            &self.alternate_sets,
        );
    }
}

impl FontWrite for LigatureSubst {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write("format", 1u16);
        writer.write_offset16("coverageOffset", Some(&self.coverage));
        writer.write_offset16_list(
            "ligatureSetCount",
            "ligatureSetOffsets",
            &self.ligature_sets,
        );
    }
}

impl FontWrite for LigatureSet {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_offset16_list("ligatureCount", "ligatureOffsets", &self.ligatures);
    }
}

impl FontWrite for Ligature {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write("ligatureGlyph", self.ligature_glyph);
        writer.write_count("componentCount", self.component_glyph_ids.len() + 1);
        writer.write_array("componentGlyphIDs", self.component_glyph_ids.iter().copied());
    }
}

impl FontWrite for ExtensionSubst {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write("format", 1u16);
        writer.write("extensionLookupType", self.extension_lookup_type);
        writer.write_offset32("extensionOffset", Some(self.subtable.as_ref()));
    }
}

impl FontWrite for ReverseChainSingleSubst {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write("format", 1u16);
        writer.write_offset16("coverageOffset", Some(&self.coverage));
        writer.write_offset16_list(
            "backtrackGlyphCount",
            "backtrackCoverageOffsets",
            &self.backtrack_coverages,
        );
        writer.write_offset16_list(
            "lookaheadGlyphCount",
            "lookaheadCoverageOffsets",
            &self.lookahead_coverages,
        );
        writer.write_count("glyphCount", self.substitute_glyph_ids.len());
        writer.write_array(
            "substituteGlyphIDs",
            self.substitute_glyph_ids.iter().copied(),
        );
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::layout::{self, FeatureDef, LookupDef, ScriptDef};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::write::dump_table;

    fn gid(raw: u16) -> GlyphId16 {
        GlyphId16::new(raw)
    }

    fn read(lookup_type: u16, bytes: &[u8]) -> SubstitutionSubtable {
        SubstitutionSubtable::read_with_args(FontData::new(bytes), &lookup_type).unwrap()
    }

    #[test]
    fn single_delta_wraps() {
        let bytes = layout::single_subst_delta(&[5, 0xFFFF], 3);
        let SubstitutionSubtable::Single(table) = read(1, &bytes) else {
            panic!("wrong subtable");
        };
        assert_eq!(table.get(gid(5)), Some(gid(8)));
        assert_eq!(table.get(gid(0xFFFF)), Some(gid(2)));
        assert_eq!(table.get(gid(6)), None);
        assert_eq!(dump_table(&table).unwrap(), bytes);
    }

    #[test]
    fn single_list() {
        let bytes = layout::single_subst_list(&[(3, 30), (4, 40)]);
        let SubstitutionSubtable::Single(table) = read(1, &bytes) else {
            panic!("wrong subtable");
        };
        assert_eq!(table.get(gid(4)), Some(gid(40)));
        assert_eq!(dump_table(&table).unwrap(), bytes);
    }

    #[test]
    fn multiple_and_alternate_share_layout() {
        let bytes = layout::sequence_subst(&[7, 9], &[&[1, 2, 3], &[]]);
        let multiple = read(2, &bytes);
        let alternate = read(3, &bytes);
        let SubstitutionSubtable::Multiple(table) = &multiple else {
            panic!("wrong subtable");
        };
        assert_eq!(table.sequences, vec![vec![gid(1), gid(2), gid(3)], vec![]]);
        assert!(matches!(alternate, SubstitutionSubtable::Alternate(_)));
        assert_eq!(dump_table(&multiple).unwrap(), bytes);
        assert_eq!(dump_table(&alternate).unwrap(), bytes);
    }

    #[test]
    fn ligatures() {
        let bytes = layout::ligature_subst(&[(10, &[(100, &[11, 12]), (101, &[11])])]);
        let SubstitutionSubtable::Ligature(table) = read(4, &bytes) else {
            panic!("wrong subtable");
        };
        assert_eq!(
            table.ligature_sets[0].ligatures,
            vec![
                Ligature {
                    ligature_glyph: gid(100),
                    component_glyph_ids: vec![gid(11), gid(12)],
                },
                Ligature {
                    ligature_glyph: gid(101),
                    component_glyph_ids: vec![gid(11)],
                },
            ]
        );
        assert_eq!(dump_table(&table).unwrap(), bytes);
    }

    #[test]
    fn extension_redirects() {
        let inner = layout::single_subst_delta(&[5], 1);
        let bytes = layout::extension(1, &inner);
        let table = read(7, &bytes);
        assert_eq!(table.lookup_type(), 7);
        assert_eq!(table.effective_type(), 1);
        assert_eq!(dump_table(&table).unwrap(), bytes);
    }

    #[test]
    fn context_format4_is_an_error() {
        let context = [0u8, 4, 0, 0];
        let table = layout::layout_table(
            &[ScriptDef {
                tag: b"latn",
                features: &[0],
                languages: &[],
            }],
            &[FeatureDef {
                tag: b"calt",
                lookups: &[0],
            }],
            &[LookupDef::new(5, vec![context.to_vec()])],
        );
        let err = Gsub::read(FontData::new(&table)).unwrap_err();
        // subtable begins after the 8 byte lookup header
        let lookup_list_start = table.len() - 8 - context.len() - 4;
        assert_eq!(
            err,
            ReadError::InvalidFormat {
                offset: (lookup_list_start + 4 + 8) as u32,
                what: "lookup type 5 format",
                found: 4,
                expected: &[1, 2, 3],
            }
        );
    }

    #[test]
    fn reverse_chain_round_trip() {
        let table = ReverseChainSingleSubst {
            coverage: CoverageTable::from_glyphs([gid(5), gid(6)]),
            backtrack_coverages: vec![CoverageTable::from_glyphs([gid(1)])],
            lookahead_coverages: Vec::new(),
            substitute_glyph_ids: vec![gid(50), gid(60)],
        };
        let bytes = dump_table(&table).unwrap();
        assert_eq!(ReverseChainSingleSubst::read(FontData::new(&bytes)).unwrap(), table);
    }

    #[test]
    fn bad_single_format() {
        let err = SingleSubst::read(FontData::new(&[0, 3, 0, 0])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "lookup type 1 format must be 1 or 2, found 3 at offset 0"
        );
    }
}
