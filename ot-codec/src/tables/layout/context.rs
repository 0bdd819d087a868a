//! Sequence context subtables, shared by GSUB types 5/6 and GPOS types 7/8

use font_types::GlyphId16;

use super::{format_label, ClassDef, CoverageTable};
use crate::{
    read::{FontRead, FontReadWithArgs, ReadError},
    write::{FontWrite, TableWriter},
    Cursor, FontData,
};

/// A lookup to apply at a position within a matched input sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceLookupRecord {
    pub sequence_index: u16,
    pub lookup_list_index: u16,
}

/// A rule matching glyph ids (format 1) or classes (format 2) after the
/// first input glyph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceRule {
    /// Input values, starting with the second glyph.
    pub input_sequence: Vec<u16>,
    pub seq_lookup_records: Vec<SequenceLookupRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SequenceRuleSet {
    pub rules: Vec<SequenceRule>,
}

/// A contextual lookup subtable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SequenceContext {
    /// Rules keyed by the coverage index of the first glyph.
    Format1 {
        coverage: CoverageTable,
        rule_sets: Vec<Option<SequenceRuleSet>>,
    },
    /// Rules keyed by the class of the first glyph.
    Format2 {
        coverage: CoverageTable,
        class_def: ClassDef,
        class_sets: Vec<Option<SequenceRuleSet>>,
    },
    /// One coverage table per input position.
    Format3 {
        coverages: Vec<CoverageTable>,
        seq_lookup_records: Vec<SequenceLookupRecord>,
    },
}

/// A chained rule: backtrack (nearest glyph first), input after the first
/// glyph, and lookahead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainedSequenceRule {
    pub backtrack_sequence: Vec<u16>,
    pub input_sequence: Vec<u16>,
    pub lookahead_sequence: Vec<u16>,
    pub seq_lookup_records: Vec<SequenceLookupRecord>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainedSequenceRuleSet {
    pub rules: Vec<ChainedSequenceRule>,
}

/// A chained contextual lookup subtable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChainedSequenceContext {
    Format1 {
        coverage: CoverageTable,
        rule_sets: Vec<Option<ChainedSequenceRuleSet>>,
    },
    Format2 {
        coverage: CoverageTable,
        backtrack_class_def: ClassDef,
        input_class_def: ClassDef,
        lookahead_class_def: ClassDef,
        class_sets: Vec<Option<ChainedSequenceRuleSet>>,
    },
    Format3 {
        backtrack_coverages: Vec<CoverageTable>,
        input_coverages: Vec<CoverageTable>,
        lookahead_coverages: Vec<CoverageTable>,
        seq_lookup_records: Vec<SequenceLookupRecord>,
    },
}

/// A successful context match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextMatch<'a> {
    /// The number of input glyphs, including the first.
    pub input_len: usize,
    pub records: &'a [SequenceLookupRecord],
}

fn match_forward(
    glyphs: &[GlyphId16],
    start: usize,
    len: usize,
    mut matches: impl FnMut(usize, GlyphId16) -> bool,
) -> bool {
    (0..len).all(|i| {
        glyphs
            .get(start + i)
            .is_some_and(|glyph| matches(i, *glyph))
    })
}

fn match_backward(
    glyphs: &[GlyphId16],
    pos: usize,
    len: usize,
    mut matches: impl FnMut(usize, GlyphId16) -> bool,
) -> bool {
    (0..len).all(|i| {
        pos.checked_sub(i + 1)
            .and_then(|idx| glyphs.get(idx))
            .is_some_and(|glyph| matches(i, *glyph))
    })
}

fn covered(coverages: &[CoverageTable]) -> impl FnMut(usize, GlyphId16) -> bool + '_ {
    move |i, glyph| coverages[i].get(glyph).is_some()
}

impl SequenceContext {
    /// Match this subtable against `glyphs` starting at `pos`.
    pub fn match_at(&self, glyphs: &[GlyphId16], pos: usize) -> Option<ContextMatch<'_>> {
        let first = *glyphs.get(pos)?;
        match self {
            SequenceContext::Format1 {
                coverage,
                rule_sets,
            } => {
                let index = coverage.get(first)?;
                let set = rule_sets.get(index as usize)?.as_ref()?;
                set.rules.iter().find_map(|rule| {
                    let input = &rule.input_sequence;
                    match_forward(glyphs, pos + 1, input.len(), |i, glyph| {
                        glyph.to_u16() == input[i]
                    })
                    .then_some(ContextMatch {
                        input_len: input.len() + 1,
                        records: &rule.seq_lookup_records,
                    })
                })
            }
            SequenceContext::Format2 {
                coverage,
                class_def,
                class_sets,
            } => {
                coverage.get(first)?;
                let set = class_sets.get(class_def.get(first) as usize)?.as_ref()?;
                set.rules.iter().find_map(|rule| {
                    let input = &rule.input_sequence;
                    match_forward(glyphs, pos + 1, input.len(), |i, glyph| {
                        class_def.get(glyph) == input[i]
                    })
                    .then_some(ContextMatch {
                        input_len: input.len() + 1,
                        records: &rule.seq_lookup_records,
                    })
                })
            }
            SequenceContext::Format3 {
                coverages,
                seq_lookup_records,
            } => (!coverages.is_empty()
                && match_forward(glyphs, pos, coverages.len(), covered(coverages)))
            .then_some(ContextMatch {
                input_len: coverages.len(),
                records: seq_lookup_records,
            }),
        }
    }
}

impl ChainedSequenceRule {
    fn to_match(&self) -> ContextMatch<'_> {
        ContextMatch {
            input_len: self.input_sequence.len() + 1,
            records: &self.seq_lookup_records,
        }
    }
}

impl ChainedSequenceContext {
    /// Match this subtable against `glyphs` with the input starting at `pos`.
    pub fn match_at(&self, glyphs: &[GlyphId16], pos: usize) -> Option<ContextMatch<'_>> {
        let first = *glyphs.get(pos)?;
        let rule_matches = |rule: &ChainedSequenceRule,
                            value_of: &dyn Fn(GlyphId16, usize) -> u16|
         -> bool {
            let input_end = pos + 1 + rule.input_sequence.len();
            match_backward(glyphs, pos, rule.backtrack_sequence.len(), |i, glyph| {
                value_of(glyph, 0) == rule.backtrack_sequence[i]
            }) && match_forward(glyphs, pos + 1, rule.input_sequence.len(), |i, glyph| {
                value_of(glyph, 1) == rule.input_sequence[i]
            }) && match_forward(glyphs, input_end, rule.lookahead_sequence.len(), |i, glyph| {
                value_of(glyph, 2) == rule.lookahead_sequence[i]
            })
        };
        match self {
            ChainedSequenceContext::Format1 {
                coverage,
                rule_sets,
            } => {
                let index = coverage.get(first)?;
                let set = rule_sets.get(index as usize)?.as_ref()?;
                set.rules
                    .iter()
                    .find(|rule| rule_matches(rule, &|glyph: GlyphId16, _: usize| glyph.to_u16()))
                    .map(ChainedSequenceRule::to_match)
            }
            ChainedSequenceContext::Format2 {
                coverage,
                backtrack_class_def,
                input_class_def,
                lookahead_class_def,
                class_sets,
            } => {
                coverage.get(first)?;
                let set = class_sets
                    .get(input_class_def.get(first) as usize)?
                    .as_ref()?;
                let class_of = |glyph: GlyphId16, which: usize| match which {
                    0 => backtrack_class_def.get(glyph),
                    1 => input_class_def.get(glyph),
                    _ => lookahead_class_def.get(glyph),
                };
                set.rules
                    .iter()
                    .find(|rule| rule_matches(rule, &class_of))
                    .map(ChainedSequenceRule::to_match)
            }
            ChainedSequenceContext::Format3 {
                backtrack_coverages,
                input_coverages,
                lookahead_coverages,
                seq_lookup_records,
            } => {
                let input_len = input_coverages.len();
                let matched = input_len > 0
                    && match_backward(
                        glyphs,
                        pos,
                        backtrack_coverages.len(),
                        covered(backtrack_coverages),
                    )
                    && match_forward(glyphs, pos, input_len, covered(input_coverages))
                    && match_forward(
                        glyphs,
                        pos + input_len,
                        lookahead_coverages.len(),
                        covered(lookahead_coverages),
                    );
                matched.then_some(ContextMatch {
                    input_len,
                    records: seq_lookup_records,
                })
            }
        }
    }
}

fn read_lookup_records(
    cursor: &mut Cursor<'_>,
    count: usize,
) -> Result<Vec<SequenceLookupRecord>, ReadError> {
    cursor.read_records(count, |cursor| {
        Ok(SequenceLookupRecord {
            sequence_index: cursor.read()?,
            lookup_list_index: cursor.read()?,
        })
    })
}

fn write_lookup_records(writer: &mut TableWriter, records: &[SequenceLookupRecord]) {
    for record in records {
        writer.write("sequenceIndex", record.sequence_index);
        writer.write("lookupListIndex", record.lookup_list_index);
    }
}

/// A u16 count followed by that many nullable offsets.
pub(crate) fn read_nullable_offsets<T: FontRead>(
    cursor: &mut Cursor<'_>,
) -> Result<Vec<Option<T>>, ReadError> {
    let count = cursor.read::<u16>()? as usize;
    cursor.read_records(count, |cursor| cursor.read_offset16())
}

impl FontRead for SequenceRule {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let glyph_count = cursor.read::<u16>()? as usize;
        let seq_lookup_count = cursor.read::<u16>()? as usize;
        Ok(SequenceRule {
            input_sequence: cursor.read_list(glyph_count.saturating_sub(1))?,
            seq_lookup_records: read_lookup_records(&mut cursor, seq_lookup_count)?,
        })
    }
}

impl FontRead for SequenceRuleSet {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let rules = data.cursor().read_offset16_list("sequence rule")?;
        Ok(SequenceRuleSet { rules })
    }
}

impl FontRead for ChainedSequenceRule {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let backtrack_count = cursor.read::<u16>()? as usize;
        let backtrack_sequence = cursor.read_list(backtrack_count)?;
        let input_count = cursor.read::<u16>()? as usize;
        let input_sequence = cursor.read_list(input_count.saturating_sub(1))?;
        let lookahead_count = cursor.read::<u16>()? as usize;
        let lookahead_sequence = cursor.read_list(lookahead_count)?;
        let seq_lookup_count = cursor.read::<u16>()? as usize;
        Ok(ChainedSequenceRule {
            backtrack_sequence,
            input_sequence,
            lookahead_sequence,
            seq_lookup_records: read_lookup_records(&mut cursor, seq_lookup_count)?,
        })
    }
}

impl FontRead for ChainedSequenceRuleSet {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let rules = data
            .cursor()
            .read_offset16_list("chained sequence rule")?;
        Ok(ChainedSequenceRuleSet { rules })
    }
}

impl FontReadWithArgs for SequenceContext {
    /// The lookup type, for error messages.
    type Args = u16;

    fn read_with_args(data: FontData<'_>, lookup_type: &u16) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        match cursor.read::<u16>()? {
            1 => Ok(SequenceContext::Format1 {
                coverage: cursor.read_required_offset16("coverage")?,
                rule_sets: read_nullable_offsets(&mut cursor)?,
            }),
            2 => Ok(SequenceContext::Format2 {
                coverage: cursor.read_required_offset16("coverage")?,
                class_def: cursor.read_required_offset16("class definition")?,
                class_sets: read_nullable_offsets(&mut cursor)?,
            }),
            3 => {
                let glyph_count = cursor.read::<u16>()? as usize;
                let seq_lookup_count = cursor.read::<u16>()? as usize;
                let coverages = cursor.read_records(glyph_count, |cursor| {
                    cursor.read_required_offset16("coverage")
                })?;
                Ok(SequenceContext::Format3 {
                    coverages,
                    seq_lookup_records: read_lookup_records(&mut cursor, seq_lookup_count)?,
                })
            }
            other => Err(cursor.invalid_format(0, format_label(*lookup_type), other, &[1, 2, 3])),
        }
    }
}

impl FontReadWithArgs for ChainedSequenceContext {
    /// The lookup type, for error messages.
    type Args = u16;

    fn read_with_args(data: FontData<'_>, lookup_type: &u16) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        match cursor.read::<u16>()? {
            1 => Ok(ChainedSequenceContext::Format1 {
                coverage: cursor.read_required_offset16("coverage")?,
                rule_sets: read_nullable_offsets(&mut cursor)?,
            }),
            2 => Ok(ChainedSequenceContext::Format2 {
                coverage: cursor.read_required_offset16("coverage")?,
                backtrack_class_def: cursor.read_required_offset16("class definition")?,
                input_class_def: cursor.read_required_offset16("class definition")?,
                lookahead_class_def: cursor.read_required_offset16("class definition")?,
                class_sets: read_nullable_offsets(&mut cursor)?,
            }),
            3 => {
                let backtrack_coverages = cursor.read_offset16_list("coverage")?;
                let input_coverages = cursor.read_offset16_list("coverage")?;
                let lookahead_coverages = cursor.read_offset16_list("coverage")?;
                let seq_lookup_count = cursor.read::<u16>()? as usize;
                Ok(ChainedSequenceContext::Format3 {
                    backtrack_coverages,
                    input_coverages,
                    lookahead_coverages,
                    seq_lookup_records: read_lookup_records(&mut cursor, seq_lookup_count)?,
                })
            }
            other => Err(cursor.invalid_format(0, format_label(*lookup_type), other, &[1, 2, 3])),
        }
    }
}

impl FontWrite for SequenceRule {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_count("glyphCount", self.input_sequence.len() + 1);
        writer.write_count("seqLookupCount", self.seq_lookup_records.len());
        writer.write_array("inputSequence", self.input_sequence.iter().copied());
        write_lookup_records(writer, &self.seq_lookup_records);
    }
}

impl FontWrite for SequenceRuleSet {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_offset16_list("seqRuleCount", "seqRuleOffsets", &self.rules);
    }
}

impl FontWrite for ChainedSequenceRule {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_u16_list(
            "backtrackGlyphCount",
            "backtrackSequence",
            &self.backtrack_sequence,
        );
        writer.write_count("inputGlyphCount", self.input_sequence.len() + 1);
        writer.write_array("inputSequence", self.input_sequence.iter().copied());
        writer.write_u16_list(
            "lookaheadGlyphCount",
            "lookaheadSequence",
            &self.lookahead_sequence,
        );
        writer.write_count("seqLookupCount", self.seq_lookup_records.len());
        write_lookup_records(writer, &self.seq_lookup_records);
    }
}

impl FontWrite for ChainedSequenceRuleSet {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_offset16_list(
            "chainedSeqRuleCount",
            "chainedSeqRuleOffsets",
            &self.rules,
        );
    }
}

fn write_nullable_offsets<T: FontWrite>(
    writer: &mut TableWriter,
    count_name: &'static str,
    name: &'static str,
    tables: &[Option<T>],
) {
    writer.write_count(count_name, tables.len());
    for table in tables {
        writer.write_offset16(name, table.as_ref());
    }
}

impl FontWrite for SequenceContext {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            SequenceContext::Format1 {
                coverage,
                rule_sets,
            } => {
                writer.write("format", 1u16);
                writer.write_offset16("coverageOffset", Some(coverage));
                write_nullable_offsets(writer, "seqRuleSetCount", "seqRuleSetOffsets", rule_sets);
            }
            SequenceContext::Format2 {
                coverage,
                class_def,
                class_sets,
            } => {
                writer.write("format", 2u16);
                writer.write_offset16("coverageOffset", Some(coverage));
                writer.write_offset16("classDefOffset", Some(class_def));
                write_nullable_offsets(
                    writer,
                    "classSeqRuleSetCount",
                    "classSeqRuleSetOffsets",
                    class_sets,
                );
            }
            SequenceContext::Format3 {
                coverages,
                seq_lookup_records,
            } => {
                writer.write("format", 3u16);
                writer.write_count("glyphCount", coverages.len());
                writer.write_count("seqLookupCount", seq_lookup_records.len());
                for coverage in coverages {
                    writer.write_offset16("coverageOffsets", Some(coverage));
                }
                write_lookup_records(writer, seq_lookup_records);
            }
        }
    }
}

impl FontWrite for ChainedSequenceContext {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            ChainedSequenceContext::Format1 {
                coverage,
                rule_sets,
            } => {
                writer.write("format", 1u16);
                writer.write_offset16("coverageOffset", Some(coverage));
                write_nullable_offsets(
                    writer,
                    "chainedSeqRuleSetCount",
                    "chainedSeqRuleSetOffsets",
                    rule_sets,
                );
            }
            ChainedSequenceContext::Format2 {
                coverage,
                backtrack_class_def,
                input_class_def,
                lookahead_class_def,
                class_sets,
            } => {
                writer.write("format", 2u16);
                writer.write_offset16("coverageOffset", Some(coverage));
                writer.write_offset16("backtrackClassDefOffset", Some(backtrack_class_def));
                writer.write_offset16("inputClassDefOffset", Some(input_class_def));
                writer.write_offset16("lookaheadClassDefOffset", Some(lookahead_class_def));
                write_nullable_offsets(
                    writer,
                    "chainedClassSeqRuleSetCount",
                    "chainedClassSeqRuleSetOffsets",
                    class_sets,
                );
            }
            ChainedSequenceContext::Format3 {
                backtrack_coverages,
                input_coverages,
                lookahead_coverages,
                seq_lookup_records,
            } => {
                writer.write("format", 3u16);
                writer.write_offset16_list(
                    "backtrackGlyphCount",
                    "backtrackCoverageOffsets",
                    backtrack_coverages,
                );
                writer.write_offset16_list(
                    "inputGlyphCount",
                    "inputCoverageOffsets",
                    input_coverages,
                );
                writer.write_offset16_list(
                    "lookaheadGlyphCount",
                    "lookaheadCoverageOffsets",
                    lookahead_coverages,
                );
                writer.write_count("seqLookupCount", seq_lookup_records.len());
                write_lookup_records(writer, seq_lookup_records);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::layout;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{tables::layout::ClassRangeRecord, write::dump_table};

    fn gids(raw: &[u16]) -> Vec<GlyphId16> {
        raw.iter().copied().map(GlyphId16::new).collect()
    }

    fn coverage(raw: &[u16]) -> CoverageTable {
        CoverageTable::Format1 { glyphs: gids(raw) }
    }

    #[test]
    fn format3_matches_each_position() {
        let bytes = layout::context_format3(&[&[5, 6], &[7]], &[(1, 0)]);
        let context = SequenceContext::read_with_args(FontData::new(&bytes), &5).unwrap();
        let found = context.match_at(&gids(&[1, 6, 7, 9]), 1).unwrap();
        assert_eq!(found.input_len, 2);
        assert_eq!(
            found.records,
            &[SequenceLookupRecord {
                sequence_index: 1,
                lookup_list_index: 0
            }]
        );
        assert!(context.match_at(&gids(&[1, 6, 7, 9]), 0).is_none());
        assert!(context.match_at(&gids(&[6]), 0).is_none());
        assert_eq!(dump_table(&context).unwrap(), bytes);
    }

    #[test]
    fn format1_rules_in_order() {
        let context = SequenceContext::Format1 {
            coverage: coverage(&[10]),
            rule_sets: vec![Some(SequenceRuleSet {
                rules: vec![
                    SequenceRule {
                        input_sequence: vec![11, 12],
                        seq_lookup_records: Vec::new(),
                    },
                    SequenceRule {
                        input_sequence: vec![11],
                        seq_lookup_records: Vec::new(),
                    },
                ],
            })],
        };
        let found = context.match_at(&gids(&[10, 11, 12]), 0).unwrap();
        assert_eq!(found.input_len, 3);
        let found = context.match_at(&gids(&[10, 11, 13]), 0).unwrap();
        assert_eq!(found.input_len, 2);
        let written = dump_table(&context).unwrap();
        let reread = SequenceContext::read_with_args(FontData::new(&written), &5).unwrap();
        assert_eq!(reread, context);
    }

    #[test]
    fn format2_matches_classes() {
        let context = SequenceContext::Format2 {
            coverage: coverage(&[1, 2]),
            class_def: ClassDef::Format2 {
                ranges: vec![
                    ClassRangeRecord {
                        start_glyph_id: GlyphId16::new(1),
                        end_glyph_id: GlyphId16::new(2),
                        class: 1,
                    },
                    ClassRangeRecord {
                        start_glyph_id: GlyphId16::new(5),
                        end_glyph_id: GlyphId16::new(9),
                        class: 2,
                    },
                ],
            },
            class_sets: vec![
                None,
                Some(SequenceRuleSet {
                    rules: vec![SequenceRule {
                        input_sequence: vec![2],
                        seq_lookup_records: Vec::new(),
                    }],
                }),
            ],
        };
        assert!(context.match_at(&gids(&[2, 7]), 0).is_some());
        assert!(context.match_at(&gids(&[2, 3]), 0).is_none());
        let written = dump_table(&context).unwrap();
        let reread = SequenceContext::read_with_args(FontData::new(&written), &7).unwrap();
        assert_eq!(reread, context);
    }

    #[test]
    fn chained_format3() {
        let bytes = layout::chain_context_format3(&[&[1]], &[&[2], &[3]], &[&[4]], &[(0, 0)]);
        let context = ChainedSequenceContext::read_with_args(FontData::new(&bytes), &6).unwrap();
        assert_eq!(context.match_at(&gids(&[1, 2, 3, 4]), 1).map(|m| m.input_len), Some(2));
        assert!(context.match_at(&gids(&[0, 2, 3, 4]), 1).is_none());
        assert!(context.match_at(&gids(&[2, 3, 4]), 0).is_none());
        assert!(context.match_at(&gids(&[1, 2, 3]), 1).is_none());
        assert_eq!(dump_table(&context).unwrap(), bytes);
    }

    #[test]
    fn chained_format1_backtrack_is_reversed() {
        let context = ChainedSequenceContext::Format1 {
            coverage: coverage(&[3]),
            rule_sets: vec![Some(ChainedSequenceRuleSet {
                rules: vec![ChainedSequenceRule {
                    backtrack_sequence: vec![2, 1],
                    input_sequence: vec![4],
                    lookahead_sequence: vec![5],
                    seq_lookup_records: Vec::new(),
                }],
            })],
        };
        assert!(context.match_at(&gids(&[1, 2, 3, 4, 5]), 2).is_some());
        assert!(context.match_at(&gids(&[2, 1, 3, 4, 5]), 2).is_none());
        let written = dump_table(&context).unwrap();
        let reread = ChainedSequenceContext::read_with_args(FontData::new(&written), &6).unwrap();
        assert_eq!(reread, context);
    }

    #[test]
    fn unsupported_format_names_lookup_type() {
        let bytes = [0, 4, 0, 0];
        let err = SequenceContext::read_with_args(FontData::new(&bytes), &5).unwrap_err();
        assert_eq!(
            err,
            ReadError::InvalidFormat {
                offset: 0,
                what: "lookup type 5 format",
                found: 4,
                expected: &[1, 2, 3],
            }
        );
    }
}
