//! Applying substitution lookups to a glyph sequence
//!
//! Lookup flags are carried but not interpreted: without glyph classes
//! every glyph takes part in matching.

use font_types::{GlyphId16, Tag};

use super::{
    AlternateSubst, Gsub, LigatureSubst, MultipleSubst, ReverseChainSingleSubst,
    SubstitutionSubtable,
};
use crate::tables::layout::{ContextMatch, Lookup, SequenceLookupRecord};

/// Nested lookups from contextual subtables stop at this depth.
const MAX_NESTING_DEPTH: usize = 64;

const REVERSE_CHAIN_TYPE: u16 = 8;

impl Gsub {
    /// Apply the lookups of each feature in turn.
    ///
    /// Features the language system does not enable are skipped.
    pub fn apply_features(
        &self,
        script: Tag,
        language: Option<Tag>,
        features: &[Tag],
        glyphs: &mut Vec<GlyphId16>,
    ) {
        for feature in features {
            let Some(feature) = self.feature(script, language, *feature) else {
                log::debug!("feature '{feature}' not enabled for '{script}'");
                continue;
            };
            for index in &feature.lookup_list_indices {
                self.apply_lookup(*index, glyphs);
            }
        }
    }

    /// Apply one lookup to every position of `glyphs`.
    pub fn apply_lookup(&self, lookup_index: u16, glyphs: &mut Vec<GlyphId16>) {
        let Some(lookup) = self.lookup(lookup_index) else {
            log::warn!("lookup index {lookup_index} out of range");
            return;
        };
        if lookup.effective_type() == REVERSE_CHAIN_TYPE {
            for pos in (0..glyphs.len()).rev() {
                self.apply_at(lookup, glyphs, pos, 0);
            }
            return;
        }
        let mut pos = 0;
        while pos < glyphs.len() {
            let len_before = glyphs.len();
            pos = match self.apply_at(lookup, glyphs, pos, 0) {
                // a deletion leaves the next glyph at `pos`
                Some(next) if next > pos || glyphs.len() < len_before => next,
                _ => pos + 1,
            };
        }
    }

    /// Apply the first subtable of `lookup` that matches at `pos`.
    ///
    /// Returns the position after the replaced glyphs.
    fn apply_at(
        &self,
        lookup: &Lookup<SubstitutionSubtable>,
        glyphs: &mut Vec<GlyphId16>,
        pos: usize,
        depth: usize,
    ) -> Option<usize> {
        if depth > MAX_NESTING_DEPTH {
            log::warn!("lookup nesting deeper than {MAX_NESTING_DEPTH}, stopping");
            return None;
        }
        lookup
            .subtables
            .iter()
            .find_map(|subtable| self.apply_subtable(subtable, glyphs, pos, depth))
    }

    fn apply_subtable(
        &self,
        subtable: &SubstitutionSubtable,
        glyphs: &mut Vec<GlyphId16>,
        pos: usize,
        depth: usize,
    ) -> Option<usize> {
        let glyph = *glyphs.get(pos)?;
        match subtable {
            SubstitutionSubtable::Single(table) => {
                glyphs[pos] = table.get(glyph)?;
                Some(pos + 1)
            }
            SubstitutionSubtable::Multiple(table) => {
                let sequence = table.apply_glyph(glyph)?;
                glyphs.splice(pos..pos + 1, sequence.iter().copied());
                Some(pos + sequence.len())
            }
            SubstitutionSubtable::Alternate(table) => {
                glyphs[pos] = table.apply_glyph(glyph)?;
                Some(pos + 1)
            }
            SubstitutionSubtable::Ligature(table) => {
                let (ligature, len) = table.apply_at(glyphs, pos)?;
                glyphs.splice(pos..pos + len, [ligature]);
                Some(pos + 1)
            }
            SubstitutionSubtable::Contextual(table) => {
                let found = table.match_at(glyphs, pos)?;
                Some(self.apply_records(found, glyphs, pos, depth))
            }
            SubstitutionSubtable::ChainContextual(table) => {
                let found = table.match_at(glyphs, pos)?;
                Some(self.apply_records(found, glyphs, pos, depth))
            }
            SubstitutionSubtable::Extension(ext) => {
                self.apply_subtable(&ext.subtable, glyphs, pos, depth)
            }
            SubstitutionSubtable::Reverse(table) => {
                let substitute = table.apply_at(glyphs, pos)?;
                glyphs[pos] = substitute;
                Some(pos + 1)
            }
        }
    }

    /// Apply the nested lookups of a context match, returning the end of
    /// the (possibly resized) input sequence.
    fn apply_records(
        &self,
        found: ContextMatch<'_>,
        glyphs: &mut Vec<GlyphId16>,
        pos: usize,
        depth: usize,
    ) -> usize {
        let mut end = pos + found.input_len;
        for SequenceLookupRecord {
            sequence_index,
            lookup_list_index,
        } in found.records
        {
            let target = pos + *sequence_index as usize;
            if target >= end {
                continue;
            }
            let Some(lookup) = self.lookup(*lookup_list_index) else {
                continue;
            };
            let len_before = glyphs.len();
            self.apply_at(lookup, glyphs, target, depth + 1);
            end = (end + glyphs.len()).saturating_sub(len_before);
        }
        end
    }
}

impl MultipleSubst {
    pub fn apply_glyph(&self, glyph: GlyphId16) -> Option<&[GlyphId16]> {
        let index = self.coverage.get(glyph)?;
        self.sequences.get(index as usize).map(Vec::as_slice)
    }
}

impl AlternateSubst {
    /// The first alternate for `glyph`.
    pub fn apply_glyph(&self, glyph: GlyphId16) -> Option<GlyphId16> {
        let index = self.coverage.get(glyph)?;
        self.alternate_sets.get(index as usize)?.first().copied()
    }
}

impl LigatureSubst {
    /// The first ligature, in stored order, whose components follow `pos`,
    /// with the number of glyphs it replaces.
    pub fn apply_at(&self, glyphs: &[GlyphId16], pos: usize) -> Option<(GlyphId16, usize)> {
        let index = self.coverage.get(*glyphs.get(pos)?)?;
        let set = self.ligature_sets.get(index as usize)?;
        let rest = &glyphs[pos + 1..];
        set.ligatures
            .iter()
            .find(|ligature| rest.starts_with(&ligature.component_glyph_ids))
            .map(|ligature| {
                (
                    ligature.ligature_glyph,
                    ligature.component_glyph_ids.len() + 1,
                )
            })
    }
}

impl ReverseChainSingleSubst {
    /// The substitute for the glyph at `pos`, if it and its context match.
    pub fn apply_at(&self, glyphs: &[GlyphId16], pos: usize) -> Option<GlyphId16> {
        let index = self.coverage.get(*glyphs.get(pos)?)?;
        let backtrack = self
            .backtrack_coverages
            .iter()
            .enumerate()
            .all(|(i, coverage)| {
                pos.checked_sub(i + 1)
                    .and_then(|idx| glyphs.get(idx))
                    .is_some_and(|glyph| coverage.get(*glyph).is_some())
            });
        let lookahead = self
            .lookahead_coverages
            .iter()
            .enumerate()
            .all(|(i, coverage)| {
                glyphs
                    .get(pos + 1 + i)
                    .is_some_and(|glyph| coverage.get(*glyph).is_some())
            });
        if backtrack && lookahead {
            self.substitute_glyph_ids.get(index as usize).copied()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::layout::{self, FeatureDef, LookupDef, ScriptDef};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{read::FontRead, tables::layout::CoverageTable, FontData};

    fn gids(raw: &[u16]) -> Vec<GlyphId16> {
        raw.iter().copied().map(GlyphId16::new).collect()
    }

    fn gsub(features: &[FeatureDef], lookups: &[LookupDef]) -> Gsub {
        let indices: Vec<u16> = (0..features.len() as u16).collect();
        let bytes = layout::layout_table(
            &[ScriptDef {
                tag: b"latn",
                features: &indices,
                languages: &[],
            }],
            features,
            lookups,
        );
        Gsub::read(FontData::new(&bytes)).unwrap()
    }

    fn apply(table: &Gsub, features: &[&[u8; 4]], glyphs: &[u16]) -> Vec<GlyphId16> {
        let features: Vec<Tag> = features.iter().map(|tag| Tag::new(tag)).collect();
        let mut glyphs = gids(glyphs);
        table.apply_features(Tag::new(b"latn"), None, &features, &mut glyphs);
        glyphs
    }

    #[test]
    fn single_then_ligature() {
        let table = gsub(
            &[
                FeatureDef {
                    tag: b"liga",
                    lookups: &[1],
                },
                FeatureDef {
                    tag: b"smcp",
                    lookups: &[0],
                },
            ],
            &[
                LookupDef::new(1, vec![layout::single_subst_delta(&[1, 2, 3], 10)]),
                LookupDef::new(
                    4,
                    vec![layout::ligature_subst(&[(
                        11,
                        &[(100, &[12, 13]), (101, &[12])],
                    )])],
                ),
            ],
        );
        assert_eq!(apply(&table, &[b"smcp"], &[1, 2, 5]), gids(&[11, 12, 5]));
        assert_eq!(
            apply(&table, &[b"smcp", b"liga"], &[1, 2, 3, 1, 2, 9]),
            gids(&[100, 101, 9])
        );
        // disabled features do nothing
        assert_eq!(apply(&table, &[b"c2sc"], &[1]), gids(&[1]));
    }

    #[test]
    fn multiple_and_alternate() {
        let table = gsub(
            &[
                FeatureDef {
                    tag: b"aalt",
                    lookups: &[1],
                },
                FeatureDef {
                    tag: b"ccmp",
                    lookups: &[0],
                },
            ],
            &[
                LookupDef::new(2, vec![layout::sequence_subst(&[4, 5], &[&[6, 7], &[]])]),
                LookupDef::new(3, vec![layout::sequence_subst(&[6], &[&[60, 61]])]),
            ],
        );
        assert_eq!(apply(&table, &[b"ccmp"], &[4, 5, 4]), gids(&[6, 7, 6, 7]));
        assert_eq!(apply(&table, &[b"ccmp", b"aalt"], &[4]), gids(&[60, 7]));
    }

    #[test]
    fn chained_context_applies_nested_lookup() {
        let table = gsub(
            &[FeatureDef {
                tag: b"calt",
                lookups: &[1],
            }],
            &[
                LookupDef::new(1, vec![layout::single_subst_list(&[(2, 20)])]),
                LookupDef::new(
                    6,
                    vec![layout::chain_context_format3(
                        &[&[1]],
                        &[&[2]],
                        &[&[3]],
                        &[(0, 0)],
                    )],
                ),
            ],
        );
        assert_eq!(
            apply(&table, &[b"calt"], &[1, 2, 3, 2, 3]),
            gids(&[1, 20, 3, 2, 3])
        );
    }

    #[test]
    fn context_through_extension() {
        let inner = layout::context_format3(&[&[7], &[8]], &[(1, 0)]);
        let table = gsub(
            &[FeatureDef {
                tag: b"calt",
                lookups: &[1],
            }],
            &[
                LookupDef::new(1, vec![layout::single_subst_delta(&[8], 1)]),
                LookupDef::new(7, vec![layout::extension(5, &inner)]),
            ],
        );
        assert_eq!(apply(&table, &[b"calt"], &[8, 7, 8]), gids(&[8, 7, 9]));
    }

    #[test]
    fn reverse_chain_runs_backwards() {
        let subtable = ReverseChainSingleSubst {
            coverage: CoverageTable::from_glyphs(gids(&[1])),
            backtrack_coverages: Vec::new(),
            lookahead_coverages: vec![CoverageTable::from_glyphs(gids(&[1, 2]))],
            substitute_glyph_ids: gids(&[2]),
        };
        let mut table = Gsub::default();
        let latn = Tag::new(b"latn");
        let index = table.add_lookup(latn, None, Tag::new(b"rclt"), 8).unwrap();
        table.lookup_list.lookups[index as usize]
            .subtables
            .push(SubstitutionSubtable::Reverse(subtable));
        // right to left, each substitution feeds the next lookahead
        let mut glyphs = gids(&[1, 1, 1, 2]);
        table.apply_lookup(index, &mut glyphs);
        assert_eq!(glyphs, gids(&[2, 2, 2, 2]));
    }

    #[test]
    fn self_referencing_context_terminates() {
        let table = gsub(
            &[FeatureDef {
                tag: b"calt",
                lookups: &[0],
            }],
            &[LookupDef::new(
                5,
                vec![layout::context_format3(&[&[1]], &[(0, 0)])],
            )],
        );
        assert_eq!(apply(&table, &[b"calt"], &[1, 1]), gids(&[1, 1]));
    }
}
