//! GSUB and GPOS tables and subtables

use crate::bebuffer::BeBuffer;

/// A script with a default language system that enables these features.
pub struct ScriptDef<'a> {
    pub tag: &'a [u8; 4],
    pub features: &'a [u16],
    /// Additional language systems: tag and feature indices.
    pub languages: &'a [(&'a [u8; 4], &'a [u16])],
}

/// A feature record: tag and lookup indices.
pub struct FeatureDef<'a> {
    pub tag: &'a [u8; 4],
    pub lookups: &'a [u16],
}

/// A lookup: type, flag and encoded subtables.
pub struct LookupDef {
    pub lookup_type: u16,
    pub flag: u16,
    pub subtables: Vec<Vec<u8>>,
}

impl LookupDef {
    pub fn new(lookup_type: u16, subtables: Vec<Vec<u8>>) -> Self {
        LookupDef {
            lookup_type,
            flag: 0,
            subtables,
        }
    }
}

/// Assemble a version 1.0 GSUB or GPOS table.
pub fn layout_table(scripts: &[ScriptDef], features: &[FeatureDef], lookups: &[LookupDef]) -> Vec<u8> {
    let script_list = script_list(scripts);
    let feature_list = feature_list(features);
    let lookup_list = lookup_list(lookups);
    let script_off = 10u16;
    let feature_off = script_off + script_list.len() as u16;
    let lookup_off = feature_off + feature_list.len() as u16;
    BeBuffer::new()
        .push(1u16)
        .push(0u16)
        .push(script_off)
        .push(feature_off)
        .push(lookup_off)
        .extend_bytes(&script_list)
        .extend_bytes(&feature_list)
        .extend_bytes(&lookup_list)
        .into_vec()
}

fn lang_sys(features: &[u16]) -> BeBuffer {
    BeBuffer::new()
        .push(0u16) // lookupOrder
        .push(0xFFFFu16) // requiredFeatureIndex
        .push(features.len() as u16)
        .extend(features.iter().copied())
}

fn script_list(scripts: &[ScriptDef]) -> Vec<u8> {
    let tables: Vec<Vec<u8>> = scripts
        .iter()
        .map(|script| {
            let header_len = 4 + 6 * script.languages.len();
            let default = lang_sys(script.features);
            let mut lang_sys_tables = Vec::new();
            let mut buf = BeBuffer::new()
                .push(header_len as u16)
                .push(script.languages.len() as u16);
            let mut next = header_len + default.len();
            for (tag, features) in script.languages {
                let table = lang_sys(features);
                buf = buf.push(font_types::Tag::new(tag)).push(next as u16);
                next += table.len();
                lang_sys_tables.push(table);
            }
            buf = buf.extend_bytes(&default);
            for table in lang_sys_tables {
                buf = buf.extend_bytes(&table);
            }
            buf.into_vec()
        })
        .collect();
    records_with_offsets(scripts.iter().map(|s| s.tag), tables)
}

fn feature_list(features: &[FeatureDef]) -> Vec<u8> {
    let tables = features
        .iter()
        .map(|feature| {
            BeBuffer::new()
                .push(0u16) // featureParams
                .push(feature.lookups.len() as u16)
                .extend(feature.lookups.iter().copied())
                .into_vec()
        })
        .collect();
    records_with_offsets(features.iter().map(|f| f.tag), tables)
}

// count, then (tag, offset16) records, then the tables
fn records_with_offsets<'a>(
    tags: impl Iterator<Item = &'a [u8; 4]>,
    tables: Vec<Vec<u8>>,
) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(tables.len() as u16);
    let mut next = 2 + 6 * tables.len();
    for (tag, table) in tags.zip(&tables) {
        buf = buf.push(font_types::Tag::new(tag)).push(next as u16);
        next += table.len();
    }
    for table in &tables {
        buf = buf.extend_bytes(table);
    }
    buf.into_vec()
}

fn lookup_list(lookups: &[LookupDef]) -> Vec<u8> {
    let tables: Vec<Vec<u8>> = lookups
        .iter()
        .map(|lookup| {
            let header_len = 6 + 2 * lookup.subtables.len();
            let mut buf = BeBuffer::new()
                .push(lookup.lookup_type)
                .push(lookup.flag)
                .push(lookup.subtables.len() as u16);
            let mut next = header_len;
            for sub in &lookup.subtables {
                buf = buf.push(next as u16);
                next += sub.len();
            }
            for sub in &lookup.subtables {
                buf = buf.extend_bytes(sub);
            }
            buf.into_vec()
        })
        .collect();
    offsets_then_tables(&tables)
}

// count, then offset16s, then the tables
fn offsets_then_tables(tables: &[Vec<u8>]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(tables.len() as u16);
    let mut next = 2 + 2 * tables.len();
    for table in tables {
        buf = buf.push(next as u16);
        next += table.len();
    }
    for table in tables {
        buf = buf.extend_bytes(table);
    }
    buf.into_vec()
}

/// A format 1 coverage table.
pub fn coverage_format1(glyphs: &[u16]) -> Vec<u8> {
    BeBuffer::new()
        .push(1u16)
        .push(glyphs.len() as u16)
        .extend(glyphs.iter().copied())
        .into_vec()
}

/// A format 2 coverage table of `(start, end, start_coverage_index)` ranges.
pub fn coverage_format2(ranges: &[(u16, u16, u16)]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(2u16).push(ranges.len() as u16);
    for (start, end, index) in ranges {
        buf = buf.push(*start).push(*end).push(*index);
    }
    buf.into_vec()
}

/// A format 1 class definition.
pub fn class_def_format1(start: u16, classes: &[u16]) -> Vec<u8> {
    BeBuffer::new()
        .push(1u16)
        .push(start)
        .push(classes.len() as u16)
        .extend(classes.iter().copied())
        .into_vec()
}

/// A format 2 class definition of `(start, end, class)` ranges.
pub fn class_def_format2(ranges: &[(u16, u16, u16)]) -> Vec<u8> {
    let mut buf = BeBuffer::new().push(2u16).push(ranges.len() as u16);
    for (start, end, class) in ranges {
        buf = buf.push(*start).push(*end).push(*class);
    }
    buf.into_vec()
}

/// GSUB type 1 format 1: add `delta` to every covered glyph.
pub fn single_subst_delta(covered: &[u16], delta: i16) -> Vec<u8> {
    BeBuffer::new()
        .push(1u16)
        .push(6u16)
        .push(delta)
        .extend_bytes(&coverage_format1(covered))
        .into_vec()
}

/// GSUB type 1 format 2: explicit `(from, to)` pairs, sorted by `from`.
pub fn single_subst_list(pairs: &[(u16, u16)]) -> Vec<u8> {
    let covered: Vec<_> = pairs.iter().map(|(from, _)| *from).collect();
    BeBuffer::new()
        .push(2u16)
        .push((6 + 2 * pairs.len()) as u16)
        .push(pairs.len() as u16)
        .extend(pairs.iter().map(|(_, to)| *to))
        .extend_bytes(&coverage_format1(&covered))
        .into_vec()
}

/// GSUB type 2 or 3 format 1: each covered glyph maps to a sequence.
pub fn sequence_subst(covered: &[u16], sequences: &[&[u16]]) -> Vec<u8> {
    let header_len = 6 + 2 * sequences.len();
    let tables: Vec<Vec<u8>> = sequences
        .iter()
        .map(|seq| {
            BeBuffer::new()
                .push(seq.len() as u16)
                .extend(seq.iter().copied())
                .into_vec()
        })
        .collect();
    let coverage = coverage_format1(covered);
    let mut buf = BeBuffer::new()
        .push(1u16)
        .push(header_len as u16)
        .push(sequences.len() as u16);
    let mut next = header_len + coverage.len();
    for table in &tables {
        buf = buf.push(next as u16);
        next += table.len();
    }
    buf = buf.extend_bytes(&coverage);
    for table in &tables {
        buf = buf.extend_bytes(table);
    }
    buf.into_vec()
}

/// GSUB type 4 format 1, one ligature set per first glyph.
///
/// Each entry is `(first, [(ligature, [rest of components])])`; entries
/// must be sorted by first glyph.
pub fn ligature_subst(sets: &[(u16, &[(u16, &[u16])])]) -> Vec<u8> {
    let covered: Vec<_> = sets.iter().map(|(first, _)| *first).collect();
    let set_tables: Vec<Vec<u8>> = sets
        .iter()
        .map(|(_, ligatures)| {
            let ligature_tables: Vec<Vec<u8>> = ligatures
                .iter()
                .map(|(glyph, rest)| {
                    BeBuffer::new()
                        .push(*glyph)
                        .push(rest.len() as u16 + 1)
                        .extend(rest.iter().copied())
                        .into_vec()
                })
                .collect();
            offsets_then_tables(&ligature_tables)
        })
        .collect();
    let header_len = 6 + 2 * sets.len();
    let coverage = coverage_format1(&covered);
    let mut buf = BeBuffer::new()
        .push(1u16)
        .push(header_len as u16)
        .push(sets.len() as u16);
    let mut next = header_len + coverage.len();
    for table in &set_tables {
        buf = buf.push(next as u16);
        next += table.len();
    }
    buf = buf.extend_bytes(&coverage);
    for table in &set_tables {
        buf = buf.extend_bytes(table);
    }
    buf.into_vec()
}

/// GSUB type 5 format 3: match one glyph per coverage, then apply
/// `(sequence_index, lookup_index)` records.
pub fn context_format3(coverages: &[&[u16]], records: &[(u16, u16)]) -> Vec<u8> {
    let header_len = 6 + 2 * coverages.len() + 4 * records.len();
    let tables: Vec<Vec<u8>> = coverages.iter().map(|c| coverage_format1(c)).collect();
    let mut buf = BeBuffer::new()
        .push(3u16)
        .push(coverages.len() as u16)
        .push(records.len() as u16);
    let mut next = header_len;
    for table in &tables {
        buf = buf.push(next as u16);
        next += table.len();
    }
    for (seq, lookup) in records {
        buf = buf.push(*seq).push(*lookup);
    }
    for table in &tables {
        buf = buf.extend_bytes(table);
    }
    buf.into_vec()
}

/// GSUB type 6 format 3, with one glyph per backtrack, input and lookahead
/// coverage.
pub fn chain_context_format3(
    backtrack: &[&[u16]],
    input: &[&[u16]],
    lookahead: &[&[u16]],
    records: &[(u16, u16)],
) -> Vec<u8> {
    let n_coverages = backtrack.len() + input.len() + lookahead.len();
    let header_len = 2 + 2 * 4 + 2 * n_coverages + 4 * records.len();
    let tables: Vec<Vec<u8>> = backtrack
        .iter()
        .chain(input)
        .chain(lookahead)
        .map(|c| coverage_format1(c))
        .collect();
    let mut offsets = Vec::new();
    let mut next = header_len;
    for table in &tables {
        offsets.push(next as u16);
        next += table.len();
    }
    let (back_off, rest) = offsets.split_at(backtrack.len());
    let (input_off, ahead_off) = rest.split_at(input.len());
    let mut buf = BeBuffer::new()
        .push(3u16)
        .push(back_off.len() as u16)
        .extend(back_off.iter().copied())
        .push(input_off.len() as u16)
        .extend(input_off.iter().copied())
        .push(ahead_off.len() as u16)
        .extend(ahead_off.iter().copied())
        .push(records.len() as u16);
    for (seq, lookup) in records {
        buf = buf.push(*seq).push(*lookup);
    }
    for table in &tables {
        buf = buf.extend_bytes(table);
    }
    buf.into_vec()
}

/// An extension subtable wrapping `subtable` of `lookup_type`.
pub fn extension(lookup_type: u16, subtable: &[u8]) -> Vec<u8> {
    BeBuffer::new()
        .push(1u16)
        .push(lookup_type)
        .push(8u32)
        .extend_bytes(subtable)
        .into_vec()
}

/// GPOS type 2 format 1 with x-advance-only values for the first glyph.
///
/// Entries are `(first, [(second, x_advance)])` sorted by first glyph.
pub fn pair_pos_format1(pairs: &[(u16, &[(u16, i16)])]) -> Vec<u8> {
    let covered: Vec<_> = pairs.iter().map(|(first, _)| *first).collect();
    let sets: Vec<Vec<u8>> = pairs
        .iter()
        .map(|(_, records)| {
            let mut buf = BeBuffer::new().push(records.len() as u16);
            for (second, advance) in records.iter() {
                buf = buf.push(*second).push(*advance);
            }
            buf.into_vec()
        })
        .collect();
    let header_len = 10 + 2 * sets.len();
    let coverage = coverage_format1(&covered);
    let mut buf = BeBuffer::new()
        .push(1u16)
        .push(header_len as u16)
        .push(0x0004u16) // valueFormat1: XAdvance
        .push(0u16) // valueFormat2
        .push(sets.len() as u16);
    let mut next = header_len + coverage.len();
    for set in &sets {
        buf = buf.push(next as u16);
        next += set.len();
    }
    buf = buf.extend_bytes(&coverage);
    for set in &sets {
        buf = buf.extend_bytes(set);
    }
    buf.into_vec()
}

/// GPOS type 2 format 2 with x-advance-only values for the first glyph.
///
/// `matrix[c1][c2]` is the x advance for a class pair.
pub fn pair_pos_format2(
    covered: &[u16],
    class_def1: &[(u16, u16, u16)],
    class_def2: &[(u16, u16, u16)],
    matrix: &[&[i16]],
) -> Vec<u8> {
    let class2_count = matrix.first().map(|row| row.len()).unwrap_or(0);
    let header_len = 16 + 2 * matrix.len() * class2_count;
    let coverage = coverage_format1(covered);
    let cd1 = class_def_format2(class_def1);
    let cd2 = class_def_format2(class_def2);
    let cov_off = header_len;
    let cd1_off = cov_off + coverage.len();
    let cd2_off = cd1_off + cd1.len();
    let mut buf = BeBuffer::new()
        .push(2u16)
        .push(cov_off as u16)
        .push(0x0004u16)
        .push(0u16)
        .push(cd1_off as u16)
        .push(cd2_off as u16)
        .push(matrix.len() as u16)
        .push(class2_count as u16);
    for row in matrix {
        buf = buf.extend(row.iter().copied());
    }
    buf.extend_bytes(&coverage)
        .extend_bytes(&cd1)
        .extend_bytes(&cd2)
        .into_vec()
}
