//! Layout queries through a decoded font: searches, coverage, classes,
//! kerning and substitution.

use font_test_data::{
    fonts,
    layout::{self, FeatureDef, LookupDef, ScriptDef},
};
use ot_codec::{
    font_types::{GlyphId16, Tag},
    tables::layout::{
        search::{bin_search, search_range, search_tag},
        ClassDef, ClassRangeRecord, CoverageTable, Script, ScriptRecord,
    },
    dump_table, Font, FontData, FontRead,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

const GSUB: Tag = Tag::new(b"GSUB");
const GPOS: Tag = Tag::new(b"GPOS");
const LATN: Tag = Tag::new(b"latn");
const LIGA: Tag = Tag::new(b"liga");
const SMCP: Tag = Tag::new(b"smcp");

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn gids(ids: &[u16]) -> Vec<GlyphId16> {
    ids.iter().copied().map(GlyphId16::new).collect()
}

/// `kern` on `DFLT`: a format 1 subtable then a format 2 subtable.
fn kerning_gpos() -> Vec<u8> {
    layout::layout_table(
        &[ScriptDef {
            tag: b"DFLT",
            features: &[0],
            languages: &[],
        }],
        &[FeatureDef {
            tag: b"kern",
            lookups: &[0],
        }],
        &[LookupDef::new(
            2,
            vec![
                layout::pair_pos_format1(&[(1, &[(2, -50)]), (4, &[(5, -10)])]),
                layout::pair_pos_format2(
                    &[1, 2],
                    &[(1, 1, 1)],
                    &[(3, 3, 1)],
                    &[&[0, -5], &[0, -20]],
                ),
            ],
        )],
    )
}

/// `liga` (f_i style ligature 10 11 12 -> 20) and `smcp` (+100 for 10 and
/// 11) on `latn`.
fn substitution_gsub() -> Vec<u8> {
    layout::layout_table(
        &[ScriptDef {
            tag: b"latn",
            features: &[0, 1],
            languages: &[],
        }],
        &[
            FeatureDef {
                tag: b"liga",
                lookups: &[0],
            },
            FeatureDef {
                tag: b"smcp",
                lookups: &[1],
            },
        ],
        &[
            LookupDef::new(4, vec![layout::ligature_subst(&[(10, &[(20, &[11, 12])])])]),
            LookupDef::new(1, vec![layout::single_subst_delta(&[10, 11], 100)]),
        ],
    )
}

fn layout_font() -> Font {
    let bytes = fonts::simple_font_with(
        vec![(GPOS, kerning_gpos()), (GSUB, substitution_gsub())],
        &[],
    );
    Font::decode(&bytes).unwrap()
}

#[rstest]
#[case::format1_pair(1, 2, -50)]
#[case::format1_second_set(4, 5, -10)]
#[case::falls_through_to_format2(1, 3, -20)]
#[case::format2_default_class1(2, 3, -5)]
#[case::format2_decides_with_zero(1, 7, 0)]
#[case::left_covered_nowhere_else(4, 3, 0)]
#[case::not_covered(9, 9, 0)]
fn kern(#[case] left: u16, #[case] right: u16, #[case] expected: i16) {
    let font = layout_font();
    assert_eq!(
        font.kern(GlyphId16::new(left), GlyphId16::new(right)),
        expected
    );
}

#[test]
fn kerning_lookups() {
    let font = layout_font();
    assert_eq!(font.kerning_lookups(None, None).len(), 1);
    assert_eq!(font.kerning_lookups(Some(LATN), None).len(), 0);
    let no_gpos = Font::decode(&fonts::simple_font()).unwrap();
    assert!(no_gpos.kerning_lookups(None, None).is_empty());
    assert_eq!(no_gpos.kern(GlyphId16::new(1), GlyphId16::new(2)), 0);
}

#[rstest]
#[case::ligature(&[LIGA], &[10, 11, 12, 13], &[20, 13])]
#[case::single(&[SMCP], &[10, 11, 12, 13], &[110, 111, 12, 13])]
#[case::ligature_first(&[LIGA, SMCP], &[10, 11, 12, 13], &[20, 13])]
#[case::single_first(&[SMCP, LIGA], &[10, 11, 12, 13], &[110, 111, 12, 13])]
#[case::partial_match(&[LIGA], &[10, 11, 10], &[10, 11, 10])]
#[case::unknown_feature(&[Tag::new(b"zzzz")], &[10, 11, 12], &[10, 11, 12])]
fn apply_lookups(#[case] features: &[Tag], #[case] input: &[u16], #[case] expected: &[u16]) {
    init_logger();
    let font = layout_font();
    assert_eq!(
        font.apply_lookups(LATN, None, features, &gids(input)),
        gids(expected)
    );
}

#[test]
fn apply_lookups_unknown_script() {
    let font = layout_font();
    let glyphs = gids(&[10, 11, 12]);
    assert_eq!(
        font.apply_lookups(Tag::new(b"cyrl"), None, &[LIGA], &glyphs),
        glyphs
    );
}

#[test]
fn coverage_format2_scenario() {
    let bytes = layout::coverage_format2(&[(10, 12, 0), (20, 20, 3)]);
    let coverage = CoverageTable::read(FontData::new(&bytes)).unwrap();
    assert_eq!(coverage.get(GlyphId16::new(11)), Some(1));
    assert_eq!(coverage.get(GlyphId16::new(20)), Some(3));
    assert_eq!(coverage.get(GlyphId16::new(15)), None);
    assert_eq!(coverage.get(GlyphId16::new(9)), None);
    assert_eq!(coverage.get(GlyphId16::new(21)), None);
}

#[rstest]
#[case::sparse(&[3, 7, 8, 100, 4000, 65535])]
#[case::runs(&[1, 2, 3, 4, 5, 6, 50, 51, 52, 53, 54, 55, 56])]
#[case::single(&[0])]
fn coverage_is_consistent(#[case] glyphs: &[u16]) {
    let coverage = CoverageTable::from_glyphs(glyphs.iter().copied().map(GlyphId16::new));
    // and the same table after a trip through bytes
    let bytes = dump_table(&coverage).unwrap();
    let reread = CoverageTable::read(FontData::new(&bytes)).unwrap();
    for table in [&coverage, &reread] {
        for gid in 0..=u16::MAX {
            let expected = glyphs.iter().position(|g| *g == gid).map(|i| i as u16);
            assert_eq!(table.get(GlyphId16::new(gid)), expected, "glyph {gid}");
        }
    }
}

#[test]
fn class_default_is_zero() {
    let format1 = layout::class_def_format1(10, &[1, 2, 0, 3]);
    let format1 = ClassDef::read(FontData::new(&format1)).unwrap();
    let format2 = layout::class_def_format2(&[(5, 6, 1), (10, 12, 2)]);
    let format2 = ClassDef::read(FontData::new(&format2)).unwrap();
    for (gid, expected) in [(0, 0), (9, 0), (10, 1), (11, 2), (12, 0), (13, 3), (14, 0)] {
        assert_eq!(format1.get(GlyphId16::new(gid)), expected, "glyph {gid}");
    }
    for (gid, expected) in [(0, 0), (5, 1), (6, 1), (7, 0), (10, 2), (12, 2), (13, 0)] {
        assert_eq!(format2.get(GlyphId16::new(gid)), expected, "glyph {gid}");
    }
    assert_eq!(format1.get(GlyphId16::new(u16::MAX)), 0);
    assert_eq!(format2.get(GlyphId16::new(u16::MAX)), 0);
}

#[test]
fn search_tag_finds_or_places() {
    let tags = [b"DFLT", b"arab", b"cyrl", b"grek", b"latn"].map(Tag::new);
    let records: Vec<_> = tags
        .iter()
        .map(|tag| ScriptRecord {
            tag: *tag,
            script: Script::default(),
        })
        .collect();
    let needles = [b"AAAA", b"DFLT", b"Zzzz", b"arab", b"beng", b"latn", b"zzzz"].map(Tag::new);
    for needle in needles {
        match search_tag(&records, needle) {
            Ok(i) => assert_eq!(tags[i], needle),
            Err(i) => {
                assert!(!tags.contains(&needle));
                assert!(tags[..i].iter().all(|tag| *tag < needle), "{needle}");
                assert!(tags[i..].iter().all(|tag| *tag > needle), "{needle}");
            }
        }
    }
    assert_eq!(search_tag(&records[..0], LATN), Err(0));
}

#[test]
fn bin_search_finds_or_places() {
    let sorted = [2u16, 3, 5, 8, 13, 21];
    for value in 0..25u16 {
        match bin_search(&sorted, &value) {
            Ok(i) => assert_eq!(sorted[i], value),
            Err(i) => {
                assert!(!sorted.contains(&value));
                let mut inserted = sorted.to_vec();
                inserted.insert(i, value);
                assert!(inserted.windows(2).all(|pair| pair[0] < pair[1]));
            }
        }
    }
}

#[test]
fn search_range_matches_containing_range() {
    let ranges = [(5, 6, 1), (10, 12, 2), (20, 20, 3)].map(|(start, end, class)| {
        ClassRangeRecord {
            start_glyph_id: GlyphId16::new(start),
            end_glyph_id: GlyphId16::new(end),
            class,
        }
    });
    for gid in 0..30u16 {
        let expected = ranges
            .iter()
            .find(|r| r.start_glyph_id.to_u16() <= gid && gid <= r.end_glyph_id.to_u16());
        assert_eq!(search_range(&ranges, GlyphId16::new(gid)), expected, "{gid}");
    }
}
