//! OpenType Layout common table formats
//!
//! The script, feature and lookup lists shared by [`GSUB`](super::gsub)
//! and [`GPOS`](super::gpos), generic over the subtable type of each.

mod class_def;
mod context;
mod coverage;
mod lookup_flag;
pub mod search;

use font_types::{GlyphId16, Tag};

pub use class_def::{ClassDef, ClassRangeRecord};
pub use context::{
    ChainedSequenceContext, ChainedSequenceRule, ChainedSequenceRuleSet, ContextMatch,
    SequenceContext, SequenceLookupRecord, SequenceRule, SequenceRuleSet,
};
pub use coverage::{CoverageTable, RangeRecord};
pub use lookup_flag::LookupFlag;
use search::{search_tag, Tagged};

use crate::{
    error::InvariantViolation,
    read::{FontRead, FontReadWithArgs, ReadError},
    write::{FontWrite, TableWriter},
    Cursor, FontData,
};

/// The language tag that selects a script's default language system.
pub const DEFAULT_LANGUAGE: Tag = Tag::new(b"dflt");
/// The script tag used for script-neutral features.
pub const DEFAULT_SCRIPT: Tag = Tag::new(b"DFLT");
const LATIN_SCRIPT: Tag = Tag::new(b"latn");
const NO_REQUIRED_FEATURE: u16 = 0xFFFF;

/// A subtable type stored in a lookup list.
pub trait LookupSubtable: FontReadWithArgs<Args = u16> + FontWrite {
    /// The lookup types a lookup of this table may declare.
    const LOOKUP_TYPES: &'static [u16];
    /// The name of the lookup type field, for errors.
    const LOOKUP_TYPE_LABEL: &'static str;

    /// The lookup type this subtable implements, looking through
    /// extension subtables.
    fn effective_type(&self) -> u16;
}

/// The label used for a format error in a subtable of `lookup_type`.
pub(crate) fn format_label(lookup_type: u16) -> &'static str {
    const LABELS: [&str; 10] = [
        "lookup subtable format",
        "lookup type 1 format",
        "lookup type 2 format",
        "lookup type 3 format",
        "lookup type 4 format",
        "lookup type 5 format",
        "lookup type 6 format",
        "lookup type 7 format",
        "lookup type 8 format",
        "lookup type 9 format",
    ];
    LABELS
        .get(lookup_type as usize)
        .copied()
        .unwrap_or(LABELS[0])
}

/// A GSUB or GPOS table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout<T> {
    /// 0 or 1; version 1.1 has a FeatureVariations offset.
    pub minor_version: u16,
    pub script_list: ScriptList,
    pub feature_list: FeatureList,
    pub lookup_list: LookupList<T>,
    /// The source had a FeatureVariations table. It is not decoded, and is
    /// written as a null offset.
    pub has_feature_variations: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptList {
    /// Sorted by tag.
    pub records: Vec<ScriptRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScriptRecord {
    pub tag: Tag,
    pub script: Script,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Script {
    pub default_lang_sys: Option<LangSys>,
    /// Sorted by tag.
    pub lang_sys_records: Vec<LangSysRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LangSysRecord {
    pub tag: Tag,
    pub lang_sys: LangSys,
}

/// The features enabled for one language of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LangSys {
    /// 0xFFFF if there is no required feature.
    pub required_feature_index: u16,
    /// Indices into the feature list.
    pub feature_indices: Vec<u16>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureList {
    /// Sorted by tag; several records may share a tag.
    pub records: Vec<FeatureRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeatureRecord {
    pub tag: Tag,
    pub feature: Feature,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Feature {
    /// Indices into the lookup list.
    pub lookup_list_indices: Vec<u16>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LookupList<T> {
    pub lookups: Vec<Lookup<T>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lookup<T> {
    pub lookup_type: u16,
    pub flag: LookupFlag,
    pub subtables: Vec<T>,
    /// Present when `flag` has [`LookupFlag::USE_MARK_FILTERING_SET`].
    pub mark_filtering_set: Option<u16>,
}

impl Tagged for ScriptRecord {
    fn tag(&self) -> Tag {
        self.tag
    }
}

impl Tagged for LangSysRecord {
    fn tag(&self) -> Tag {
        self.tag
    }
}

impl Tagged for FeatureRecord {
    fn tag(&self) -> Tag {
        self.tag
    }
}

impl Default for LangSys {
    fn default() -> Self {
        LangSys {
            required_feature_index: NO_REQUIRED_FEATURE,
            feature_indices: Vec::new(),
        }
    }
}

impl<T> Default for LookupList<T> {
    fn default() -> Self {
        LookupList {
            lookups: Vec::new(),
        }
    }
}

impl<T> Default for Layout<T> {
    fn default() -> Self {
        Layout {
            minor_version: 0,
            script_list: ScriptList::default(),
            feature_list: FeatureList::default(),
            lookup_list: LookupList::default(),
            has_feature_variations: false,
        }
    }
}

impl<T> Lookup<T> {
    /// An empty lookup with no flags.
    pub fn new(lookup_type: u16) -> Self {
        Lookup {
            lookup_type,
            flag: LookupFlag::empty(),
            subtables: Vec::new(),
            mark_filtering_set: None,
        }
    }
}

impl<T: LookupSubtable> Lookup<T> {
    /// The lookup type, or the type wrapped by its extension subtables.
    pub fn effective_type(&self) -> u16 {
        self.subtables
            .first()
            .map(LookupSubtable::effective_type)
            .unwrap_or(self.lookup_type)
    }
}

fn is_default_language(language: Option<Tag>) -> bool {
    matches!(language, None | Some(DEFAULT_LANGUAGE) | Some(DEFAULT_SCRIPT))
}

impl Script {
    /// The language system for `language`; `None`, `dflt` and `DFLT` select
    /// the default.
    pub fn lang_sys(&self, language: Option<Tag>) -> Option<&LangSys> {
        match language {
            Some(tag) if !is_default_language(language) => search_tag(&self.lang_sys_records, tag)
                .ok()
                .map(|index| &self.lang_sys_records[index].lang_sys),
            _ => self.default_lang_sys.as_ref(),
        }
    }

    /// The language system for `language`, inserting an empty one if needed.
    pub fn get_or_insert_lang_sys(&mut self, language: Option<Tag>) -> &mut LangSys {
        match language {
            Some(tag) if !is_default_language(language) => {
                let index = match search_tag(&self.lang_sys_records, tag) {
                    Ok(index) => index,
                    Err(index) => {
                        self.lang_sys_records.insert(
                            index,
                            LangSysRecord {
                                tag,
                                lang_sys: LangSys::default(),
                            },
                        );
                        index
                    }
                };
                &mut self.lang_sys_records[index].lang_sys
            }
            _ => self.default_lang_sys.get_or_insert_with(LangSys::default),
        }
    }
}

impl<T> Layout<T> {
    /// The script with this tag.
    pub fn script(&self, script: Tag) -> Option<&Script> {
        search_tag(&self.script_list.records, script)
            .ok()
            .map(|index| &self.script_list.records[index].script)
    }

    /// Tags of every script, in table order.
    pub fn script_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.script_list.records.iter().map(|record| record.tag)
    }

    /// `DFLT` if present, else `latn` if present.
    pub fn default_script_tag(&self) -> Option<Tag> {
        [DEFAULT_SCRIPT, LATIN_SCRIPT]
            .into_iter()
            .find(|tag| self.script(*tag).is_some())
    }

    pub fn lang_sys(&self, script: Tag, language: Option<Tag>) -> Option<&LangSys> {
        self.script(script)?.lang_sys(language)
    }

    /// The index of the feature with this tag enabled for a language system.
    pub fn feature_index(&self, script: Tag, language: Option<Tag>, feature: Tag) -> Option<u16> {
        self.lang_sys(script, language)?
            .feature_indices
            .iter()
            .copied()
            .find(|index| {
                self.feature_list
                    .records
                    .get(*index as usize)
                    .is_some_and(|record| record.tag == feature)
            })
    }

    pub fn feature(&self, script: Tag, language: Option<Tag>, feature: Tag) -> Option<&Feature> {
        let index = self.feature_index(script, language, feature)?;
        Some(&self.feature_list.records[index as usize].feature)
    }

    pub fn lookup(&self, index: u16) -> Option<&Lookup<T>> {
        self.lookup_list.lookups.get(index as usize)
    }

    /// The script record for `script`, inserting an empty script with an
    /// empty default language system if needed.
    pub fn get_or_insert_script(&mut self, script: Tag) -> &mut Script {
        let records = &mut self.script_list.records;
        let index = match search_tag(records, script) {
            Ok(index) => index,
            Err(index) => {
                records.insert(
                    index,
                    ScriptRecord {
                        tag: script,
                        script: Script {
                            default_lang_sys: Some(LangSys::default()),
                            lang_sys_records: Vec::new(),
                        },
                    },
                );
                index
            }
        };
        &mut records[index].script
    }

    pub fn get_or_insert_lang_sys(&mut self, script: Tag, language: Option<Tag>) -> &mut LangSys {
        self.get_or_insert_script(script)
            .get_or_insert_lang_sys(language)
    }

    /// The index of `feature` for this language system, appending a new
    /// feature record if the language system does not enable one.
    ///
    /// The feature list must stay sorted by tag, so a new feature whose tag
    /// sorts before the last record is rejected.
    pub fn add_feature(
        &mut self,
        script: Tag,
        language: Option<Tag>,
        feature: Tag,
    ) -> Result<u16, InvariantViolation> {
        if let Some(index) = self.feature_index(script, language, feature) {
            return Ok(index);
        }
        if let Some(last) = self.feature_list.records.last() {
            if feature < last.tag {
                return Err(InvariantViolation::FeatureOutOfOrder {
                    previous: last.tag,
                    inserted: feature,
                });
            }
        }
        // a list longer than u16::MAX is reported as a count overflow on encode
        let index = self.feature_list.records.len() as u16;
        self.feature_list.records.push(FeatureRecord {
            tag: feature,
            feature: Feature::default(),
        });
        self.get_or_insert_lang_sys(script, language)
            .feature_indices
            .push(index);
        Ok(index)
    }

    /// The index of a lookup of `lookup_type` linked to `feature`.
    ///
    /// If the feature has no lookup of that type, an empty one is appended
    /// to the lookup list and linked, adding the feature first if needed.
    pub fn add_lookup(
        &mut self,
        script: Tag,
        language: Option<Tag>,
        feature: Tag,
        lookup_type: u16,
    ) -> Result<u16, InvariantViolation> {
        let feature_index = self.add_feature(script, language, feature)?;
        let feature = &mut self.feature_list.records[feature_index as usize].feature;
        let lookups = &self.lookup_list.lookups;
        let existing = feature.lookup_list_indices.iter().copied().find(|index| {
            lookups
                .get(*index as usize)
                .is_some_and(|lookup| lookup.lookup_type == lookup_type)
        });
        if let Some(index) = existing {
            return Ok(index);
        }
        let lookup_index = self.lookup_list.lookups.len() as u16;
        feature.lookup_list_indices.push(lookup_index);
        self.lookup_list.lookups.push(Lookup::new(lookup_type));
        Ok(lookup_index)
    }
}

impl<T: LookupSubtable> Layout<T> {
    /// The lookups of a feature, in feature order, optionally restricted to
    /// one lookup type.
    pub fn lookups(
        &self,
        script: Tag,
        language: Option<Tag>,
        feature: Tag,
        lookup_type: Option<u16>,
    ) -> Vec<&Lookup<T>> {
        let Some(feature) = self.feature(script, language, feature) else {
            return Vec::new();
        };
        feature
            .lookup_list_indices
            .iter()
            .filter_map(|index| self.lookup(*index))
            .filter(|lookup| lookup_type.map_or(true, |ty| lookup.effective_type() == ty))
            .collect()
    }
}

/// Every glyph covered by `coverage`, in coverage index order.
pub fn expand_coverage(coverage: &CoverageTable) -> Vec<GlyphId16> {
    coverage.iter().collect()
}

impl<T: LookupSubtable> FontRead for Layout<T> {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major_version: u16 = cursor.read()?;
        if major_version != 1 {
            return Err(cursor.invalid_format(0, "layout major version", major_version, &[1]));
        }
        let minor_version: u16 = cursor.read()?;
        if minor_version > 1 {
            return Err(cursor.invalid_format(2, "layout minor version", minor_version, &[0, 1]));
        }
        let script_list = cursor.read_offset16()?.unwrap_or_default();
        let feature_list = cursor.read_offset16()?.unwrap_or_default();
        let lookup_list = cursor.read_offset16()?.unwrap_or_default();
        let has_feature_variations = minor_version == 1 && cursor.read::<u32>()? != 0;
        Ok(Layout {
            minor_version,
            script_list,
            feature_list,
            lookup_list,
            has_feature_variations,
        })
    }
}

fn read_tagged<R>(
    cursor: &mut Cursor<'_>,
    what: &'static str,
    make: impl Fn(Tag, FontData<'_>) -> Result<R, ReadError>,
) -> Result<Vec<R>, ReadError> {
    let count = cursor.read::<u16>()? as usize;
    let base = cursor.data();
    cursor.read_records(count, |cursor| {
        let tag = cursor.read()?;
        let pos = cursor.position();
        let offset = cursor.read::<u16>()? as usize;
        if offset == 0 {
            return Err(ReadError::MalformedData {
                offset: base.absolute_pos(pos),
                what,
            });
        }
        make(tag, base.split_off_checked(offset)?)
    })
}

impl FontRead for ScriptList {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let records = read_tagged(&mut data.cursor(), "script", |tag, data| {
            Ok(ScriptRecord {
                tag,
                script: Script::read(data)?,
            })
        })?;
        Ok(ScriptList { records })
    }
}

impl FontRead for Script {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let default_lang_sys = cursor.read_offset16()?;
        let lang_sys_records = read_tagged(&mut cursor, "language system", |tag, data| {
            Ok(LangSysRecord {
                tag,
                lang_sys: LangSys::read(data)?,
            })
        })?;
        Ok(Script {
            default_lang_sys,
            lang_sys_records,
        })
    }
}

impl FontRead for LangSys {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2); // lookupOrderOffset, reserved
        Ok(LangSys {
            required_feature_index: cursor.read()?,
            feature_indices: cursor.read_u16_list()?,
        })
    }
}

impl FontRead for FeatureList {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let records = read_tagged(&mut data.cursor(), "feature", |tag, data| {
            Ok(FeatureRecord {
                tag,
                feature: Feature::read(data)?,
            })
        })?;
        Ok(FeatureList { records })
    }
}

impl FontRead for Feature {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        // feature parameters are only defined for a handful of features
        // and are not modelled
        cursor.advance_by(2);
        Ok(Feature {
            lookup_list_indices: cursor.read_u16_list()?,
        })
    }
}

impl<T: LookupSubtable> FontRead for LookupList<T> {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let lookups = data.cursor().read_offset16_list("lookup")?;
        Ok(LookupList { lookups })
    }
}

impl<T: LookupSubtable> FontRead for Lookup<T> {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let lookup_type: u16 = cursor.read()?;
        if !T::LOOKUP_TYPES.contains(&lookup_type) {
            return Err(cursor.invalid_format(
                0,
                T::LOOKUP_TYPE_LABEL,
                lookup_type,
                T::LOOKUP_TYPES,
            ));
        }
        let flag: LookupFlag = cursor.read()?;
        let count = cursor.read::<u16>()? as usize;
        let subtables = cursor.read_records(count, |cursor| {
            let pos = cursor.position();
            let offset = cursor.read::<u16>()? as usize;
            if offset == 0 {
                return Err(ReadError::MalformedData {
                    offset: data.absolute_pos(pos),
                    what: "lookup subtable",
                });
            }
            T::read_with_args(data.split_off_checked(offset)?, &lookup_type)
        })?;
        let mark_filtering_set = if flag.contains(LookupFlag::USE_MARK_FILTERING_SET) {
            Some(cursor.read()?)
        } else {
            None
        };
        Ok(Lookup {
            lookup_type,
            flag,
            subtables,
            mark_filtering_set,
        })
    }
}

impl<T: LookupSubtable> FontWrite for Layout<T> {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write("majorVersion", 1u16);
        writer.write("minorVersion", self.minor_version);
        writer.write_offset16("scriptListOffset", Some(&self.script_list));
        writer.write_offset16("featureListOffset", Some(&self.feature_list));
        writer.write_offset16("lookupListOffset", Some(&self.lookup_list));
        if self.minor_version >= 1 {
            writer.write_offset32::<FeatureList>("featureVariationsOffset", None);
        }
    }
}

impl FontWrite for ScriptList {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_count("scriptCount", self.records.len());
        for record in &self.records {
            writer.write("scriptTag", record.tag);
            writer.write_offset16("scriptOffset", Some(&record.script));
        }
    }
}

impl FontWrite for Script {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_offset16("defaultLangSysOffset", self.default_lang_sys.as_ref());
        writer.write_count("langSysCount", self.lang_sys_records.len());
        for record in &self.lang_sys_records {
            writer.write("langSysTag", record.tag);
            writer.write_offset16("langSysOffset", Some(&record.lang_sys));
        }
    }
}

impl FontWrite for LangSys {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write("lookupOrderOffset", 0u16);
        writer.write("requiredFeatureIndex", self.required_feature_index);
        writer.write_u16_list(
            "featureIndexCount",
            "featureIndices",
            &self.feature_indices,
        );
    }
}

impl FontWrite for FeatureList {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_count("featureCount", self.records.len());
        for record in &self.records {
            writer.write("featureTag", record.tag);
            writer.write_offset16("featureOffset", Some(&record.feature));
        }
    }
}

impl FontWrite for Feature {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write("featureParamsOffset", 0u16);
        writer.write_u16_list(
            "lookupIndexCount",
            "lookupListIndices",
            &self.lookup_list_indices,
        );
    }
}

impl<T: LookupSubtable> FontWrite for LookupList<T> {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write_offset16_list("lookupCount", "lookupOffsets", &self.lookups);
    }
}

impl<T: LookupSubtable> FontWrite for Lookup<T> {
    fn write_into(&self, writer: &mut TableWriter) {
        let mut flag = self.flag;
        if self.mark_filtering_set.is_some() {
            flag |= LookupFlag::USE_MARK_FILTERING_SET;
        }
        writer.write("lookupType", self.lookup_type);
        writer.write("lookupFlag", flag);
        writer.write_offset16_list("subTableCount", "subtableOffsets", &self.subtables);
        if flag.contains(LookupFlag::USE_MARK_FILTERING_SET) {
            writer.write("markFilteringSet", self.mark_filtering_set.unwrap_or_default());
        }
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::layout::{self, FeatureDef, LookupDef, ScriptDef};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::write::dump_table;

    /// A stand-in subtable: the raw format word.
    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Raw(u16);

    impl FontReadWithArgs for Raw {
        type Args = u16;

        fn read_with_args(data: FontData<'_>, _: &u16) -> Result<Self, ReadError> {
            data.read_at(0).map(Raw)
        }
    }

    impl FontWrite for Raw {
        fn write_into(&self, writer: &mut TableWriter) {
            writer.write("format", self.0);
        }
    }

    impl LookupSubtable for Raw {
        const LOOKUP_TYPES: &'static [u16] = &[1, 2, 3];
        const LOOKUP_TYPE_LABEL: &'static str = "test lookup type";

        fn effective_type(&self) -> u16 {
            self.0
        }
    }

    fn tag(raw: &[u8; 4]) -> Tag {
        Tag::new(raw)
    }

    fn sample() -> Vec<u8> {
        layout::layout_table(
            &[
                ScriptDef {
                    tag: b"DFLT",
                    features: &[0],
                    languages: &[],
                },
                ScriptDef {
                    tag: b"latn",
                    features: &[0, 1],
                    languages: &[(b"DEU ", &[1]), (b"TRK ", &[0])],
                },
            ],
            &[
                FeatureDef {
                    tag: b"kern",
                    lookups: &[0],
                },
                FeatureDef {
                    tag: b"liga",
                    lookups: &[1, 0],
                },
            ],
            &[
                LookupDef::new(2, vec![vec![0, 2]]),
                LookupDef::new(1, vec![vec![0, 1], vec![0, 3]]),
            ],
        )
    }

    #[test]
    fn queries() {
        let bytes = sample();
        let table = Layout::<Raw>::read(FontData::new(&bytes)).unwrap();
        assert_eq!(
            table.script_tags().collect::<Vec<_>>(),
            [tag(b"DFLT"), tag(b"latn")]
        );
        assert_eq!(table.default_script_tag(), Some(tag(b"DFLT")));
        assert!(table.script(tag(b"cyrl")).is_none());

        let latn = tag(b"latn");
        assert_eq!(
            table.lang_sys(latn, None).unwrap().feature_indices,
            vec![0, 1]
        );
        assert_eq!(
            table.lang_sys(latn, Some(tag(b"dflt"))),
            table.lang_sys(latn, None)
        );
        assert_eq!(
            table.lang_sys(latn, Some(tag(b"DEU "))).unwrap().feature_indices,
            vec![1]
        );
        assert!(table.lang_sys(latn, Some(tag(b"FRA "))).is_none());

        assert_eq!(table.feature_index(latn, None, tag(b"liga")), Some(1));
        assert!(table.feature(latn, Some(tag(b"DEU ")), tag(b"kern")).is_none());

        let lookups = table.lookups(latn, None, tag(b"liga"), None);
        assert_eq!(lookups.len(), 2);
        assert_eq!(lookups[0].subtables, vec![Raw(1), Raw(3)]);
        let only_pairs = table.lookups(latn, None, tag(b"liga"), Some(2));
        assert_eq!(only_pairs.len(), 1);
        assert_eq!(only_pairs[0].lookup_type, 2);
    }

    #[test]
    fn reencode_preserves_graph() {
        let bytes = sample();
        let table = Layout::<Raw>::read(FontData::new(&bytes)).unwrap();
        let written = dump_table(&table).unwrap();
        let reread = Layout::<Raw>::read(FontData::new(&written)).unwrap();
        assert_eq!(reread, table);
    }

    #[test]
    fn unknown_lookup_type() {
        let bytes = layout::layout_table(&[], &[], &[LookupDef::new(7, vec![vec![0, 1]])]);
        let err = Layout::<Raw>::read(FontData::new(&bytes)).unwrap_err();
        assert!(matches!(
            err,
            ReadError::InvalidFormat {
                what: "test lookup type",
                found: 7,
                ..
            }
        ));
    }

    #[test]
    fn version_checked() {
        let mut bytes = sample();
        bytes[1] = 2;
        let err = Layout::<Raw>::read(FontData::new(&bytes)).unwrap_err();
        assert_eq!(err.to_string(), "layout major version must be 1, found 2 at offset 0");
    }

    #[test]
    fn mark_filtering_set_round_trip() {
        let mut lookup = Lookup::new(1);
        lookup.subtables.push(Raw(1));
        lookup.mark_filtering_set = Some(4);
        let bytes = dump_table(&lookup).unwrap();
        assert_eq!(&bytes[..4], &[0, 1, 0, 0x10]);
        let reread = Lookup::<Raw>::read(FontData::new(&bytes)).unwrap();
        assert_eq!(reread.mark_filtering_set, Some(4));
        assert_eq!(reread.subtables, vec![Raw(1)]);
    }

    #[test]
    fn build_from_scratch() {
        let mut table = Layout::<Raw>::default();
        let latn = tag(b"latn");
        let kern = table.add_lookup(latn, None, tag(b"kern"), 2).unwrap();
        let liga = table.add_lookup(latn, None, tag(b"liga"), 4).unwrap();
        let also_liga = table.add_lookup(latn, None, tag(b"liga"), 4).unwrap();
        // a lookup of another type under the same feature is a new one
        let liga_context = table.add_lookup(latn, None, tag(b"liga"), 6).unwrap();
        assert_eq!((kern, liga, also_liga, liga_context), (0, 1, 1, 2));
        assert_eq!(table.lookup_list.lookups.len(), 3);
        assert_eq!(table.feature_list.records.len(), 2);
        assert_eq!(
            table.feature(latn, None, tag(b"liga")).unwrap().lookup_list_indices,
            vec![1, 2]
        );

        table.get_or_insert_script(tag(b"DFLT"));
        table.get_or_insert_script(tag(b"arab"));
        assert_eq!(
            table.script_tags().collect::<Vec<_>>(),
            [tag(b"DFLT"), tag(b"arab"), tag(b"latn")]
        );
        table.get_or_insert_lang_sys(latn, Some(tag(b"TRK ")));
        table.get_or_insert_lang_sys(latn, Some(tag(b"DEU ")));
        let langs: Vec<_> = table
            .script(latn)
            .unwrap()
            .lang_sys_records
            .iter()
            .map(|record| record.tag)
            .collect();
        assert_eq!(langs, [tag(b"DEU "), tag(b"TRK ")]);
    }

    #[test]
    fn features_must_be_added_in_order() {
        let mut table = Layout::<Raw>::default();
        let latn = tag(b"latn");
        table.add_feature(latn, None, tag(b"liga")).unwrap();
        // same tag for another language is fine
        table
            .add_feature(latn, Some(tag(b"TRK ")), tag(b"liga"))
            .unwrap();
        let err = table.add_feature(latn, None, tag(b"kern")).unwrap_err();
        assert_eq!(
            err,
            InvariantViolation::FeatureOutOfOrder {
                previous: tag(b"liga"),
                inserted: tag(b"kern"),
            }
        );
        assert_eq!(table.feature_list.records.len(), 2);
    }

    #[test]
    fn coverage_expansion() {
        let coverage = CoverageTable::Format2 {
            ranges: vec![RangeRecord {
                start_glyph_id: GlyphId16::new(4),
                end_glyph_id: GlyphId16::new(6),
                start_coverage_index: 0,
            }],
        };
        assert_eq!(
            expand_coverage(&coverage),
            [4, 5, 6].map(GlyphId16::new).to_vec()
        );
    }
}
