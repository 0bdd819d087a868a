//! Whole fonts: the sfnt and WOFF containers and the decoded table graph.

use std::{borrow::Cow, collections::BTreeMap, io::Read};

use font_types::{GlyphId16, Tag, CFF_SFNT_VERSION, TT_SFNT_VERSION, WOFF2_SIGNATURE, WOFF_SIGNATURE};

use crate::{
    error::{EncodeError, Error},
    glyph_set::{GlyphLoading, GlyphSet},
    read::{FontRead, FontReadWithArgs, ReadError},
    tables::{
        glyf::{self, GlyfLocaBuilder, Outline},
        gpos::{self, Gpos, PositioningSubtable},
        gsub::{self, Gsub},
        head::{self, Head, CHECKSUM_ADJUSTMENT_POS, CHECKSUM_MAGIC},
        hhea::{self, Hhea},
        hmtx::{self, Hmtx},
        layout::Lookup,
        loca::{self, Loca},
        maxp::{self, Maxp},
    },
    write::dump_table,
    FontData,
};

const NAME: Tag = Tag::new(b"name");
const CFF: Tag = Tag::new(b"CFF ");
const CFF2: Tag = Tag::new(b"CFF2");
const FVAR: Tag = Tag::new(b"fvar");
const GVAR: Tag = Tag::new(b"gvar");
const AVAR: Tag = Tag::new(b"avar");

/// Apple's TrueType signature.
const TRUE_SIGNATURE: u32 = u32::from_be_bytes(*b"true");
/// Old style PostScript-in-sfnt; the tables are read as TrueType.
const TYP1_SIGNATURE: u32 = u32::from_be_bytes(*b"typ1");

const SFNT_HEADER_LEN: usize = 12;
const TABLE_RECORD_LEN: usize = 16;
const WOFF_HEADER_LEN: usize = 44;
const WOFF_RECORD_LEN: usize = 20;

/// Options controlling [`Font::decode_with_options`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// When glyph outlines are decoded.
    pub glyphs: GlyphLoading,
    /// Drop a `GSUB` or `GPOS` table in an unsupported format from the
    /// layout model, instead of failing. Its bytes are still re-encoded.
    pub skip_unsupported_layout: bool,
}

/// Where a font's outlines come from.
#[derive(Debug)]
pub enum Outlines {
    /// TrueType `glyf` and `loca`.
    Glyf(GlyphSet),
    /// `CFF ` or `CFF2`, kept as opaque bytes.
    Cff(Tag),
}

/// A glyph with its horizontal metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph<'a> {
    pub id: GlyphId16,
    pub advance_width: u16,
    pub left_side_bearing: i16,
    /// `None` for CFF fonts, whose charstrings are not interpreted.
    pub outline: Option<Cow<'a, Outline>>,
}

/// Raw bytes of one table, and where they began in the file.
#[derive(Clone, Debug)]
struct TableBytes {
    data: Vec<u8>,
    /// Absolute offset of the first byte; zero for tables that were
    /// decompressed from a WOFF file.
    position: u32,
}

impl TableBytes {
    fn font_data(&self) -> FontData<'_> {
        FontData::new_at(&self.data, self.position)
    }
}

/// A decoded font.
///
/// The tables this crate understands are decoded into an owned graph;
/// every other table is kept as bytes and written back unchanged by
/// [`Font::encode`].
#[derive(Debug)]
pub struct Font {
    sfnt_version: u32,
    tables: BTreeMap<Tag, TableBytes>,
    head: Head,
    hhea: Hhea,
    maxp: Maxp,
    hmtx: Hmtx,
    outlines: Outlines,
    gsub: Option<Gsub>,
    gpos: Option<Gpos>,
}

/// Decode a font with the default options.
pub fn decode_font(bytes: &[u8]) -> Result<Font, Error> {
    Font::decode(bytes)
}

/// Encode a font back to sfnt bytes.
pub fn encode_font(font: &Font) -> Result<Vec<u8>, Error> {
    font.encode()
}

impl Font {
    /// Decode an sfnt or WOFF file.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        Self::decode_with_options(bytes, DecodeOptions::default())
    }

    pub fn decode_with_options(bytes: &[u8], options: DecodeOptions) -> Result<Self, Error> {
        let data = FontData::new(bytes);
        let signature: u32 = data.read_at(0).map_err(Error::Directory)?;
        let (sfnt_version, tables) = match signature {
            TT_SFNT_VERSION | TRUE_SIGNATURE | TYP1_SIGNATURE | CFF_SFNT_VERSION => {
                (signature, read_sfnt_tables(data).map_err(Error::Directory)?)
            }
            WOFF_SIGNATURE => read_woff_tables(data)?,
            WOFF2_SIGNATURE => {
                log::debug!("WOFF 2.0 decoding is not supported");
                return Err(Error::UnsupportedSignature(Tag::from_u32(signature)));
            }
            _ => return Err(Error::UnsupportedSignature(Tag::from_u32(signature))),
        };
        log::debug!(
            "decoding {} tables ({:?})",
            tables.len(),
            Tag::from_u32(sfnt_version)
        );
        Self::from_tables(sfnt_version, tables, options)
    }

    fn from_tables(
        sfnt_version: u32,
        tables: BTreeMap<Tag, TableBytes>,
        options: DecodeOptions,
    ) -> Result<Self, Error> {
        let required = |tag: Tag| {
            tables
                .get(&tag)
                .map(TableBytes::font_data)
                .ok_or(Error::MissingTable(tag))
        };
        required(NAME)?;
        let hmtx_data = required(hmtx::TAG)?;
        let head = Head::read(required(head::TAG)?).map_err(Error::table(head::TAG))?;
        let hhea = Hhea::read(required(hhea::TAG)?).map_err(Error::table(hhea::TAG))?;
        let maxp = Maxp::read(required(maxp::TAG)?).map_err(Error::table(maxp::TAG))?;
        let num_glyphs = maxp.num_glyphs();
        let hmtx = Hmtx::read_with_args(hmtx_data, &(hhea.number_of_h_metrics(), num_glyphs))
            .map_err(Error::table(hmtx::TAG))?;

        let outlines = match (tables.get(&glyf::TAG), tables.get(&loca::TAG)) {
            (Some(glyf_bytes), Some(loca_bytes)) => {
                let loca = Loca::read_with_args(
                    loca_bytes.font_data(),
                    &(head.long_loca(), num_glyphs),
                )
                .map_err(Error::table(loca::TAG))?;
                let glyphs = GlyphSet::load(glyf_bytes.font_data(), loca, options.glyphs)
                    .map_err(Error::table(glyf::TAG))?;
                Outlines::Glyf(glyphs)
            }
            (Some(_), None) => return Err(Error::MissingTable(loca::TAG)),
            _ => match [CFF, CFF2].into_iter().find(|tag| tables.contains_key(tag)) {
                Some(tag) => Outlines::Cff(tag),
                None => return Err(Error::NoOutlines),
            },
        };

        if !tables.contains_key(&FVAR) {
            for tag in [GVAR, AVAR] {
                if tables.contains_key(&tag) {
                    log::warn!("'{tag}' table present without 'fvar'");
                }
            }
        }
        if tables.contains_key(&GVAR) && !tables.contains_key(&glyf::TAG) {
            log::warn!("'gvar' table present without 'glyf'");
        }

        let gsub = read_layout::<Gsub>(&tables, gsub::TAG, options)?;
        let gpos = read_layout::<Gpos>(&tables, gpos::TAG, options)?;

        Ok(Font {
            sfnt_version,
            tables,
            head,
            hhea,
            maxp,
            hmtx,
            outlines,
            gsub,
            gpos,
        })
    }

    /// The sfnt version, or for WOFF files the flavor of the wrapped font.
    pub fn sfnt_version(&self) -> u32 {
        self.sfnt_version
    }

    /// The tags of every table in the font, in order.
    pub fn table_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.tables.keys().copied()
    }

    /// The raw (decompressed) bytes of a table.
    pub fn table_data(&self, tag: Tag) -> Option<&[u8]> {
        self.tables.get(&tag).map(|table| table.data.as_slice())
    }

    pub fn head(&self) -> &Head {
        &self.head
    }

    pub fn hhea(&self) -> &Hhea {
        &self.hhea
    }

    pub fn maxp(&self) -> &Maxp {
        &self.maxp
    }

    pub fn hmtx(&self) -> &Hmtx {
        &self.hmtx
    }

    pub fn num_glyphs(&self) -> u16 {
        self.maxp.num_glyphs()
    }

    pub fn outlines(&self) -> &Outlines {
        &self.outlines
    }

    /// The glyph set, for TrueType outlines.
    pub fn glyph_set(&self) -> Option<&GlyphSet> {
        match &self.outlines {
            Outlines::Glyf(glyphs) => Some(glyphs),
            Outlines::Cff(_) => None,
        }
    }

    pub fn gsub(&self) -> Option<&Gsub> {
        self.gsub.as_ref()
    }

    pub fn gsub_mut(&mut self) -> &mut Option<Gsub> {
        &mut self.gsub
    }

    pub fn gpos(&self) -> Option<&Gpos> {
        self.gpos.as_ref()
    }

    /// If the GPOS holds undecoded subtables, any change made here makes
    /// [`Font::encode`] fail with [`EncodeError::UndecodedSubtables`].
    pub fn gpos_mut(&mut self) -> &mut Option<Gpos> {
        &mut self.gpos
    }

    /// A glyph and its metrics, decoding the outline if needed.
    ///
    /// Returns `None` if `gid` is not less than `numGlyphs`.
    pub fn glyph(&self, gid: GlyphId16) -> Result<Option<Glyph<'_>>, Error> {
        if gid.to_u16() >= self.num_glyphs() {
            return Ok(None);
        }
        let outline = match &self.outlines {
            Outlines::Glyf(glyphs) => glyphs.outline(gid)?,
            Outlines::Cff(_) => None,
        };
        Ok(Some(Glyph {
            id: gid,
            advance_width: self.hmtx.advance(gid).unwrap_or_default(),
            left_side_bearing: self.hmtx.side_bearing(gid).unwrap_or_default(),
            outline,
        }))
    }

    /// The pair adjustment lookups of the `kern` feature.
    ///
    /// `script` defaults to `DFLT`, then `latn`.
    pub fn kerning_lookups(
        &self,
        script: Option<Tag>,
        language: Option<Tag>,
    ) -> Vec<&Lookup<PositioningSubtable>> {
        let Some(gpos) = &self.gpos else {
            return Vec::new();
        };
        let Some(script) = script.or_else(|| gpos.default_script_tag()) else {
            return Vec::new();
        };
        gpos.kerning_lookups(script, language)
    }

    /// The horizontal kerning adjustment between two glyphs, or 0.
    pub fn kern(&self, left: GlyphId16, right: GlyphId16) -> i16 {
        gpos::kerning(&self.kerning_lookups(None, None), left, right)
    }

    /// Run the `GSUB` lookups of `features`, in order, over `glyphs`.
    pub fn apply_lookups(
        &self,
        script: Tag,
        language: Option<Tag>,
        features: &[Tag],
        glyphs: &[GlyphId16],
    ) -> Vec<GlyphId16> {
        let mut glyphs = glyphs.to_vec();
        if let Some(gsub) = &self.gsub {
            gsub.apply_features(script, language, features, &mut glyphs);
        }
        glyphs
    }

    /// Encode the font as an sfnt.
    ///
    /// Outlines and layout tables are re-encoded from the decoded graph,
    /// other tables are copied. Offsets may differ from the input.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut builder = FontBuilder::new(self.sfnt_version);
        for (tag, table) in &self.tables {
            builder.add_raw(*tag, table.data.as_slice());
        }

        let mut head = self.head.clone();
        if let Outlines::Glyf(glyphs) = &self.outlines {
            let mut glyf_loca = GlyfLocaBuilder::new();
            for gid in 0..glyphs.num_glyphs() {
                let gid = GlyphId16::new(gid);
                let outline = glyphs.outline(gid)?.unwrap_or_default();
                if let Outline::Simple(glyph) = outline.as_ref() {
                    glyph.check_limits(gid)?;
                }
                glyf_loca.add_glyph(&outline)?;
            }
            let (glyf_data, loca_table) = glyf_loca.build();
            head.set_index_to_loc_format(true);
            builder.add_raw(glyf::TAG, glyf_data);
            builder.add_raw(loca::TAG, dump_table(&loca_table)?);
        }
        head.set_checksum_adjustment(0);
        builder.add_raw(head::TAG, dump_table(&head)?);
        builder.add_raw(hhea::TAG, dump_table(&self.hhea)?);
        builder.add_raw(maxp::TAG, dump_table(&self.maxp)?);
        builder.add_raw(hmtx::TAG, dump_table(&self.hmtx)?);

        if let Some(gsub) = &self.gsub {
            builder.add_raw(gsub::TAG, dump_table(gsub)?);
        }
        match &self.gpos {
            Some(gpos) if gpos.has_unsupported_subtables() => {
                if !self.matches_source(gpos::TAG, gpos) {
                    return Err(EncodeError::UndecodedSubtables { table: gpos::TAG }.into());
                }
                log::warn!("GPOS has undecoded subtables, copying it unchanged");
            }
            Some(gpos) => {
                builder.add_raw(gpos::TAG, dump_table(gpos)?);
            }
            None => (),
        }
        Ok(builder.build())
    }

    /// `true` if the table's source bytes decode to `table`.
    fn matches_source<T: FontRead + PartialEq>(&self, tag: Tag, table: &T) -> bool {
        self.tables
            .get(&tag)
            .and_then(|source| T::read(source.font_data()).ok())
            .is_some_and(|source| &source == table)
    }
}

fn read_layout<T: FontRead>(
    tables: &BTreeMap<Tag, TableBytes>,
    tag: Tag,
    options: DecodeOptions,
) -> Result<Option<T>, Error> {
    let Some(table) = tables.get(&tag) else {
        return Ok(None);
    };
    match T::read(table.font_data()) {
        Ok(layout) => Ok(Some(layout)),
        Err(err @ ReadError::InvalidFormat { .. }) if options.skip_unsupported_layout => {
            log::warn!("skipping '{tag}': {err}");
            Ok(None)
        }
        Err(err) => Err(Error::Table { tag, source: err }),
    }
}

fn read_sfnt_tables(data: FontData) -> Result<BTreeMap<Tag, TableBytes>, ReadError> {
    let num_tables: u16 = data.read_at(4)?;
    let mut cursor = data.split_off_checked(SFNT_HEADER_LEN)?.cursor();
    let mut tables = BTreeMap::new();
    for _ in 0..num_tables {
        let tag: Tag = cursor.read()?;
        let _checksum: u32 = cursor.read()?;
        let offset: u32 = cursor.read()?;
        let length: u32 = cursor.read()?;
        let table = data.slice_checked(offset as usize, length as usize)?;
        tables.insert(
            tag,
            TableBytes {
                data: table.as_bytes().to_vec(),
                position: offset,
            },
        );
    }
    Ok(tables)
}

fn read_woff_tables(data: FontData) -> Result<(u32, BTreeMap<Tag, TableBytes>), Error> {
    let flavor: u32 = data.read_at(4).map_err(Error::Directory)?;
    if !matches!(flavor, TT_SFNT_VERSION | CFF_SFNT_VERSION) {
        return Err(Error::UnsupportedSignature(Tag::from_u32(flavor)));
    }
    let num_tables: u16 = data.read_at(12).map_err(Error::Directory)?;
    let mut tables = BTreeMap::new();
    for i in 0..num_tables as usize {
        let record = WOFF_HEADER_LEN + i * WOFF_RECORD_LEN;
        let read_u32 = |pos: usize| data.read_at::<u32>(record + pos).map_err(Error::Directory);
        let tag = Tag::from_u32(read_u32(0)?);
        let offset = read_u32(4)?;
        let comp_length = read_u32(8)?;
        let orig_length = read_u32(12)?;
        let payload = data
            .slice_checked(offset as usize, comp_length as usize)
            .map_err(Error::Directory)?;
        let table = if comp_length == orig_length {
            TableBytes {
                data: payload.as_bytes().to_vec(),
                position: offset,
            }
        } else if comp_length < orig_length {
            TableBytes {
                data: inflate(tag, payload.as_bytes(), orig_length)?,
                position: 0,
            }
        } else {
            return Err(Error::Directory(ReadError::MalformedData {
                offset: data.absolute_pos(record + 8),
                what: "WOFF compLength must not exceed origLength",
            }));
        };
        tables.insert(tag, table);
    }
    Ok((flavor, tables))
}

/// Inflate a zlib-compressed WOFF table, which must be exactly `expected`
/// bytes long.
fn inflate(tag: Tag, payload: &[u8], expected: u32) -> Result<Vec<u8>, Error> {
    let mut decoder = flate2::read::ZlibDecoder::new(payload).take(expected as u64 + 1);
    let mut out = Vec::with_capacity(expected as usize);
    let result = decoder.read_to_end(&mut out);
    let actual = out.len() as u32;
    if let Err(err) = result {
        log::warn!("'{tag}' failed to inflate: {err}");
        return Err(Error::Compression {
            tag,
            expected,
            actual,
        });
    }
    if actual != expected {
        return Err(Error::Compression {
            tag,
            expected,
            actual,
        });
    }
    Ok(out)
}

/// Assembles tables into an sfnt.
#[derive(Debug, Clone, Default)]
struct FontBuilder<'a> {
    sfnt_version: u32,
    tables: BTreeMap<Tag, Cow<'a, [u8]>>,
}

impl<'a> FontBuilder<'a> {
    fn new(sfnt_version: u32) -> Self {
        FontBuilder {
            sfnt_version,
            tables: BTreeMap::new(),
        }
    }

    fn add_raw(&mut self, tag: Tag, data: impl Into<Cow<'a, [u8]>>) -> &mut Self {
        self.tables.insert(tag, data.into());
        self
    }

    /// Lay out the directory and tables, then fix up `checksumAdjustment`.
    fn build(&self) -> Vec<u8> {
        let num_tables = self.tables.len() as u16;
        let search = SearchRange::compute(num_tables as usize, TABLE_RECORD_LEN);
        let mut data = Vec::new();
        data.extend_from_slice(&self.sfnt_version.to_be_bytes());
        for value in [
            num_tables,
            search.search_range,
            search.entry_selector,
            search.range_shift,
        ] {
            data.extend_from_slice(&value.to_be_bytes());
        }

        let mut position = SFNT_HEADER_LEN + self.tables.len() * TABLE_RECORD_LEN;
        let mut head_pos = None;
        for (tag, table) in &self.tables {
            if *tag == head::TAG {
                head_pos = Some(position);
            }
            data.extend_from_slice(&tag.to_be_bytes());
            data.extend_from_slice(&compute_checksum(table).to_be_bytes());
            data.extend_from_slice(&(position as u32).to_be_bytes());
            data.extend_from_slice(&(table.len() as u32).to_be_bytes());
            position += round4(table.len());
        }
        for table in self.tables.values() {
            data.extend_from_slice(table);
            data.resize(round4(data.len()), 0);
        }

        if let Some(pos) = head_pos {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(compute_checksum(&data));
            let field = pos + CHECKSUM_ADJUSTMENT_POS;
            if let Some(bytes) = data.get_mut(field..field + 4) {
                bytes.copy_from_slice(&adjustment.to_be_bytes());
            }
        }
        log::debug!("built font with {num_tables} tables ({} bytes)", data.len());
        data
    }
}

/// The binary search helpers in a table directory header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SearchRange {
    search_range: u16,
    entry_selector: u16,
    range_shift: u16,
}

impl SearchRange {
    fn compute(n_items: usize, item_size: usize) -> Self {
        let entry_selector = n_items.checked_ilog2().unwrap_or(0) as usize;
        let search_range = (1usize << entry_selector) * item_size;
        let range_shift = (n_items * item_size).saturating_sub(search_range);
        SearchRange {
            search_range: search_range as u16,
            entry_selector: entry_selector as u16,
            range_shift: range_shift as u16,
        }
    }
}

fn round4(sz: usize) -> usize {
    (sz + 3) & !3
}

/// The sum of the data as big-endian u32s, zero padded.
fn compute_checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}
