//! Whole font files, assembled from tables

use std::io::Write;

use font_types::{Fixed, Tag};

use crate::{bebuffer::BeBuffer, glyf};

/// Assemble an sfnt from `(tag, data)` pairs.
///
/// Tables are sorted by tag and padded to four bytes; checksums are left
/// at zero since nothing here verifies them.
pub fn build_sfnt(version: u32, tables: &[(Tag, Vec<u8>)]) -> Vec<u8> {
    let mut tables: Vec<_> = tables.iter().collect();
    tables.sort_by_key(|(tag, _)| *tag);
    let header_len = 12 + 16 * tables.len();
    let mut buf = BeBuffer::new()
        .push(version)
        .push(tables.len() as u16)
        .extend([0u16; 3]);
    let mut next = header_len;
    for (tag, data) in &tables {
        buf = buf
            .push(*tag)
            .push(0u32)
            .push(next as u32)
            .push(data.len() as u32);
        next += (data.len() + 3) & !3;
    }
    for (_, data) in &tables {
        let pad = ((data.len() + 3) & !3) - data.len();
        buf = buf.extend_bytes(data).extend_bytes(&[0u8; 3][..pad]);
    }
    buf.into_vec()
}

/// Wrap an sfnt in a WOFF 1.0 container, compressing every table.
///
/// `inflated_len_delta` is added to each table's declared original length,
/// to produce files whose payloads do not inflate to the declared size.
pub fn build_woff(sfnt: &[u8], inflated_len_delta: i32) -> Vec<u8> {
    let be_u16 = |pos: usize| u16::from_be_bytes([sfnt[pos], sfnt[pos + 1]]);
    let be_u32 =
        |pos: usize| u32::from_be_bytes([sfnt[pos], sfnt[pos + 1], sfnt[pos + 2], sfnt[pos + 3]]);
    let flavor = be_u32(0);
    let num_tables = be_u16(4) as usize;
    let mut entries = Vec::new();
    for i in 0..num_tables {
        let rec = 12 + 16 * i;
        let tag = Tag::from_u32(be_u32(rec));
        let offset = be_u32(rec + 8) as usize;
        let length = be_u32(rec + 12) as usize;
        let data = &sfnt[offset..offset + length];
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::best());
        encoder.write_all(data).unwrap();
        let compressed = encoder.finish().unwrap();
        let payload = if compressed.len() < data.len() {
            compressed
        } else {
            data.to_vec()
        };
        entries.push((tag, payload, length));
    }
    let header_len = 44 + 20 * entries.len();
    let mut body = BeBuffer::new();
    let mut records = BeBuffer::new();
    let mut next = header_len;
    for (tag, payload, orig_len) in &entries {
        let declared = (*orig_len as i64 + inflated_len_delta as i64) as u32;
        records = records
            .push(*tag)
            .push(next as u32)
            .push(payload.len() as u32)
            .push(declared)
            .push(0u32);
        let pad = ((payload.len() + 3) & !3) - payload.len();
        body = body.extend_bytes(payload).extend_bytes(&[0u8; 3][..pad]);
        next += payload.len() + pad;
    }
    BeBuffer::new()
        .push(Tag::new(b"wOFF"))
        .push(flavor)
        .push(next as u32)
        .push(entries.len() as u16)
        .push(0u16)
        .push(sfnt.len() as u32)
        .push(1u16)
        .push(0u16)
        .extend([0u32; 5])
        .extend_bytes(&records)
        .extend_bytes(&body)
        .into_vec()
}

/// A 54 byte `head` table.
pub fn head(units_per_em: u16, index_to_loc_format: i16) -> Vec<u8> {
    BeBuffer::new()
        .push(Fixed::from_f64(1.0))
        .push(Fixed::from_f64(1.0)) // fontRevision
        .push(0u32) // checksumAdjustment
        .push(0x5F0F3CF5u32)
        .push(0u16) // flags
        .push(units_per_em)
        .push(0i64) // created
        .push(0i64) // modified
        .extend([0i16, 0, 600, 800])
        .push(0u16) // macStyle
        .push(8u16) // lowestRecPPEM
        .push(2i16) // fontDirectionHint
        .push(index_to_loc_format)
        .push(0i16)
        .into_vec()
}

/// A 36 byte `hhea` table.
pub fn hhea(number_of_h_metrics: u16) -> Vec<u8> {
    BeBuffer::new()
        .push(Fixed::from_f64(1.0))
        .push(800i16) // ascender
        .push(-200i16) // descender
        .push(0i16) // lineGap
        .push(600u16) // advanceWidthMax
        .extend([0i16; 3]) // min lsb, min rsb, xMaxExtent
        .push(1i16) // caretSlopeRise
        .push(0i16) // caretSlopeRun
        .push(0i16) // caretOffset
        .extend([0i16; 4])
        .push(0i16) // metricDataFormat
        .push(number_of_h_metrics)
        .into_vec()
}

/// A version 1.0 (32 byte) `maxp` table.
pub fn maxp(num_glyphs: u16) -> Vec<u8> {
    BeBuffer::new()
        .push(Fixed::from_f64(1.0))
        .push(num_glyphs)
        .extend([0u16; 13])
        .into_vec()
}

/// A version 0.5 (6 byte) `maxp` table, as used by CFF fonts.
pub fn maxp_cff(num_glyphs: u16) -> Vec<u8> {
    BeBuffer::new()
        .push(0x0000_5000u32)
        .push(num_glyphs)
        .into_vec()
}

/// An `hmtx` table: long metrics then trailing left side bearings.
pub fn hmtx(metrics: &[(u16, i16)], trailing_lsbs: &[i16]) -> Vec<u8> {
    let mut buf = BeBuffer::new();
    for (advance, lsb) in metrics {
        buf = buf.push(*advance).push(*lsb);
    }
    buf.extend(trailing_lsbs.iter().copied()).into_vec()
}

/// An empty format 0 `name` table.
pub fn name() -> Vec<u8> {
    BeBuffer::new()
        .push(0u16)
        .push(0u16)
        .push(6u16)
        .into_vec()
}

/// `glyf` and a short or long `loca` for these glyph entries.
///
/// Entries are padded to even lengths.
pub fn glyf_and_loca(glyphs: &[&[u8]], long_loca: bool) -> (Vec<u8>, Vec<u8>) {
    let mut glyf = Vec::new();
    let mut offsets = vec![0u32];
    for glyph in glyphs {
        glyf.extend_from_slice(glyph);
        if glyf.len() % 2 == 1 {
            glyf.push(0);
        }
        offsets.push(glyf.len() as u32);
    }
    let loca = if long_loca {
        BeBuffer::new().extend(offsets).into_vec()
    } else {
        BeBuffer::new()
            .extend(offsets.into_iter().map(|off| (off / 2) as u16))
            .into_vec()
    };
    (glyf, loca)
}

/// Options for [`glyf_font`].
pub struct FontOptions<'a> {
    pub glyphs: &'a [&'a [u8]],
    pub metrics: &'a [(u16, i16)],
    pub trailing_lsbs: &'a [i16],
    pub long_loca: bool,
    pub extra_tables: Vec<(Tag, Vec<u8>)>,
    pub omit: &'a [Tag],
}

impl Default for FontOptions<'_> {
    fn default() -> Self {
        FontOptions {
            glyphs: &[],
            metrics: &[],
            trailing_lsbs: &[],
            long_loca: false,
            extra_tables: Vec::new(),
            omit: &[],
        }
    }
}

/// A TrueType font with the required tables.
pub fn glyf_font(options: FontOptions) -> Vec<u8> {
    let num_glyphs = options.glyphs.len() as u16;
    let (glyf, loca) = glyf_and_loca(options.glyphs, options.long_loca);
    let mut tables = vec![
        (Tag::new(b"head"), head(1000, options.long_loca as i16)),
        (Tag::new(b"hhea"), hhea(options.metrics.len() as u16)),
        (Tag::new(b"maxp"), maxp(num_glyphs)),
        (
            Tag::new(b"hmtx"),
            hmtx(options.metrics, options.trailing_lsbs),
        ),
        (Tag::new(b"loca"), loca),
        (Tag::new(b"glyf"), glyf),
        (Tag::new(b"name"), name()),
    ];
    tables.extend(options.extra_tables);
    tables.retain(|(tag, _)| !options.omit.contains(tag));
    build_sfnt(0x0001_0000, &tables)
}

/// Glyphs: .notdef (empty), the rectangle, the arch and the matched-point
/// composite of the two.
pub fn simple_font() -> Vec<u8> {
    simple_font_with(Vec::new(), &[])
}

/// [`simple_font`] with additional tables, omitting some of the defaults.
pub fn simple_font_with(extra_tables: Vec<(Tag, Vec<u8>)>, omit: &[Tag]) -> Vec<u8> {
    glyf_font(FontOptions {
        glyphs: &[&[], glyf::RECTANGLE, glyf::ARCH, glyf::MATCHED_POINTS_COMPOSITE],
        metrics: &[(500, 0), (600, 0), (200, 50)],
        trailing_lsbs: &[0],
        long_loca: false,
        extra_tables,
        omit,
    })
}
