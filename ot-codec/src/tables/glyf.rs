//! The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table

mod composite;
mod simple;

use font_types::{BoundingBox, OutlinePen, Tag};

use crate::{
    error::EncodeError,
    font_data::Cursor,
    read::{FontRead, ReadError},
    tables::loca::Loca,
    write::{dump_table, FontWrite, TableWriter},
    FontData,
};

pub use composite::{Anchor, Component, ComponentFlags, CompositeGlyph, Transform};
pub use simple::{ContourPoint, SimpleGlyph};

/// 'glyf'
pub const TAG: Tag = Tag::new(b"glyf");

bitflags::bitflags! {
    /// Flags used in [`SimpleGlyph`]
    #[derive(Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SimpleGlyphFlags: u8 {
        /// Bit 0: the point is on the curve.
        const ON_CURVE_POINT = 0x01;
        /// Bit 1: the x coordinate is one byte long.
        const X_SHORT_VECTOR = 0x02;
        /// Bit 2: the y coordinate is one byte long.
        const Y_SHORT_VECTOR = 0x04;
        /// Bit 3: the next byte is the number of additional times this
        /// flag is to be repeated.
        const REPEAT_FLAG = 0x08;
        /// Bit 4: with `X_SHORT_VECTOR`, the sign of the short x delta;
        /// without, the x coordinate repeats the previous one.
        const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 0x10;
        /// Bit 5: as bit 4, for y.
        const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 0x20;
        /// Bit 6: contours may overlap. Only meaningful on the first flag.
        const OVERLAP_SIMPLE = 0x40;
        const RESERVED = 0x80;
    }
}

flags_scalar!(SimpleGlyphFlags, u8);

bitflags::bitflags! {
    /// Flags used in [`CompositeGlyph`]
    #[derive(Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CompositeGlyphFlags: u16 {
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        const ARGS_ARE_XY_VALUES = 0x0002;
        const ROUND_XY_TO_GRID = 0x0004;
        const WE_HAVE_A_SCALE = 0x0008;
        const MORE_COMPONENTS = 0x0020;
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        const WE_HAVE_INSTRUCTIONS = 0x0100;
        const USE_MY_METRICS = 0x0200;
        const OVERLAP_COMPOUND = 0x0400;
        const SCALED_COMPONENT_OFFSET = 0x0800;
        const UNSCALED_COMPONENT_OFFSET = 0x1000;
        const RESERVED = 0xE010;
    }
}

flags_scalar!(CompositeGlyphFlags, u16);

/// A decoded glyph outline.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outline {
    /// No contours; occupies no space in `glyf`.
    #[default]
    Empty,
    Simple(SimpleGlyph),
    Composite(CompositeGlyph),
}

impl Outline {
    /// `numberOfContours`: -1 for composites.
    pub fn number_of_contours(&self) -> i16 {
        match self {
            Outline::Empty => 0,
            Outline::Simple(glyph) => glyph.contours().count() as i16,
            Outline::Composite(_) => -1,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outline::Empty)
    }

    /// The stored bounding box, if any.
    pub fn bbox(&self) -> Option<BoundingBox<i16>> {
        match self {
            Outline::Empty => None,
            Outline::Simple(glyph) => Some(glyph.bbox),
            Outline::Composite(glyph) => Some(glyph.bbox),
        }
    }
}

impl FontRead for Outline {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        if data.is_empty() {
            return Ok(Outline::Empty);
        }
        match data.read_at::<i16>(0)? {
            0 => Ok(Outline::Empty),
            n if n > 0 => SimpleGlyph::read(data).map(Outline::Simple),
            _ => CompositeGlyph::read(data).map(Outline::Composite),
        }
    }
}

impl FontWrite for Outline {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            Outline::Empty => (),
            Outline::Simple(glyph) => glyph.write_into(writer),
            Outline::Composite(glyph) => glyph.write_into(writer),
        }
    }
}

impl FontWrite for BoundingBox<i16> {
    fn write_into(&self, writer: &mut TableWriter) {
        writer.write("xMin", self.x_min);
        writer.write("yMin", self.y_min);
        writer.write("xMax", self.x_max);
        writer.write("yMax", self.y_max);
    }
}

pub(crate) fn read_bbox(cursor: &mut Cursor<'_>) -> Result<BoundingBox<i16>, ReadError> {
    Ok(BoundingBox {
        x_min: cursor.read()?,
        y_min: cursor.read()?,
        x_max: cursor.read()?,
        y_max: cursor.read()?,
    })
}

/// A builder for constructing the 'glyf' & 'loca' tables.
///
/// These two tables are tightly coupled, and are necessarily constructed
/// together. Glyphs are padded to two bytes and the resulting `loca` always
/// uses 32-bit offsets; the caller is responsible for setting
/// `indexToLocFormat` in `head`.
#[derive(Debug)]
pub struct GlyfLocaBuilder {
    glyph_data: Vec<u8>,
    raw_loca: Vec<u32>,
}

impl GlyfLocaBuilder {
    pub fn new() -> Self {
        Self {
            glyph_data: Vec::new(),
            raw_loca: vec![0],
        }
    }

    /// Add a glyph to the table.
    ///
    /// The glyph is compiled immediately, so that the caller can associate
    /// any errors with a particular glyph.
    pub fn add_glyph(&mut self, glyph: &Outline) -> Result<&mut Self, EncodeError> {
        if !glyph.is_empty() {
            let bytes = dump_table(glyph)?;
            self.glyph_data.extend_from_slice(&bytes);
            if self.glyph_data.len() % 2 == 1 {
                self.glyph_data.push(0);
            }
        }
        self.raw_loca.push(self.glyph_data.len() as u32);
        Ok(self)
    }

    /// Construct the final glyf and loca tables.
    #[must_use]
    pub fn build(self) -> (Vec<u8>, Loca) {
        (self.glyph_data, Loca::from_offsets(self.raw_loca))
    }
}

impl Default for GlyfLocaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw a realized point list as quadratic contours.
///
/// A contour starts at its last point if that is on the curve, else at its
/// first point if that is, else at the midpoint of the two. Consecutive
/// off-curve points imply an on-curve point halfway between them.
pub fn draw(points: &[ContourPoint<f32>], pen: &mut impl OutlinePen) {
    fn mid(a: &ContourPoint<f32>, b: &ContourPoint<f32>) -> (f32, f32) {
        ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    for contour in contours(points) {
        let (Some(first), Some(last)) = (contour.first(), contour.last()) else {
            continue;
        };
        if last.on_curve {
            pen.move_to(last.x, last.y);
        } else if first.on_curve {
            pen.move_to(first.x, first.y);
        } else {
            let (x, y) = mid(last, first);
            pen.move_to(x, y);
        }
        for (i, curr) in contour.iter().enumerate() {
            let next = &contour[(i + 1) % contour.len()];
            if curr.on_curve {
                pen.line_to(curr.x, curr.y);
            } else {
                let (x, y) = if next.on_curve {
                    (next.x, next.y)
                } else {
                    mid(curr, next)
                };
                pen.quad_to(curr.x, curr.y, x, y);
            }
        }
        pen.close();
    }
}

/// Split a point list into contours at each `last_point_of_contour`.
///
/// Trailing points without a terminating flag form a final contour.
pub fn contours<T>(points: &[ContourPoint<T>]) -> impl Iterator<Item = &[ContourPoint<T>]> {
    points.split_inclusive(|point| point.last_point_of_contour)
}
