//! Composite glyphs (containing other glyphs as components)

use font_types::{BoundingBox, F2Dot14, GlyphId16};

use super::{read_bbox, CompositeGlyphFlags, ContourPoint};
use crate::{
    error::InvariantViolation,
    read::{FontRead, ReadError},
    write::{FontWrite, TableWriter},
    FontData,
};

/// A glyph consisting of multiple component sub-glyphs
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositeGlyph {
    pub bbox: BoundingBox<i16>,
    /// Components in file order, which is also the order they are placed in.
    pub components: Vec<Component>,
    pub instructions: Vec<u8>,
}

/// A single component glyph (part of a [`CompositeGlyph`]).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Component {
    pub glyph: GlyphId16,
    pub anchor: Anchor,
    pub flags: ComponentFlags,
    pub transform: Transform,
}

/// Anchor position for a composite component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Anchor {
    /// Translate the component by `(x, y)`.
    Offset { x: i16, y: i16 },
    /// Move the component so that its point `component` lands on point
    /// `base` of the points placed before it.
    Point { base: u16, component: u16 },
}

/// Transform for a composite component.
///
/// A point `(x, y)` maps to `(xx * x + xy * y, yx * x + yy * y)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    /// X scale factor.
    pub xx: F2Dot14,
    /// YX skew factor.
    pub yx: F2Dot14,
    /// XY skew factor.
    pub xy: F2Dot14,
    /// Y scale factor.
    pub yy: F2Dot14,
}

/// Options that can be manually set for a given component.
///
/// These are the flags that are not calculated from the anchor and
/// transform; they are combined with the calculated flags on write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComponentFlags {
    /// Round xy values to the nearest grid line
    pub round_xy_to_grid: bool,
    /// Use the advance/lsb/rsb values of this component for the whole
    /// composite glyph
    pub use_my_metrics: bool,
    /// The composite should have this component's offset scaled
    pub scaled_component_offset: bool,
    /// The composite should *not* have this component's offset scaled
    pub unscaled_component_offset: bool,
    /// If set, the components of the composite glyph overlap.
    pub overlap_compound: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            xx: F2Dot14::ONE,
            yx: F2Dot14::ZERO,
            xy: F2Dot14::ZERO,
            yy: F2Dot14::ONE,
        }
    }
}

impl Transform {
    /// A uniform scale.
    pub fn scale(scale: f32) -> Self {
        let scale = F2Dot14::from_f32(scale);
        Transform {
            xx: scale,
            yy: scale,
            ..Default::default()
        }
    }

    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.xx.to_f32() * x + self.xy.to_f32() * y,
            self.yx.to_f32() * x + self.yy.to_f32() * y,
        )
    }

    fn compute_flags(&self) -> CompositeGlyphFlags {
        if self.yx != F2Dot14::ZERO || self.xy != F2Dot14::ZERO {
            CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO
        } else if self.xx != self.yy {
            CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE
        } else if self.xx != F2Dot14::ONE {
            CompositeGlyphFlags::WE_HAVE_A_SCALE
        } else {
            CompositeGlyphFlags::empty()
        }
    }
}

impl Anchor {
    fn compute_flags(&self) -> CompositeGlyphFlags {
        const I8_RANGE: std::ops::RangeInclusive<i16> = i8::MIN as i16..=i8::MAX as i16;
        match self {
            Anchor::Offset { x, y } if I8_RANGE.contains(x) && I8_RANGE.contains(y) => {
                CompositeGlyphFlags::ARGS_ARE_XY_VALUES
            }
            Anchor::Offset { .. } => {
                CompositeGlyphFlags::ARGS_ARE_XY_VALUES | CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS
            }
            Anchor::Point { base, component } if *base <= 255 && *component <= 255 => {
                CompositeGlyphFlags::empty()
            }
            Anchor::Point { .. } => CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS,
        }
    }
}

impl Component {
    /// Create a new component.
    pub fn new(
        glyph: GlyphId16,
        anchor: Anchor,
        transform: Transform,
        flags: impl Into<ComponentFlags>,
    ) -> Self {
        Component {
            glyph,
            anchor,
            flags: flags.into(),
            transform,
        }
    }

    /// Transform this component's realized points and append them to `host`.
    ///
    /// `host` holds the points placed by earlier components of `owner`; a
    /// point-matched anchor refers into it.
    pub fn place(
        &self,
        owner: GlyphId16,
        host: &mut Vec<ContourPoint<f32>>,
        points: &[ContourPoint<f32>],
    ) -> Result<(), InvariantViolation> {
        let (dx, dy) = match self.anchor {
            Anchor::Offset { x, y } => {
                let (x, y) = (x as f32, y as f32);
                if self.flags.scaled_component_offset && !self.flags.unscaled_component_offset {
                    self.transform.apply(x, y)
                } else {
                    (x, y)
                }
            }
            Anchor::Point { base, component } => {
                let out_of_range = |point, available| InvariantViolation::AnchorOutOfRange {
                    glyph: owner,
                    point,
                    available,
                };
                let host_point = host
                    .get(base as usize)
                    .ok_or_else(|| out_of_range(base, host.len()))?;
                let matched = points
                    .get(component as usize)
                    .ok_or_else(|| out_of_range(component, points.len()))?;
                let (x, y) = self.transform.apply(matched.x, matched.y);
                (host_point.x - x, host_point.y - y)
            }
        };
        host.extend(points.iter().map(|point| {
            let (x, y) = self.transform.apply(point.x, point.y);
            ContourPoint {
                x: x + dx,
                y: y + dy,
                ..*point
            }
        }));
        Ok(())
    }

    /// Compute the flags for this glyph, excepting `MORE_COMPONENTS` and
    /// `WE_HAVE_INSTRUCTIONS`, which must be set manually
    fn compute_flag(&self) -> CompositeGlyphFlags {
        self.anchor.compute_flags() | self.transform.compute_flags() | self.flags.into()
    }

    /// like `FontWrite` but lets us pass in the flags that must be determined
    /// externally (WE_HAVE_INSTRUCTIONS and MORE_COMPONENTS)
    fn write_into(&self, writer: &mut TableWriter, extra_flags: CompositeGlyphFlags) {
        let flags = self.compute_flag() | extra_flags;
        writer.write("flags", flags.bits());
        writer.write("glyphIndex", self.glyph);
        let words = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
        match self.anchor {
            Anchor::Offset { x, y } if !words => {
                writer.write("argument1", x as i8);
                writer.write("argument2", y as i8);
            }
            Anchor::Offset { x, y } => {
                writer.write("argument1", x);
                writer.write("argument2", y);
            }
            Anchor::Point { base, component } if !words => {
                writer.write("argument1", base as u8);
                writer.write("argument2", component as u8);
            }
            Anchor::Point { base, component } => {
                writer.write("argument1", base);
                writer.write("argument2", component);
            }
        }
        let Transform { xx, yx, xy, yy } = self.transform;
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            writer.write("xScale", xx);
            writer.write("scale01", yx);
            writer.write("scale10", xy);
            writer.write("yScale", yy);
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            writer.write("xScale", xx);
            writer.write("yScale", yy);
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            writer.write("scale", xx);
        }
    }
}

impl FontRead for CompositeGlyph {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        cursor.advance_by(2); // numberOfContours
        let bbox = read_bbox(&mut cursor)?;
        let mut components = Vec::new();
        let mut flags;
        loop {
            flags = cursor.read::<CompositeGlyphFlags>()?;
            let glyph = cursor.read::<GlyphId16>()?;
            let args_are_words = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
            let args_are_xy_values = flags.contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES);
            let anchor = match (args_are_xy_values, args_are_words) {
                (true, true) => Anchor::Offset {
                    x: cursor.read()?,
                    y: cursor.read()?,
                },
                (true, false) => Anchor::Offset {
                    x: cursor.read::<i8>()? as _,
                    y: cursor.read::<i8>()? as _,
                },
                (false, true) => Anchor::Point {
                    base: cursor.read()?,
                    component: cursor.read()?,
                },
                (false, false) => Anchor::Point {
                    base: cursor.read::<u8>()? as _,
                    component: cursor.read::<u8>()? as _,
                },
            };
            let mut transform = Transform::default();
            if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
                transform.xx = cursor.read()?;
                transform.yy = transform.xx;
            } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
                transform.xx = cursor.read()?;
                transform.yy = cursor.read()?;
            } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
                transform.xx = cursor.read()?;
                transform.yx = cursor.read()?;
                transform.xy = cursor.read()?;
                transform.yy = cursor.read()?;
            }
            components.push(Component {
                glyph,
                anchor,
                flags: flags.into(),
                transform,
            });
            if !flags.contains(CompositeGlyphFlags::MORE_COMPONENTS) {
                break;
            }
        }
        let instructions = if flags.contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS) {
            let len = cursor.read::<u16>()? as usize;
            cursor.read_bytes(len)?.to_vec()
        } else {
            Vec::new()
        };
        Ok(CompositeGlyph {
            bbox,
            components,
            instructions,
        })
    }
}

impl FontWrite for CompositeGlyph {
    fn write_into(&self, writer: &mut TableWriter) {
        const N_CONTOURS: i16 = -1;
        writer.write("numberOfContours", N_CONTOURS);
        self.bbox.write_into(writer);
        let Some((last, rest)) = self.components.split_last() else {
            return;
        };
        for comp in rest {
            comp.write_into(writer, CompositeGlyphFlags::MORE_COMPONENTS);
        }
        let last_flags = if self.instructions.is_empty() {
            CompositeGlyphFlags::empty()
        } else {
            CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS
        };
        last.write_into(writer, last_flags);

        if !self.instructions.is_empty() {
            writer.write_count("numInstr", self.instructions.len());
            writer.write_bytes("instr", &self.instructions);
        }
    }
}

impl From<CompositeGlyphFlags> for ComponentFlags {
    fn from(src: CompositeGlyphFlags) -> ComponentFlags {
        ComponentFlags {
            round_xy_to_grid: src.contains(CompositeGlyphFlags::ROUND_XY_TO_GRID),
            use_my_metrics: src.contains(CompositeGlyphFlags::USE_MY_METRICS),
            scaled_component_offset: src.contains(CompositeGlyphFlags::SCALED_COMPONENT_OFFSET),
            unscaled_component_offset: src.contains(CompositeGlyphFlags::UNSCALED_COMPONENT_OFFSET),
            overlap_compound: src.contains(CompositeGlyphFlags::OVERLAP_COMPOUND),
        }
    }
}

impl From<ComponentFlags> for CompositeGlyphFlags {
    fn from(value: ComponentFlags) -> Self {
        [
            (value.round_xy_to_grid, CompositeGlyphFlags::ROUND_XY_TO_GRID),
            (value.use_my_metrics, CompositeGlyphFlags::USE_MY_METRICS),
            (
                value.scaled_component_offset,
                CompositeGlyphFlags::SCALED_COMPONENT_OFFSET,
            ),
            (
                value.unscaled_component_offset,
                CompositeGlyphFlags::UNSCALED_COMPONENT_OFFSET,
            ),
            (value.overlap_compound, CompositeGlyphFlags::OVERLAP_COMPOUND),
        ]
        .into_iter()
        .filter(|(set, _)| *set)
        .fold(CompositeGlyphFlags::empty(), |acc, (_, flag)| acc | flag)
    }
}
