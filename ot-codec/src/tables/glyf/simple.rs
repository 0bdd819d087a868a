//! Simple glyphs (glyphs which do not contain components)

use font_types::{BoundingBox, GlyphId16};

use super::{read_bbox, SimpleGlyphFlags};
use crate::{
    error::InvariantViolation,
    read::{FontRead, ReadError},
    write::{FontWrite, TableWriter},
    Cursor, FontData,
};

/// A point in a glyph outline.
///
/// Decoded glyphs store integer coordinates; realized composites and drawing
/// use `ContourPoint<f32>`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContourPoint<T = i16> {
    pub x: T,
    pub y: T,
    pub on_curve: bool,
    pub last_point_of_contour: bool,
}

impl ContourPoint<i16> {
    pub fn to_f32(self) -> ContourPoint<f32> {
        ContourPoint {
            x: self.x as f32,
            y: self.y as f32,
            on_curve: self.on_curve,
            last_point_of_contour: self.last_point_of_contour,
        }
    }
}

/// A simple (without components) glyph
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleGlyph {
    pub bbox: BoundingBox<i16>,
    /// Every contour, concatenated; each contour ends at a point with
    /// `last_point_of_contour` set.
    pub points: Vec<ContourPoint>,
    pub instructions: Vec<u8>,
    /// `OVERLAP_SIMPLE` was set on the first flag.
    pub overlap: bool,
}

impl SimpleGlyph {
    /// Create a glyph from points, computing its bounding box.
    pub fn new(points: Vec<ContourPoint>, instructions: Vec<u8>) -> Self {
        let mut glyph = SimpleGlyph {
            bbox: BoundingBox::default(),
            points,
            instructions,
            overlap: false,
        };
        glyph.recompute_bounding_box();
        glyph
    }

    /// Iterate over the contours of this glyph.
    pub fn contours(&self) -> impl Iterator<Item = &[ContourPoint]> {
        super::contours(&self.points)
    }

    /// Recompute the Glyph's bounding box based on the current points
    pub fn recompute_bounding_box(&mut self) {
        if let Some(bbox) = BoundingBox::from_points(self.points.iter().map(|p| (p.x, p.y))) {
            self.bbox = bbox;
        }
    }

    /// Check that the glyph can be stored.
    pub fn check_limits(&self, glyph: GlyphId16) -> Result<(), InvariantViolation> {
        if self.points.len() > u16::MAX as usize || self.contours().count() > i16::MAX as usize {
            return Err(InvariantViolation::ContourOverflow { glyph });
        }
        Ok(())
    }

    /// Compute the flags and deltas for this glyph's points.
    ///
    /// This does not do the final binary encoding, and it also does not handle
    /// repeating flags.
    fn compute_point_deltas(
        &self,
    ) -> impl Iterator<Item = (SimpleGlyphFlags, CoordDelta, CoordDelta)> + '_ {
        // reused for x & y by passing in the flags
        fn flag_and_delta(
            value: i16,
            short_flag: SimpleGlyphFlags,
            same_or_pos: SimpleGlyphFlags,
        ) -> (SimpleGlyphFlags, CoordDelta) {
            const SHORT_MAX: i16 = u8::MAX as i16;
            const SHORT_MIN: i16 = -SHORT_MAX;
            match value {
                0 => (same_or_pos, CoordDelta::Skip),
                SHORT_MIN..=-1 => (short_flag, CoordDelta::Short(value.unsigned_abs() as u8)),
                1..=SHORT_MAX => (short_flag | same_or_pos, CoordDelta::Short(value as _)),
                _other => (SimpleGlyphFlags::empty(), CoordDelta::Long(value)),
            }
        }

        let (mut last_x, mut last_y) = (0i16, 0i16);
        self.points.iter().map(move |point| {
            let mut flag = SimpleGlyphFlags::empty();
            let d_x = point.x.wrapping_sub(last_x);
            let d_y = point.y.wrapping_sub(last_y);
            last_x = point.x;
            last_y = point.y;

            if point.on_curve {
                flag |= SimpleGlyphFlags::ON_CURVE_POINT;
            }
            let (x_flag, x_data) = flag_and_delta(
                d_x,
                SimpleGlyphFlags::X_SHORT_VECTOR,
                SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
            );
            let (y_flag, y_data) = flag_and_delta(
                d_y,
                SimpleGlyphFlags::Y_SHORT_VECTOR,
                SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
            );
            flag |= x_flag | y_flag;
            (flag, x_data, y_data)
        })
    }
}

fn read_coordinates(
    cursor: &mut Cursor<'_>,
    flags: &[SimpleGlyphFlags],
    short: SimpleGlyphFlags,
    same_or_pos: SimpleGlyphFlags,
) -> Result<Vec<i16>, ReadError> {
    let mut value = 0i16;
    flags
        .iter()
        .map(|flag| {
            let delta = if flag.contains(short) {
                let magnitude = cursor.read::<u8>()? as i16;
                if flag.contains(same_or_pos) {
                    magnitude
                } else {
                    -magnitude
                }
            } else if flag.contains(same_or_pos) {
                0
            } else {
                cursor.read::<i16>()?
            };
            value = value.wrapping_add(delta);
            Ok(value)
        })
        .collect()
}

impl FontRead for SimpleGlyph {
    fn read(data: FontData<'_>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let number_of_contours = cursor.read::<i16>()?;
        let bbox = read_bbox(&mut cursor)?;
        let end_pts: Vec<u16> = cursor.read_list(number_of_contours.max(0) as usize)?;
        if let Some(pos) = end_pts.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(ReadError::MalformedData {
                offset: data.absolute_pos(10 + 2 * (pos + 1)),
                what: "endPtsOfContours",
            });
        }
        let num_points = end_pts.last().map(|end| *end as usize + 1).unwrap_or(0);
        let instruction_length = cursor.read::<u16>()? as usize;
        let instructions = cursor.read_bytes(instruction_length)?.to_vec();

        let mut flags = Vec::with_capacity(num_points);
        while flags.len() < num_points {
            let flag: SimpleGlyphFlags = cursor.read()?;
            let repeat = if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
                cursor.read::<u8>()? as usize
            } else {
                0
            };
            let count = (repeat + 1).min(num_points - flags.len());
            flags.extend(std::iter::repeat(flag).take(count));
        }
        let xs = read_coordinates(
            &mut cursor,
            &flags,
            SimpleGlyphFlags::X_SHORT_VECTOR,
            SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
        )?;
        let ys = read_coordinates(
            &mut cursor,
            &flags,
            SimpleGlyphFlags::Y_SHORT_VECTOR,
            SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
        )?;

        let mut ends = end_pts.iter().map(|end| *end as usize).peekable();
        let points = flags
            .iter()
            .zip(xs.into_iter().zip(ys))
            .enumerate()
            .map(|(i, (flag, (x, y)))| {
                let last_point_of_contour = ends.next_if_eq(&i).is_some();
                ContourPoint {
                    x,
                    y,
                    on_curve: flag.contains(SimpleGlyphFlags::ON_CURVE_POINT),
                    last_point_of_contour,
                }
            })
            .collect();
        let overlap = flags
            .first()
            .is_some_and(|flag| flag.contains(SimpleGlyphFlags::OVERLAP_SIMPLE));
        Ok(SimpleGlyph {
            bbox,
            points,
            instructions,
            overlap,
        })
    }
}

impl FontWrite for SimpleGlyph {
    fn write_into(&self, writer: &mut TableWriter) {
        let contour_lens = self.contours().map(|c| c.len()).collect::<Vec<_>>();
        if contour_lens.is_empty() {
            // we don't bother writing empty glyphs
            return;
        }
        writer.write("numberOfContours", contour_lens.len() as i16);
        BoundingBox::from_points(self.points.iter().map(|p| (p.x, p.y)))
            .unwrap_or(self.bbox)
            .write_into(writer);
        let mut cur = 0;
        for len in contour_lens {
            cur += len;
            writer.write("endPtsOfContours", (cur - 1) as u16);
        }
        writer.write_count("instructionLength", self.instructions.len());
        writer.write_bytes("instructions", &self.instructions);

        let mut deltas = self.compute_point_deltas().collect::<Vec<_>>();
        if let Some((flag, _, _)) = deltas.first_mut().filter(|_| self.overlap) {
            *flag |= SimpleGlyphFlags::OVERLAP_SIMPLE;
        }
        RepeatableFlag::iter_from_flags(deltas.iter().map(|(flag, _, _)| *flag))
            .for_each(|flag| flag.write_into(writer));
        deltas
            .iter()
            .for_each(|(_, x, _)| x.write_into(writer, "xCoordinates"));
        deltas
            .iter()
            .for_each(|(_, _, y)| y.write_into(writer, "yCoordinates"));
    }
}

/// A little helper for managing how we're representing a given delta
#[derive(Clone, Copy, Debug)]
enum CoordDelta {
    // this is a repeat (set in the flag) and so we write nothing
    Skip,
    Short(u8),
    Long(i16),
}

impl CoordDelta {
    fn write_into(&self, writer: &mut TableWriter, name: &'static str) {
        match self {
            CoordDelta::Skip => (),
            CoordDelta::Short(val) => writer.write(name, *val),
            CoordDelta::Long(val) => writer.write(name, *val),
        }
    }
}

/// A little helper for writing flags that may have a 'repeat' byte
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct RepeatableFlag {
    flag: SimpleGlyphFlags,
    repeat: u8,
}

impl FontWrite for RepeatableFlag {
    fn write_into(&self, writer: &mut TableWriter) {
        debug_assert_eq!(
            self.flag.contains(SimpleGlyphFlags::REPEAT_FLAG),
            self.repeat > 0
        );

        writer.write("flags", self.flag.bits());
        if self.flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
            writer.write("repeat", self.repeat);
        }
    }
}

impl RepeatableFlag {
    /// given an iterator over raw flags, return an iterator over flags + repeat values
    fn iter_from_flags(
        flags: impl IntoIterator<Item = SimpleGlyphFlags>,
    ) -> impl Iterator<Item = RepeatableFlag> {
        let mut iter = flags.into_iter();
        let mut prev = None;
        // a flag that repeats exactly once costs the same either way; write
        // it twice rather than with a repeat count of 1.
        let mut decompose_single_repeat = None;

        std::iter::from_fn(move || loop {
            if let Some(repeat) = decompose_single_repeat.take() {
                return Some(repeat);
            }

            match (iter.next(), prev.take()) {
                (None, Some(RepeatableFlag { flag, repeat: 1 })) => {
                    let flag = flag & !SimpleGlyphFlags::REPEAT_FLAG;
                    decompose_single_repeat = Some(RepeatableFlag { flag, repeat: 0 });
                    return decompose_single_repeat;
                }
                (None, prev) => return prev,
                (Some(flag), None) => prev = Some(RepeatableFlag { flag, repeat: 0 }),
                (Some(flag), Some(mut last)) => {
                    if (last.flag & !SimpleGlyphFlags::REPEAT_FLAG) == flag && last.repeat < u8::MAX
                    {
                        last.repeat += 1;
                        last.flag |= SimpleGlyphFlags::REPEAT_FLAG;
                        prev = Some(last);
                    } else {
                        if last.repeat == 1 {
                            last.flag &= !SimpleGlyphFlags::REPEAT_FLAG;
                            last.repeat = 0;
                            decompose_single_repeat = Some(last);
                        }
                        prev = Some(RepeatableFlag { flag, repeat: 0 });
                        return Some(last);
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::{bebuffer::BeBuffer, glyf};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::write::dump_table;

    fn point(x: i16, y: i16, on_curve: bool, last_point_of_contour: bool) -> ContourPoint {
        ContourPoint {
            x,
            y,
            on_curve,
            last_point_of_contour,
        }
    }

    #[test]
    fn read_rectangle() {
        let glyph = SimpleGlyph::read(FontData::new(glyf::RECTANGLE)).unwrap();
        assert_eq!(
            glyph.bbox,
            BoundingBox {
                x_min: 0,
                y_min: 0,
                x_max: 500,
                y_max: 700
            }
        );
        assert_eq!(
            glyph.points,
            vec![
                point(0, 0, true, false),
                point(500, 0, true, false),
                point(500, 700, true, false),
                point(0, 700, true, true),
            ]
        );
        assert!(glyph.instructions.is_empty());
    }

    #[test]
    fn read_short_and_same_deltas() {
        let glyph = SimpleGlyph::read(FontData::new(glyf::ARCH)).unwrap();
        assert_eq!(
            glyph.points,
            vec![
                point(50, 0, true, false),
                point(50, 100, false, false),
                point(150, 100, false, false),
                point(150, 0, true, true),
            ]
        );
    }

    #[test]
    fn read_two_contours_and_instructions() {
        let glyph = SimpleGlyph::read(FontData::new(glyf::TWO_SQUARES)).unwrap();
        assert_eq!(glyph.contours().count(), 2);
        assert_eq!(glyph.instructions, vec![0xB0, 0x01]);
        assert_eq!(glyph.points[3], point(0, 100, true, true));
        assert_eq!(glyph.points[4], point(200, 0, true, false));
        assert_eq!(glyph.points[7], point(200, 100, true, true));
    }

    #[test]
    fn repeated_flags_round_trip_exactly() {
        let glyph = SimpleGlyph::read(FontData::new(glyf::REPEATED_FLAGS)).unwrap();
        let xs = glyph.points.iter().map(|p| p.x).collect::<Vec<_>>();
        assert_eq!(xs, vec![0, 100, 200, 300]);
        assert_eq!(dump_table(&glyph).unwrap(), glyf::REPEATED_FLAGS);
    }

    #[test]
    fn write_then_read() {
        for bytes in [glyf::RECTANGLE, glyf::ARCH, glyf::TWO_SQUARES] {
            let glyph = SimpleGlyph::read(FontData::new(bytes)).unwrap();
            let written = dump_table(&glyph).unwrap();
            assert_eq!(SimpleGlyph::read(FontData::new(&written)).unwrap(), glyph);
        }
    }

    #[test]
    fn overlap_flag_survives() {
        let mut glyph = SimpleGlyph::read(FontData::new(glyf::RECTANGLE)).unwrap();
        glyph.overlap = true;
        let written = dump_table(&glyph).unwrap();
        assert!(SimpleGlyph::read(FontData::new(&written)).unwrap().overlap);
    }

    #[test]
    fn truncated_coordinates() {
        let bytes = &glyf::RECTANGLE[..glyf::RECTANGLE.len() - 2];
        let err = SimpleGlyph::read(FontData::new(bytes)).unwrap_err();
        assert!(matches!(err, ReadError::OutOfBounds { .. }));
    }

    #[test]
    fn end_points_must_increase() {
        let bytes = BeBuffer::new()
            .push(2i16)
            .extend([0i16; 4])
            .extend([3u16, 3])
            .push(0u16)
            .into_vec();
        let err = SimpleGlyph::read(FontData::new(&bytes)).unwrap_err();
        assert_eq!(
            err,
            ReadError::MalformedData {
                offset: 12,
                what: "endPtsOfContours"
            }
        );
    }

    #[test]
    fn long_deltas_and_bbox() {
        let glyph = SimpleGlyph::new(
            vec![
                point(-300, 10, true, false),
                point(400, -2000, false, false),
                point(0, 0, true, true),
            ],
            Vec::new(),
        );
        assert_eq!(
            glyph.bbox,
            BoundingBox {
                x_min: -300,
                y_min: -2000,
                x_max: 400,
                y_max: 10
            }
        );
        let written = dump_table(&glyph).unwrap();
        assert_eq!(SimpleGlyph::read(FontData::new(&written)).unwrap(), glyph);
    }

    #[test]
    fn repeat_flags() {
        let flags = [
            SimpleGlyphFlags::ON_CURVE_POINT,
            SimpleGlyphFlags::ON_CURVE_POINT,
            SimpleGlyphFlags::X_SHORT_VECTOR,
            SimpleGlyphFlags::X_SHORT_VECTOR,
            SimpleGlyphFlags::X_SHORT_VECTOR,
        ];
        let repeatable = RepeatableFlag::iter_from_flags(flags).collect::<Vec<_>>();
        assert_eq!(
            repeatable,
            vec![
                RepeatableFlag {
                    flag: SimpleGlyphFlags::ON_CURVE_POINT,
                    repeat: 0
                },
                RepeatableFlag {
                    flag: SimpleGlyphFlags::ON_CURVE_POINT,
                    repeat: 0
                },
                RepeatableFlag {
                    flag: SimpleGlyphFlags::X_SHORT_VECTOR | SimpleGlyphFlags::REPEAT_FLAG,
                    repeat: 2
                },
            ]
        );
    }
}
