//! Access to decoded glyph outlines.
//!
//! Outlines come from a [`GlyphSource`], chosen when the font is loaded:
//! every glyph decoded up front, glyphs decoded on first access and kept, or
//! glyphs decoded on every access and dropped afterwards.

use std::{borrow::Cow, collections::HashMap, sync::OnceLock};

use font_types::{GlyphId16, OutlinePen};

use crate::{
    error::{Error, InvariantViolation},
    read::{FontRead, ReadError},
    tables::{
        glyf::{self, ContourPoint, Outline},
        loca::Loca,
    },
    FontData,
};

/// Composites nested deeper than this are assumed to be cyclic.
pub const MAX_COMPONENT_DEPTH: usize = 32;

/// When glyph outlines are decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GlyphLoading {
    /// Decode each glyph on first access and keep the result.
    #[default]
    Lazy,
    /// Decode each glyph on every access; nothing is kept.
    LowMemory,
    /// Decode every glyph while loading the font.
    Eager,
}

/// Something that can produce the outline for a glyph id.
pub trait GlyphSource: std::fmt::Debug + Send + Sync {
    /// The number of glyphs available.
    fn num_glyphs(&self) -> u16;

    /// The outline for `gid`, or `None` if the id is out of range.
    fn outline(&self, gid: GlyphId16) -> Result<Option<Cow<'_, Outline>>, ReadError>;
}

/// The `glyf` bytes and the `loca` that indexes them.
#[derive(Clone, Debug)]
struct GlyfData {
    bytes: Vec<u8>,
    position: u32,
    loca: Loca,
}

impl GlyfData {
    fn decode(&self, gid: GlyphId16) -> Result<Option<Outline>, ReadError> {
        if gid.to_usize() >= self.loca.len() {
            return Ok(None);
        }
        let data = FontData::new_at(&self.bytes, self.position);
        let Some(range) = self.loca.glyph_range(gid) else {
            return Err(ReadError::MalformedData {
                offset: self.position,
                what: "loca offsets must not decrease",
            });
        };
        let glyph_data = data.slice_checked(range.start, range.len())?;
        log::trace!("decoding {gid} ({} bytes)", glyph_data.len());
        Outline::read(glyph_data).map(Some)
    }

    fn num_glyphs(&self) -> u16 {
        self.loca.len().min(u16::MAX as usize) as u16
    }
}

/// Glyphs that were all decoded while the font was loaded.
#[derive(Clone, Debug, Default)]
pub struct EagerGlyphs {
    outlines: Vec<Outline>,
}

impl EagerGlyphs {
    pub fn new(outlines: Vec<Outline>) -> Self {
        EagerGlyphs { outlines }
    }
}

impl GlyphSource for EagerGlyphs {
    fn num_glyphs(&self) -> u16 {
        self.outlines.len() as u16
    }

    fn outline(&self, gid: GlyphId16) -> Result<Option<Cow<'_, Outline>>, ReadError> {
        Ok(self.outlines.get(gid.to_usize()).map(Cow::Borrowed))
    }
}

/// Glyphs decoded on first access and memoized.
#[derive(Debug)]
pub struct LazyGlyphs {
    glyf: GlyfData,
    cache: Vec<OnceLock<Outline>>,
}

impl GlyphSource for LazyGlyphs {
    fn num_glyphs(&self) -> u16 {
        self.glyf.num_glyphs()
    }

    fn outline(&self, gid: GlyphId16) -> Result<Option<Cow<'_, Outline>>, ReadError> {
        let Some(cell) = self.cache.get(gid.to_usize()) else {
            return Ok(None);
        };
        if let Some(outline) = cell.get() {
            return Ok(Some(Cow::Borrowed(outline)));
        }
        let Some(outline) = self.glyf.decode(gid)? else {
            return Ok(None);
        };
        // another thread may have won; either value is the same
        let _ = cell.set(outline);
        Ok(cell.get().map(Cow::Borrowed))
    }
}

/// Glyphs decoded from the raw bytes on every access.
#[derive(Debug)]
pub struct LowMemoryGlyphs {
    glyf: GlyfData,
}

impl GlyphSource for LowMemoryGlyphs {
    fn num_glyphs(&self) -> u16 {
        self.glyf.num_glyphs()
    }

    fn outline(&self, gid: GlyphId16) -> Result<Option<Cow<'_, Outline>>, ReadError> {
        Ok(self.glyf.decode(gid)?.map(Cow::Owned))
    }
}

/// The glyph outlines of a font.
#[derive(Debug)]
pub struct GlyphSet {
    source: Box<dyn GlyphSource>,
}

impl GlyphSet {
    /// Wrap an arbitrary source.
    pub fn new(source: impl GlyphSource + 'static) -> Self {
        GlyphSet {
            source: Box::new(source),
        }
    }

    /// Build a glyph set over a `glyf` table.
    ///
    /// With [`GlyphLoading::Eager`] every glyph is decoded here and the first
    /// failure is returned.
    pub fn load(glyf: FontData, loca: Loca, loading: GlyphLoading) -> Result<Self, ReadError> {
        let glyf = GlyfData {
            bytes: glyf.as_bytes().to_vec(),
            position: glyf.absolute_pos(0),
            loca,
        };
        let num_glyphs = glyf.num_glyphs();
        log::debug!("loading {num_glyphs} glyphs ({loading:?})");
        Ok(match loading {
            GlyphLoading::Eager => {
                let outlines = (0..num_glyphs)
                    .map(|gid| {
                        glyf.decode(GlyphId16::new(gid))
                            .map(Option::unwrap_or_default)
                    })
                    .collect::<Result<_, _>>()?;
                GlyphSet::new(EagerGlyphs::new(outlines))
            }
            GlyphLoading::Lazy => GlyphSet::new(LazyGlyphs {
                cache: (0..num_glyphs).map(|_| OnceLock::new()).collect(),
                glyf,
            }),
            GlyphLoading::LowMemory => GlyphSet::new(LowMemoryGlyphs { glyf }),
        })
    }

    pub fn num_glyphs(&self) -> u16 {
        self.source.num_glyphs()
    }

    /// The decoded outline for `gid`, or `None` if out of range.
    pub fn outline(&self, gid: GlyphId16) -> Result<Option<Cow<'_, Outline>>, Error> {
        self.source.outline(gid).map_err(Error::table(glyf::TAG))
    }

    /// The realized points of a glyph, with every component resolved.
    ///
    /// Components are placed in file order; a matched-point anchor may only
    /// refer to points placed by earlier components.
    pub fn points(&self, gid: GlyphId16) -> Result<Vec<ContourPoint<f32>>, Error> {
        self.realize(gid, 0, &mut HashMap::new())
    }

    /// `realized` holds the composites already resolved during this call, so
    /// a component shared by several branches is only walked once.
    fn realize(
        &self,
        gid: GlyphId16,
        depth: usize,
        realized: &mut HashMap<GlyphId16, Vec<ContourPoint<f32>>>,
    ) -> Result<Vec<ContourPoint<f32>>, Error> {
        if depth > MAX_COMPONENT_DEPTH {
            return Err(InvariantViolation::ComponentDepthExceeded { glyph: gid }.into());
        }
        if let Some(points) = realized.get(&gid) {
            return Ok(points.clone());
        }
        let Some(outline) = self.outline(gid)? else {
            log::warn!("component {gid} is out of range, skipping");
            return Ok(Vec::new());
        };
        match outline.as_ref() {
            Outline::Empty => Ok(Vec::new()),
            Outline::Simple(glyph) => Ok(glyph.points.iter().map(|p| p.to_f32()).collect()),
            Outline::Composite(glyph) => {
                let mut points = Vec::new();
                for component in &glyph.components {
                    let component_points = self.realize(component.glyph, depth + 1, realized)?;
                    component.place(gid, &mut points, &component_points)?;
                }
                realized.insert(gid, points.clone());
                Ok(points)
            }
        }
    }

    /// Draw a glyph into `pen`.
    pub fn draw(&self, gid: GlyphId16, pen: &mut impl OutlinePen) -> Result<(), Error> {
        let points = self.points(gid)?;
        glyf::draw(&points, pen);
        Ok(())
    }

    /// The outline of a glyph as a [`kurbo::BezPath`].
    #[cfg(feature = "kurbo")]
    pub fn to_bez_path(&self, gid: GlyphId16) -> Result<kurbo::BezPath, Error> {
        let mut path = kurbo::BezPath::new();
        self.draw(gid, &mut path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::{fonts, glyf as glyf_data};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use font_types::PenCommand;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn glyph_set(glyphs: &[&[u8]], loading: GlyphLoading) -> GlyphSet {
        let (glyf, loca) = fonts::glyf_and_loca(glyphs, true);
        let loca = Loca::from_offsets(
            loca.chunks_exact(4)
                .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        );
        GlyphSet::load(FontData::new(&glyf), loca, loading).unwrap()
    }

    fn simple_set(loading: GlyphLoading) -> GlyphSet {
        glyph_set(
            &[
                &[],
                glyf_data::RECTANGLE,
                glyf_data::ARCH,
                glyf_data::MATCHED_POINTS_COMPOSITE,
            ],
            loading,
        )
    }

    #[rstest]
    #[case::lazy(GlyphLoading::Lazy)]
    #[case::low_memory(GlyphLoading::LowMemory)]
    #[case::eager(GlyphLoading::Eager)]
    fn sources_agree(#[case] loading: GlyphLoading) {
        let set = simple_set(loading);
        assert_eq!(set.num_glyphs(), 4);
        let outline = set.outline(GlyphId16::new(1)).unwrap().unwrap();
        assert_eq!(outline.number_of_contours(), 1);
        assert!(set.outline(GlyphId16::new(0)).unwrap().unwrap().is_empty());
        assert!(set.outline(GlyphId16::new(4)).unwrap().is_none());
    }

    #[test]
    fn lazy_memoizes() {
        let set = simple_set(GlyphLoading::Lazy);
        let first = set.outline(GlyphId16::new(2)).unwrap().unwrap();
        assert!(matches!(first, Cow::Borrowed(_)));
        let first = first.as_ref() as *const Outline;
        let second = set.outline(GlyphId16::new(2)).unwrap().unwrap();
        assert_eq!(first, second.as_ref() as *const Outline);
    }

    #[test]
    fn low_memory_keeps_nothing() {
        let set = simple_set(GlyphLoading::LowMemory);
        let outline = set.outline(GlyphId16::new(2)).unwrap().unwrap();
        assert!(matches!(outline, Cow::Owned(_)));
    }

    #[test]
    fn matched_points_composite() {
        let set = simple_set(GlyphLoading::Lazy);
        let points = set.points(GlyphId16::new(3)).unwrap();
        // four points from each component
        assert_eq!(points.len(), 8);
        // point 0 of the arch lands on point 2 of the rectangle
        assert_eq!((points[4].x, points[4].y), (500.0, 700.0));
        assert_eq!((points[7].x, points[7].y), (600.0, 700.0));
        assert!(points[3].last_point_of_contour);
        assert!(points[7].last_point_of_contour);
    }

    #[test]
    fn scaled_offset_component() {
        let composite = glyf_data::scaled_composite(1, 10, 20, 0.5);
        let set = glyph_set(
            &[&[], glyf_data::RECTANGLE, &composite],
            GlyphLoading::Lazy,
        );
        let points = set.points(GlyphId16::new(2)).unwrap();
        let coords: Vec<_> = points.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(
            coords,
            vec![(10.0, 20.0), (260.0, 20.0), (260.0, 370.0), (10.0, 370.0)]
        );
    }

    #[test]
    fn self_reference_is_rejected() {
        let composite = glyf_data::self_referencing_composite(1);
        let set = glyph_set(&[&[], &composite], GlyphLoading::Lazy);
        assert_eq!(
            set.points(GlyphId16::new(1)),
            Err(Error::Invariant(InvariantViolation::ComponentDepthExceeded {
                glyph: GlyphId16::new(1)
            }))
        );
    }

    #[test]
    fn anchor_out_of_range() {
        let composite = glyf_data::bad_anchor_composite(1, 9);
        let set = glyph_set(&[&[], glyf_data::RECTANGLE, &composite], GlyphLoading::Lazy);
        assert_eq!(
            set.points(GlyphId16::new(2)),
            Err(Error::Invariant(InvariantViolation::AnchorOutOfRange {
                glyph: GlyphId16::new(2),
                point: 9,
                available: 0,
            }))
        );
    }

    #[derive(Debug)]
    struct CountingGlyphs {
        inner: EagerGlyphs,
        calls: Arc<AtomicUsize>,
    }

    impl GlyphSource for CountingGlyphs {
        fn num_glyphs(&self) -> u16 {
            self.inner.num_glyphs()
        }

        fn outline(&self, gid: GlyphId16) -> Result<Option<Cow<'_, Outline>>, ReadError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.inner.outline(gid)
        }
    }

    #[test]
    fn shared_components_are_realized_once() {
        // glyph n + 1 places glyph n twice, side by side
        let mut outlines = vec![
            Outline::Empty,
            Outline::read(FontData::new(glyf_data::RECTANGLE)).unwrap(),
        ];
        for gid in 1..12u16 {
            let bytes = glyf_data::doubled_composite(gid, 600);
            outlines.push(Outline::read(FontData::new(&bytes)).unwrap());
        }
        let calls = Arc::new(AtomicUsize::new(0));
        let set = GlyphSet::new(CountingGlyphs {
            inner: EagerGlyphs::new(outlines),
            calls: calls.clone(),
        });

        let points = set.points(GlyphId16::new(12)).unwrap();
        assert_eq!(points.len(), 4 << 11);
        assert_eq!((points[4].x, points[4].y), (600.0, 0.0));
        assert_eq!(calls.load(Ordering::Relaxed), 12);
    }

    #[test]
    fn truncated_glyph_reports_absolute_offset() {
        let glyf = glyf_data::RECTANGLE[..20].to_vec();
        let loca = Loca::from_offsets(vec![0, 0, 30]);
        let set = GlyphSet::load(FontData::new_at(&glyf, 100), loca, GlyphLoading::Lazy).unwrap();
        let err = set.outline(GlyphId16::new(1)).unwrap_err();
        assert!(err.is_bounds_error());
        assert_eq!(err.read_error().map(ReadError::offset), Some(100));
    }

    #[test]
    fn draw_into_pen() {
        let set = simple_set(GlyphLoading::Eager);
        let mut commands = Vec::new();
        set.draw(GlyphId16::new(1), &mut commands).unwrap();
        assert_eq!(commands.first(), Some(&PenCommand::MoveTo { x: 0.0, y: 700.0 }));
        assert_eq!(commands.last(), Some(&PenCommand::Close));
        assert_eq!(commands.len(), 6);
    }
}
