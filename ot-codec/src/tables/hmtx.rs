//! The [hmtx (Horizontal Metrics)](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table

use font_types::{GlyphId16, Tag};

use crate::{
    read::{FontReadWithArgs, ReadError},
    write::{FontWrite, TableWriter},
    FontData,
};

/// 'hmtx'
pub const TAG: Tag = Tag::new(b"hmtx");

/// An advance width and left side bearing pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LongMetric {
    pub advance: u16,
    pub side_bearing: i16,
}

/// Horizontal metrics for every glyph.
///
/// Glyphs past the last long metric share its advance and have their own
/// side bearing in `left_side_bearings`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hmtx {
    pub h_metrics: Vec<LongMetric>,
    pub left_side_bearings: Vec<i16>,
}

impl Hmtx {
    /// The advance width for a glyph.
    pub fn advance(&self, gid: GlyphId16) -> Option<u16> {
        self.h_metrics
            .get(gid.to_usize())
            .or_else(|| self.h_metrics.last())
            .map(|metric| metric.advance)
    }

    /// The left side bearing for a glyph.
    pub fn side_bearing(&self, gid: GlyphId16) -> Option<i16> {
        let idx = gid.to_usize();
        match self.h_metrics.get(idx) {
            Some(metric) => Some(metric.side_bearing),
            None => self
                .left_side_bearings
                .get(idx - self.h_metrics.len())
                .copied(),
        }
    }
}

impl FontReadWithArgs for Hmtx {
    /// `(numberOfHMetrics, numGlyphs)`
    type Args = (u16, u16);

    fn read_with_args(data: FontData<'_>, args: &(u16, u16)) -> Result<Self, ReadError> {
        let (number_of_h_metrics, num_glyphs) = *args;
        let mut cursor = data.cursor();
        let h_metrics = cursor.read_records(number_of_h_metrics as usize, |cursor| {
            Ok(LongMetric {
                advance: cursor.read()?,
                side_bearing: cursor.read()?,
            })
        })?;
        let declared = num_glyphs.saturating_sub(number_of_h_metrics) as usize;
        let available = cursor.remaining_bytes() / 2;
        if available < declared {
            log::warn!("hmtx has {available} of {declared} left side bearings");
        }
        let left_side_bearings = cursor.read_list(declared.min(available))?;
        Ok(Hmtx {
            h_metrics,
            left_side_bearings,
        })
    }
}

impl FontWrite for Hmtx {
    fn write_into(&self, writer: &mut TableWriter) {
        for metric in &self.h_metrics {
            writer.write("advanceWidth", metric.advance);
            writer.write("lsb", metric.side_bearing);
        }
        writer.write_array("leftSideBearings", self.left_side_bearings.iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::fonts;

    use super::*;

    #[test]
    fn trailing_glyphs_reuse_last_advance() {
        let bytes = fonts::hmtx(&[(500, 10), (600, 20)], &[30, 40]);
        let hmtx = Hmtx::read_with_args(FontData::new(&bytes), &(2, 4)).unwrap();
        assert_eq!(hmtx.advance(GlyphId16::new(1)), Some(600));
        assert_eq!(hmtx.advance(GlyphId16::new(3)), Some(600));
        assert_eq!(hmtx.side_bearing(GlyphId16::new(0)), Some(10));
        assert_eq!(hmtx.side_bearing(GlyphId16::new(3)), Some(40));
        assert_eq!(hmtx.side_bearing(GlyphId16::new(4)), None);
    }

    #[test]
    fn truncated_side_bearings() {
        let _ = env_logger::builder().is_test(true).try_init();
        let bytes = fonts::hmtx(&[(500, 10)], &[30]);
        let hmtx = Hmtx::read_with_args(FontData::new(&bytes), &(1, 5)).unwrap();
        assert_eq!(hmtx.left_side_bearings, vec![30]);
    }

    #[test]
    fn truncated_long_metrics() {
        let bytes = fonts::hmtx(&[(500, 10)], &[]);
        assert!(Hmtx::read_with_args(FontData::new(&bytes), &(2, 2)).is_err());
    }
}
