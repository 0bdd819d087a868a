//! The [loca (Index to Location)][loca] table
//!
//! [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use std::ops::Range;

use font_types::{GlyphId16, Tag};

use crate::{
    read::{FontReadWithArgs, ReadError},
    write::{FontWrite, TableWriter},
    FontData,
};

/// 'loca'
pub const TAG: Tag = Tag::new(b"loca");

/// The [loca] table: `numGlyphs + 1` offsets into `glyf`.
///
/// [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Loca {
    /// Offsets divided by two.
    Short(Vec<u16>),
    Long(Vec<u32>),
}

impl Loca {
    /// Build a long `loca` from byte offsets.
    pub fn from_offsets(offsets: Vec<u32>) -> Self {
        Loca::Long(offsets)
    }

    /// The number of glyphs.
    pub fn len(&self) -> usize {
        match self {
            Loca::Short(data) => data.len().saturating_sub(1),
            Loca::Long(data) => data.len().saturating_sub(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Loca::Long(_))
    }

    /// Attempt to return the offset for a given glyph id.
    pub fn get_raw(&self, idx: usize) -> Option<u32> {
        match self {
            Loca::Short(data) => data.get(idx).map(|x| *x as u32 * 2),
            Loca::Long(data) => data.get(idx).copied(),
        }
    }

    /// The range of `glyf` occupied by a glyph.
    ///
    /// An empty range is an empty glyph. Returns `None` if the glyph id is
    /// out of range or the offsets run backwards.
    pub fn glyph_range(&self, gid: GlyphId16) -> Option<Range<usize>> {
        let idx = gid.to_usize();
        let start = self.get_raw(idx)? as usize;
        let end = self.get_raw(idx + 1)? as usize;
        (start <= end).then_some(start..end)
    }
}

impl FontReadWithArgs for Loca {
    /// `(is_long, numGlyphs)`
    type Args = (bool, u16);

    fn read_with_args(data: FontData<'_>, args: &(bool, u16)) -> Result<Self, ReadError> {
        let (is_long, num_glyphs) = *args;
        let count = num_glyphs as usize + 1;
        let mut cursor = data.cursor();
        if is_long {
            cursor.read_list(count).map(Loca::Long)
        } else {
            cursor.read_list(count).map(Loca::Short)
        }
    }
}

impl FontWrite for Loca {
    fn write_into(&self, writer: &mut TableWriter) {
        match self {
            Loca::Short(data) => writer.write_array("offsets", data.iter().copied()),
            Loca::Long(data) => writer.write_array("offsets", data.iter().copied()),
        }
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::fonts;

    use super::*;

    #[test]
    fn short_offsets_are_doubled() {
        let (_, loca) = fonts::glyf_and_loca(&[&[], &[1, 2, 3], &[4, 5]], false);
        let loca = Loca::read_with_args(FontData::new(&loca), &(false, 3)).unwrap();
        assert_eq!(loca.len(), 3);
        assert_eq!(loca.glyph_range(GlyphId16::new(0)), Some(0..0));
        assert_eq!(loca.glyph_range(GlyphId16::new(1)), Some(0..4));
        assert_eq!(loca.glyph_range(GlyphId16::new(2)), Some(4..6));
        assert_eq!(loca.glyph_range(GlyphId16::new(3)), None);
    }

    #[test]
    fn too_short() {
        let (_, loca) = fonts::glyf_and_loca(&[&[1, 2]], true);
        assert!(Loca::read_with_args(FontData::new(&loca), &(true, 2)).is_err());
    }
}
