//! raw font bytes

use std::ops::{Bound, RangeBounds};

use font_types::{Offset16, Offset32, Scalar};

use crate::read::{FontRead, ReadError};

/// A reference to raw binary font data.
///
/// This is a wrapper around a byte slice, that provides convenience methods
/// for parsing and validating that data. It also remembers where the slice
/// begins within the whole font, so that errors can report absolute
/// positions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontData<'a> {
    total_pos: u32,
    bytes: &'a [u8],
}

/// A cursor for validating bytes during parsing.
///
/// Every read advances the position; reading past the end of the data is a
/// [`ReadError::OutOfBounds`] carrying the absolute offset of the read.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    pos: usize,
    data: FontData<'a>,
}

impl<'a> FontData<'a> {
    /// Create a new `FontData` with these bytes.
    pub const fn new(bytes: &'a [u8]) -> Self {
        FontData {
            total_pos: 0,
            bytes,
        }
    }

    /// Create a `FontData` for bytes that begin at `total_pos` in the font.
    ///
    /// Used for tables that are held apart from the file they came from.
    pub const fn new_at(bytes: &'a [u8], total_pos: u32) -> Self {
        FontData { total_pos, bytes }
    }

    /// The length of the data, in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if the data has a length of zero bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The absolute position of the byte at `offset` within the font.
    pub fn absolute_pos(&self, offset: usize) -> u32 {
        self.total_pos.saturating_add(offset as u32)
    }

    /// Returns self[pos..]
    pub fn split_off(&self, pos: usize) -> Option<FontData<'a>> {
        self.bytes.get(pos..).map(|bytes| FontData {
            bytes,
            total_pos: self.absolute_pos(pos),
        })
    }

    /// Returns self[..pos], and updates self to = self[pos..];
    pub fn take_up_to(&mut self, pos: usize) -> Option<FontData<'a>> {
        if pos > self.len() {
            return None;
        }
        let (head, tail) = self.bytes.split_at(pos);
        let head = FontData {
            bytes: head,
            total_pos: self.total_pos,
        };
        self.total_pos = self.absolute_pos(pos);
        self.bytes = tail;
        Some(head)
    }

    pub fn slice(&self, range: impl RangeBounds<usize>) -> Option<FontData<'a>> {
        let start = match range.start_bound() {
            Bound::Unbounded => 0,
            Bound::Included(i) => *i,
            Bound::Excluded(i) => i.saturating_add(1),
        };
        let bounds = (range.start_bound().cloned(), range.end_bound().cloned());
        let total_pos = self.absolute_pos(start);
        self.bytes
            .get(bounds)
            .map(|bytes| FontData { bytes, total_pos })
    }

    /// Like [`FontData::split_off`], but reporting a bounds error.
    pub fn split_off_checked(&self, pos: usize) -> Result<FontData<'a>, ReadError> {
        self.split_off(pos).ok_or_else(|| self.out_of_bounds(pos, 0))
    }

    /// Like [`FontData::slice`] for `start..start + len`, but reporting a
    /// bounds error.
    pub fn slice_checked(&self, start: usize, len: usize) -> Result<FontData<'a>, ReadError> {
        start
            .checked_add(len)
            .and_then(|end| self.slice(start..end))
            .ok_or_else(|| self.out_of_bounds(start, len))
    }

    /// Read a scalar at the provided location in the data.
    pub fn read_at<T: Scalar>(&self, offset: usize) -> Result<T, ReadError> {
        self.bytes
            .get(offset..)
            .and_then(T::read)
            .ok_or_else(|| self.out_of_bounds(offset, T::RAW_BYTE_LEN))
    }

    /// Read `len` u16 values starting at `offset`.
    pub fn read_u16_array(&self, offset: usize, len: usize) -> Result<Vec<u16>, ReadError> {
        let bytes = offset
            .checked_add(len * 2)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or_else(|| self.out_of_bounds(offset, len * 2))?;
        // this can only fail on a length mismatch, which the slice above rules out
        let pairs: &[[u8; 2]] = bytemuck::try_cast_slice(bytes)
            .map_err(|_| ReadError::MalformedData {
                offset: self.absolute_pos(offset),
                what: "u16 array",
            })?;
        Ok(pairs.iter().map(|raw| u16::from_be_bytes(*raw)).collect())
    }

    /// Return the bytes in `offset..offset + len`.
    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], ReadError> {
        offset
            .checked_add(len)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or_else(|| self.out_of_bounds(offset, len))
    }

    /// Parse `T` from the data starting at `offset`.
    pub fn read_table_at<T: FontRead>(&self, offset: usize) -> Result<T, ReadError> {
        T::read(self.split_off_checked(offset)?)
    }

    pub fn cursor(&self) -> Cursor<'a> {
        Cursor {
            pos: 0,
            data: *self,
        }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub(crate) fn out_of_bounds(&self, offset: usize, len: usize) -> ReadError {
        ReadError::OutOfBounds {
            offset: self.absolute_pos(offset),
            len,
        }
    }

    pub(crate) fn invalid_format(
        &self,
        offset: usize,
        what: &'static str,
        found: u16,
        expected: &'static [u16],
    ) -> ReadError {
        ReadError::InvalidFormat {
            offset: self.absolute_pos(offset),
            what,
            found,
            expected,
        }
    }
}

impl<'a> Cursor<'a> {
    pub fn advance_by(&mut self, n_bytes: usize) {
        self.pos = self.pos.saturating_add(n_bytes);
    }

    /// Read a big-endian scalar and advance past it.
    pub fn read<T: Scalar>(&mut self) -> Result<T, ReadError> {
        let temp = self.data.read_at(self.pos);
        self.pos += T::RAW_BYTE_LEN;
        temp
    }

    /// Read `count` scalars.
    pub fn read_list<T: Scalar>(&mut self, count: usize) -> Result<Vec<T>, ReadError> {
        let len = count
            .checked_mul(T::RAW_BYTE_LEN)
            .ok_or_else(|| self.data.out_of_bounds(self.pos, usize::MAX))?;
        let bytes = self.data.read_bytes(self.pos, len)?;
        self.pos += len;
        Ok(bytes
            .chunks_exact(T::RAW_BYTE_LEN)
            .filter_map(T::read)
            .collect())
    }

    /// Read a u16 count followed by that many u16 values.
    pub fn read_u16_list(&mut self) -> Result<Vec<u16>, ReadError> {
        let count = self.read::<u16>()? as usize;
        let temp = self.data.read_u16_array(self.pos, count);
        self.pos += count * 2;
        temp
    }

    /// Read `count` raw bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], ReadError> {
        let temp = self.data.read_bytes(self.pos, count);
        self.pos += count;
        temp
    }

    /// Read `count` records with the provided function.
    pub fn read_records<T>(
        &mut self,
        count: usize,
        mut read_one: impl FnMut(&mut Cursor<'a>) -> Result<T, ReadError>,
    ) -> Result<Vec<T>, ReadError> {
        (0..count).map(|_| read_one(self)).collect()
    }

    /// Read a 16-bit offset and parse the table it points to.
    ///
    /// Offsets are resolved relative to the start of this cursor's data. A
    /// null offset yields `None`.
    pub fn read_offset16<T: FontRead>(&mut self) -> Result<Option<T>, ReadError> {
        let offset = self.read::<Offset16>()?;
        self.resolve(offset.non_null())
    }

    /// Read a 32-bit offset and parse the table it points to.
    pub fn read_offset32<T: FontRead>(&mut self) -> Result<Option<T>, ReadError> {
        let offset = self.read::<Offset32>()?;
        self.resolve(offset.non_null())
    }

    /// Read a 16-bit offset to a table that must be present.
    pub fn read_required_offset16<T: FontRead>(
        &mut self,
        what: &'static str,
    ) -> Result<T, ReadError> {
        let pos = self.pos;
        self.read_offset16()?
            .ok_or_else(|| ReadError::MalformedData {
                offset: self.data.absolute_pos(pos),
                what,
            })
    }

    /// Read a u16 count followed by that many non-null 16-bit offsets.
    pub fn read_offset16_list<T: FontRead>(
        &mut self,
        what: &'static str,
    ) -> Result<Vec<T>, ReadError> {
        let count = self.read::<u16>()? as usize;
        self.read_records(count, |cursor| cursor.read_required_offset16(what))
    }

    /// Read a u16 count of offsets, each pointing to a counted list of u16s.
    pub fn read_list_of_lists(&mut self) -> Result<Vec<Vec<u16>>, ReadError> {
        let count = self.read::<u16>()? as usize;
        let base = self.data;
        self.read_records(count, |cursor| {
            let offset = cursor.read::<u16>()? as usize;
            base.split_off_checked(offset)?.cursor().read_u16_list()
        })
    }

    fn resolve<T: FontRead>(&self, offset: Option<usize>) -> Result<Option<T>, ReadError> {
        let Some(offset) = offset else {
            return Ok(None);
        };
        self.data.read_table_at(offset).map(Some)
    }

    /// The current position, relative to the start of the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The data this cursor reads from; offsets are resolved against it.
    pub fn data(&self) -> FontData<'a> {
        self.data
    }

    // used when handling fields with an implicit length, which must be at the
    // end of a table.
    pub fn remaining_bytes(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// An [`ReadError::InvalidFormat`] for a value read at `pos`.
    pub(crate) fn invalid_format(
        &self,
        pos: usize,
        what: &'static str,
        found: u16,
        expected: &'static [u16],
    ) -> ReadError {
        self.data.invalid_format(pos, what, found, expected)
    }
}

impl AsRef<[u8]> for FontData<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> From<&'a [u8]> for FontData<'a> {
    fn from(src: &'a [u8]) -> FontData<'a> {
        FontData::new(src)
    }
}

#[cfg(test)]
mod tests {
    use font_test_data::bebuffer::BeBuffer;
    use font_types::{F2Dot14, Tag};

    use super::*;

    #[test]
    fn reads_advance_and_fail_at_end() {
        let buf = BeBuffer::new()
            .push(0xfeu8)
            .push(-2i8)
            .push(0x1234u16)
            .push(-300i16)
            .push(0x0001_0000u32)
            .push(Tag::new(b"kern"))
            .push(F2Dot14::from_f32(0.5));
        let data = FontData::new(&buf);
        let mut cursor = data.cursor();
        assert_eq!(cursor.read::<u8>().unwrap(), 0xfe);
        assert_eq!(cursor.read::<i8>().unwrap(), -2);
        assert_eq!(cursor.read::<u16>().unwrap(), 0x1234);
        assert_eq!(cursor.read::<i16>().unwrap(), -300);
        assert_eq!(cursor.read::<u32>().unwrap(), 0x10000);
        assert_eq!(cursor.read::<Tag>().unwrap(), Tag::new(b"kern"));
        assert_eq!(cursor.read::<F2Dot14>().unwrap().to_f32(), 0.5);
        assert_eq!(cursor.remaining_bytes(), 0);
        assert!(matches!(
            cursor.read::<u16>(),
            Err(ReadError::OutOfBounds { offset: 16, len: 2 })
        ));
    }

    #[test]
    fn errors_report_absolute_offsets() {
        let buf = BeBuffer::new().extend([0u16; 4]);
        let data = FontData::new(&buf).split_off(6).unwrap();
        let err = data.read_at::<u32>(0).unwrap_err();
        assert!(matches!(err, ReadError::OutOfBounds { offset: 6, len: 4 }));
    }

    #[test]
    fn list_of_lists() {
        let buf = BeBuffer::new()
            .push(2u16)
            .extend([6u16, 10])
            .push(1u16)
            .push(7u16)
            .push(2u16)
            .extend([8u16, 9]);
        let lists = FontData::new(&buf).cursor().read_list_of_lists().unwrap();
        assert_eq!(lists, vec![vec![7], vec![8, 9]]);
    }

    #[test]
    fn take_up_to() {
        let buf = BeBuffer::new().extend([1u8, 2, 3, 4]);
        let mut data = FontData::new(&buf);
        let head = data.take_up_to(1).unwrap();
        assert_eq!(head.as_bytes(), &[1]);
        assert_eq!(data.absolute_pos(0), 1);
        assert!(data.take_up_to(4).is_none());
    }
}
