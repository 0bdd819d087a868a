//! Four-byte identifiers for tables, scripts, languages and features

use std::{fmt, str::FromStr};

use crate::raw::Scalar;

/// A four-byte identifier such as `glyf` or `liga`.
///
/// Bytes are kept exactly as read, so a font with a malformed tag still
/// round trips. Tags compare bytewise, which is the order of the table
/// directory and of every tagged record list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; 4]);

/// Text that is not one to four printable ASCII characters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidTag(String);

impl Tag {
    pub const fn new(bytes: &[u8; 4]) -> Tag {
        Tag(*bytes)
    }

    /// The tag whose bytes are the big-endian encoding of `value`.
    pub const fn from_u32(value: u32) -> Tag {
        Tag(value.to_be_bytes())
    }

    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0
    }
}

/// Parses a tag from its text form, padding short tags with spaces.
impl FromStr for Tag {
    type Err = InvalidTag;

    fn from_str(text: &str) -> Result<Tag, InvalidTag> {
        let bytes = text.as_bytes();
        let printable = bytes.iter().all(|byte| (0x20..=0x7E).contains(byte));
        if bytes.is_empty() || bytes.len() > 4 || !printable {
            return Err(InvalidTag(text.to_owned()));
        }
        let mut raw = [b' '; 4];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Tag(raw))
    }
}

impl Scalar for Tag {
    type Raw = [u8; 4];
    const RAW_BYTE_LEN: usize = 4;

    fn from_raw(raw: [u8; 4]) -> Tag {
        Tag(raw)
    }

    fn to_raw(self) -> [u8; 4] {
        self.0
    }

    fn read(bytes: &[u8]) -> Option<Tag> {
        bytes.get(..4)?.try_into().ok().map(Tag)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            match byte {
                0x20..=0x7E => write!(f, "{}", byte as char)?,
                _ => write!(f, "\\x{byte:02X}")?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

impl fmt::Display for InvalidTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not one to four printable ASCII characters", self.0)
    }
}

impl std::error::Error for InvalidTag {}

// text in human-readable formats, raw bytes otherwise
#[cfg(feature = "serde")]
impl serde::Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serde::Serialize::serialize(&self.0, serializer)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Tag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = <String as serde::Deserialize>::deserialize(deserializer)?;
            text.parse().map_err(serde::de::Error::custom)
        } else {
            <[u8; 4] as serde::Deserialize>::deserialize(deserializer).map(Tag)
        }
    }
}
