//! Traits for interpreting font data

use crate::font_data::FontData;

/// A type that can be read from raw table data.
///
/// Everything produced by this crate is an owned value: offsets are resolved
/// eagerly while reading, so a decoded table does not borrow the font bytes.
pub trait FontRead: Sized {
    /// Read an instance of `Self` from the provided data, performing validation.
    ///
    /// The data begins at the start of the table; offsets stored in the
    /// table are resolved relative to it.
    fn read(data: FontData<'_>) -> Result<Self, ReadError>;
}

/// A trait for types that require external data in order to be constructed.
///
/// Lookup subtables need their lookup type; `hmtx` and `loca` need counts
/// that live in other tables.
pub trait FontReadWithArgs: Sized {
    type Args;

    /// read an item, using the provided args.
    fn read_with_args(data: FontData<'_>, args: &Self::Args) -> Result<Self, ReadError>;
}

/// An error that occurs when reading font data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// A read needed `len` bytes at absolute `offset`, past the end of the
    /// available data.
    OutOfBounds { offset: u32, len: usize },
    /// A format, version or type discriminant this crate does not handle.
    InvalidFormat {
        offset: u32,
        what: &'static str,
        found: u16,
        expected: &'static [u16],
    },
    /// Data that is structurally inconsistent, such as a null offset where
    /// a table is required.
    MalformedData { offset: u32, what: &'static str },
}

impl ReadError {
    /// The absolute byte offset where the error was encountered.
    pub fn offset(&self) -> u32 {
        match self {
            ReadError::OutOfBounds { offset, .. }
            | ReadError::InvalidFormat { offset, .. }
            | ReadError::MalformedData { offset, .. } => *offset,
        }
    }
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadError::OutOfBounds { offset, len } => {
                write!(f, "read of {len} bytes at offset {offset} is out of bounds")
            }
            ReadError::InvalidFormat {
                offset,
                what,
                found,
                expected,
            } => {
                write!(f, "{what} must be ")?;
                match *expected {
                    [] => write!(f, "one of none")?,
                    [only] => write!(f, "{only}")?,
                    [init @ .., last] => {
                        let init = init
                            .iter()
                            .map(|x| x.to_string())
                            .collect::<Vec<_>>()
                            .join(", ");
                        write!(f, "{init} or {last}")?;
                    }
                }
                write!(f, ", found {found} at offset {offset}")
            }
            ReadError::MalformedData { offset, what } => {
                write!(f, "malformed {what} at offset {offset}")
            }
        }
    }
}

impl std::error::Error for ReadError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_message() {
        let err = ReadError::InvalidFormat {
            offset: 42,
            what: "lookup type 5 format",
            found: 4,
            expected: &[1, 2, 3],
        };
        assert_eq!(
            err.to_string(),
            "lookup type 5 format must be 1, 2 or 3, found 4 at offset 42"
        );
    }
}
