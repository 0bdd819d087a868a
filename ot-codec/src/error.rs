//! Font-level errors

use font_types::{GlyphId16, Tag};

use crate::read::ReadError;

/// An error that occurs while decoding, querying or encoding a font.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The file header or table directory failed to parse.
    Directory(ReadError),
    /// A table failed to parse.
    Table { tag: Tag, source: ReadError },
    /// A table the font cannot be used without is absent.
    MissingTable(Tag),
    /// None of `glyf`+`loca`, `CFF ` or `CFF2` is present.
    NoOutlines,
    /// The file does not begin with a known sfnt or WOFF signature.
    UnsupportedSignature(Tag),
    /// A WOFF table did not inflate to its declared length.
    Compression {
        tag: Tag,
        expected: u32,
        actual: u32,
    },
    /// A structural rule was broken by the caller or by composite data.
    Invariant(InvariantViolation),
    /// The in-memory graph could not be laid out as bytes.
    Encode(EncodeError),
}

/// A broken structural invariant.
///
/// These indicate misuse of the mutation API or glyph data that cannot be
/// realized, rather than bytes that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A feature was added after a feature with a greater tag.
    FeatureOutOfOrder { previous: Tag, inserted: Tag },
    /// A matched-point anchor referred to a point that does not exist.
    AnchorOutOfRange {
        glyph: GlyphId16,
        point: u16,
        available: usize,
    },
    /// Components nested too deeply, most likely a reference cycle.
    ComponentDepthExceeded { glyph: GlyphId16 },
    /// A glyph has more contours or points than the format can store.
    ContourOverflow { glyph: GlyphId16 },
}

/// An error that occurs while laying out a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A subtable landed further away than the offset field can express.
    OffsetOverflow {
        table: &'static str,
        field: &'static str,
        offset: usize,
    },
    /// A list is longer than its count field can express.
    CountOverflow {
        table: &'static str,
        field: &'static str,
        count: usize,
    },
    /// A table with undecoded subtables was modified after decoding.
    UndecodedSubtables { table: Tag },
}

impl Error {
    /// `true` if decoding read past the end of the data.
    pub fn is_bounds_error(&self) -> bool {
        matches!(
            self.read_error(),
            Some(ReadError::OutOfBounds { .. })
        )
    }

    /// `true` if a table used a format or version this crate does not handle.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(
            self.read_error(),
            Some(ReadError::InvalidFormat { .. })
        )
    }

    /// `true` if a required table was absent.
    pub fn is_missing_table(&self) -> bool {
        matches!(self, Error::MissingTable(_) | Error::NoOutlines)
    }

    /// The underlying read error, if this error came from parsing.
    pub fn read_error(&self) -> Option<&ReadError> {
        match self {
            Error::Directory(source) | Error::Table { source, .. } => Some(source),
            _ => None,
        }
    }

    pub(crate) fn table(tag: Tag) -> impl FnOnce(ReadError) -> Error {
        move |source| Error::Table { tag, source }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Directory(source) => write!(f, "failed to read table directory: {source}"),
            Error::Table { tag, source } => write!(f, "failed to read '{tag}' table: {source}"),
            Error::MissingTable(tag) => write!(f, "the required '{tag}' table is missing"),
            Error::NoOutlines => write!(f, "the font has no glyf, CFF or CFF2 outlines"),
            Error::UnsupportedSignature(tag) => write!(f, "unsupported font signature '{tag}'"),
            Error::Compression {
                tag,
                expected,
                actual,
            } => write!(
                f,
                "'{tag}' inflated to {actual} bytes, expected {expected}"
            ),
            Error::Invariant(inner) => inner.fmt(f),
            Error::Encode(inner) => inner.fmt(f),
        }
    }
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvariantViolation::FeatureOutOfOrder { previous, inserted } => write!(
                f,
                "features must be added in alphabetical order: '{inserted}' after '{previous}'"
            ),
            InvariantViolation::AnchorOutOfRange {
                glyph,
                point,
                available,
            } => write!(
                f,
                "matched point {point} out of range in {glyph} ({available} points)"
            ),
            InvariantViolation::ComponentDepthExceeded { glyph } => {
                write!(f, "component nesting too deep in {glyph}")
            }
            InvariantViolation::ContourOverflow { glyph } => {
                write!(f, "{glyph} has too many contours or points")
            }
        }
    }
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::OffsetOverflow {
                table,
                field,
                offset,
            } => write!(f, "{table}.{field}: offset {offset} does not fit"),
            EncodeError::CountOverflow {
                table,
                field,
                count,
            } => write!(f, "{table}.{field}: count {count} does not fit"),
            EncodeError::UndecodedSubtables { table } => {
                write!(f, "'{table}' was modified but has undecoded subtables")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.read_error()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}

impl std::error::Error for InvariantViolation {}
impl std::error::Error for EncodeError {}

impl From<InvariantViolation> for Error {
    fn from(src: InvariantViolation) -> Error {
        Error::Invariant(src)
    }
}

impl From<EncodeError> for Error {
    fn from(src: EncodeError) -> Error {
        Error::Encode(src)
    }
}
