//! A GPOS ValueRecord

use super::ValueFormat;
use crate::{
    read::ReadError,
    write::TableWriter,
    Cursor,
};

/// A positioning adjustment.
///
/// A field is `Some` when its bit is set in the format the record was read
/// with, so a zero value and an absent value round-trip differently. Device
/// and variation index tables are not modelled: `devices` remembers which
/// device fields were present, and they are written as null offsets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRecord {
    pub x_placement: Option<i16>,
    pub y_placement: Option<i16>,
    pub x_advance: Option<i16>,
    pub y_advance: Option<i16>,
    pub devices: ValueFormat,
}

impl ValueRecord {
    /// A record that only adjusts the horizontal advance.
    pub fn x_advance(advance: i16) -> Self {
        ValueRecord {
            x_advance: Some(advance),
            ..Default::default()
        }
    }

    pub fn read(cursor: &mut Cursor<'_>, format: ValueFormat) -> Result<Self, ReadError> {
        let mut this = ValueRecord::default();
        if format.contains(ValueFormat::X_PLACEMENT) {
            this.x_placement = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::Y_PLACEMENT) {
            this.y_placement = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::X_ADVANCE) {
            this.x_advance = Some(cursor.read()?);
        }
        if format.contains(ValueFormat::Y_ADVANCE) {
            this.y_advance = Some(cursor.read()?);
        }
        let devices = format & ValueFormat::ANY_DEVICE_OR_VARIDX;
        cursor.advance_by(devices.record_byte_len());
        this.devices = devices;
        Ok(this)
    }

    /// The smallest format that holds every field of this record.
    pub fn format(&self) -> ValueFormat {
        let mut format = self.devices & ValueFormat::ANY_DEVICE_OR_VARIDX;
        for (value, flag) in [
            (self.x_placement, ValueFormat::X_PLACEMENT),
            (self.y_placement, ValueFormat::Y_PLACEMENT),
            (self.x_advance, ValueFormat::X_ADVANCE),
            (self.y_advance, ValueFormat::Y_ADVANCE),
        ] {
            if value.is_some() {
                format |= flag;
            }
        }
        format
    }

    /// Write the fields selected by `format`, which may be wider than this
    /// record's own format; missing fields are written as zero.
    pub fn write(&self, writer: &mut TableWriter, format: ValueFormat) {
        for (value, flag, name) in [
            (self.x_placement, ValueFormat::X_PLACEMENT, "xPlacement"),
            (self.y_placement, ValueFormat::Y_PLACEMENT, "yPlacement"),
            (self.x_advance, ValueFormat::X_ADVANCE, "xAdvance"),
            (self.y_advance, ValueFormat::Y_ADVANCE, "yAdvance"),
        ] {
            if format.contains(flag) {
                writer.write(name, value.unwrap_or_default());
            }
        }
        for _ in 0..(format & ValueFormat::ANY_DEVICE_OR_VARIDX).bits().count_ones() {
            writer.write("deviceOffset", 0u16);
        }
    }
}

/// The union of the formats of `records`.
pub(crate) fn common_format<'a>(records: impl IntoIterator<Item = &'a ValueRecord>) -> ValueFormat {
    records
        .into_iter()
        .fold(ValueFormat::empty(), |acc, record| acc | record.format())
}
