//! The tables this crate models.
//!
//! Tables not listed here are carried through a round trip as raw bytes.

// `Scalar` for a `bitflags` type. Unknown bits are dropped on read, so each
// flag set declares its reserved bits to keep them through a round trip.
macro_rules! flags_scalar {
    ($name:ident, $ty:ty) => {
        impl font_types::Scalar for $name {
            type Raw = <$ty as font_types::Scalar>::Raw;
            const RAW_BYTE_LEN: usize = <$ty as font_types::Scalar>::RAW_BYTE_LEN;

            fn from_raw(raw: Self::Raw) -> Self {
                Self::from_bits_truncate(<$ty as font_types::Scalar>::from_raw(raw))
            }

            fn to_raw(self) -> Self::Raw {
                <$ty as font_types::Scalar>::to_raw(self.bits())
            }

            fn read(bytes: &[u8]) -> Option<Self> {
                <$ty as font_types::Scalar>::read(bytes).map(Self::from_bits_truncate)
            }
        }
    };
}

pub mod glyf;
pub mod gpos;
pub mod gsub;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod layout;
pub mod loca;
pub mod maxp;
