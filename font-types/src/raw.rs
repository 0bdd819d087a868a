//! types for working with raw big-endian bytes

/// A trait for font scalars.
///
/// This is an internal trait for encoding and decoding big-endian bytes.
/// Every type that can appear as a fixed-width field in a font table
/// implements it.
pub trait Scalar: Sized + Copy {
    /// The raw byte representation of this type.
    type Raw: Copy + AsRef<[u8]>;

    /// The size of the raw type, in bytes.
    const RAW_BYTE_LEN: usize;

    /// Create an instance of this type from raw big-endian bytes
    fn from_raw(raw: Self::Raw) -> Self;

    /// Encode this type as raw big-endian bytes
    fn to_raw(self) -> Self::Raw;

    /// Attempt to read a value from the front of a slice.
    ///
    /// Returns `None` if the slice is shorter than [`Self::RAW_BYTE_LEN`].
    fn read(bytes: &[u8]) -> Option<Self>;
}

/// An internal macro for implementing `Scalar` on newtypes over scalars.
#[macro_export]
#[doc(hidden)]
macro_rules! newtype_scalar {
    ($name:ident, $inner:ty) => {
        impl $crate::Scalar for $name {
            type Raw = <$inner as $crate::Scalar>::Raw;
            const RAW_BYTE_LEN: usize = <$inner as $crate::Scalar>::RAW_BYTE_LEN;

            fn from_raw(raw: Self::Raw) -> Self {
                Self(<$inner as $crate::Scalar>::from_raw(raw))
            }

            fn to_raw(self) -> Self::Raw {
                <$inner as $crate::Scalar>::to_raw(self.0)
            }

            fn read(bytes: &[u8]) -> Option<Self> {
                <$inner as $crate::Scalar>::read(bytes).map(Self)
            }
        }
    };
}

macro_rules! int_scalar {
    ($ty:ty, $len:literal) => {
        impl Scalar for $ty {
            type Raw = [u8; $len];
            const RAW_BYTE_LEN: usize = $len;

            fn from_raw(raw: [u8; $len]) -> $ty {
                <$ty>::from_be_bytes(raw)
            }

            fn to_raw(self) -> [u8; $len] {
                self.to_be_bytes()
            }

            #[inline]
            fn read(bytes: &[u8]) -> Option<$ty> {
                let raw: [u8; $len] = bytes.get(..$len)?.try_into().ok()?;
                Some(<$ty>::from_be_bytes(raw))
            }
        }
    };
}

int_scalar!(u8, 1);
int_scalar!(i8, 1);
int_scalar!(u16, 2);
int_scalar!(i16, 2);
int_scalar!(u32, 4);
int_scalar!(i32, 4);
int_scalar!(i64, 8);

#[cfg(test)]
mod tests {
    use super::Scalar;

    #[test]
    fn read_is_big_endian() {
        assert_eq!(u16::read(&[0x12, 0x34]), Some(0x1234));
        assert_eq!(i16::read(&[0xff, 0xfe]), Some(-2));
        assert_eq!(u32::read(&[0, 1, 0, 0, 0xff]), Some(0x10000));
        assert_eq!(i8::read(&[0x80]), Some(-128));
    }

    #[test]
    fn read_short_slice() {
        assert_eq!(u32::read(&[0, 1, 0]), None);
        assert_eq!(u8::read(&[]), None);
    }

    #[test]
    fn raw_round_trip() {
        assert_eq!(i16::from_raw((-1234i16).to_raw()), -1234);
        assert_eq!(0xdead_beefu32.to_raw(), [0xde, 0xad, 0xbe, 0xef]);
    }
}
