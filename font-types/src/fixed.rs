//! fixed-point numerical types

// shared between Fixed and F2dot14
macro_rules! fixed_impl {
    ($name:ident, $bits:literal, $fract_bits:literal, $ty:ty, $to:ident, $from:ident, $float:ty) => {
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[doc = concat!(stringify!($bits), "-bit signed fixed point number with ", stringify!($fract_bits), " bits of fraction." )]
        pub struct $name($ty);

        impl $name {
            /// Minimum value.
            pub const MIN: Self = Self(<$ty>::MIN);

            /// Maximum value.
            pub const MAX: Self = Self(<$ty>::MAX);

            /// The value `1.0`.
            pub const ONE: Self = Self(1 << $fract_bits);

            /// The value `0.0`.
            pub const ZERO: Self = Self(0);

            const INT_MASK: $ty = !0 << $fract_bits;
            const FRACT_BITS: usize = $fract_bits;

            /// Create a value from its raw bit representation.
            pub const fn from_bits(bits: $ty) -> Self {
                Self(bits)
            }

            /// Return the raw bit representation.
            pub const fn to_bits(self) -> $ty {
                self.0
            }

            #[doc = concat!("Creates a fixed point value from a ", stringify!($float), ".")]
            ///
            /// This operation is lossy; the float will be rounded to the nearest
            /// representable value.
            pub fn $from(x: $float) -> Self {
                Self((x * Self::ONE.0 as $float).round() as _)
            }

            #[doc = concat!("Returns the value as an ", stringify!($float), ".")]
            ///
            /// This operation is lossless: all representable values can be
            /// round-tripped.
            pub fn $to(self) -> $float {
                let int = ((self.0 & Self::INT_MASK) >> Self::FRACT_BITS) as $float;
                let fract = (self.0 & !Self::INT_MASK) as $float / Self::ONE.0 as $float;
                int + fract
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                self.$to().fmt(f)
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                self.$to().fmt(f)
            }
        }

        crate::newtype_scalar!($name, $ty);
    };
}

fixed_impl!(F2Dot14, 16, 14, i16, to_f32, from_f32, f32);
fixed_impl!(Fixed, 32, 16, i32, to_f64, from_f64, f64);

impl Fixed {
    /// The 16.16 value of a table version such as `0x00010000`.
    pub fn to_version(self) -> (u16, u16) {
        ((self.0 as u32 >> 16) as u16, self.0 as u32 as u16)
    }
}

#[cfg(test)]
mod tests {
    #![allow(overflowing_literals)] // we want to specify byte values directly
    use super::*;

    #[test]
    fn f2dot14_floats() {
        // Examples from https://docs.microsoft.com/en-us/typography/opentype/spec/otff#data-types
        assert_eq!(F2Dot14(0x7fff), F2Dot14::from_f32(1.999939));
        assert_eq!(F2Dot14(0x7000), F2Dot14::from_f32(1.75));
        assert_eq!(F2Dot14(0x0001), F2Dot14::from_f32(0.0000610356));
        assert_eq!(F2Dot14(0x0000), F2Dot14::from_f32(0.0));
        assert_eq!(F2Dot14(0xffff), F2Dot14::from_f32(-0.000061));
        assert_eq!(F2Dot14(0x8000), F2Dot14::from_f32(-2.0));
    }

    #[test]
    fn roundtrip_f2dot14() {
        for i in i16::MIN..=i16::MAX {
            let val = F2Dot14(i);
            assert_eq!(val, F2Dot14::from_f32(val.to_f32()));
        }
    }

    #[test]
    fn fixed_floats() {
        assert_eq!(Fixed(0x7fff_0000), Fixed::from_f64(32767.));
        assert_eq!(Fixed(0x0001_0000), Fixed::from_f64(1.0));
        assert_eq!(Fixed(0x0000_0000), Fixed::from_f64(0.0));
        assert_eq!(Fixed::from_bits(0x0001_0000).to_version(), (1, 0));
    }
}
