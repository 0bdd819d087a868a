//! Offsets to tables

macro_rules! impl_offset {
    ($name:ident, $bits:literal, $rawty:ty) => {
        #[doc = concat!("A ", stringify!($bits), "-bit offset to a table.")]
        ///
        /// Offsets are relative to the start of the structure that contains
        /// them. A value of zero is the null offset.
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($rawty);

        impl $name {
            /// The null offset.
            pub const NULL: Self = Self(0);

            /// Create a new offset.
            pub const fn new(raw: $rawty) -> Self {
                Self(raw)
            }

            /// Return the raw value.
            pub const fn to_u32(self) -> u32 {
                self.0 as u32
            }

            /// Returns this offset as a `usize`, or `None` if it is `0`.
            pub const fn non_null(self) -> Option<usize> {
                if self.0 == 0 {
                    None
                } else {
                    Some(self.0 as usize)
                }
            }

            /// Returns `true` if this is the null offset.
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        crate::newtype_scalar!($name, $rawty);
    };
}

impl_offset!(Offset16, 16, u16);
impl_offset!(Offset32, 32, u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_offsets() {
        assert_eq!(Offset16::NULL.non_null(), None);
        assert_eq!(Offset16::new(12).non_null(), Some(12));
        assert!(Offset32::new(0).is_null());
    }
}
