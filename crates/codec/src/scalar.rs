//! Binary-serializable scalars
//!
//! A closed set of fixed-width types is encoded by raw copy instead of going
//! through a field-by-field `Encode` routine. Each member carries a fixed
//! `ScalarTag`; the set is sealed so no other type can opt into raw copying.
//!
//! All scalars are little-endian on the wire.

use byteorder::{ByteOrder, LittleEndian};
use strata_core::{ProtocolVersion, Result, WireError};

use crate::archive::{Reader, Writer};
use crate::traits::{Decode, Encode};

mod sealed {
    pub trait Sealed {}
}

/// Largest `BinaryItem::SIZE` in the set.
pub const MAX_ITEM_SIZE: usize = 8;

/// Tag identifying a member of the raw-copy scalar set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarTag {
    /// `i8`
    I8,
    /// `u8`
    U8,
    /// `i16`
    I16,
    /// `u16`
    U16,
    /// `i32`
    I32,
    /// `u32`
    U32,
    /// `i64`
    I64,
    /// `u64`
    U64,
    /// `bool`, one byte holding 0 or 1
    Bool,
    /// `f64`
    F64,
    /// `ProtocolVersion`, flags included
    Version,
}

impl ScalarTag {
    /// Encoded width in bytes.
    pub const fn size(self) -> usize {
        match self {
            ScalarTag::I8 | ScalarTag::U8 | ScalarTag::Bool => 1,
            ScalarTag::I16 | ScalarTag::U16 => 2,
            ScalarTag::I32 | ScalarTag::U32 => 4,
            ScalarTag::I64 | ScalarTag::U64 | ScalarTag::F64 | ScalarTag::Version => 8,
        }
    }
}

/// A scalar encoded by raw copy of `SIZE` bytes.
///
/// `store` and `load` are handed slices of exactly `SIZE` bytes.
pub trait BinaryItem: Copy + sealed::Sealed {
    /// Tag of this member of the scalar set.
    const TAG: ScalarTag;

    /// Encoded width in bytes.
    const SIZE: usize = Self::TAG.size();

    /// Write the little-endian image into `out`.
    fn store(self, out: &mut [u8]);

    /// Read the little-endian image from `input`.
    fn load(input: &[u8]) -> Result<Self>;
}

macro_rules! impl_binary_item {
    ($ty:ty, $tag:ident, $write:ident, $read:ident) => {
        impl sealed::Sealed for $ty {}

        impl BinaryItem for $ty {
            const TAG: ScalarTag = ScalarTag::$tag;

            #[inline]
            fn store(self, out: &mut [u8]) {
                LittleEndian::$write(out, self)
            }

            #[inline]
            fn load(input: &[u8]) -> Result<Self> {
                Ok(LittleEndian::$read(input))
            }
        }
    };
}

impl_binary_item!(i16, I16, write_i16, read_i16);
impl_binary_item!(u16, U16, write_u16, read_u16);
impl_binary_item!(i32, I32, write_i32, read_i32);
impl_binary_item!(u32, U32, write_u32, read_u32);
impl_binary_item!(i64, I64, write_i64, read_i64);
impl_binary_item!(u64, U64, write_u64, read_u64);
impl_binary_item!(f64, F64, write_f64, read_f64);

impl sealed::Sealed for u8 {}

impl BinaryItem for u8 {
    const TAG: ScalarTag = ScalarTag::U8;

    #[inline]
    fn store(self, out: &mut [u8]) {
        out[0] = self;
    }

    #[inline]
    fn load(input: &[u8]) -> Result<Self> {
        Ok(input[0])
    }
}

impl sealed::Sealed for i8 {}

impl BinaryItem for i8 {
    const TAG: ScalarTag = ScalarTag::I8;

    #[inline]
    fn store(self, out: &mut [u8]) {
        out[0] = self as u8;
    }

    #[inline]
    fn load(input: &[u8]) -> Result<Self> {
        Ok(input[0] as i8)
    }
}

impl sealed::Sealed for bool {}

impl BinaryItem for bool {
    const TAG: ScalarTag = ScalarTag::Bool;

    #[inline]
    fn store(self, out: &mut [u8]) {
        out[0] = self as u8;
    }

    #[inline]
    fn load(input: &[u8]) -> Result<Self> {
        match input[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(WireError::InvalidBool(other)),
        }
    }
}

impl sealed::Sealed for ProtocolVersion {}

impl BinaryItem for ProtocolVersion {
    const TAG: ScalarTag = ScalarTag::Version;

    #[inline]
    fn store(self, out: &mut [u8]) {
        LittleEndian::write_u64(out, self.version_with_flags())
    }

    #[inline]
    fn load(input: &[u8]) -> Result<Self> {
        Ok(ProtocolVersion::new(LittleEndian::read_u64(input)))
    }
}

macro_rules! impl_scalar_codec {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Encode for $ty {
                #[inline]
                fn encode<W: Writer>(&self, w: &mut W) {
                    w.write_item(*self);
                }
            }

            impl Decode for $ty {
                #[inline]
                fn decode<R: Reader>(r: &mut R) -> Result<Self> {
                    r.read_item()
                }
            }
        )+
    };
}

impl_scalar_codec!(i8, u8, i16, u16, i32, u32, i64, u64, bool, f64, ProtocolVersion);
