//! Field groups
//!
//! Tuples encode their fields back to back, in order, with no framing. They
//! are how several values are written "together" in one call.
//!
//! `wire_struct!` derives `Encode`/`Decode` for a named-field struct the same
//! way: fields in declaration order.

use strata_core::Result;

use crate::archive::{check_version, Reader, Writer};
use crate::traits::{Decode, Encode};

impl Encode for () {
    #[inline]
    fn encode<W: Writer>(&self, _w: &mut W) {}
}

impl Decode for () {
    #[inline]
    fn decode<R: Reader>(_r: &mut R) -> Result<Self> {
        Ok(())
    }
}

macro_rules! impl_tuple_codec {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Encode),+> Encode for ($($name,)+) {
            fn encode<W: Writer>(&self, w: &mut W) {
                $(self.$idx.encode(w);)+
                check_version(w);
            }
        }

        impl<$($name: Decode),+> Decode for ($($name,)+) {
            fn decode<R: Reader>(r: &mut R) -> Result<Self> {
                let value = ($($name::decode(r)?,)+);
                check_version(r);
                Ok(value)
            }
        }
    };
}

impl_tuple_codec!(A: 0);
impl_tuple_codec!(A: 0, B: 1);
impl_tuple_codec!(A: 0, B: 1, C: 2);
impl_tuple_codec!(A: 0, B: 1, C: 2, D: 3);
impl_tuple_codec!(A: 0, B: 1, C: 2, D: 3, E: 4);
impl_tuple_codec!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_tuple_codec!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_tuple_codec!(A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

/// Implement `Encode` and `Decode` for a struct, field by field.
///
/// ```
/// use strata_codec::{wire_struct, BinaryReader, BinaryWriter, VersionPolicy};
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// wire_struct!(Point { x, y });
///
/// let bytes = BinaryWriter::encode_to_bytes(&Point { x: 1, y: -1 }, VersionPolicy::Unversioned);
/// let back: Point = BinaryReader::decode_from(&bytes, VersionPolicy::Unversioned).unwrap();
/// assert_eq!(back, Point { x: 1, y: -1 });
/// ```
#[macro_export]
macro_rules! wire_struct {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::Encode for $name {
            fn encode<W: $crate::Writer>(&self, w: &mut W) {
                $($crate::Encode::encode(&self.$field, w);)+
                $crate::check_version(w);
            }
        }

        impl $crate::Decode for $name {
            fn decode<R: $crate::Reader>(r: &mut R) -> $crate::Result<Self> {
                let value = $name {
                    $($field: $crate::Decode::decode(r)?,)+
                };
                $crate::check_version(r);
                Ok(value)
            }
        }
    };
}
