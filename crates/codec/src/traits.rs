//! Encode/decode dispatch
//!
//! `Encode` and `Decode` are the single customization point of the codec.
//! Scalars in the raw-copy set route to `Writer::write_item` /
//! `Reader::read_item`; every other type encodes itself field by field, in a
//! fixed order, against whichever archive it is handed.
//!
//! Container lengths are signed 32-bit values with no terminator sentinel.

use strata_core::{Result, WireError, MAX_WIRE_LEN};

use crate::archive::{Reader, Writer};

/// A value that can be written to any archive.
pub trait Encode {
    /// Write this value at the writer's current position.
    fn encode<W: Writer>(&self, w: &mut W);
}

/// A value that can be read from any archive.
pub trait Decode: Sized {
    /// Read a value from the reader's current position.
    fn decode<R: Reader>(r: &mut R) -> Result<Self>;
}

impl<T: Encode + ?Sized> Encode for &T {
    #[inline]
    fn encode<W: Writer>(&self, w: &mut W) {
        (**self).encode(w)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    #[inline]
    fn encode<W: Writer>(&self, w: &mut W) {
        (**self).encode(w)
    }
}

impl<T: Decode> Decode for Box<T> {
    #[inline]
    fn decode<R: Reader>(r: &mut R) -> Result<Self> {
        T::decode(r).map(Box::new)
    }
}

/// Write a container length prefix.
///
/// # Panics
///
/// Panics if `len` does not fit the signed 32-bit prefix.
#[inline]
pub fn encode_len<W: Writer>(w: &mut W, len: usize) {
    assert!(
        len <= MAX_WIRE_LEN,
        "container length {} exceeds the wire maximum",
        len
    );
    w.write_item(len as i32);
}

/// Read a container length prefix.
///
/// Negative lengths and lengths above the reader's limit are rejected.
#[inline]
pub fn decode_len<R: Reader>(r: &mut R) -> Result<usize> {
    let raw: i32 = r.read_item()?;
    if raw < 0 {
        return Err(WireError::NegativeLength(raw));
    }
    let len = raw as usize;
    let max = r.max_container_len();
    if len > max {
        return Err(WireError::LengthLimitExceeded { len, max });
    }
    Ok(len)
}

/// Capacity to reserve up front for a decoded container of `len` elements.
///
/// Bounded by the remaining input so a corrupt prefix cannot force a large
/// allocation before any element has been read.
#[inline]
pub(crate) fn reserve_hint<R: Reader>(r: &R, len: usize) -> usize {
    len.min(r.remaining())
}
