//! Built-in composite encodings
//!
//! | Type | Wire form |
//! |------|-----------|
//! | `String`, `str` | i32 length, UTF-8 bytes |
//! | `Bytes` | i32 length, raw bytes |
//! | `Vec<T>` | i32 count, elements |
//! | `[T; N]` | elements, no prefix |
//! | `BTreeSet`, `HashSet` | i32 count, elements |
//! | `BTreeMap`, `HashMap` | i32 count, key/value pairs |
//! | `Option<T>` | bool presence flag, value if present |

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::{BuildHasher, Hash};

use bytes::Bytes;
use strata_core::{Result, WireError};

use crate::archive::{check_version, Reader, Writer};
use crate::traits::{decode_len, encode_len, reserve_hint, Decode, Encode};

impl Encode for str {
    fn encode<W: Writer>(&self, w: &mut W) {
        encode_len(w, self.len());
        w.write_bytes(self.as_bytes());
        check_version(w);
    }
}

impl Encode for String {
    #[inline]
    fn encode<W: Writer>(&self, w: &mut W) {
        self.as_str().encode(w)
    }
}

impl Decode for String {
    fn decode<R: Reader>(r: &mut R) -> Result<Self> {
        let len = decode_len(r)?;
        let raw = r.read_bytes(len)?;
        let s = std::str::from_utf8(raw)
            .map_err(|_| WireError::InvalidUtf8)?
            .to_owned();
        check_version(r);
        Ok(s)
    }
}

impl Encode for [u8] {
    fn encode<W: Writer>(&self, w: &mut W) {
        encode_len(w, self.len());
        w.write_bytes(self);
        check_version(w);
    }
}

impl Encode for Bytes {
    #[inline]
    fn encode<W: Writer>(&self, w: &mut W) {
        self[..].encode(w)
    }
}

impl Decode for Bytes {
    fn decode<R: Reader>(r: &mut R) -> Result<Self> {
        let len = decode_len(r)?;
        let bytes = r.read_shared(len)?;
        check_version(r);
        Ok(bytes)
    }
}

fn encode_seq<'a, W, T, I>(w: &mut W, len: usize, items: I)
where
    W: Writer,
    T: Encode + 'a,
    I: IntoIterator<Item = &'a T>,
{
    encode_len(w, len);
    for item in items {
        item.encode(w);
    }
    check_version(w);
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<W: Writer>(&self, w: &mut W) {
        encode_seq(w, self.len(), self)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode<R: Reader>(r: &mut R) -> Result<Self> {
        let len = decode_len(r)?;
        let mut out = Vec::with_capacity(reserve_hint(r, len));
        for _ in 0..len {
            out.push(T::decode(r)?);
        }
        check_version(r);
        Ok(out)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode<W: Writer>(&self, w: &mut W) {
        for item in self {
            item.encode(w);
        }
        check_version(w);
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode<R: Reader>(r: &mut R) -> Result<Self> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::decode(r)?);
        }
        check_version(r);
        items
            .try_into()
            .map_err(|_| WireError::malformed("fixed array length mismatch"))
    }
}

impl<T: Encode> Encode for BTreeSet<T> {
    fn encode<W: Writer>(&self, w: &mut W) {
        encode_seq(w, self.len(), self)
    }
}

impl<T: Decode + Ord> Decode for BTreeSet<T> {
    fn decode<R: Reader>(r: &mut R) -> Result<Self> {
        let len = decode_len(r)?;
        let mut out = BTreeSet::new();
        for _ in 0..len {
            out.insert(T::decode(r)?);
        }
        check_version(r);
        Ok(out)
    }
}

impl<T: Encode, S> Encode for HashSet<T, S> {
    fn encode<W: Writer>(&self, w: &mut W) {
        encode_seq(w, self.len(), self)
    }
}

impl<T, S> Decode for HashSet<T, S>
where
    T: Decode + Hash + Eq,
    S: BuildHasher + Default,
{
    fn decode<R: Reader>(r: &mut R) -> Result<Self> {
        let len = decode_len(r)?;
        let mut out = HashSet::with_capacity_and_hasher(reserve_hint(r, len), S::default());
        for _ in 0..len {
            out.insert(T::decode(r)?);
        }
        check_version(r);
        Ok(out)
    }
}

fn encode_pairs<'a, W, K, V, I>(w: &mut W, len: usize, pairs: I)
where
    W: Writer,
    K: Encode + 'a,
    V: Encode + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    encode_len(w, len);
    for (k, v) in pairs {
        k.encode(w);
        v.encode(w);
    }
    check_version(w);
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode<W: Writer>(&self, w: &mut W) {
        encode_pairs(w, self.len(), self)
    }
}

impl<K: Decode + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn decode<R: Reader>(r: &mut R) -> Result<Self> {
        let len = decode_len(r)?;
        let mut out = BTreeMap::new();
        for _ in 0..len {
            let k = K::decode(r)?;
            let v = V::decode(r)?;
            out.insert(k, v);
        }
        check_version(r);
        Ok(out)
    }
}

impl<K: Encode, V: Encode, S> Encode for HashMap<K, V, S> {
    fn encode<W: Writer>(&self, w: &mut W) {
        encode_pairs(w, self.len(), self)
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Hash + Eq,
    V: Decode,
    S: BuildHasher + Default,
{
    fn decode<R: Reader>(r: &mut R) -> Result<Self> {
        let len = decode_len(r)?;
        let mut out = HashMap::with_capacity_and_hasher(reserve_hint(r, len), S::default());
        for _ in 0..len {
            let k = K::decode(r)?;
            let v = V::decode(r)?;
            out.insert(k, v);
        }
        check_version(r);
        Ok(out)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode<W: Writer>(&self, w: &mut W) {
        match self {
            Some(value) => {
                w.write_item(true);
                value.encode(w);
            }
            None => w.write_item(false),
        }
        check_version(w);
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode<R: Reader>(r: &mut R) -> Result<Self> {
        let present: bool = r.read_item()?;
        let value = if present { Some(T::decode(r)?) } else { None };
        check_version(r);
        Ok(value)
    }
}
