//! Ordered-key encoding
//!
//! Values written with `TupleWrite` compare bytewise in the same order as
//! the values themselves, so encoded keys can be sorted without decoding.
//!
//! | Value | Encoding |
//! |-------|----------|
//! | `false` | `0x14` |
//! | `true` | `0x15 0x01` |
//! | integer `0` | `0x14` |
//! | integer `t > 0` | `0x14 + n`, then `t` as `n` big-endian bytes |
//! | integer `t < 0` | `0x14 - n`, then the low `n` big-endian bytes of `t - 1` |
//! | byte string | `0x01`, content with `0x00` escaped as `0x00 0xFF`, `0x00` |
//!
//! `n` is the minimal byte width of the magnitude.

use strata_core::{Result, WireError};

use crate::archive::{Reader, Writer};

/// Type code of a byte string.
pub const BYTES_CODE: u8 = 0x01;

/// Type code of integer zero; other integers are offset from it.
pub const INT_ZERO_CODE: u8 = 0x14;

const ESCAPE: u8 = 0xFF;

/// Minimal number of bytes (at least one) needed to hold `value`.
pub fn bytes_needed(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    ((bits + 7) / 8).max(1)
}

/// Ordered-key encoders available on every writer.
pub trait TupleWrite: Writer {
    /// Write a boolean.
    fn write_tuple_bool(&mut self, value: bool) {
        if value {
            self.write_bytes(&[INT_ZERO_CODE + 1, 1]);
        } else {
            self.write_bytes(&[INT_ZERO_CODE]);
        }
    }

    /// Write an unsigned integer.
    fn write_tuple_u64(&mut self, value: u64) {
        if value == 0 {
            self.write_bytes(&[INT_ZERO_CODE]);
            return;
        }
        let n = bytes_needed(value);
        let mut image = [0u8; 9];
        image[0] = INT_ZERO_CODE + n as u8;
        image[1..].copy_from_slice(&value.to_be_bytes());
        self.write_bytes(&image[..1]);
        self.write_bytes(&image[9 - n..]);
    }

    /// Write a signed integer.
    fn write_tuple_i64(&mut self, value: i64) {
        if value >= 0 {
            self.write_tuple_u64(value as u64);
            return;
        }
        let n = bytes_needed(value.unsigned_abs());
        let image = value.wrapping_sub(1).to_be_bytes();
        self.write_bytes(&[INT_ZERO_CODE - n as u8]);
        self.write_bytes(&image[8 - n..]);
    }

    /// Write a byte string.
    fn write_tuple_bytes(&mut self, value: &[u8]) {
        self.write_bytes(&[BYTES_CODE]);
        let mut rest = value;
        while let Some(pos) = rest.iter().position(|&b| b == 0) {
            self.write_bytes(&rest[..pos]);
            self.write_bytes(&[0, ESCAPE]);
            rest = &rest[pos + 1..];
        }
        self.write_bytes(rest);
        self.write_bytes(&[0]);
    }
}

impl<W: Writer + ?Sized> TupleWrite for W {}

/// Ordered-key decoders available on every reader.
pub trait TupleRead: Reader {
    /// Read a boolean.
    fn read_tuple_bool(&mut self) -> Result<bool> {
        match self.read_item::<u8>()? {
            INT_ZERO_CODE => Ok(false),
            code if code == INT_ZERO_CODE + 1 => match self.read_item::<u8>()? {
                1 => Ok(true),
                other => Err(WireError::malformed(format!(
                    "tuple bool payload {:#04x}",
                    other
                ))),
            },
            code => Err(WireError::malformed(format!(
                "tuple bool type code {:#04x}",
                code
            ))),
        }
    }

    /// Read an unsigned integer.
    fn read_tuple_u64(&mut self) -> Result<u64> {
        let code = self.read_item::<u8>()?;
        if !(INT_ZERO_CODE..=INT_ZERO_CODE + 8).contains(&code) {
            return Err(WireError::malformed(format!(
                "tuple unsigned type code {:#04x}",
                code
            )));
        }
        let n = (code - INT_ZERO_CODE) as usize;
        read_magnitude(self, n)
    }

    /// Read a signed integer.
    fn read_tuple_i64(&mut self) -> Result<i64> {
        let code = self.read_item::<u8>()?;
        if (INT_ZERO_CODE..=INT_ZERO_CODE + 8).contains(&code) {
            let n = (code - INT_ZERO_CODE) as usize;
            let magnitude = read_magnitude(self, n)?;
            return i64::try_from(magnitude)
                .map_err(|_| WireError::malformed("tuple integer exceeds i64"));
        }
        if (INT_ZERO_CODE - 8..INT_ZERO_CODE).contains(&code) {
            let n = (INT_ZERO_CODE - code) as usize;
            let low = read_magnitude(self, n)? as i128;
            let value = low - (1i128 << (8 * n)) + 1;
            if value >= 0 {
                return Err(WireError::malformed("tuple negative integer is not negative"));
            }
            return i64::try_from(value)
                .map_err(|_| WireError::malformed("tuple integer exceeds i64"));
        }
        Err(WireError::malformed(format!(
            "tuple integer type code {:#04x}",
            code
        )))
    }

    /// Read a byte string, removing escapes.
    fn read_tuple_bytes(&mut self) -> Result<Vec<u8>> {
        let code = self.read_item::<u8>()?;
        if code != BYTES_CODE {
            return Err(WireError::malformed(format!(
                "tuple bytes type code {:#04x}",
                code
            )));
        }
        let mut out = Vec::new();
        loop {
            if self.remaining() == 0 {
                return Err(WireError::malformed("unterminated tuple bytes"));
            }
            match self.read_item::<u8>()? {
                0 => {
                    if self.remaining() > 0 && self.peek_bytes(1)?[0] == ESCAPE {
                        self.read_bytes(1)?;
                        out.push(0);
                    } else {
                        return Ok(out);
                    }
                }
                b => out.push(b),
            }
        }
    }
}

impl<R: Reader + ?Sized> TupleRead for R {}

fn read_magnitude<R: Reader + ?Sized>(r: &mut R, n: usize) -> Result<u64> {
    let mut image = [0u8; 8];
    image[8 - n..].copy_from_slice(r.read_bytes(n)?);
    Ok(u64::from_be_bytes(image))
}
