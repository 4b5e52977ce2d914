//! Contiguous readers
//!
//! Two readers share one cursor implementation:
//!
//! - `BinaryReader<'a>` reads from a borrowed slice. Values that must outlive
//!   the slice (`read_shared`) are copied into fresh memory.
//! - `ArenaReader` reads from a reference-counted `Bytes`. `read_shared`
//!   slices it without copying and keeps the arena alive.
//!
//! Both run version negotiation at construction, never read past the end of
//! their input, and support one level of checkpoint/rewind for speculative
//! parsing.

use bytes::Bytes;
use strata_core::{ProtocolVersion, Result, VersionPolicy, WireConfig, WireError};

use crate::archive::{Archive, Reader};
use crate::traits::Decode;

/// Bounds-checked position over an input of known length.
#[derive(Debug, Clone)]
struct Cursor {
    pos: usize,
    end: usize,
    check: Option<usize>,
    version: ProtocolVersion,
    max_container_len: usize,
}

impl Cursor {
    fn open(input: &[u8], config: &WireConfig) -> Result<Self> {
        let negotiated = config.policy.negotiate_read(
            input,
            config.default_version,
            config.max_supported_version,
        )?;
        Ok(Cursor {
            pos: negotiated.header_len,
            end: input.len(),
            check: None,
            version: negotiated.version,
            max_container_len: config.max_container_len,
        })
    }

    fn remaining(&self) -> usize {
        self.end - self.pos
    }

    fn span(&self, len: usize) -> Result<std::ops::Range<usize>> {
        if len > self.remaining() {
            return Err(WireError::eof(len, self.remaining()));
        }
        Ok(self.pos..self.pos + len)
    }

    fn advance(&mut self, len: usize) -> Result<std::ops::Range<usize>> {
        let span = self.span(len)?;
        self.pos = span.end;
        Ok(span)
    }

    fn checkpoint(&mut self) {
        self.check = Some(self.pos);
    }

    fn rewind(&mut self) {
        match self.check.take() {
            Some(pos) => self.pos = pos,
            None => panic!("rewind without a checkpoint"),
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(WireError::TrailingBytes(extra)),
        }
    }
}

/// Reader over a borrowed byte slice.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    cursor: Cursor,
}

impl<'a> BinaryReader<'a> {
    /// Open a reader for the given policy with default configuration.
    pub fn new(data: &'a [u8], policy: VersionPolicy) -> Result<Self> {
        Self::with_config(data, &WireConfig::new(policy))
    }

    /// Open a reader, negotiating the version before any field access.
    pub fn with_config(data: &'a [u8], config: &WireConfig) -> Result<Self> {
        let cursor = Cursor::open(data, config)?;
        Ok(BinaryReader { data, cursor })
    }

    /// Decode one value from `data`.
    pub fn decode_from<T: Decode>(data: &'a [u8], policy: VersionPolicy) -> Result<T> {
        let mut reader = Self::new(data, policy)?;
        T::decode(&mut reader)
    }

    /// Consume `len` bytes, borrowing them for the input's lifetime.
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        let span = self.cursor.advance(len)?;
        Ok(&self.data[span])
    }

    /// Look at the next `len` bytes without consuming them.
    pub fn peek_bytes(&self, len: usize) -> Result<&'a [u8]> {
        let span = self.cursor.span(len)?;
        Ok(&self.data[span])
    }

    /// True when the whole input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.cursor.remaining() == 0
    }

    /// Fail if any input is left unread.
    pub fn expect_end(&self) -> Result<()> {
        self.cursor.expect_end()
    }

    /// Remember the current position. Replaces any earlier checkpoint.
    pub fn checkpoint(&mut self) {
        self.cursor.checkpoint();
    }

    /// Return to the last checkpoint and clear it.
    ///
    /// # Panics
    ///
    /// Panics if no checkpoint is set.
    pub fn rewind(&mut self) {
        self.cursor.rewind();
    }
}

impl Archive for BinaryReader<'_> {
    fn protocol_version(&self) -> ProtocolVersion {
        self.cursor.version
    }

    fn set_protocol_version(&mut self, version: ProtocolVersion) {
        self.cursor.version = version;
    }
}

impl Reader for BinaryReader<'_> {
    fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        self.read_slice(len)
    }

    fn read_shared(&mut self, len: usize) -> Result<Bytes> {
        if len == 0 {
            return Ok(Bytes::new());
        }
        self.read_slice(len).map(Bytes::copy_from_slice)
    }

    fn peek_bytes(&self, len: usize) -> Result<&[u8]> {
        let span = self.cursor.span(len)?;
        Ok(&self.data[span])
    }

    fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    fn max_container_len(&self) -> usize {
        self.cursor.max_container_len
    }
}

/// Reader over reference-counted memory.
#[derive(Debug, Clone)]
pub struct ArenaReader {
    data: Bytes,
    cursor: Cursor,
}

impl ArenaReader {
    /// Open a reader for the given policy with default configuration.
    pub fn new(data: Bytes, policy: VersionPolicy) -> Result<Self> {
        Self::with_config(data, &WireConfig::new(policy))
    }

    /// Open a reader, negotiating the version before any field access.
    pub fn with_config(data: Bytes, config: &WireConfig) -> Result<Self> {
        let cursor = Cursor::open(&data, config)?;
        Ok(ArenaReader { data, cursor })
    }

    /// Unread tail of the input, shared with the arena.
    pub fn read_rest(&self) -> Bytes {
        self.data.slice(self.cursor.pos..self.cursor.end)
    }

    /// The arena this reader keeps alive.
    pub fn arena(&self) -> &Bytes {
        &self.data
    }

    /// True when the whole input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.cursor.remaining() == 0
    }

    /// Fail if any input is left unread.
    pub fn expect_end(&self) -> Result<()> {
        self.cursor.expect_end()
    }

    /// Remember the current position. Replaces any earlier checkpoint.
    pub fn checkpoint(&mut self) {
        self.cursor.checkpoint();
    }

    /// Return to the last checkpoint and clear it.
    ///
    /// # Panics
    ///
    /// Panics if no checkpoint is set.
    pub fn rewind(&mut self) {
        self.cursor.rewind();
    }
}

impl Archive for ArenaReader {
    fn protocol_version(&self) -> ProtocolVersion {
        self.cursor.version
    }

    fn set_protocol_version(&mut self, version: ProtocolVersion) {
        self.cursor.version = version;
    }
}

impl Reader for ArenaReader {
    fn read_bytes(&mut self, len: usize) -> Result<&[u8]> {
        let span = self.cursor.advance(len)?;
        Ok(&self.data[span])
    }

    fn read_shared(&mut self, len: usize) -> Result<Bytes> {
        let span = self.cursor.advance(len)?;
        Ok(self.data.slice(span))
    }

    fn peek_bytes(&self, len: usize) -> Result<&[u8]> {
        let span = self.cursor.span(len)?;
        Ok(&self.data[span])
    }

    fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    fn max_container_len(&self) -> usize {
        self.cursor.max_container_len
    }
}
