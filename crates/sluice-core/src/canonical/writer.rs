//! Append-only canonical byte writer.
//!
//! [`CanonicalWriter`] is the only component in the crate that writes bytes.
//! All integer writers emit most-significant-byte-first, so output is
//! independent of host byte order. Signed integers are emitted as their
//! two's-complement bit pattern.
//!
//! A writer is created per encode call, consumed once via [`finish`], and
//! discarded. Bytes already written are never rearranged or rewritten.
//!
//! [`finish`]: CanonicalWriter::finish

use super::CanonicalError;

/// Default pre-allocation for a fresh writer.
///
/// Sized to hold any of the current record layouts without reallocating for
/// typical flow-bucket counts.
pub const DEFAULT_WRITER_CAPACITY: usize = 256;

/// Append-only, pre-sized output buffer with fixed-width big-endian writers.
#[derive(Debug)]
pub struct CanonicalWriter {
    buf: Vec<u8>,
}

impl CanonicalWriter {
    /// Creates a writer with the default capacity hint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WRITER_CAPACITY)
    }

    /// Creates a writer pre-sized to `capacity` bytes.
    ///
    /// The capacity is a hint; the buffer grows monotonically if exceeded.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Appends a single byte.
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Appends an unsigned 16-bit integer, big-endian.
    pub fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends an unsigned 32-bit integer, big-endian.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends an unsigned 64-bit integer, big-endian.
    pub fn put_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends a signed 32-bit integer as its two's-complement bit
    /// pattern, big-endian.
    pub fn put_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends a signed 64-bit integer as its two's-complement bit
    /// pattern, big-endian.
    pub fn put_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends pre-encoded bytes verbatim (UUID output, hash prefixes).
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends `len` zero bytes for reserved/padding regions.
    pub fn put_zeros(&mut self, len: usize) {
        self.buf.resize(self.buf.len() + len, 0);
    }

    /// Appends a fixed array of unsigned 16-bit integers, big-endian,
    /// after checking the slice length against the caller-declared count.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::SizeMismatch`] if `values.len()` does not
    /// equal `expected`. No bytes are written in that case.
    pub fn put_u16_slice(&mut self, expected: usize, values: &[u16]) -> Result<(), CanonicalError> {
        if values.len() != expected {
            return Err(CanonicalError::SizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        for value in values {
            self.put_u16(*value);
        }
        Ok(())
    }

    /// Number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the writer and returns the finished byte sequence.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for CanonicalWriter {
    fn default() -> Self {
        Self::new()
    }
}
