//! Canonical 16-byte encoding of 128-bit identifiers.
//!
//! The wire form is the RFC 4122 field order: `time_low`, `time_mid`,
//! `time_hi_and_version`, `clock_seq_hi_and_reserved`, `clock_seq_low`,
//! `node`. Fields are extracted from the identifier's 128-bit value by
//! explicit shifting, never by copying a platform's in-memory
//! representation: native layouts are not guaranteed byte-order-consistent
//! across platforms, and this encoding must be.

use uuid::Uuid;

use super::CanonicalError;

/// Canonical encoded length of a 128-bit identifier.
pub const UUID_CANONICAL_LEN: usize = 16;

/// Deny code attached to the defensive extraction-length check.
pub const DENY_UUID_CANONICAL_LENGTH: &str = "DENY_UUID_CANONICAL_LENGTH";

/// Encodes a 128-bit identifier into exactly 16 canonical bytes.
///
/// # Errors
///
/// Returns [`CanonicalError::UuidCanonicalization`] if extraction yields a
/// byte count other than 16. This is unreachable with the extraction below
/// and exists as a safety net against future refactors of the field
/// slicing; it is not an expected runtime path.
#[allow(clippy::cast_possible_truncation)] // Each shift isolates the field width.
pub fn canonical_uuid_bytes(id: Uuid) -> Result<[u8; UUID_CANONICAL_LEN], CanonicalError> {
    let value = id.as_u128();

    let mut out = Vec::with_capacity(UUID_CANONICAL_LEN);

    // time_low: bits 127..96.
    out.extend_from_slice(&((value >> 96) as u32).to_be_bytes());
    // time_mid: bits 95..80.
    out.extend_from_slice(&((value >> 80) as u16).to_be_bytes());
    // time_hi_and_version: bits 79..64.
    out.extend_from_slice(&((value >> 64) as u16).to_be_bytes());
    // clock_seq_hi_and_reserved: bits 63..56.
    out.push((value >> 56) as u8);
    // clock_seq_low: bits 55..48.
    out.push((value >> 48) as u8);
    // node: bits 47..0, high byte first.
    for shift in [40u32, 32, 24, 16, 8, 0] {
        out.push((value >> shift) as u8);
    }

    let actual = out.len();
    out.try_into()
        .map_err(|_| CanonicalError::UuidCanonicalization {
            code: DENY_UUID_CANONICAL_LENGTH,
            actual,
        })
}
