//! Canonical byte encoding primitives for decision records.
//!
//! Everything the kernel hashes (policy configuration, candidate identity,
//! extension snapshots, decision inputs) goes through this module first.
//! The encoding is fixed-width, big-endian, and explicit-order: two
//! processes on different operating systems or architectures, given the
//! same logical values, produce byte-identical output. Any malformed or
//! incomplete record fails the encode instead of emitting ambiguous bytes.
//!
//! # Why not serde / JSON / protobuf
//!
//! General-purpose encoders are deliberately excluded from the hash path.
//! Text formats, tag-length-value formats, and reflection-driven encoders
//! do not guarantee byte stability across platforms and library versions,
//! and a single unstable byte breaks hash verification, idempotency keys,
//! and tamper detection. The only serialization sanctioned here is the
//! hand-ordered writer in [`CanonicalWriter`].
//!
//! # Fail-closed model
//!
//! Three independent checks back each other up:
//!
//! 1. The size-checked array writer refuses to emit an array whose element
//!    count disagrees with the caller-declared count.
//! 2. UUID canonicalization verifies it produced exactly 16 bytes.
//! 3. Every record encoder asserts the finished buffer's total length
//!    against the layout's formula-computed expected length before any
//!    bytes are handed to the hasher.
//!
//! A failure in any of them aborts the encode call; partial bytes are never
//! returned. Mismatches indicate a caller bug or a layout-version skew, not
//! a transient condition, so nothing here retries.
//!
//! # Layout versioning
//!
//! Each record layout carries an explicit version byte and a static layout
//! name. Changing any field's order, width, or presence rule mints a new
//! version byte and layout name. In-place modification of a released
//! layout version is forbidden.

use thiserror::Error;

mod layout;
mod uuid;
mod writer;

pub use layout::{
    ADMISSION_POLICY_FIXED_LEN, ADMISSION_POLICY_LAYOUT, ADMISSION_POLICY_LAYOUT_VERSION,
    CANDIDATE_IDENTITY_LAYOUT, CANDIDATE_IDENTITY_LAYOUT_VERSION, CANDIDATE_IDENTITY_LEN,
    DECISION_INPUT_BASE_LEN, DECISION_INPUT_LAYOUT, DECISION_INPUT_LAYOUT_VERSION,
    DENIAL_REASON_WIDTH, DecisionCardinality, EXTENSION_SNAPSHOT_BASE_LEN,
    EXTENSION_SNAPSHOT_LAYOUT, EXTENSION_SNAPSHOT_LAYOUT_VERSION, FLOW_COUNTER_WIDTH,
    FLOW_WEIGHT_WIDTH, REASON_CODE_WIDTH, THROTTLE_STATS_WIDTH, assert_exact_length,
    candidate_identity_expected_len, decision_input_expected_len,
    extension_snapshot_expected_len, policy_expected_len,
};
pub use self::uuid::{DENY_UUID_CANONICAL_LENGTH, UUID_CANONICAL_LEN, canonical_uuid_bytes};
pub use writer::{CanonicalWriter, DEFAULT_WRITER_CAPACITY};

/// Errors raised by canonical encoding.
///
/// Every variant is fatal to the encode call that raised it. The writer and
/// the record are both discarded; there is no partial state to roll back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CanonicalError {
    /// A size-checked array write was given the wrong element count.
    ///
    /// No bytes were emitted for the array.
    #[error("fixed array size mismatch: expected {expected} elements, got {actual}")]
    SizeMismatch {
        /// Element count the caller declared.
        expected: usize,
        /// Element count actually supplied.
        actual: usize,
    },

    /// The finished record's total byte length does not equal the
    /// formula-computed expected length for its layout.
    #[error("canonical length mismatch for {layout}: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Static layout name/version, used verbatim.
        layout: &'static str,
        /// Length the layout formula computed.
        expected: usize,
        /// Length the writer actually produced.
        actual: usize,
    },

    /// UUID field extraction did not yield exactly 16 bytes.
    ///
    /// Defensive; unreachable with the current extraction algorithm. Kept
    /// as a safety net against future refactors of the field slicing.
    #[error("uuid canonicalization failed ({code}): produced {actual} bytes, expected 16")]
    UuidCanonicalization {
        /// Dedicated deny code for this contract violation.
        code: &'static str,
        /// Byte count the extraction produced.
        actual: usize,
    },

    /// An incrementally built record is missing a mandatory field.
    #[error("missing mandatory field: {0}")]
    MissingField(&'static str),

    /// A single-byte discriminant does not map to any known enum value.
    #[error("unknown discriminant for {field}: {value}")]
    UnknownDiscriminant {
        /// Record field the discriminant was read for.
        field: &'static str,
        /// The out-of-range byte.
        value: u8,
    },
}
