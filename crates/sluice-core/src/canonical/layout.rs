//! Per-layout expected-length formulas and the exact-length assertion.
//!
//! Each record layout pins an exact encoded byte length, computed from the
//! record's cardinality-determining inputs only: flow-bucket counts and
//! optional-field presence flags. Every record encoder calls
//! [`assert_exact_length`] with its layout's formula result immediately
//! before returning bytes; a mismatch means a field was dropped,
//! duplicated, or a count field disagrees with its array, and the encode
//! fails closed.
//!
//! The formulas here are pure functions so they can be unit-tested
//! independently of the writer.
//!
//! Layout names are static and used verbatim in errors. A change to any
//! field's order, width, or presence rule mints a new name and version
//! byte; released layouts are never modified in place.

use super::CanonicalError;

/// Layout name for the admission policy record, version 1.
pub const ADMISSION_POLICY_LAYOUT: &str = "admission-policy-v1";
/// Version byte written as the first byte of the policy record.
pub const ADMISSION_POLICY_LAYOUT_VERSION: u8 = 1;
/// Fixed portion of the policy record: every field except the flow-weights
/// array, including the flow-bucket count itself.
pub const ADMISSION_POLICY_FIXED_LEN: usize = 139;

/// Layout name for the candidate identity record, version 1.
pub const CANDIDATE_IDENTITY_LAYOUT: &str = "candidate-identity-v1";
/// Version byte written as the first byte of the identity record.
pub const CANDIDATE_IDENTITY_LAYOUT_VERSION: u8 = 1;
/// The identity record has no variable parts: always exactly 45 bytes.
pub const CANDIDATE_IDENTITY_LEN: usize = 45;

/// Layout name for the extension snapshot record, version 1.
pub const EXTENSION_SNAPSHOT_LAYOUT: &str = "extension-snapshot-v1";
/// Version byte written as the first byte of the snapshot record.
pub const EXTENSION_SNAPSHOT_LAYOUT_VERSION: u8 = 1;
/// Snapshot length with the denial-reason payload absent.
pub const EXTENSION_SNAPSHOT_BASE_LEN: usize = 61;

/// Layout name for the decision hash input record, version 1.
pub const DECISION_INPUT_LAYOUT: &str = "decision-input-v1";
/// Version byte written as the first byte of the decision record.
pub const DECISION_INPUT_LAYOUT_VERSION: u8 = 1;
/// Decision record length with all optional payloads absent and zero flow
/// buckets: all fixed fields, the count field, and every presence tag.
pub const DECISION_INPUT_BASE_LEN: usize = 48;

/// Width of one flow-weight element in the policy record.
pub const FLOW_WEIGHT_WIDTH: usize = 2;
/// Width of one per-flow counter element in the decision record.
pub const FLOW_COUNTER_WIDTH: usize = 2;
/// Width of the optional denial-reason payload in the snapshot record.
pub const DENIAL_REASON_WIDTH: usize = 1;
/// Width of each optional single-byte reason/decision payload in the
/// decision record.
pub const REASON_CODE_WIDTH: usize = 1;
/// Width of the optional throttle-stats payload: window start tick (8),
/// window duration (4), attempts in window (4).
pub const THROTTLE_STATS_WIDTH: usize = 16;

/// Expected encoded length of an admission policy record.
#[must_use]
pub const fn policy_expected_len(flow_bucket_count: u16) -> usize {
    ADMISSION_POLICY_FIXED_LEN + flow_bucket_count as usize * FLOW_WEIGHT_WIDTH
}

/// Expected encoded length of a candidate identity record.
#[must_use]
pub const fn candidate_identity_expected_len() -> usize {
    CANDIDATE_IDENTITY_LEN
}

/// Expected encoded length of an extension snapshot record.
#[must_use]
pub const fn extension_snapshot_expected_len(denial_reason_present: bool) -> usize {
    if denial_reason_present {
        EXTENSION_SNAPSHOT_BASE_LEN + DENIAL_REASON_WIDTH
    } else {
        EXTENSION_SNAPSHOT_BASE_LEN
    }
}

/// The exact set of decision-record fields that affect encoded length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionCardinality {
    /// Whether the reject-reason payload byte is written.
    pub reject_reason_present: bool,
    /// Whether the shed-decision payload byte is written.
    pub shed_decision_present: bool,
    /// Whether the shed-reason payload byte is written.
    pub shed_reason_present: bool,
    /// Whether the degradation-reason-code payload byte is written.
    pub degradation_reason_present: bool,
    /// Declared per-flow counter count.
    pub flow_bucket_count: u32,
    /// Whether the 16-byte throttle-stats payload is written.
    pub throttle_stats_present: bool,
}

/// Expected encoded length of a decision hash input record.
#[must_use]
pub const fn decision_input_expected_len(cardinality: &DecisionCardinality) -> usize {
    let mut len = DECISION_INPUT_BASE_LEN;
    if cardinality.reject_reason_present {
        len += REASON_CODE_WIDTH;
    }
    if cardinality.shed_decision_present {
        len += REASON_CODE_WIDTH;
    }
    if cardinality.shed_reason_present {
        len += REASON_CODE_WIDTH;
    }
    if cardinality.degradation_reason_present {
        len += REASON_CODE_WIDTH;
    }
    len += cardinality.flow_bucket_count as usize * FLOW_COUNTER_WIDTH;
    if cardinality.throttle_stats_present {
        len += THROTTLE_STATS_WIDTH;
    }
    len
}

/// Asserts that an encoded record's actual length equals its layout's
/// expected length.
///
/// # Errors
///
/// Returns [`CanonicalError::LengthMismatch`] carrying the static layout
/// name when the two disagree.
pub const fn assert_exact_length(
    actual: usize,
    expected: usize,
    layout: &'static str,
) -> Result<(), CanonicalError> {
    if actual != expected {
        return Err(CanonicalError::LengthMismatch {
            layout,
            expected,
            actual,
        });
    }
    Ok(())
}
