//! Candidate identity record, layout `candidate-identity-v1`.
//!
//! Fixed 45 bytes, no variable parts. The digest of this record is the
//! stable identity a candidate keeps across retries, which is what makes
//! replay and duplicate-admission detection possible.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canonical::{
    CANDIDATE_IDENTITY_LAYOUT, CANDIDATE_IDENTITY_LAYOUT_VERSION, CanonicalError, CanonicalWriter,
    assert_exact_length, candidate_identity_expected_len, canonical_uuid_bytes,
};

use super::{CandidateKind, POLICY_HASH_LEN};

/// Reserved tail bytes, zero-filled on the wire.
const RESERVED_LEN: usize = 3;

/// Canonical identity of an admission candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateIdentityRecord {
    /// Session the candidate originated from.
    pub session_source_id: Uuid,
    /// The candidate's own identifier.
    pub candidate_id: Uuid,
    /// Prefix of the digest of the policy active at admission time.
    pub policy_hash: [u8; POLICY_HASH_LEN],
    /// Kind of candidate.
    pub candidate_kind: CandidateKind,
}

impl CandidateIdentityRecord {
    /// Encodes the identity into its canonical 45-byte sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::LengthMismatch`] if the finished buffer
    /// misses the layout's expected length, or a UUID canonicalization
    /// error from the defensive extraction check.
    pub fn encode(&self) -> Result<Vec<u8>, CanonicalError> {
        let expected = candidate_identity_expected_len();
        let mut writer = CanonicalWriter::with_capacity(expected);

        writer.put_u8(CANDIDATE_IDENTITY_LAYOUT_VERSION);
        writer.put_bytes(&canonical_uuid_bytes(self.session_source_id)?);
        writer.put_bytes(&canonical_uuid_bytes(self.candidate_id)?);
        writer.put_bytes(&self.policy_hash);
        writer.put_u8(self.candidate_kind.as_u8());
        writer.put_zeros(RESERVED_LEN);

        let bytes = writer.finish();
        assert_exact_length(bytes.len(), expected, CANDIDATE_IDENTITY_LAYOUT)?;
        Ok(bytes)
    }
}
