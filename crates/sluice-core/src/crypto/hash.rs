//! Blake3 hashing of canonical record bytes.

use tracing::warn;

use crate::canonical::CanonicalError;
use crate::record::{
    AdmissionPolicyRecord, CandidateIdentityRecord, DecisionHashInputRecord, POLICY_HASH_LEN,
};

/// Size of a Blake3 digest in bytes.
pub const HASH_SIZE: usize = 32;

/// Type alias for a 32-byte digest.
pub type Hash = [u8; HASH_SIZE];

/// Hasher for canonical decision records.
///
/// All derivations encode first and hash second; a canonical encode
/// failure propagates and nothing is hashed, so a digest can never cover
/// partial or ambiguous bytes.
pub struct RecordHasher;

impl RecordHasher {
    /// Hashes an already-encoded canonical byte sequence.
    #[must_use]
    pub fn hash_bytes(bytes: &[u8]) -> Hash {
        *blake3::hash(bytes).as_bytes()
    }

    /// Derives the 8-byte policy hash embedded in identity, snapshot, and
    /// decision records.
    ///
    /// # Errors
    ///
    /// Propagates any canonical encode failure of the policy record.
    pub fn policy_hash(policy: &AdmissionPolicyRecord) -> Result<[u8; POLICY_HASH_LEN], CanonicalError> {
        let bytes = encode_for_hashing(policy.encode(), "admission policy")?;
        let digest = Self::hash_bytes(&bytes);
        let mut prefix = [0u8; POLICY_HASH_LEN];
        prefix.copy_from_slice(&digest[..POLICY_HASH_LEN]);
        Ok(prefix)
    }

    /// Derives a candidate's stable id: the first 8 digest bytes of its
    /// identity record, as a big-endian integer.
    ///
    /// # Errors
    ///
    /// Propagates any canonical encode failure of the identity record.
    pub fn stable_id(identity: &CandidateIdentityRecord) -> Result<u64, CanonicalError> {
        let bytes = encode_for_hashing(identity.encode(), "candidate identity")?;
        let digest = Self::hash_bytes(&bytes);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        Ok(u64::from_be_bytes(prefix))
    }

    /// Derives a decision's idempotency key: the full digest of its hash
    /// input record.
    ///
    /// # Errors
    ///
    /// Propagates any canonical encode failure of the decision record.
    pub fn idempotency_key(decision: &DecisionHashInputRecord) -> Result<Hash, CanonicalError> {
        let bytes = encode_for_hashing(decision.encode(), "decision input")?;
        Ok(Self::hash_bytes(&bytes))
    }
}

/// Unwraps an encode result, logging the contract violation on failure.
///
/// A canonical encode failure at the hashing boundary means the caller
/// handed the kernel an inconsistent record; the surrounding decision or
/// audit operation must fail, so the violation is worth alerting on.
fn encode_for_hashing(
    result: Result<Vec<u8>, CanonicalError>,
    record: &'static str,
) -> Result<Vec<u8>, CanonicalError> {
    match result {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            warn!(record, error = %err, "refusing to hash: canonical encode failed");
            Err(err)
        }
    }
}
