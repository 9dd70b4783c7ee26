//! sluice-core - canonical record encoding for the sluice admission kernel.
//!
//! This crate produces the stable, cross-platform, collision-resistant byte
//! representations of the kernel's decision records: policy configuration,
//! candidate identity, extension snapshots, and decision hash inputs. Two
//! processes on different operating systems, architectures, or language
//! runtimes, given the same logical values, produce byte-identical output;
//! a malformed or incomplete record fails the encode rather than emitting
//! ambiguous bytes.
//!
//! The encoded bytes feed content hashing (see [`crypto`]) to derive audit
//! identities and idempotency keys, so a single off-by-one, wrong
//! endianness, or silently skipped optional field would break hash
//! verification, idempotency, and replay/tamper detection. The format is
//! write-only: nothing in this crate decodes canonical bytes back into
//! records.
//!
//! # Modules
//!
//! - [`canonical`]: the byte writer, UUID field extraction, layout length
//!   formulas, and the error taxonomy
//! - [`record`]: the four record types, their encoders, and the shared
//!   wire enums
//! - [`crypto`]: Blake3 digests over encoded records (policy hash, stable
//!   ids, idempotency keys)
//!
//! # Concurrency
//!
//! Encoding is synchronous and allocation-only. Each encode call owns its
//! writer; there is no shared mutable state, so concurrent encode calls on
//! independent threads need no locking.
//!
//! # Example
//!
//! ```
//! use sluice_core::crypto::RecordHasher;
//! use sluice_core::record::{DecisionClass, DecisionHashInputRecord};
//!
//! let decision = DecisionHashInputRecord::builder()
//!     .decision_schema_version(1)
//!     .policy_hash([0; 8])
//!     .session_stable_id(7)
//!     .candidate_stable_id(9)
//!     .classification(DecisionClass::Admit)
//!     .degradation_level(0)
//!     .value_score(250)
//!     .flow_counters(2, vec![4, 6])
//!     .build()?;
//!
//! let bytes = decision.encode()?;
//! assert_eq!(bytes.len(), 48 + 2 * 2);
//!
//! let key = RecordHasher::idempotency_key(&decision)?;
//! assert_eq!(key.len(), 32);
//! # Ok::<(), sluice_core::canonical::CanonicalError>(())
//! ```

pub mod canonical;
pub mod crypto;
pub mod record;

pub use canonical::{CanonicalError, CanonicalWriter};
pub use crypto::{Hash, RecordHasher};
pub use record::{
    AdmissionPolicyRecord, CandidateIdentityRecord, CandidateKind, DecisionClass,
    DecisionHashInputRecord, ExtensionResult, ExtensionSnapshotRecord, ExtensionTrigger,
    ThrottleStats,
};
