//! Content hashing for canonical decision records.
//!
//! The canonical encoders in [`crate::canonical`] are hash-agnostic; this
//! module is the consumer side that turns their output bytes into
//! identities:
//!
//! - **Policy hash**: an 8-byte prefix of the policy record digest,
//!   embedded in every other record to pin it to the policy bytes that
//!   produced it.
//! - **Stable ids**: 8-byte identities derived from the candidate
//!   identity record, stable across retries of the same candidate.
//! - **Idempotency key**: the full digest of the decision hash input
//!   record, used for duplicate-decision detection and audit.
//!
//! Blake3 is the content hash throughout. The contract with the encoders
//! is exactly "hash these bytes, in this order, with no padding": an
//! encode failure aborts the derivation and nothing is hashed.

mod hash;

pub use hash::{HASH_SIZE, Hash, RecordHasher};
