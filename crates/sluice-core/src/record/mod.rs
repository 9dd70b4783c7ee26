//! The four canonical decision records and their shared wire enums.
//!
//! Record values are built by the admission-control engine, encoded once,
//! and discarded; only the resulting byte sequence is retained downstream.
//! Each record encoder writes its fields in the fixed order its layout
//! version mandates, then asserts the total length against the layout
//! formula before returning bytes.
//!
//! Optional wire fields are modeled as `Option<T>`: the one-byte presence
//! tag is derived from `is_some()`, so a tag can never disagree with its
//! payload. Count fields are independent of their arrays and CAN disagree;
//! the length assertion (or the size-checked array writer) catches that.

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalError;

mod decision;
mod extension;
mod identity;
mod policy;

pub use decision::{DecisionHashInputRecord, DecisionInputBuilder, ThrottleStats};
pub use extension::{ExtensionSnapshotBuilder, ExtensionSnapshotRecord};
pub use identity::CandidateIdentityRecord;
pub use policy::{AdmissionPolicyRecord, VALUE_SCORE_WEIGHT_COUNT};

/// Presence tag byte for an absent optional field.
pub const PRESENCE_ABSENT: u8 = 0;
/// Presence tag byte for a present optional field.
pub const PRESENCE_PRESENT: u8 = 1;

/// Width of the policy-hash prefix embedded in identity, snapshot, and
/// decision records.
pub const POLICY_HASH_LEN: usize = 8;

/// Kind of admission candidate, as written to the identity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum CandidateKind {
    /// Interactive request admitted on the latency-sensitive path.
    Interactive,
    /// Batch work admitted on the throughput path.
    Batch,
    /// Replayed request re-admitted for audit reconstruction.
    Replay,
}

impl CandidateKind {
    /// Returns the single-byte wire discriminant.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Interactive => 0,
            Self::Batch => 1,
            Self::Replay => 2,
        }
    }

    /// Returns the string representation for logs and protocol events.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Interactive => "INTERACTIVE",
            Self::Batch => "BATCH",
            Self::Replay => "REPLAY",
        }
    }
}

impl TryFrom<u8> for CandidateKind {
    type Error = CanonicalError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Interactive),
            1 => Ok(Self::Batch),
            2 => Ok(Self::Replay),
            _ => Err(CanonicalError::UnknownDiscriminant {
                field: "candidate_kind",
                value,
            }),
        }
    }
}

impl std::fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of an admission decision, as written to the decision
/// hash input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum DecisionClass {
    /// The candidate was admitted.
    Admit,
    /// The candidate was rejected by policy.
    Reject,
    /// The candidate was shed under load.
    Shed,
    /// The candidate was throttled by the rate limiter.
    Throttle,
}

impl DecisionClass {
    /// Returns the single-byte wire discriminant.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Admit => 0,
            Self::Reject => 1,
            Self::Shed => 2,
            Self::Throttle => 3,
        }
    }

    /// Returns the string representation for logs and protocol events.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admit => "ADMIT",
            Self::Reject => "REJECT",
            Self::Shed => "SHED",
            Self::Throttle => "THROTTLE",
        }
    }
}

impl TryFrom<u8> for DecisionClass {
    type Error = CanonicalError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Admit),
            1 => Ok(Self::Reject),
            2 => Ok(Self::Shed),
            3 => Ok(Self::Throttle),
            _ => Err(CanonicalError::UnknownDiscriminant {
                field: "classification",
                value,
            }),
        }
    }
}

impl std::fmt::Display for DecisionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What triggered an extension request, as written to the snapshot record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ExtensionTrigger {
    /// The session owner asked for more budget.
    UserRequest,
    /// The limiter auto-renewed a session inside its budget.
    AutoRenewal,
    /// A grace window opened after a soft-limit breach.
    GraceWindow,
}

impl ExtensionTrigger {
    /// Returns the single-byte wire discriminant.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::UserRequest => 0,
            Self::AutoRenewal => 1,
            Self::GraceWindow => 2,
        }
    }

    /// Returns the string representation for logs and protocol events.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UserRequest => "USER_REQUEST",
            Self::AutoRenewal => "AUTO_RENEWAL",
            Self::GraceWindow => "GRACE_WINDOW",
        }
    }
}

impl TryFrom<u8> for ExtensionTrigger {
    type Error = CanonicalError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::UserRequest),
            1 => Ok(Self::AutoRenewal),
            2 => Ok(Self::GraceWindow),
            _ => Err(CanonicalError::UnknownDiscriminant {
                field: "trigger_code",
                value,
            }),
        }
    }
}

impl std::fmt::Display for ExtensionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of an extension request, as written to the snapshot record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ExtensionResult {
    /// The extension was granted in full.
    Granted,
    /// The extension was denied; the snapshot carries a denial reason.
    Denied,
    /// The extension was granted but clamped to the remaining budget.
    Clamped,
}

impl ExtensionResult {
    /// Returns the single-byte wire discriminant.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Granted => 0,
            Self::Denied => 1,
            Self::Clamped => 2,
        }
    }

    /// Returns the string representation for logs and protocol events.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Granted => "GRANTED",
            Self::Denied => "DENIED",
            Self::Clamped => "CLAMPED",
        }
    }
}

impl TryFrom<u8> for ExtensionResult {
    type Error = CanonicalError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Granted),
            1 => Ok(Self::Denied),
            2 => Ok(Self::Clamped),
            _ => Err(CanonicalError::UnknownDiscriminant {
                field: "result_tag",
                value,
            }),
        }
    }
}

impl std::fmt::Display for ExtensionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
