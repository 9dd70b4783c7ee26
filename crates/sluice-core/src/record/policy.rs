//! Admission policy record, layout `admission-policy-v1`.
//!
//! The policy record is the canonical form of the kernel's active policy
//! configuration. Its digest (see [`crate::crypto::RecordHasher`]) is the
//! `policy_hash` every other record embeds, which pins each decision and
//! snapshot to the exact policy bytes that produced it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canonical::{
    ADMISSION_POLICY_LAYOUT, ADMISSION_POLICY_LAYOUT_VERSION, CanonicalError, CanonicalWriter,
    assert_exact_length, canonical_uuid_bytes, policy_expected_len,
};

/// Number of value-score weights the policy always carries.
pub const VALUE_SCORE_WEIGHT_COUNT: usize = 4;

/// Canonical admission policy configuration.
///
/// Field order below is the wire order of `admission-policy-v1`. Rates are
/// fixed-point integers (millionths or basis points) rather than floats so
/// the encoding never depends on platform float formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionPolicyRecord {
    /// Service tier this policy applies to.
    pub tier_id: u8,
    /// Policy schema version (the value-domain version, distinct from the
    /// layout version byte).
    pub schema_version: u16,
    /// Identifier of the policy profile this configuration was derived
    /// from.
    pub profile_id: Uuid,
    /// Monotonic policy epoch; bumped on every policy rollout.
    pub policy_epoch: u32,
    /// Policy behavior flags, bit-packed.
    pub policy_flags: u32,
    /// Number of soft-limit patches applied on top of the profile.
    pub soft_limit_patch_count: u16,
    /// Number of hard-limit patches applied on top of the profile.
    pub hard_limit_patch_count: u16,
    /// Extension budget granted to a fresh session.
    pub extension_budget_base: u32,
    /// Budget level at which soft-limit handling begins.
    pub extension_budget_soft_threshold: u32,
    /// Budget level at which extensions are refused outright.
    pub extension_budget_hard_threshold: u32,
    /// Hysteresis band around the thresholds.
    pub extension_budget_epsilon: u32,
    /// Maximum extensions a single session may receive.
    pub max_session_extensions: u16,
    /// Fraction of remaining budget grantable per extension, in
    /// millionths.
    pub extension_budget_ratio_millionths: u32,
    /// Cooldown between extensions for one session, in milliseconds.
    pub cooldown_duration_ms: u64,
    /// Throttle accounting window, in milliseconds.
    pub throttle_window_duration_ms: u64,
    /// Maximum admission attempts per throttle window.
    pub throttle_max_attempts: u32,
    /// Token-bucket burst allowance.
    pub throttle_burst_tokens: u32,
    /// Token refill rate, tokens per thousand limiter ticks.
    pub throttle_refill_rate: u32,
    /// Attempt count that trips the retry-storm fuse.
    pub retry_storm_fuse_threshold: u32,
    /// Number of decisions in the rolling cost window.
    pub cost_window_size: u32,
    /// Minimum value score a candidate needs to stay eligible.
    pub min_value_score: u32,
    /// Shed rate once the cost window saturates, in basis points.
    pub shed_rate_saturated_bp: u16,
    /// Shed rate at terminal overload, in basis points.
    pub shed_rate_terminal_bp: u16,
    /// Salt mixed into deterministic candidate selection.
    pub selection_salt: u64,
    /// Identifier of the content-hash algorithm downstream consumers
    /// apply to encoded records.
    pub hash_algorithm_id: u8,
    /// Number of decisions in the eligibility window.
    pub eligibility_window_size: u32,
    /// Minimum score gain for an extension to be worth granting. Signed:
    /// a negative threshold admits regressions up to that magnitude.
    pub min_gain_threshold: i32,
    /// Minimum distinct flow buckets that must stay admissible.
    pub min_diversity: u16,
    /// Maximum share of the cost window one reject reason may hold, in
    /// basis points.
    pub reject_dominance_max_share_bp: u16,
    /// Declared number of flow buckets. Must equal `flow_weights.len()`;
    /// the encoder fails closed if it does not.
    pub flow_bucket_count: u16,
    /// Per-bucket fairness weights.
    pub flow_weights: Vec<u16>,
    /// Maximum extensions chargeable to a single flow bucket.
    pub max_per_flow_extensions: u16,
    /// Duration of one limiter tick, in milliseconds.
    pub limiter_tick_duration_ms: u32,
    /// Weights of the four value-score components.
    pub value_score_weights: [u16; VALUE_SCORE_WEIGHT_COUNT],
    /// Upper bound of the value-score scale.
    pub value_score_max: u32,
}

impl AdmissionPolicyRecord {
    /// Encodes the policy into its canonical byte sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::SizeMismatch`] if `flow_bucket_count`
    /// disagrees with `flow_weights.len()`, or
    /// [`CanonicalError::LengthMismatch`] if the finished buffer misses
    /// the layout's expected length.
    pub fn encode(&self) -> Result<Vec<u8>, CanonicalError> {
        let expected = policy_expected_len(self.flow_bucket_count);
        let mut writer = CanonicalWriter::with_capacity(expected);

        writer.put_u8(ADMISSION_POLICY_LAYOUT_VERSION);
        writer.put_u8(self.tier_id);
        writer.put_u16(self.schema_version);
        writer.put_bytes(&canonical_uuid_bytes(self.profile_id)?);
        writer.put_u32(self.policy_epoch);
        writer.put_u32(self.policy_flags);
        writer.put_u16(self.soft_limit_patch_count);
        writer.put_u16(self.hard_limit_patch_count);
        writer.put_u32(self.extension_budget_base);
        writer.put_u32(self.extension_budget_soft_threshold);
        writer.put_u32(self.extension_budget_hard_threshold);
        writer.put_u32(self.extension_budget_epsilon);
        writer.put_u16(self.max_session_extensions);
        writer.put_u32(self.extension_budget_ratio_millionths);
        writer.put_u64(self.cooldown_duration_ms);
        writer.put_u64(self.throttle_window_duration_ms);
        writer.put_u32(self.throttle_max_attempts);
        writer.put_u32(self.throttle_burst_tokens);
        writer.put_u32(self.throttle_refill_rate);
        writer.put_u32(self.retry_storm_fuse_threshold);
        writer.put_u32(self.cost_window_size);
        writer.put_u32(self.min_value_score);
        writer.put_u16(self.shed_rate_saturated_bp);
        writer.put_u16(self.shed_rate_terminal_bp);
        writer.put_u64(self.selection_salt);
        writer.put_u8(self.hash_algorithm_id);
        writer.put_u32(self.eligibility_window_size);
        writer.put_i32(self.min_gain_threshold);
        writer.put_u16(self.min_diversity);
        writer.put_u16(self.reject_dominance_max_share_bp);
        writer.put_u16(self.flow_bucket_count);
        writer.put_u16_slice(usize::from(self.flow_bucket_count), &self.flow_weights)?;
        writer.put_u16(self.max_per_flow_extensions);
        writer.put_u32(self.limiter_tick_duration_ms);
        for weight in self.value_score_weights {
            writer.put_u16(weight);
        }
        writer.put_u32(self.value_score_max);

        let bytes = writer.finish();
        assert_exact_length(bytes.len(), expected, ADMISSION_POLICY_LAYOUT)?;
        Ok(bytes)
    }
}
