//! Decision hash input record, layout `decision-input-v1`.
//!
//! This is the record whose digest becomes the decision's identity and
//! idempotency key, so it carries everything that distinguishes one
//! decision from another: policy hash, stable ids, classification, the
//! optional reason codes, the per-flow counter array, and the optional
//! throttle statistics.
//!
//! The per-flow counters are written element-by-element without consulting
//! the declared `flow_bucket_count`; a count that disagrees with the array
//! surfaces as a canonical length mismatch at the final assertion rather
//! than a writer-level size error. Tampering with the count without
//! touching the array therefore cannot produce valid bytes.

use serde::{Deserialize, Serialize};

use crate::canonical::{
    CanonicalError, CanonicalWriter, DECISION_INPUT_LAYOUT, DECISION_INPUT_LAYOUT_VERSION,
    DecisionCardinality, assert_exact_length, decision_input_expected_len,
};

use super::{DecisionClass, POLICY_HASH_LEN, PRESENCE_ABSENT, PRESENCE_PRESENT};

/// Throttle counters captured at decision time; 16 bytes on the wire when
/// present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleStats {
    /// Limiter tick at which the current throttle window opened.
    pub window_start_tick: u64,
    /// Length of the throttle window, in milliseconds.
    pub window_duration_ms: u32,
    /// Admission attempts observed inside the window.
    pub attempts_in_window: u32,
}

/// Canonical input to the decision hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionHashInputRecord {
    /// Version of the decision value schema (distinct from the layout
    /// version byte).
    pub decision_schema_version: u32,
    /// Prefix of the digest of the policy that produced the decision.
    pub policy_hash: [u8; POLICY_HASH_LEN],
    /// Stable identity of the session, derived from the identity record
    /// digest.
    pub session_stable_id: u64,
    /// Stable identity of the candidate, derived from the identity record
    /// digest.
    pub candidate_stable_id: u64,
    /// Decision classification.
    pub classification: DecisionClass,
    /// Reject reason code; `None` unless the candidate was rejected.
    pub reject_reason: Option<u8>,
    /// Shed decision value; `None` when no shed evaluation ran.
    pub shed_decision: Option<u8>,
    /// Shed reason code; `None` unless shedding supplied one.
    pub shed_reason: Option<u8>,
    /// Degradation level in force at decision time.
    pub degradation_level: u8,
    /// Degradation reason code; `None` at level zero.
    pub degradation_reason_code: Option<u8>,
    /// Candidate value score on the policy's score scale.
    pub value_score: u64,
    /// Declared number of per-flow counters. Must equal
    /// `per_flow_counters.len()`; skew fails the length assertion.
    pub flow_bucket_count: u32,
    /// Per-flow-bucket admission counters.
    pub per_flow_counters: Vec<u16>,
    /// Throttle statistics; `None` when the limiter was idle.
    pub throttle_stats: Option<ThrottleStats>,
}

impl DecisionHashInputRecord {
    /// Starts an incremental builder for the record.
    #[must_use]
    pub fn builder() -> DecisionInputBuilder {
        DecisionInputBuilder::new()
    }

    /// The cardinality inputs that determine this record's encoded length.
    #[must_use]
    pub const fn cardinality(&self) -> DecisionCardinality {
        DecisionCardinality {
            reject_reason_present: self.reject_reason.is_some(),
            shed_decision_present: self.shed_decision.is_some(),
            shed_reason_present: self.shed_reason.is_some(),
            degradation_reason_present: self.degradation_reason_code.is_some(),
            flow_bucket_count: self.flow_bucket_count,
            throttle_stats_present: self.throttle_stats.is_some(),
        }
    }

    /// Encodes the record into its canonical byte sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::LengthMismatch`] if the finished buffer
    /// misses the layout's expected length, in particular when
    /// `flow_bucket_count` disagrees with `per_flow_counters.len()`.
    pub fn encode(&self) -> Result<Vec<u8>, CanonicalError> {
        let expected = decision_input_expected_len(&self.cardinality());
        let mut writer = CanonicalWriter::with_capacity(expected);

        writer.put_u8(DECISION_INPUT_LAYOUT_VERSION);
        writer.put_u32(self.decision_schema_version);
        writer.put_bytes(&self.policy_hash);
        writer.put_u64(self.session_stable_id);
        writer.put_u64(self.candidate_stable_id);
        writer.put_u8(self.classification.as_u8());
        put_optional_u8(&mut writer, self.reject_reason);
        put_optional_u8(&mut writer, self.shed_decision);
        put_optional_u8(&mut writer, self.shed_reason);
        writer.put_u8(self.degradation_level);
        put_optional_u8(&mut writer, self.degradation_reason_code);
        writer.put_u64(self.value_score);
        writer.put_u32(self.flow_bucket_count);
        for counter in &self.per_flow_counters {
            writer.put_u16(*counter);
        }
        match self.throttle_stats {
            Some(stats) => {
                writer.put_u8(PRESENCE_PRESENT);
                writer.put_u64(stats.window_start_tick);
                writer.put_u32(stats.window_duration_ms);
                writer.put_u32(stats.attempts_in_window);
            }
            None => writer.put_u8(PRESENCE_ABSENT),
        }

        let bytes = writer.finish();
        assert_exact_length(bytes.len(), expected, DECISION_INPUT_LAYOUT)?;
        Ok(bytes)
    }
}

/// Writes a presence tag and, when present, the single payload byte.
fn put_optional_u8(writer: &mut CanonicalWriter, value: Option<u8>) {
    match value {
        Some(payload) => {
            writer.put_u8(PRESENCE_PRESENT);
            writer.put_u8(payload);
        }
        None => writer.put_u8(PRESENCE_ABSENT),
    }
}

/// Incremental builder for [`DecisionHashInputRecord`].
///
/// Every mandatory field must be set before [`build`](Self::build); the
/// first gap found fails the build with
/// [`CanonicalError::MissingField`].
#[derive(Debug, Default, Clone)]
pub struct DecisionInputBuilder {
    decision_schema_version: Option<u32>,
    policy_hash: Option<[u8; POLICY_HASH_LEN]>,
    session_stable_id: Option<u64>,
    candidate_stable_id: Option<u64>,
    classification: Option<DecisionClass>,
    reject_reason: Option<u8>,
    shed_decision: Option<u8>,
    shed_reason: Option<u8>,
    degradation_level: Option<u8>,
    degradation_reason_code: Option<u8>,
    value_score: Option<u64>,
    flow_bucket_count: Option<u32>,
    per_flow_counters: Option<Vec<u16>>,
    throttle_stats: Option<ThrottleStats>,
}

impl DecisionInputBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the decision value-schema version.
    #[must_use]
    pub fn decision_schema_version(mut self, version: u32) -> Self {
        self.decision_schema_version = Some(version);
        self
    }

    /// Sets the policy hash prefix.
    #[must_use]
    pub fn policy_hash(mut self, policy_hash: [u8; POLICY_HASH_LEN]) -> Self {
        self.policy_hash = Some(policy_hash);
        self
    }

    /// Sets the session stable id.
    #[must_use]
    pub fn session_stable_id(mut self, id: u64) -> Self {
        self.session_stable_id = Some(id);
        self
    }

    /// Sets the candidate stable id.
    #[must_use]
    pub fn candidate_stable_id(mut self, id: u64) -> Self {
        self.candidate_stable_id = Some(id);
        self
    }

    /// Sets the decision classification.
    #[must_use]
    pub fn classification(mut self, classification: DecisionClass) -> Self {
        self.classification = Some(classification);
        self
    }

    /// Sets the optional reject reason code.
    #[must_use]
    pub fn reject_reason(mut self, reason: u8) -> Self {
        self.reject_reason = Some(reason);
        self
    }

    /// Sets the optional shed decision value.
    #[must_use]
    pub fn shed_decision(mut self, decision: u8) -> Self {
        self.shed_decision = Some(decision);
        self
    }

    /// Sets the optional shed reason code.
    #[must_use]
    pub fn shed_reason(mut self, reason: u8) -> Self {
        self.shed_reason = Some(reason);
        self
    }

    /// Sets the degradation level.
    #[must_use]
    pub fn degradation_level(mut self, level: u8) -> Self {
        self.degradation_level = Some(level);
        self
    }

    /// Sets the optional degradation reason code.
    #[must_use]
    pub fn degradation_reason_code(mut self, code: u8) -> Self {
        self.degradation_reason_code = Some(code);
        self
    }

    /// Sets the value score.
    #[must_use]
    pub fn value_score(mut self, score: u64) -> Self {
        self.value_score = Some(score);
        self
    }

    /// Sets the declared flow-bucket count and the counter array.
    ///
    /// The two are taken as given; a disagreement between them fails the
    /// eventual encode, not the build.
    #[must_use]
    pub fn flow_counters(mut self, flow_bucket_count: u32, counters: Vec<u16>) -> Self {
        self.flow_bucket_count = Some(flow_bucket_count);
        self.per_flow_counters = Some(counters);
        self
    }

    /// Sets the optional throttle statistics.
    #[must_use]
    pub fn throttle_stats(mut self, stats: ThrottleStats) -> Self {
        self.throttle_stats = Some(stats);
        self
    }

    /// Finalizes the record.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::MissingField`] naming the first mandatory
    /// field that was never set.
    pub fn build(self) -> Result<DecisionHashInputRecord, CanonicalError> {
        Ok(DecisionHashInputRecord {
            decision_schema_version: self
                .decision_schema_version
                .ok_or(CanonicalError::MissingField("decision_schema_version"))?,
            policy_hash: self
                .policy_hash
                .ok_or(CanonicalError::MissingField("policy_hash"))?,
            session_stable_id: self
                .session_stable_id
                .ok_or(CanonicalError::MissingField("session_stable_id"))?,
            candidate_stable_id: self
                .candidate_stable_id
                .ok_or(CanonicalError::MissingField("candidate_stable_id"))?,
            classification: self
                .classification
                .ok_or(CanonicalError::MissingField("classification"))?,
            reject_reason: self.reject_reason,
            shed_decision: self.shed_decision,
            shed_reason: self.shed_reason,
            degradation_level: self
                .degradation_level
                .ok_or(CanonicalError::MissingField("degradation_level"))?,
            degradation_reason_code: self.degradation_reason_code,
            value_score: self
                .value_score
                .ok_or(CanonicalError::MissingField("value_score"))?,
            flow_bucket_count: self
                .flow_bucket_count
                .ok_or(CanonicalError::MissingField("flow_bucket_count"))?,
            per_flow_counters: self
                .per_flow_counters
                .ok_or(CanonicalError::MissingField("per_flow_counters"))?,
            throttle_stats: self.throttle_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// The worked example: three counters, shed-decision present with
    /// value 1, every other optional absent.
    fn worked_example() -> DecisionHashInputRecord {
        DecisionHashInputRecord {
            decision_schema_version: 2,
            policy_hash: [0xC0, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7],
            session_stable_id: 0x1111_2222_3333_4444,
            candidate_stable_id: 0x5555_6666_7777_8888,
            classification: DecisionClass::Shed,
            reject_reason: None,
            shed_decision: Some(1),
            shed_reason: None,
            degradation_level: 0,
            degradation_reason_code: None,
            value_score: 640,
            flow_bucket_count: 3,
            per_flow_counters: vec![10, 20, 30],
            throttle_stats: None,
        }
    }

    #[test]
    fn test_worked_example_is_55_bytes() {
        let bytes = worked_example().encode().unwrap();
        assert_eq!(bytes.len(), 55);
    }

    #[test]
    fn test_worked_example_golden_layout() {
        let record = worked_example();
        let bytes = record.encode().unwrap();

        assert_eq!(bytes[0], DECISION_INPUT_LAYOUT_VERSION);
        assert_eq!(&bytes[1..5], &2u32.to_be_bytes());
        assert_eq!(&bytes[5..13], &record.policy_hash);
        assert_eq!(&bytes[13..21], &0x1111_2222_3333_4444u64.to_be_bytes());
        assert_eq!(&bytes[21..29], &0x5555_6666_7777_8888u64.to_be_bytes());
        assert_eq!(bytes[29], DecisionClass::Shed.as_u8());
        assert_eq!(bytes[30], PRESENCE_ABSENT); // reject_reason
        assert_eq!(bytes[31], PRESENCE_PRESENT); // shed_decision
        assert_eq!(bytes[32], 1); // shed_decision payload
        assert_eq!(bytes[33], PRESENCE_ABSENT); // shed_reason
        assert_eq!(bytes[34], 0); // degradation_level
        assert_eq!(bytes[35], PRESENCE_ABSENT); // degradation_reason_code
        assert_eq!(&bytes[36..44], &640u64.to_be_bytes());
        assert_eq!(&bytes[44..48], &3u32.to_be_bytes());
        assert_eq!(&bytes[48..54], &[0, 10, 0, 20, 0, 30]);
        assert_eq!(bytes[54], PRESENCE_ABSENT); // throttle_stats
    }

    #[test]
    fn test_count_tamper_raises_length_mismatch() {
        let mut record = worked_example();
        record.flow_bucket_count = 4; // counters still hold 3 entries
        let err = record.encode().unwrap_err();
        assert_eq!(
            err,
            CanonicalError::LengthMismatch {
                layout: DECISION_INPUT_LAYOUT,
                expected: 57,
                actual: 55,
            }
        );
    }

    #[test]
    fn test_throttle_stats_payload_is_16_bytes() {
        let mut record = worked_example();
        record.throttle_stats = Some(ThrottleStats {
            window_start_tick: 0x0102_0304_0506_0708,
            window_duration_ms: 60_000,
            attempts_in_window: 17,
        });
        let bytes = record.encode().unwrap();
        assert_eq!(bytes.len(), 55 + 16);
        assert_eq!(bytes[54], PRESENCE_PRESENT);
        assert_eq!(&bytes[55..63], &0x0102_0304_0506_0708u64.to_be_bytes());
        assert_eq!(&bytes[63..67], &60_000u32.to_be_bytes());
        assert_eq!(&bytes[67..71], &17u32.to_be_bytes());
    }

    #[test]
    fn test_presence_minimality() {
        let absent = worked_example();
        let mut present = worked_example();
        present.reject_reason = Some(0x07);

        let absent_bytes = absent.encode().unwrap();
        let present_bytes = present.encode().unwrap();
        assert_eq!(present_bytes.len(), absent_bytes.len() + 1);
        // Everything before the reject tag agrees.
        assert_eq!(&present_bytes[..30], &absent_bytes[..30]);
        assert_eq!(present_bytes[30], PRESENCE_PRESENT);
        assert_eq!(present_bytes[31], 0x07);
        // Everything after the injected payload agrees again.
        assert_eq!(&present_bytes[32..], &absent_bytes[31..]);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let record = worked_example();
        assert_eq!(record.encode().unwrap(), record.encode().unwrap());
    }

    #[test]
    fn test_builder_builds_worked_example() {
        let record = DecisionHashInputRecord::builder()
            .decision_schema_version(2)
            .policy_hash([0xC0, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7])
            .session_stable_id(0x1111_2222_3333_4444)
            .candidate_stable_id(0x5555_6666_7777_8888)
            .classification(DecisionClass::Shed)
            .shed_decision(1)
            .degradation_level(0)
            .value_score(640)
            .flow_counters(3, vec![10, 20, 30])
            .build()
            .unwrap();
        assert_eq!(record, worked_example());
    }

    #[test]
    fn test_builder_missing_field_fails_closed() {
        let err = DecisionInputBuilder::new()
            .decision_schema_version(2)
            .build()
            .unwrap_err();
        assert_eq!(err, CanonicalError::MissingField("policy_hash"));
    }

    proptest! {
        #[test]
        fn prop_length_contract_holds_for_valid_records(
            counters in proptest::collection::vec(any::<u16>(), 0..64),
            reject in proptest::option::of(any::<u8>()),
            shed_decision in proptest::option::of(any::<u8>()),
            shed_reason in proptest::option::of(any::<u8>()),
            degradation in proptest::option::of(any::<u8>()),
            throttle in any::<bool>(),
        ) {
            let mut record = worked_example();
            record.flow_bucket_count = counters.len() as u32;
            record.per_flow_counters = counters;
            record.reject_reason = reject;
            record.shed_decision = shed_decision;
            record.shed_reason = shed_reason;
            record.degradation_reason_code = degradation;
            record.throttle_stats = throttle.then_some(ThrottleStats {
                window_start_tick: 1,
                window_duration_ms: 2,
                attempts_in_window: 3,
            });

            let bytes = record.encode().unwrap();
            prop_assert_eq!(
                bytes.len(),
                decision_input_expected_len(&record.cardinality())
            );
        }

        #[test]
        fn prop_count_skew_never_encodes(extra in 1u32..8) {
            let mut record = worked_example();
            record.flow_bucket_count += extra;
            let is_length_mismatch = matches!(
                record.encode(),
                Err(CanonicalError::LengthMismatch { .. })
            );
            prop_assert!(is_length_mismatch);
        }
    }
}
