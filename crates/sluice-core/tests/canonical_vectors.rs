//! End-to-end canonical encoding vectors.
//!
//! Exercises the full pipeline the kernel runs per decision: encode the
//! policy, derive its hash, thread that hash through identity, snapshot,
//! and decision records, and derive the idempotency key. Then tamper
//! with cardinality inputs and check every path fails closed.

use uuid::Uuid;

use sluice_core::canonical::{
    CanonicalError, DECISION_INPUT_LAYOUT, decision_input_expected_len,
};
use sluice_core::crypto::RecordHasher;
use sluice_core::record::{
    AdmissionPolicyRecord, CandidateIdentityRecord, CandidateKind, DecisionClass,
    DecisionHashInputRecord, ExtensionResult, ExtensionSnapshotRecord, ExtensionTrigger,
};

fn fixture_policy() -> AdmissionPolicyRecord {
    AdmissionPolicyRecord {
        tier_id: 3,
        schema_version: 2,
        profile_id: Uuid::from_u128(0x00AA_00BB_00CC_00DD_00EE_00FF_0011_0022),
        policy_epoch: 17,
        policy_flags: 0x0000_0005,
        soft_limit_patch_count: 2,
        hard_limit_patch_count: 1,
        extension_budget_base: 200_000,
        extension_budget_soft_threshold: 50_000,
        extension_budget_hard_threshold: 10_000,
        extension_budget_epsilon: 1_000,
        max_session_extensions: 8,
        extension_budget_ratio_millionths: 125_000,
        cooldown_duration_ms: 45_000,
        throttle_window_duration_ms: 120_000,
        throttle_max_attempts: 60,
        throttle_burst_tokens: 12,
        throttle_refill_rate: 250,
        retry_storm_fuse_threshold: 40,
        cost_window_size: 512,
        min_value_score: 75,
        shed_rate_saturated_bp: 3_000,
        shed_rate_terminal_bp: 9_500,
        selection_salt: 0x0123_4567_89AB_CDEF,
        hash_algorithm_id: 1,
        eligibility_window_size: 128,
        min_gain_threshold: -10,
        min_diversity: 4,
        reject_dominance_max_share_bp: 3_500,
        flow_bucket_count: 4,
        flow_weights: vec![10, 20, 30, 40],
        max_per_flow_extensions: 3,
        limiter_tick_duration_ms: 25,
        value_score_weights: [4, 3, 2, 1],
        value_score_max: 1_000,
    }
}

#[test]
fn policy_hash_threads_through_the_full_pipeline() {
    let policy = fixture_policy();
    let policy_hash = RecordHasher::policy_hash(&policy).unwrap();

    let identity = CandidateIdentityRecord {
        session_source_id: Uuid::from_u128(0x1234),
        candidate_id: Uuid::from_u128(0x5678),
        policy_hash,
        candidate_kind: CandidateKind::Interactive,
    };
    let session_identity = CandidateIdentityRecord {
        candidate_id: identity.session_source_id,
        ..identity
    };
    let session_stable_id = RecordHasher::stable_id(&session_identity).unwrap();
    let candidate_stable_id = RecordHasher::stable_id(&identity).unwrap();
    assert_ne!(session_stable_id, candidate_stable_id);

    let snapshot = ExtensionSnapshotRecord::builder()
        .extension_request_id(Uuid::from_u128(0x9ABC))
        .trigger(ExtensionTrigger::GraceWindow)
        .tier_id(policy.tier_id)
        .schema_version(policy.schema_version)
        .policy_hash(policy_hash)
        .extension_count(2)
        .result(ExtensionResult::Clamped)
        .budget(200_000, 12_500, 37_500)
        .build()
        .unwrap();
    assert_eq!(snapshot.encode().unwrap().len(), 61);

    let decision = DecisionHashInputRecord::builder()
        .decision_schema_version(2)
        .policy_hash(policy_hash)
        .session_stable_id(session_stable_id)
        .candidate_stable_id(candidate_stable_id)
        .classification(DecisionClass::Admit)
        .degradation_level(1)
        .degradation_reason_code(3)
        .value_score(420)
        .flow_counters(4, vec![1, 2, 3, 4])
        .build()
        .unwrap();

    let bytes = decision.encode().unwrap();
    assert_eq!(bytes.len(), decision_input_expected_len(&decision.cardinality()));
    // The policy hash sits right after the version byte and schema version.
    assert_eq!(&bytes[5..13], &policy_hash);

    let key = RecordHasher::idempotency_key(&decision).unwrap();
    assert_eq!(key, RecordHasher::idempotency_key(&decision).unwrap());
}

#[test]
fn worked_example_is_55_bytes_and_tamper_fails_closed() {
    let decision = DecisionHashInputRecord::builder()
        .decision_schema_version(1)
        .policy_hash([0xC0, 0xC1, 0xC2, 0xC3, 0xC4, 0xC5, 0xC6, 0xC7])
        .session_stable_id(11)
        .candidate_stable_id(12)
        .classification(DecisionClass::Shed)
        .shed_decision(1)
        .degradation_level(0)
        .value_score(0)
        .flow_counters(3, vec![10, 20, 30])
        .build()
        .unwrap();

    assert_eq!(decision.encode().unwrap().len(), 55);

    let mut tampered = decision.clone();
    tampered.flow_bucket_count = 4;
    match tampered.encode().unwrap_err() {
        CanonicalError::LengthMismatch {
            layout,
            expected,
            actual,
        } => {
            assert_eq!(layout, DECISION_INPUT_LAYOUT);
            assert_eq!(expected, 57);
            assert_eq!(actual, 55);
        }
        other => panic!("expected length mismatch, got {other}"),
    }

    // Tampering must also abort key derivation; nothing is hashed.
    assert!(RecordHasher::idempotency_key(&tampered).is_err());
}

#[test]
fn same_logical_values_yield_identical_bytes_and_digests() {
    let first = fixture_policy();
    let second = fixture_policy();

    assert_eq!(first.encode().unwrap(), second.encode().unwrap());
    assert_eq!(
        RecordHasher::policy_hash(&first).unwrap(),
        RecordHasher::policy_hash(&second).unwrap()
    );
}

#[test]
fn any_single_field_change_moves_the_policy_hash() {
    let base_hash = RecordHasher::policy_hash(&fixture_policy()).unwrap();

    let mut salted = fixture_policy();
    salted.selection_salt ^= 1;
    assert_ne!(base_hash, RecordHasher::policy_hash(&salted).unwrap());

    let mut reweighted = fixture_policy();
    reweighted.flow_weights[3] += 1;
    assert_ne!(base_hash, RecordHasher::policy_hash(&reweighted).unwrap());

    let mut regraded = fixture_policy();
    regraded.min_gain_threshold = 10;
    assert_ne!(base_hash, RecordHasher::policy_hash(&regraded).unwrap());
}
