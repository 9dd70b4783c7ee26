//! Extension snapshot record, layout `extension-snapshot-v1`.
//!
//! Snapshots pin the budget arithmetic of a single extension request so the
//! grant (or denial) can be audited and replayed byte-for-byte. The
//! denial reason is the layout's one optional field: present only when the
//! result is a denial, absent otherwise, with no placeholder bytes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::canonical::{
    CanonicalError, CanonicalWriter, EXTENSION_SNAPSHOT_LAYOUT,
    EXTENSION_SNAPSHOT_LAYOUT_VERSION, assert_exact_length, canonical_uuid_bytes,
    extension_snapshot_expected_len,
};

use super::{ExtensionResult, ExtensionTrigger, POLICY_HASH_LEN, PRESENCE_ABSENT, PRESENCE_PRESENT};

/// Reserved tail bytes, zero-filled on the wire.
const RESERVED_LEN: usize = 4;

/// Canonical snapshot of one extension request's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSnapshotRecord {
    /// Identifier of the extension request.
    pub extension_request_id: Uuid,
    /// What triggered the request.
    pub trigger: ExtensionTrigger,
    /// Service tier the session runs under.
    pub tier_id: u8,
    /// Policy schema version in force when the snapshot was taken.
    pub schema_version: u16,
    /// Prefix of the digest of the policy the budget math ran against.
    pub policy_hash: [u8; POLICY_HASH_LEN],
    /// How many extensions the session had received before this one.
    pub extension_count: u16,
    /// Outcome of the request.
    pub result: ExtensionResult,
    /// Denial reason code; `None` unless the request was denied.
    pub denial_reason: Option<u8>,
    /// Budget ceiling in force for the session.
    pub budget_ceiling: u64,
    /// Budget added by this extension (zero on denial).
    pub budget_added: u64,
    /// Budget remaining after the request settled.
    pub budget_new_remaining: u64,
}

impl ExtensionSnapshotRecord {
    /// Starts an incremental builder for the snapshot.
    #[must_use]
    pub fn builder() -> ExtensionSnapshotBuilder {
        ExtensionSnapshotBuilder::new()
    }

    /// Encodes the snapshot into its canonical byte sequence.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::LengthMismatch`] if the finished buffer
    /// misses the layout's expected length, or a UUID canonicalization
    /// error from the defensive extraction check.
    pub fn encode(&self) -> Result<Vec<u8>, CanonicalError> {
        let expected = extension_snapshot_expected_len(self.denial_reason.is_some());
        let mut writer = CanonicalWriter::with_capacity(expected);

        writer.put_u8(EXTENSION_SNAPSHOT_LAYOUT_VERSION);
        writer.put_bytes(&canonical_uuid_bytes(self.extension_request_id)?);
        writer.put_u8(self.trigger.as_u8());
        writer.put_u8(self.tier_id);
        writer.put_u16(self.schema_version);
        writer.put_bytes(&self.policy_hash);
        writer.put_u16(self.extension_count);
        writer.put_u8(self.result.as_u8());
        match self.denial_reason {
            Some(reason) => {
                writer.put_u8(PRESENCE_PRESENT);
                writer.put_u8(reason);
            }
            None => writer.put_u8(PRESENCE_ABSENT),
        }
        writer.put_u64(self.budget_ceiling);
        writer.put_u64(self.budget_added);
        writer.put_u64(self.budget_new_remaining);
        writer.put_zeros(RESERVED_LEN);

        let bytes = writer.finish();
        assert_exact_length(bytes.len(), expected, EXTENSION_SNAPSHOT_LAYOUT)?;
        Ok(bytes)
    }
}

/// Incremental builder for [`ExtensionSnapshotRecord`].
///
/// Every mandatory field must be set before [`build`](Self::build); the
/// first gap found fails the build with
/// [`CanonicalError::MissingField`].
#[derive(Debug, Default, Clone)]
pub struct ExtensionSnapshotBuilder {
    extension_request_id: Option<Uuid>,
    trigger: Option<ExtensionTrigger>,
    tier_id: Option<u8>,
    schema_version: Option<u16>,
    policy_hash: Option<[u8; POLICY_HASH_LEN]>,
    extension_count: Option<u16>,
    result: Option<ExtensionResult>,
    denial_reason: Option<u8>,
    budget_ceiling: Option<u64>,
    budget_added: Option<u64>,
    budget_new_remaining: Option<u64>,
}

impl ExtensionSnapshotBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the extension request identifier.
    #[must_use]
    pub fn extension_request_id(mut self, id: Uuid) -> Self {
        self.extension_request_id = Some(id);
        self
    }

    /// Sets the request trigger.
    #[must_use]
    pub fn trigger(mut self, trigger: ExtensionTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Sets the service tier.
    #[must_use]
    pub fn tier_id(mut self, tier_id: u8) -> Self {
        self.tier_id = Some(tier_id);
        self
    }

    /// Sets the policy schema version.
    #[must_use]
    pub fn schema_version(mut self, schema_version: u16) -> Self {
        self.schema_version = Some(schema_version);
        self
    }

    /// Sets the policy hash prefix.
    #[must_use]
    pub fn policy_hash(mut self, policy_hash: [u8; POLICY_HASH_LEN]) -> Self {
        self.policy_hash = Some(policy_hash);
        self
    }

    /// Sets the prior extension count.
    #[must_use]
    pub fn extension_count(mut self, extension_count: u16) -> Self {
        self.extension_count = Some(extension_count);
        self
    }

    /// Sets the request outcome.
    #[must_use]
    pub fn result(mut self, result: ExtensionResult) -> Self {
        self.result = Some(result);
        self
    }

    /// Sets the optional denial reason code.
    #[must_use]
    pub fn denial_reason(mut self, reason: u8) -> Self {
        self.denial_reason = Some(reason);
        self
    }

    /// Sets the three budget fields in one call.
    #[must_use]
    pub fn budget(mut self, ceiling: u64, added: u64, new_remaining: u64) -> Self {
        self.budget_ceiling = Some(ceiling);
        self.budget_added = Some(added);
        self.budget_new_remaining = Some(new_remaining);
        self
    }

    /// Finalizes the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CanonicalError::MissingField`] naming the first mandatory
    /// field that was never set.
    pub fn build(self) -> Result<ExtensionSnapshotRecord, CanonicalError> {
        Ok(ExtensionSnapshotRecord {
            extension_request_id: self
                .extension_request_id
                .ok_or(CanonicalError::MissingField("extension_request_id"))?,
            trigger: self.trigger.ok_or(CanonicalError::MissingField("trigger"))?,
            tier_id: self.tier_id.ok_or(CanonicalError::MissingField("tier_id"))?,
            schema_version: self
                .schema_version
                .ok_or(CanonicalError::MissingField("schema_version"))?,
            policy_hash: self
                .policy_hash
                .ok_or(CanonicalError::MissingField("policy_hash"))?,
            extension_count: self
                .extension_count
                .ok_or(CanonicalError::MissingField("extension_count"))?,
            result: self.result.ok_or(CanonicalError::MissingField("result"))?,
            denial_reason: self.denial_reason,
            budget_ceiling: self
                .budget_ceiling
                .ok_or(CanonicalError::MissingField("budget_ceiling"))?,
            budget_added: self
                .budget_added
                .ok_or(CanonicalError::MissingField("budget_added"))?,
            budget_new_remaining: self
                .budget_new_remaining
                .ok_or(CanonicalError::MissingField("budget_new_remaining"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> ExtensionSnapshotRecord {
        ExtensionSnapshotRecord {
            extension_request_id: Uuid::from_u128(0x2021_2223_2425_2627_2829_2A2B_2C2D_2E2F),
            trigger: ExtensionTrigger::UserRequest,
            tier_id: 1,
            schema_version: 3,
            policy_hash: [0xB0, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5, 0xB6, 0xB7],
            extension_count: 4,
            result: ExtensionResult::Granted,
            denial_reason: None,
            budget_ceiling: 500_000,
            budget_added: 50_000,
            budget_new_remaining: 130_000,
        }
    }

    #[test]
    fn test_encode_without_denial_is_61_bytes() {
        let bytes = sample_snapshot().encode().unwrap();
        assert_eq!(bytes.len(), 61);
    }

    #[test]
    fn test_encode_with_denial_is_62_bytes() {
        let mut snapshot = sample_snapshot();
        snapshot.result = ExtensionResult::Denied;
        snapshot.denial_reason = Some(0x42);
        let bytes = snapshot.encode().unwrap();
        assert_eq!(bytes.len(), 62);
        assert_eq!(bytes[32], PRESENCE_PRESENT);
        assert_eq!(bytes[33], 0x42);
    }

    #[test]
    fn test_absent_denial_leaves_no_placeholder() {
        let absent = sample_snapshot().encode().unwrap();
        assert_eq!(absent[32], PRESENCE_ABSENT);
        // The next byte is already the budget ceiling's high byte, not a
        // zero-filled payload slot.
        assert_eq!(&absent[33..41], &500_000u64.to_be_bytes());
    }

    #[test]
    fn test_encode_golden_layout() {
        let snapshot = sample_snapshot();
        let bytes = snapshot.encode().unwrap();

        assert_eq!(bytes[0], EXTENSION_SNAPSHOT_LAYOUT_VERSION);
        assert_eq!(&bytes[1..17], snapshot.extension_request_id.as_bytes());
        assert_eq!(bytes[17], ExtensionTrigger::UserRequest.as_u8());
        assert_eq!(bytes[18], 1); // tier_id
        assert_eq!(&bytes[19..21], &3u16.to_be_bytes());
        assert_eq!(&bytes[21..29], &snapshot.policy_hash);
        assert_eq!(&bytes[29..31], &4u16.to_be_bytes());
        assert_eq!(bytes[31], ExtensionResult::Granted.as_u8());
        assert_eq!(&bytes[41..49], &50_000u64.to_be_bytes());
        assert_eq!(&bytes[49..57], &130_000u64.to_be_bytes());
        assert_eq!(&bytes[57..61], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_builder_builds_complete_record() {
        let snapshot = ExtensionSnapshotRecord::builder()
            .extension_request_id(sample_snapshot().extension_request_id)
            .trigger(ExtensionTrigger::UserRequest)
            .tier_id(1)
            .schema_version(3)
            .policy_hash(sample_snapshot().policy_hash)
            .extension_count(4)
            .result(ExtensionResult::Granted)
            .budget(500_000, 50_000, 130_000)
            .build()
            .unwrap();
        assert_eq!(snapshot, sample_snapshot());
    }

    #[test]
    fn test_builder_missing_field_fails_closed() {
        let err = ExtensionSnapshotRecord::builder()
            .trigger(ExtensionTrigger::AutoRenewal)
            .build()
            .unwrap_err();
        assert_eq!(err, CanonicalError::MissingField("extension_request_id"));
    }

    #[test]
    fn test_denied_snapshot_roundtrips_via_serde() {
        let mut snapshot = sample_snapshot();
        snapshot.result = ExtensionResult::Denied;
        snapshot.denial_reason = Some(9);
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: ExtensionSnapshotRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.encode().unwrap(), snapshot.encode().unwrap());
    }
}
