//! In-memory OTP store
//!
//! Maps an identifier to at most one [`OtpRecord`]. The store owns its lock and
//! every mutating operation runs its read-check-mutate-delete sequence under a
//! single write-lock acquisition, so two verifications for the same identifier
//! can never interleave. Writes are crate-private: records only change through
//! the issue/verify paths of [`OtpService`](super::OtpService) and the reaper.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use otp_shared::phone::mask_phone_number;

use crate::domain::entities::otp_record::OtpRecord;

use super::types::VerifyOutcome;

/// Sanitized view of one record, safe to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSnapshot {
    /// Masked identifier
    pub identifier: String,
    /// First 16 hex chars of the digest
    pub hash_preview: String,
    /// Expiry instant
    pub expires_at: DateTime<Utc>,
    /// Failed attempts so far
    pub attempts: u32,
}

/// Process-local OTP record set
#[derive(Debug, Default)]
pub struct OtpStore {
    records: RwLock<HashMap<String, OtpRecord>>,
}

impl OtpStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, replacing any outstanding one for the identifier
    ///
    /// Returns the replaced record, if any.
    pub(crate) async fn insert(&self, identifier: &str, record: OtpRecord) -> Option<OtpRecord> {
        self.records
            .write()
            .await
            .insert(identifier.to_string(), record)
    }

    /// Run the verification state machine for one identifier
    ///
    /// Checks are evaluated in order and the first match wins:
    /// 1. no record -> `NotFound`
    /// 2. missing/empty candidate -> `BadRequest`
    /// 3. expired -> remove, `Expired`
    /// 4. attempt ceiling already reached -> remove, `TooManyAttempts`
    /// 5. digest match -> remove, `Success`; otherwise count the failure and
    ///    either remove with `TooManyAttempts` or report `IncorrectCode`
    pub(crate) async fn verify(
        &self,
        identifier: &str,
        candidate: Option<&str>,
        now: DateTime<Utc>,
        max_attempts: u32,
    ) -> VerifyOutcome {
        let mut records = self.records.write().await;

        let Some(record) = records.get_mut(identifier) else {
            return VerifyOutcome::NotFound;
        };

        let candidate = match candidate {
            Some(code) if !code.is_empty() => code,
            _ => return VerifyOutcome::BadRequest,
        };

        if record.is_expired_at(now) {
            records.remove(identifier);
            return VerifyOutcome::Expired;
        }

        // Unreachable through the branch below, which removes on the ceiling;
        // kept so a record that somehow reached it is still consumed.
        if record.is_exhausted(max_attempts) {
            records.remove(identifier);
            return VerifyOutcome::TooManyAttempts;
        }

        if record.matches(candidate) {
            records.remove(identifier);
            return VerifyOutcome::Success;
        }

        record.record_failure();
        if record.is_exhausted(max_attempts) {
            records.remove(identifier);
            return VerifyOutcome::TooManyAttempts;
        }

        VerifyOutcome::IncorrectCode {
            remaining_attempts: record.remaining_attempts(max_attempts),
        }
    }

    /// Remove every record that has expired at `now`
    ///
    /// Returns the number of records removed.
    pub(crate) async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired_at(now));
        before - records.len()
    }

    /// Whether an identifier currently has a record (expired or not)
    pub async fn contains(&self, identifier: &str) -> bool {
        self.records.read().await.contains_key(identifier)
    }

    /// Failed attempts recorded for an identifier
    pub async fn attempts(&self, identifier: &str) -> Option<u32> {
        self.records
            .read()
            .await
            .get(identifier)
            .map(|record| record.attempts)
    }

    /// Number of records held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Sanitized snapshot of all records, sorted by masked identifier
    pub async fn snapshot(&self) -> Vec<RecordSnapshot> {
        let records = self.records.read().await;
        let mut snapshot: Vec<RecordSnapshot> = records
            .iter()
            .map(|(identifier, record)| RecordSnapshot {
                identifier: mask_phone_number(identifier),
                hash_preview: record.hash_preview().to_string(),
                expires_at: record.expires_at,
                attempts: record.attempts,
            })
            .collect();
        snapshot.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        snapshot
    }
}
