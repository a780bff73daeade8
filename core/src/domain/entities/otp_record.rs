//! OTP record entity: the stored state behind one outstanding code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::otp::code::{hash_code, verify_code};

/// Stored state for one identifier's outstanding code
///
/// The plaintext code is never kept; only its digest is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Hex-encoded SHA-256 digest of the plaintext code
    pub code_hash: String,

    /// The record is invalid strictly after this instant
    pub expires_at: DateTime<Utc>,

    /// Failed verification attempts so far
    pub attempts: u32,
}

impl OtpRecord {
    /// Creates a fresh record for a plaintext code
    ///
    /// # Arguments
    ///
    /// * `code` - The plaintext code that was delivered
    /// * `expires_at` - Absolute expiry instant
    pub fn for_code(code: &str, expires_at: DateTime<Utc>) -> Self {
        Self {
            code_hash: hash_code(code),
            expires_at,
            attempts: 0,
        }
    }

    /// Checks whether the record has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Checks whether the attempt ceiling has been reached
    pub fn is_exhausted(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }

    /// Compares a candidate against the stored digest in constant time
    pub fn matches(&self, candidate: &str) -> bool {
        verify_code(candidate, &self.code_hash)
    }

    /// Records one failed attempt and returns the new count
    pub fn record_failure(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }

    /// Attempts left before the ceiling
    pub fn remaining_attempts(&self, max_attempts: u32) -> u32 {
        max_attempts.saturating_sub(self.attempts)
    }

    /// Short, non-reversible prefix of the digest for log output
    pub fn hash_preview(&self) -> &str {
        let end = self.code_hash.len().min(16);
        &self.code_hash[..end]
    }
}
