//! Types for OTP service results

use chrono::{DateTime, Utc};
use std::fmt;

/// Result of issuing a code
///
/// Carries no plaintext: the code only ever leaves the process through the
/// delivery gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCode {
    /// Identifier the code was issued for
    pub identifier: String,
    /// Message ID returned by the delivery provider
    pub message_id: String,
    /// When the code stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Outcome of a verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Code accepted; the record has been consumed
    Success,
    /// Candidate code missing or empty
    BadRequest,
    /// No active code for the identifier
    NotFound,
    /// Code existed but its lifetime elapsed; the record has been removed
    Expired,
    /// Wrong code, attempts remain
    IncorrectCode {
        /// Attempts left before the code is consumed
        remaining_attempts: u32,
    },
    /// Attempt ceiling reached; the record has been removed
    TooManyAttempts,
}

impl VerifyOutcome {
    /// Whether the code was accepted
    pub fn is_success(&self) -> bool {
        matches!(self, VerifyOutcome::Success)
    }

    /// Whether this outcome removed the record
    pub fn consumes_record(&self) -> bool {
        matches!(
            self,
            VerifyOutcome::Success | VerifyOutcome::Expired | VerifyOutcome::TooManyAttempts
        )
    }

    /// Stable event name for structured logs
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyOutcome::Success => "success",
            VerifyOutcome::BadRequest => "bad_request",
            VerifyOutcome::NotFound => "not_found",
            VerifyOutcome::Expired => "expired",
            VerifyOutcome::IncorrectCode { .. } => "incorrect_code",
            VerifyOutcome::TooManyAttempts => "too_many_attempts",
        }
    }
}

impl fmt::Display for VerifyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyOutcome::IncorrectCode { remaining_attempts } => {
                write!(f, "incorrect_code (remaining: {})", remaining_attempts)
            }
            other => f.write_str(other.as_str()),
        }
    }
}
