//! Domain-specific error types and error handling.
//!
//! Verification outcomes are not errors: every branch of the verify state
//! machine is reported through [`VerifyOutcome`](crate::services::otp::VerifyOutcome).
//! `DomainError` covers the issue path and setup.

use otp_shared::ConfigError;
use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The delivery gateway rejected or failed the handoff; no record was written
    #[error("Delivery failed via {provider}: {message}")]
    Delivery { provider: String, message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DomainError {
    /// Whether the caller may simply retry issuance
    pub fn is_delivery(&self) -> bool {
        matches!(self, DomainError::Delivery { .. })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
