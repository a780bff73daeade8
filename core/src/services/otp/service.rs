//! Main OTP service implementation

use std::sync::Arc;
use tracing;

use otp_shared::phone::mask_phone_number;

use crate::domain::entities::otp_record::OtpRecord;
use crate::errors::{DomainError, DomainResult};

use super::clock::{Clock, SystemClock};
use super::code::generate_code;
use super::config::OtpServiceConfig;
use super::store::OtpStore;
use super::traits::DeliveryGateway;
use super::types::{IssuedCode, VerifyOutcome};

/// OTP service: issues codes through a delivery gateway and verifies them
/// against the store
pub struct OtpService<G: DeliveryGateway + ?Sized> {
    /// Gateway that delivers plaintext codes
    gateway: Arc<G>,
    /// Record set shared with the reaper
    store: Arc<OtpStore>,
    /// Time source for expiry
    clock: Arc<dyn Clock>,
    /// Service configuration
    config: OtpServiceConfig,
}

impl<G: DeliveryGateway + ?Sized> OtpService<G> {
    /// Create a new OTP service using the system clock
    ///
    /// # Arguments
    ///
    /// * `gateway` - Delivery gateway implementation
    /// * `store` - Store holding outstanding records
    /// * `config` - Service configuration
    pub fn new(gateway: Arc<G>, store: Arc<OtpStore>, config: OtpServiceConfig) -> Self {
        Self::with_clock(gateway, store, config, Arc::new(SystemClock))
    }

    /// Create a new OTP service with an explicit time source
    pub fn with_clock(
        gateway: Arc<G>,
        store: Arc<OtpStore>,
        config: OtpServiceConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            store,
            clock,
            config,
        }
    }

    /// Issue a new code for an identifier
    ///
    /// This method:
    /// 1. Generates a fresh code with the OS CSPRNG
    /// 2. Computes the expiry instant
    /// 3. Hands the plaintext to the delivery gateway and waits for it
    /// 4. Only on delivery success, stores the digest, replacing any
    ///    outstanding record for the identifier
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedCode)` - Delivery succeeded and the record is live
    /// * `Err(DomainError::Delivery)` - Delivery failed; the store is untouched
    /// * `Err(DomainError::Internal)` - The expiry instant is not representable
    pub async fn issue(&self, identifier: &str) -> DomainResult<IssuedCode> {
        if identifier.is_empty() {
            return Err(DomainError::Validation {
                message: "identifier must not be empty".to_string(),
            });
        }

        let masked = mask_phone_number(identifier);
        let code = generate_code(self.config.code_length);
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.config.lifetime)
            .ok_or_else(|| DomainError::Internal {
                message: "code expiry is out of range".to_string(),
            })?;

        let message_id = self
            .gateway
            .send(identifier, &code)
            .await
            .map_err(|e| {
                tracing::error!(
                    phone = %masked,
                    provider = self.gateway.provider_name(),
                    error = %e,
                    event = "otp_delivery_failed",
                    "Failed to deliver verification code"
                );
                DomainError::Delivery {
                    provider: self.gateway.provider_name().to_string(),
                    message: e,
                }
            })?;

        let replaced = self
            .store
            .insert(identifier, OtpRecord::for_code(&code, expires_at))
            .await;

        tracing::info!(
            phone = %masked,
            provider = self.gateway.provider_name(),
            message_id = %message_id,
            expires_at = %expires_at,
            replaced_previous = replaced.is_some(),
            event = "otp_issued",
            "Issued verification code"
        );
        self.log_active_codes().await;

        Ok(IssuedCode {
            identifier: identifier.to_string(),
            message_id,
            expires_at,
        })
    }

    /// Verify a candidate code for an identifier
    ///
    /// `candidate` is `None` when the caller supplied no code at all. Every
    /// branch yields exactly one [`VerifyOutcome`]; terminal outcomes remove
    /// the record.
    pub async fn verify(&self, identifier: &str, candidate: Option<&str>) -> VerifyOutcome {
        let outcome = self
            .store
            .verify(
                identifier,
                candidate,
                self.clock.now(),
                self.config.max_attempts,
            )
            .await;

        let masked = mask_phone_number(identifier);
        match outcome {
            VerifyOutcome::Success => tracing::info!(
                phone = %masked,
                event = "otp_verified_success",
                "Verification code successfully verified"
            ),
            VerifyOutcome::IncorrectCode { remaining_attempts } => tracing::warn!(
                phone = %masked,
                remaining_attempts,
                event = "otp_verification_failed",
                "Verification code verification failed"
            ),
            VerifyOutcome::TooManyAttempts => tracing::warn!(
                phone = %masked,
                event = "max_attempts_exceeded",
                "Maximum verification attempts exceeded, code consumed"
            ),
            other => tracing::info!(
                phone = %masked,
                outcome = other.as_str(),
                event = "otp_verification_rejected",
                "Verification request rejected"
            ),
        }
        if outcome.consumes_record() || matches!(outcome, VerifyOutcome::IncorrectCode { .. }) {
            self.log_active_codes().await;
        }

        outcome
    }

    /// Shared handle to the store
    pub fn store(&self) -> &Arc<OtpStore> {
        &self.store
    }

    /// Time source used for expiry
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Service configuration
    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    /// Provider name of the underlying gateway
    pub fn provider_name(&self) -> &str {
        self.gateway.provider_name()
    }

    /// Emit a sanitized view of active records at debug level
    async fn log_active_codes(&self) {
        if !tracing::enabled!(tracing::Level::DEBUG) {
            return;
        }
        for record in self.store.snapshot().await {
            tracing::debug!(
                phone = %record.identifier,
                hash = %format!("{}...", record.hash_preview),
                expires_at = %record.expires_at,
                attempts = record.attempts,
                "Active code"
            );
        }
    }
}
