//! Configuration for the OTP service

use chrono::Duration;

use otp_shared::config::otp::{
    OtpConfig, DEFAULT_CODE_LENGTH, DEFAULT_LIFETIME_MINUTES, DEFAULT_MAX_ATTEMPTS,
};

use crate::errors::{DomainError, DomainResult};

/// Configuration for the OTP service
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Number of digits in a generated code
    pub code_length: u32,
    /// How long a code stays valid after issue
    pub lifetime: Duration,
    /// Failed verifications allowed before the code is consumed
    pub max_attempts: u32,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            lifetime: Duration::minutes(DEFAULT_LIFETIME_MINUTES),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl TryFrom<&OtpConfig> for OtpServiceConfig {
    type Error = DomainError;

    fn try_from(config: &OtpConfig) -> DomainResult<Self> {
        config.validate()?;
        Ok(Self {
            code_length: config.code_length,
            lifetime: Duration::minutes(config.lifetime_minutes),
            max_attempts: config.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_shared_config() {
        let shared = OtpConfig {
            code_length: 8,
            lifetime_minutes: 10,
            max_attempts: 5,
            ..Default::default()
        };
        let config = OtpServiceConfig::try_from(&shared).unwrap();
        assert_eq!(config.code_length, 8);
        assert_eq!(config.lifetime, Duration::minutes(10));
        assert_eq!(config.max_attempts, 5);
    }

    #[test]
    fn test_invalid_shared_config_is_rejected() {
        let shared = OtpConfig { max_attempts: 0, ..Default::default() };
        assert!(matches!(
            OtpServiceConfig::try_from(&shared),
            Err(DomainError::Config(_))
        ));

        let shared = OtpConfig { lifetime_minutes: 1_000_000_000_000, ..Default::default() };
        assert!(matches!(
            OtpServiceConfig::try_from(&shared),
            Err(DomainError::Config(_))
        ));
    }
}
