//! OTP lifecycle configuration

use serde::{Deserialize, Serialize};

use super::{env_or, ConfigError};

/// Default number of digits in a generated code
pub const DEFAULT_CODE_LENGTH: u32 = 6;

/// Default code lifetime (5 minutes)
pub const DEFAULT_LIFETIME_MINUTES: i64 = 5;

/// Default number of failed verifications before a code is consumed
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Largest code length whose range still fits in a `u32`
pub const MAX_CODE_LENGTH: u32 = 9;

/// Longest allowed code lifetime (one day)
pub const MAX_LIFETIME_MINUTES: i64 = 24 * 60;

/// OTP issue/verify policy
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of decimal digits in a generated code
    #[serde(default = "default_code_length")]
    pub code_length: u32,

    /// Minutes a code stays valid after issue
    #[serde(default = "default_lifetime_minutes")]
    pub lifetime_minutes: i64,

    /// Failed verifications allowed before the code is consumed
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Whether the background reaper purges expired records
    #[serde(default = "default_reaper_enabled")]
    pub reaper_enabled: bool,

    /// Seconds between reaper sweeps
    #[serde(default = "default_reaper_interval")]
    pub reaper_interval_secs: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
            lifetime_minutes: default_lifetime_minutes(),
            max_attempts: default_max_attempts(),
            reaper_enabled: default_reaper_enabled(),
            reaper_interval_secs: default_reaper_interval(),
        }
    }
}

impl OtpConfig {
    /// Load OTP policy from `OTP_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            code_length: env_or("OTP_CODE_LENGTH", default_code_length())?,
            lifetime_minutes: env_or("OTP_LIFETIME_MINUTES", default_lifetime_minutes())?,
            max_attempts: env_or("OTP_MAX_ATTEMPTS", default_max_attempts())?,
            reaper_enabled: env_or("OTP_REAPER_ENABLED", default_reaper_enabled())?,
            reaper_interval_secs: env_or("OTP_REAPER_INTERVAL_SECS", default_reaper_interval())?,
        })
    }

    /// Check that the policy is internally consistent
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.code_length == 0 || self.code_length > MAX_CODE_LENGTH {
            return Err(ConfigError::OutOfRange {
                message: format!(
                    "code_length must be between 1 and {}, got {}",
                    MAX_CODE_LENGTH, self.code_length
                ),
            });
        }
        if self.lifetime_minutes <= 0 || self.lifetime_minutes > MAX_LIFETIME_MINUTES {
            return Err(ConfigError::OutOfRange {
                message: format!(
                    "lifetime_minutes must be between 1 and {}, got {}",
                    MAX_LIFETIME_MINUTES, self.lifetime_minutes
                ),
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::OutOfRange {
                message: "max_attempts must be at least 1".to_string(),
            });
        }
        if self.reaper_enabled && self.reaper_interval_secs == 0 {
            return Err(ConfigError::OutOfRange {
                message: "reaper_interval_secs must be positive when the reaper is enabled"
                    .to_string(),
            });
        }
        Ok(())
    }
}

fn default_code_length() -> u32 {
    DEFAULT_CODE_LENGTH
}

fn default_lifetime_minutes() -> i64 {
    DEFAULT_LIFETIME_MINUTES
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_reaper_enabled() -> bool {
    true
}

fn default_reaper_interval() -> u64 {
    60
}
