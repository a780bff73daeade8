//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `delivery` - Which gateway delivers codes to users
//! - `environment` - Environment detection and logging configuration
//! - `otp` - Code length, lifetime, attempt ceiling and reaper policy
//! - `server` - HTTP server configuration

pub mod delivery;
pub mod environment;
pub mod otp;
pub mod server;

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

// Re-export commonly used types
pub use delivery::{DeliveryConfig, DeliveryProvider};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use otp::OtpConfig;
pub use server::ServerConfig;

/// Errors raised while loading or validating configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration out of range: {message}")]
    OutOfRange { message: String },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// OTP lifecycle policy
    #[serde(default)]
    pub otp: OtpConfig,

    /// Delivery gateway selection
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            server: ServerConfig::default(),
            otp: OtpConfig::default(),
            delivery: DeliveryConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let config = Self {
            environment,
            server: ServerConfig::from_env()?,
            otp: OtpConfig::from_env()?,
            delivery: DeliveryConfig::from_env()?,
            logging: LoggingConfig::for_environment(environment),
        };
        config.otp.validate()?;
        Ok(config)
    }
}

/// Read and parse an environment variable, falling back to `default` when unset
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}
