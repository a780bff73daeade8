//! Shared utilities and common types for the OTP server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types (server, environment, logging, OTP policy, delivery)
//! - Phone number helpers (normalization, validation, masking for logs)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ConfigError, DeliveryConfig, DeliveryProvider, Environment, LogFormat,
    LoggingConfig, OtpConfig, ServerConfig,
};
pub use utils::phone;
