//! # Infrastructure Layer
//!
//! Concrete delivery gateways for the OTP server. Each gateway implements the
//! core [`DeliveryGateway`](otp_core::services::otp::DeliveryGateway) trait so
//! the service never knows which channel carried the code.
//!
//! ## Gateways
//!
//! - **WhatsApp**: Cloud API authentication templates (default)
//! - **Twilio**: programmable SMS
//! - **Mock**: logs the code instead of sending it
//!
//! ## Features
//!
//! - `twilio-sms`: Enable the Twilio SMS gateway (default)

pub mod config;
pub mod delivery;

pub use config::{WhatsAppConfig, WhatsAppSetup};
pub use delivery::{create_delivery_gateway, MockGateway, WhatsAppGateway};

#[cfg(feature = "twilio-sms")]
pub use delivery::{TwilioConfig, TwilioGateway};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Delivery provider rejected the message
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Message template lookup failed or the template is unusable
    #[error("Template error: {0}")]
    Template(String),

    /// Reading a setup file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing a setup file or API response failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
