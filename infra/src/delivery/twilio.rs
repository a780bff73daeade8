//! Twilio SMS delivery gateway
//!
//! Sends the code as a plain SMS. Recipients must be E.164; WhatsApp-style
//! identifiers without the leading '+' are given one.

use async_trait::async_trait;
use tracing::{debug, error, info};
use twilio::{Client, OutboundMessage};

use otp_core::services::otp::DeliveryGateway;
use otp_shared::phone::{is_valid_phone_identifier, mask_phone_number, normalize_phone_number};

use crate::InfrastructureError;

/// Twilio SMS gateway configuration
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    /// Twilio Account SID
    pub account_sid: String,
    /// Twilio Auth Token
    pub auth_token: String,
    /// From phone number (must be a Twilio phone number)
    pub from_number: String,
}

impl TwilioConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        let account_sid = std::env::var("TWILIO_ACCOUNT_SID")
            .map_err(|_| InfrastructureError::Config("TWILIO_ACCOUNT_SID not set".to_string()))?;
        let auth_token = std::env::var("TWILIO_AUTH_TOKEN")
            .map_err(|_| InfrastructureError::Config("TWILIO_AUTH_TOKEN not set".to_string()))?;
        let from_number = std::env::var("TWILIO_FROM_NUMBER")
            .map_err(|_| InfrastructureError::Config("TWILIO_FROM_NUMBER not set".to_string()))?;

        if !from_number.starts_with('+') {
            return Err(InfrastructureError::Config(
                "TWILIO_FROM_NUMBER must be in E.164 format (starting with '+')".to_string(),
            ));
        }

        Ok(Self {
            account_sid,
            auth_token,
            from_number,
        })
    }
}

/// Message body sent to the user
pub fn verification_message(code: &str) -> String {
    format!("Your verification code is: {}", code)
}

/// Normalize a recipient to E.164
pub fn to_e164(phone: &str) -> Result<String, InfrastructureError> {
    let normalized = normalize_phone_number(phone);
    if !is_valid_phone_identifier(&normalized) {
        return Err(InfrastructureError::Delivery(format!(
            "Invalid phone number format: {}",
            mask_phone_number(phone)
        )));
    }
    if normalized.starts_with('+') {
        Ok(normalized)
    } else {
        Ok(format!("+{}", normalized))
    }
}

/// Twilio SMS gateway
pub struct TwilioGateway {
    client: Client,
    config: TwilioConfig,
}

impl TwilioGateway {
    pub fn new(config: TwilioConfig) -> Self {
        let client = Client::new(&config.account_sid, &config.auth_token);

        info!(
            "Twilio SMS gateway initialized with from number: {}",
            mask_phone_number(&config.from_number)
        );

        Self { client, config }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self, InfrastructureError> {
        Ok(Self::new(TwilioConfig::from_env()?))
    }

    /// Send a single SMS; a failure is returned to the caller as is
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, InfrastructureError> {
        debug!("Sending SMS to {}", mask_phone_number(to));

        let msg = OutboundMessage::new(&self.config.from_number, to, body);
        let response = self.client.send_message(msg).await.map_err(|e| {
            error!("Failed to send SMS to {}: {}", mask_phone_number(to), e);
            InfrastructureError::Delivery(format!("Twilio send failed: {}", e))
        })?;

        info!(
            "SMS sent successfully to {} with SID: {}",
            mask_phone_number(to),
            response.sid
        );
        Ok(response.sid)
    }
}

#[async_trait]
impl DeliveryGateway for TwilioGateway {
    async fn send(&self, identifier: &str, code: &str) -> Result<String, String> {
        let to = to_e164(identifier).map_err(|e| e.to_string())?;
        self.send_sms(&to, &verification_message(code))
            .await
            .map_err(|e| e.to_string())
    }

    fn provider_name(&self) -> &str {
        "Twilio"
    }
}
