//! Delivery gateway module
//!
//! Gateways hand a freshly generated code to an external channel. The factory
//! picks one from [`DeliveryConfig`] and performs any provider setup that has
//! to succeed before the server accepts requests.

use std::sync::Arc;

use otp_core::services::otp::DeliveryGateway;
use otp_shared::{DeliveryConfig, DeliveryProvider};

use crate::config::WhatsAppConfig;
use crate::InfrastructureError;

pub mod mock;
pub mod whatsapp;

// Twilio SMS gateway (feature-gated)
#[cfg(feature = "twilio-sms")]
pub mod twilio;

pub use mock::MockGateway;
pub use whatsapp::{TemplateMessage, WhatsAppGateway};

#[cfg(feature = "twilio-sms")]
pub use twilio::{TwilioConfig, TwilioGateway};

/// Create the delivery gateway selected by configuration
///
/// For WhatsApp this loads the setup file and resolves the approved template,
/// so a misconfigured account fails here rather than on the first request.
pub async fn create_delivery_gateway(
    config: &DeliveryConfig,
) -> Result<Arc<dyn DeliveryGateway>, InfrastructureError> {
    match config.provider {
        DeliveryProvider::Mock => {
            tracing::warn!("Using mock delivery gateway; codes are only logged");
            Ok(Arc::new(MockGateway::new()))
        }
        DeliveryProvider::WhatsApp => {
            let whatsapp_config = WhatsAppConfig::from_env(config)?;
            let gateway = WhatsAppGateway::connect(whatsapp_config).await?;
            Ok(Arc::new(gateway))
        }
        #[cfg(feature = "twilio-sms")]
        DeliveryProvider::Twilio => Ok(Arc::new(TwilioGateway::from_env()?)),
        #[cfg(not(feature = "twilio-sms"))]
        DeliveryProvider::Twilio => Err(InfrastructureError::Config(
            "Twilio delivery requires the twilio-sms feature".to_string(),
        )),
    }
}
