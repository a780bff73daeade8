//! Delivery gateway selection

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::str::FromStr;

use super::ConfigError;

/// Which external channel delivers codes to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryProvider {
    /// WhatsApp Cloud API authentication template
    WhatsApp,
    /// Twilio programmable SMS
    Twilio,
    /// Log-only gateway for local development
    Mock,
}

impl Default for DeliveryProvider {
    fn default() -> Self {
        DeliveryProvider::WhatsApp
    }
}

impl fmt::Display for DeliveryProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryProvider::WhatsApp => write!(f, "whatsapp"),
            DeliveryProvider::Twilio => write!(f, "twilio"),
            DeliveryProvider::Mock => write!(f, "mock"),
        }
    }
}

impl FromStr for DeliveryProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whatsapp" | "wa" => Ok(DeliveryProvider::WhatsApp),
            "twilio" | "sms" => Ok(DeliveryProvider::Twilio),
            "mock" => Ok(DeliveryProvider::Mock),
            _ => Err(format!("Invalid delivery provider: {}", s)),
        }
    }
}

/// Delivery gateway configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeliveryConfig {
    /// Selected provider
    #[serde(default)]
    pub provider: DeliveryProvider,

    /// Explicit path of the WhatsApp setup file, if not in a default location
    #[serde(default)]
    pub whatsapp_config_path: Option<String>,
}

impl DeliveryConfig {
    /// Load from `DELIVERY_PROVIDER` and `WHATSAPP_CONFIG_PATH`
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = match env::var("DELIVERY_PROVIDER") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "DELIVERY_PROVIDER".to_string(),
                value,
            })?,
            Err(_) => DeliveryProvider::default(),
        };

        Ok(Self {
            provider,
            whatsapp_config_path: env::var("WHATSAPP_CONFIG_PATH").ok(),
        })
    }
}
