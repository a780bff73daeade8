//! Configuration for infrastructure services
//!
//! The WhatsApp gateway reads its credentials from a JSON setup file
//! (`whatsapp-info.json`) produced when the business account is provisioned.
//! Everything else comes from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use otp_shared::DeliveryConfig;

use crate::InfrastructureError;

/// File name of the WhatsApp setup document
pub const SETUP_FILENAME: &str = "whatsapp-info.json";

/// Graph API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://graph.facebook.com";

/// Graph API version used for all calls
pub const DEFAULT_API_VERSION: &str = "v21.0";

/// Timeout applied to every Cloud API request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Credentials and identifiers from the setup file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatsAppSetup {
    /// WhatsApp Business Account ID, owner of the message templates
    #[serde(default)]
    pub waba_id: String,
    /// Bearer token for the Cloud API
    #[serde(default)]
    pub access_token: String,
    /// Sending phone number ID
    #[serde(default)]
    pub phone_number_id: String,
    /// ID of the approved authentication template
    #[serde(default)]
    pub template_id: String,
}

impl WhatsAppSetup {
    /// Parse and validate a setup document
    pub fn from_json(json: &str) -> Result<Self, InfrastructureError> {
        let setup: WhatsAppSetup = serde_json::from_str(json).map_err(|e| {
            InfrastructureError::Config(format!("could not parse {}: {}", SETUP_FILENAME, e))
        })?;
        setup.validate()?;
        Ok(setup)
    }

    /// Read a setup file from disk
    pub fn load(path: &Path) -> Result<Self, InfrastructureError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Every field is required
    pub fn validate(&self) -> Result<(), InfrastructureError> {
        let missing: Vec<&str> = [
            ("waba_id", &self.waba_id),
            ("access_token", &self.access_token),
            ("phone_number_id", &self.phone_number_id),
            ("template_id", &self.template_id),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(InfrastructureError::Config(format!(
                "missing required fields in {}: {}",
                SETUP_FILENAME,
                missing.join(", ")
            )))
        }
    }
}

/// Locate the setup file
///
/// An explicit path must exist. Otherwise `../setup/whatsapp-info.json` and
/// then `setup/whatsapp-info.json` are tried relative to the working directory.
pub fn resolve_setup_path(explicit: Option<&str>) -> Result<PathBuf, InfrastructureError> {
    if let Some(path) = explicit {
        let path = PathBuf::from(path);
        return if path.is_file() {
            Ok(path)
        } else {
            Err(InfrastructureError::Config(format!(
                "WHATSAPP_CONFIG_PATH points to a missing file: {}",
                path.display()
            )))
        };
    }

    [
        Path::new("..").join("setup").join(SETUP_FILENAME),
        Path::new("setup").join(SETUP_FILENAME),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
    .ok_or_else(|| {
        InfrastructureError::Config(format!(
            "missing {} file; run the WhatsApp setup first or set WHATSAPP_CONFIG_PATH",
            SETUP_FILENAME
        ))
    })
}

/// Full WhatsApp gateway configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsAppConfig {
    pub setup: WhatsAppSetup,
    pub api_base_url: String,
    pub api_version: String,
    pub request_timeout_secs: u64,
}

impl WhatsAppConfig {
    pub fn new(setup: WhatsAppSetup) -> Self {
        Self {
            setup,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Load the setup file named by the delivery config and apply
    /// `WHATSAPP_API_BASE_URL` / `WHATSAPP_API_VERSION` overrides
    pub fn from_env(delivery: &DeliveryConfig) -> Result<Self, InfrastructureError> {
        let path = resolve_setup_path(delivery.whatsapp_config_path.as_deref())?;
        tracing::info!(path = %path.display(), "Loading WhatsApp setup file");

        let mut config = Self::new(WhatsAppSetup::load(&path)?);
        if let Ok(base_url) = std::env::var("WHATSAPP_API_BASE_URL") {
            config.api_base_url = base_url;
        }
        if let Ok(version) = std::env::var("WHATSAPP_API_VERSION") {
            config.api_version = version;
        }
        Ok(config)
    }

    /// `{base}/{version}/{phone_number_id}/messages`
    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.api_base_url.trim_end_matches('/'),
            self.api_version,
            self.setup.phone_number_id
        )
    }

    /// `{base}/{version}/{waba_id}/message_templates`
    pub fn templates_url(&self) -> String {
        format!(
            "{}/{}/{}/message_templates",
            self.api_base_url.trim_end_matches('/'),
            self.api_version,
            self.setup.waba_id
        )
    }
}
