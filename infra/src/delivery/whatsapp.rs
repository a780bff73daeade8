//! WhatsApp Cloud API delivery gateway
//!
//! Codes are sent as an authentication template message. The template is
//! referenced by ID in the setup file but the send API wants its name, so the
//! name is resolved once at startup from the account's template list and the
//! template must be approved.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use otp_core::services::otp::DeliveryGateway;
use otp_shared::phone::mask_phone_number;

use crate::config::WhatsAppConfig;
use crate::InfrastructureError;

const APPROVED_STATUS: &str = "APPROVED";

/// Authentication template message body
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TemplateMessage {
    pub messaging_product: &'static str,
    pub recipient_type: &'static str,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub template: Template,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub language: TemplateLanguage,
    pub components: Vec<TemplateComponent>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TemplateLanguage {
    pub code: &'static str,
    pub policy: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TemplateComponent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<&'static str>,
    pub parameters: Vec<TextParameter>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TextParameter {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl TemplateMessage {
    /// Build the message carrying `code` in the body and in the copy-code button
    pub fn authentication(to: &str, template_name: &str, code: &str) -> Self {
        let code_parameter = || {
            vec![TextParameter {
                kind: "text",
                text: code.to_string(),
            }]
        };

        Self {
            messaging_product: "whatsapp",
            recipient_type: "individual",
            to: to.to_string(),
            kind: "template",
            template: Template {
                name: template_name.to_string(),
                language: TemplateLanguage {
                    code: "en_US",
                    policy: "deterministic",
                },
                components: vec![
                    TemplateComponent {
                        kind: "body",
                        sub_type: None,
                        index: None,
                        parameters: code_parameter(),
                    },
                    TemplateComponent {
                        kind: "button",
                        sub_type: Some("url"),
                        index: Some("0"),
                        parameters: code_parameter(),
                    },
                ],
            },
        }
    }
}

/// One entry of the `message_templates` listing
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TemplateSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct TemplatePage {
    #[serde(default)]
    data: Vec<TemplateSummary>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct Paging {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    messages: Vec<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

/// Pick the template with `template_id` out of one page of the listing
///
/// Returns `Ok(None)` when the page does not contain it.
pub fn select_template(
    templates: &[TemplateSummary],
    template_id: &str,
) -> Result<Option<String>, InfrastructureError> {
    match templates.iter().find(|t| t.id == template_id) {
        Some(template) if template.status == APPROVED_STATUS => Ok(Some(template.name.clone())),
        Some(template) => Err(InfrastructureError::Template(format!(
            "template with ID {} is not approved (status: {})",
            template_id, template.status
        ))),
        None => Ok(None),
    }
}

/// WhatsApp Cloud API gateway
pub struct WhatsAppGateway {
    client: reqwest::Client,
    config: WhatsAppConfig,
    template_name: String,
}

impl WhatsAppGateway {
    /// Create a gateway for an already resolved template name
    pub fn new(config: WhatsAppConfig, template_name: String) -> Result<Self, InfrastructureError> {
        let client = build_client(&config)?;
        Ok(Self {
            client,
            config,
            template_name,
        })
    }

    /// Resolve the template name, then create the gateway
    pub async fn connect(config: WhatsAppConfig) -> Result<Self, InfrastructureError> {
        let client = build_client(&config)?;
        let template_name = fetch_template_name(&client, &config).await?;

        info!(
            template_name = %template_name,
            template_id = %config.setup.template_id,
            "Verified OTP template is approved and ready to send"
        );

        Ok(Self {
            client,
            config,
            template_name,
        })
    }

    /// Resolved template name
    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    async fn send_template(&self, to: &str, code: &str) -> Result<String, InfrastructureError> {
        let message = TemplateMessage::authentication(to, &self.template_name, code);

        let response = self
            .client
            .post(self.config.messages_url())
            .bearer_auth(&self.config.setup.access_token)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = status.as_u16(),
                body = %body,
                "WhatsApp API rejected the message"
            );
            return Err(InfrastructureError::Delivery(format!(
                "WhatsApp API returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let message_id = serde_json::from_str::<SendResponse>(&body)
            .ok()
            .and_then(|r| r.messages.into_iter().next())
            .map(|m| m.id)
            .unwrap_or_default();
        Ok(message_id)
    }
}

#[async_trait]
impl DeliveryGateway for WhatsAppGateway {
    async fn send(&self, identifier: &str, code: &str) -> Result<String, String> {
        debug!(phone = %mask_phone_number(identifier), "Sending WhatsApp authentication template");
        self.send_template(identifier, code)
            .await
            .map_err(|e| e.to_string())
    }

    fn provider_name(&self) -> &str {
        "WhatsApp"
    }
}

fn build_client(config: &WhatsAppConfig) -> Result<reqwest::Client, InfrastructureError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?)
}

/// Walk the template listing, following `paging.next`, until the configured
/// template is found
pub async fn fetch_template_name(
    client: &reqwest::Client,
    config: &WhatsAppConfig,
) -> Result<String, InfrastructureError> {
    let template_id = &config.setup.template_id;
    let mut request = client
        .get(config.templates_url())
        .query(&[("access_token", config.setup.access_token.as_str())]);

    loop {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InfrastructureError::Template(format!(
                "error fetching templates ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let page: TemplatePage = response.json().await?;
        if let Some(name) = select_template(&page.data, template_id)? {
            return Ok(name);
        }

        match page.paging.and_then(|p| p.next) {
            Some(next) => request = client.get(next),
            None => break,
        }
    }

    Err(InfrastructureError::Template(format!(
        "could not find template with ID {}",
        template_id
    )))
}
