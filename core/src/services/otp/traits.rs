//! Traits for delivery gateway integration

use async_trait::async_trait;

/// External channel that delivers a plaintext code to the user
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Send a code to an identifier
    ///
    /// # Returns
    ///
    /// * `Ok(message_id)` - Provider message identifier
    /// * `Err(reason)` - Delivery failed; no record may be created
    async fn send(&self, identifier: &str, code: &str) -> Result<String, String>;

    /// Name of the provider behind this gateway
    fn provider_name(&self) -> &str;
}
