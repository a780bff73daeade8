//! Mock delivery gateway
//!
//! Logs codes instead of sending them. Used for local development and tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use otp_core::services::otp::DeliveryGateway;
use otp_shared::phone::mask_phone_number;

/// Mock gateway for development and testing
///
/// This implementation:
/// - Logs the code so a developer can complete the flow by hand
/// - Generates `mock_<uuid>` message IDs
/// - Tracks how many messages were sent
/// - Can simulate provider failures
#[derive(Clone, Default)]
pub struct MockGateway {
    message_count: Arc<AtomicU64>,
    simulate_failure: Arc<AtomicBool>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway that fails every send
    pub fn failing() -> Self {
        let gateway = Self::new();
        gateway.set_simulate_failure(true);
        gateway
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl DeliveryGateway for MockGateway {
    async fn send(&self, identifier: &str, code: &str) -> Result<String, String> {
        let masked_phone = mask_phone_number(identifier);

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(phone = %masked_phone, "Mock gateway simulating delivery failure");
            return Err("Simulated delivery failure".to_string());
        }

        let message_id = format!("mock_{}", Uuid::new_v4());
        let count = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;

        // Development only: the plaintext code is the whole point of this gateway
        info!(
            target: "delivery",
            provider = "mock",
            phone = %masked_phone,
            message_id = %message_id,
            message_number = count,
            code = %code,
            "Verification code delivered (mock)"
        );

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }
}
