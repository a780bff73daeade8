//! Business services containing domain logic and use cases.

pub mod otp;

// Re-export commonly used types
pub use otp::{
    DeliveryGateway, IssuedCode, OtpReaper, OtpService, OtpServiceConfig, OtpStore,
    VerifyOutcome,
};
