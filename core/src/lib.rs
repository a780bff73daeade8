//! # OTP Core
//!
//! Core business logic for the OTP server: the record entity, the code
//! generator/hasher/verifier, the in-memory store and the issue/verify service.
//! Delivery is abstracted behind [`DeliveryGateway`](services::otp::DeliveryGateway)
//! so the infrastructure layer can plug in WhatsApp, SMS or test doubles.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
