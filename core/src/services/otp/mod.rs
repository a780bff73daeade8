//! OTP service module for code-based phone verification
//!
//! This module provides the complete one-time passcode lifecycle:
//! - Secure code generation with the OS CSPRNG
//! - Hashed storage (the plaintext is never kept)
//! - Lazy expiry enforcement and an optional background reaper
//! - Bounded-attempt verification with constant-time comparison
//! - One-time consumption of accepted codes

mod clock;
pub mod code;
mod config;
mod reaper;
mod service;
mod store;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use code::{generate_code, hash_code, verify_code};
pub use config::OtpServiceConfig;
pub use reaper::{OtpReaper, ReapResult};
pub use service::OtpService;
pub use store::{OtpStore, RecordSnapshot};
pub use traits::DeliveryGateway;
pub use types::{IssuedCode, VerifyOutcome};
