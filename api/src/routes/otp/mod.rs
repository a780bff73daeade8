//! One-time passcode route handlers
//!
//! Both operations share the `/otp/{phone}` resource:
//! - `GET` issues a code and delivers it
//! - `POST` submits a code for verification

pub mod request_code;
pub mod submit_code;

pub use request_code::{request_code, AppState};
pub use submit_code::submit_code;
