//! Request and response bodies

pub mod otp;
