//! Route handlers

pub mod otp;
