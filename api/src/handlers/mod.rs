//! Mapping from service results to HTTP responses

pub mod error;

pub use error::{issue_error_response, verify_outcome_response};
