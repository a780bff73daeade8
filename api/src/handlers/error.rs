//! Plain-text responses for the OTP endpoints
//!
//! Mobile clients show these bodies to the user verbatim, so they are short
//! sentences rather than JSON error documents.

use actix_web::{http::StatusCode, HttpResponse};

use otp_core::errors::DomainError;
use otp_core::services::otp::VerifyOutcome;

/// Status code for a verification outcome
pub fn outcome_status(outcome: &VerifyOutcome) -> StatusCode {
    match outcome {
        VerifyOutcome::Success => StatusCode::OK,
        VerifyOutcome::BadRequest => StatusCode::BAD_REQUEST,
        VerifyOutcome::NotFound => StatusCode::NOT_FOUND,
        VerifyOutcome::Expired
        | VerifyOutcome::IncorrectCode { .. }
        | VerifyOutcome::TooManyAttempts => StatusCode::UNAUTHORIZED,
    }
}

/// User-facing message for a verification outcome
pub fn outcome_message(outcome: &VerifyOutcome, phone: &str) -> String {
    match outcome {
        VerifyOutcome::Success => String::new(),
        VerifyOutcome::BadRequest => "No code provided.".to_string(),
        VerifyOutcome::NotFound => format!("No active code for phone # {}", phone),
        VerifyOutcome::Expired => "Code has expired, please request another.".to_string(),
        VerifyOutcome::TooManyAttempts => {
            "Too many failed attempts, please request a new code.".to_string()
        }
        VerifyOutcome::IncorrectCode { remaining_attempts } => format!(
            "Incorrect code. {} attempt(s) remaining.",
            remaining_attempts
        ),
    }
}

/// Build the response for `POST /otp/{phone}`
pub fn verify_outcome_response(outcome: &VerifyOutcome, phone: &str) -> HttpResponse {
    let status = outcome_status(outcome);
    if outcome.is_success() {
        return HttpResponse::build(status).finish();
    }
    HttpResponse::build(status)
        .content_type("text/plain; charset=utf-8")
        .body(outcome_message(outcome, phone))
}

/// Build the error response for `GET /otp/{phone}`
pub fn issue_error_response(error: &DomainError) -> HttpResponse {
    let (status, message) = match error {
        DomainError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
        DomainError::Delivery { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error calling send message API. Check server logs.".to_string(),
        ),
        DomainError::Internal { .. } | DomainError::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error generating code".to_string(),
        ),
    };
    HttpResponse::build(status)
        .content_type("text/plain; charset=utf-8")
        .body(message)
}
