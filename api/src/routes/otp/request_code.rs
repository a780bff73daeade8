use actix_web::{web, HttpResponse};
use std::sync::Arc;

use otp_core::errors::DomainError;
use otp_core::services::otp::{DeliveryGateway, OtpService};
use otp_shared::phone::{is_valid_phone_identifier, mask_phone_number};

use crate::handlers::issue_error_response;

/// Application state that holds shared services
pub struct AppState<G: DeliveryGateway + ?Sized> {
    pub otp_service: Arc<OtpService<G>>,
}

impl<G: DeliveryGateway + ?Sized> AppState<G> {
    pub fn new(otp_service: Arc<OtpService<G>>) -> Self {
        Self { otp_service }
    }
}

/// Handler for GET /otp/{phone}
///
/// Generates a code and hands it to the delivery gateway. The code only
/// becomes verifiable once delivery succeeded.
///
/// # Response
///
/// - 200 with an empty body when the code was delivered
/// - 400 when the phone number is not a usable identifier
/// - 500 with a short text message when delivery failed
pub async fn request_code<G>(
    state: web::Data<AppState<G>>,
    path: web::Path<String>,
) -> HttpResponse
where
    G: DeliveryGateway + ?Sized + 'static,
{
    let phone = path.into_inner();
    let masked = mask_phone_number(&phone);

    tracing::info!(phone = %masked, "OTP requested");

    if !is_valid_phone_identifier(&phone) {
        tracing::warn!(phone = %masked, "Rejected OTP request for invalid phone number");
        return issue_error_response(&DomainError::Validation {
            message: "Invalid phone number.".to_string(),
        });
    }

    match state.otp_service.issue(&phone).await {
        Ok(issued) => {
            tracing::info!(
                phone = %masked,
                message_id = %issued.message_id,
                "OTP request completed"
            );
            HttpResponse::Ok().finish()
        }
        Err(error) => {
            tracing::error!(phone = %masked, error = %error, "OTP request failed");
            issue_error_response(&error)
        }
    }
}
