use actix_web::{web, HttpResponse};

use otp_core::services::otp::DeliveryGateway;
use otp_shared::phone::mask_phone_number;

use crate::dto::otp::SubmitCodeRequest;
use crate::handlers::verify_outcome_response;

use super::AppState;

/// Handler for POST /otp/{phone}
///
/// # Request Body
///
/// ```json
/// { "code": "123456" }
/// ```
///
/// The body is read raw rather than through `web::Json` so that a phone
/// number with no active code answers 404 even when the body is unusable.
///
/// # Response
///
/// - 200 with an empty body when the code is accepted
/// - 400 `No code provided.`
/// - 404 `No active code for phone # ...`
/// - 401 for an expired code, a wrong code or an exhausted attempt budget
pub async fn submit_code<G>(
    state: web::Data<AppState<G>>,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse
where
    G: DeliveryGateway + ?Sized + 'static,
{
    let phone = path.into_inner();

    tracing::info!(phone = %mask_phone_number(&phone), "OTP validation requested");

    let code = SubmitCodeRequest::code_from_body(&body);
    let outcome = state.otp_service.verify(&phone, code.as_deref()).await;

    verify_outcome_response(&outcome, &phone)
}
