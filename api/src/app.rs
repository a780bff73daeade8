//! Application factory
//!
//! Builds the Actix-web application around a shared [`AppState`].

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::NormalizePath,
    web, App, HttpResponse,
};
use tracing_actix_web::TracingLogger;

use otp_core::services::otp::DeliveryGateway;

use crate::routes::otp::{request_code, submit_code, AppState};

/// Create and configure the application with all dependencies
///
/// # Arguments
///
/// * `app_state` - Shared OTP service
/// * `max_payload_size` - Body limit for code submissions, in bytes
pub fn create_app<G>(
    app_state: web::Data<AppState<G>>,
    max_payload_size: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    G: DeliveryGateway + ?Sized + 'static,
{
    App::new()
        .app_data(app_state)
        .app_data(web::PayloadConfig::new(max_payload_size))
        // The last wrap runs first, so paths are normalized before tracing
        .wrap(TracingLogger::default())
        .wrap(NormalizePath::trim())
        .route("/health", web::get().to(health_check))
        .service(
            web::resource("/otp/{phone}")
                .route(web::get().to(request_code::<G>))
                .route(web::post().to(submit_code::<G>))
                .default_service(web::route().to(method_not_allowed)),
        )
        .default_service(web::route().to(not_found))
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "otp-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .content_type("text/plain; charset=utf-8")
        .body("Method not allowed")
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "not_found",
        "message": "The requested resource was not found"
    }))
}
