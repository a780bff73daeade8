use actix_web::{http::StatusCode, test, web};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use otp_api::app::create_app;
use otp_api::routes::otp::AppState;
use otp_core::services::otp::{
    DeliveryGateway, ManualClock, OtpService, OtpServiceConfig, OtpStore,
};

const PHONE: &str = "14155552671";

/// Gateway that keeps the last code sent to each phone
#[derive(Default)]
struct CapturingGateway {
    codes: Mutex<HashMap<String, String>>,
    fail: AtomicBool,
}

impl CapturingGateway {
    fn code_for(&self, phone: &str) -> String {
        self.codes.lock().unwrap().get(phone).cloned().unwrap()
    }
}

#[async_trait]
impl DeliveryGateway for CapturingGateway {
    async fn send(&self, identifier: &str, code: &str) -> Result<String, String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err("WhatsApp API returned 400".to_string());
        }
        self.codes
            .lock()
            .unwrap()
            .insert(identifier.to_string(), code.to_string());
        Ok("wamid.test".to_string())
    }

    fn provider_name(&self) -> &str {
        "Capturing"
    }
}

struct TestContext {
    state: web::Data<AppState<CapturingGateway>>,
    gateway: Arc<CapturingGateway>,
    store: Arc<OtpStore>,
    clock: Arc<ManualClock>,
}

fn create_test_context() -> TestContext {
    let gateway = Arc::new(CapturingGateway::default());
    let store = Arc::new(OtpStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = OtpService::with_clock(
        gateway.clone(),
        store.clone(),
        OtpServiceConfig::default(),
        clock.clone(),
    );
    TestContext {
        state: web::Data::new(AppState::new(Arc::new(service))),
        gateway,
        store,
        clock,
    }
}

async fn body_text<B: actix_web::body::MessageBody>(resp: actix_web::dev::ServiceResponse<B>) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[actix_web::test]
async fn test_request_code_success() {
    let ctx = create_test_context();
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    let req = test::TestRequest::get().uri("/otp/14155552671").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.is_empty());
    assert!(ctx.store.contains(PHONE).await);
    assert_eq!(ctx.gateway.code_for(PHONE).len(), 6);
}

#[actix_web::test]
async fn test_request_code_delivery_failure() {
    let ctx = create_test_context();
    ctx.gateway.fail.store(true, Ordering::SeqCst);
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    let req = test::TestRequest::get().uri("/otp/14155552671").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_text(resp).await,
        "Error calling send message API. Check server logs."
    );
    assert!(ctx.store.is_empty().await);
}

#[actix_web::test]
async fn test_request_code_invalid_phone() {
    let ctx = create_test_context();
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    let req = test::TestRequest::get().uri("/otp/not-a-number").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(ctx.store.is_empty().await);
}

#[actix_web::test]
async fn test_submit_correct_code() {
    let ctx = create_test_context();
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    let req = test::TestRequest::get().uri("/otp/14155552671").to_request();
    test::call_service(&app, req).await;
    let code = ctx.gateway.code_for(PHONE);

    let req = test::TestRequest::post()
        .uri("/otp/14155552671")
        .set_json(serde_json::json!({ "code": code }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.is_empty());

    // One-time use
    let req = test::TestRequest::post()
        .uri("/otp/14155552671")
        .set_json(serde_json::json!({ "code": code }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(resp).await, "No active code for phone # 14155552671");
}

#[actix_web::test]
async fn test_submit_without_active_code() {
    let ctx = create_test_context();
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    // A missing record is reported even when the body is unusable
    let req = test::TestRequest::post()
        .uri("/otp/14155552671")
        .set_payload("garbage")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_multibyte_identifier_is_answered() {
    let ctx = create_test_context();
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    let req = test::TestRequest::post()
        .uri("/otp/%E2%82%AC%E2%82%AC")
        .set_json(serde_json::json!({ "code": "123456" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(resp).await, "No active code for phone # €€");

    let req = test::TestRequest::get().uri("/otp/%E2%82%AC%E2%82%AC").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(resp).await, "Invalid phone number.");
}

#[actix_web::test]
async fn test_submit_missing_code() {
    let ctx = create_test_context();
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    let req = test::TestRequest::get().uri("/otp/14155552671").to_request();
    test::call_service(&app, req).await;

    for payload in [r#"{}"#, r#"{"code": ""}"#, "not json"] {
        let req = test::TestRequest::post()
            .uri("/otp/14155552671")
            .insert_header(("content-type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(resp).await, "No code provided.");
    }

    assert_eq!(ctx.store.attempts(PHONE).await, Some(0));
}

#[actix_web::test]
async fn test_submit_wrong_code_until_exhausted() {
    let ctx = create_test_context();
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    let req = test::TestRequest::get().uri("/otp/14155552671").to_request();
    test::call_service(&app, req).await;
    let code = ctx.gateway.code_for(PHONE);

    let expected = [
        "Incorrect code. 2 attempt(s) remaining.",
        "Incorrect code. 1 attempt(s) remaining.",
        "Too many failed attempts, please request a new code.",
    ];
    for message in expected {
        let req = test::TestRequest::post()
            .uri("/otp/14155552671")
            .set_json(serde_json::json!({ "code": "000000" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(resp).await, message);
    }

    // The correct code no longer works
    let req = test::TestRequest::post()
        .uri("/otp/14155552671")
        .set_json(serde_json::json!({ "code": code }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_submit_expired_code() {
    let ctx = create_test_context();
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    let req = test::TestRequest::get().uri("/otp/14155552671").to_request();
    test::call_service(&app, req).await;
    let code = ctx.gateway.code_for(PHONE);

    ctx.clock.advance(Duration::minutes(5) + Duration::seconds(1));

    let req = test::TestRequest::post()
        .uri("/otp/14155552671")
        .set_json(serde_json::json!({ "code": code }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_text(resp).await,
        "Code has expired, please request another."
    );
    assert!(ctx.store.is_empty().await);
}

#[actix_web::test]
async fn test_trailing_slash_is_accepted() {
    let ctx = create_test_context();
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    let req = test::TestRequest::get().uri("/otp/14155552671/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(ctx.store.contains(PHONE).await);
}

#[actix_web::test]
async fn test_other_methods_not_allowed() {
    let ctx = create_test_context();
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    let req = test::TestRequest::delete().uri("/otp/14155552671").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let req = test::TestRequest::put().uri("/otp/14155552671").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn test_health_and_unknown_route() {
    let ctx = create_test_context();
    let app = test::init_service(create_app(ctx.state.clone(), 4096)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");

    let req = test::TestRequest::get().uri("/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}
