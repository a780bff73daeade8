//! Unit tests for the OTP service

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::errors::DomainError;
use crate::services::otp::{
    Clock, ManualClock, OtpService, OtpServiceConfig, OtpStore, VerifyOutcome,
};

use super::mocks::{MockGateway, ObservingGateway};

const PHONE: &str = "+14155552671";

struct Harness {
    service: OtpService<MockGateway>,
    gateway: Arc<MockGateway>,
    store: Arc<OtpStore>,
    clock: Arc<ManualClock>,
}

fn harness_with_config(config: OtpServiceConfig) -> Harness {
    let gateway = Arc::new(MockGateway::new(false));
    let store = Arc::new(OtpStore::new());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = OtpService::with_clock(gateway.clone(), store.clone(), config, clock.clone());
    Harness {
        service,
        gateway,
        store,
        clock,
    }
}

fn harness() -> Harness {
    harness_with_config(OtpServiceConfig::default())
}

#[tokio::test]
async fn test_issue_success() {
    let h = harness();
    let start = h.clock.now();

    let issued = h.service.issue(PHONE).await.unwrap();

    assert_eq!(issued.identifier, PHONE);
    assert_eq!(issued.message_id, "mock-msg-1");
    assert_eq!(issued.expires_at, start + Duration::minutes(5));

    let code = h.gateway.get_sent_code(PHONE).unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    assert!(h.store.contains(PHONE).await);
    assert_eq!(h.store.attempts(PHONE).await, Some(0));
}

#[tokio::test]
async fn test_issue_rejects_empty_identifier() {
    let h = harness();

    let result = h.service.issue("").await;

    assert!(matches!(result, Err(DomainError::Validation { .. })));
    assert!(h.store.is_empty().await);
    assert_eq!(h.gateway.get_sent_code(""), None);
}

#[tokio::test]
async fn test_issue_reports_unrepresentable_expiry() {
    let h = harness();
    h.clock.set(DateTime::<Utc>::MAX_UTC);

    let result = h.service.issue(PHONE).await;

    assert!(matches!(result, Err(DomainError::Internal { .. })));
    assert!(h.store.is_empty().await);
    assert_eq!(h.gateway.get_sent_code(PHONE), None);
}

#[tokio::test]
async fn test_multibyte_identifier_lifecycle() {
    let h = harness();

    assert_eq!(h.service.verify("€€", Some("123456")).await, VerifyOutcome::NotFound);

    h.service.issue("€€").await.unwrap();
    let code = h.gateway.get_sent_code("€€").unwrap();
    assert_eq!(
        h.service.verify("€€", Some("000000")).await,
        VerifyOutcome::IncorrectCode { remaining_attempts: 2 }
    );
    assert_eq!(h.service.verify("€€", Some(&code)).await, VerifyOutcome::Success);
}

#[tokio::test]
async fn test_delivery_failure_creates_no_record() {
    let h = harness();
    h.gateway.set_should_fail(true);

    let result = h.service.issue(PHONE).await;

    match result {
        Err(DomainError::Delivery { provider, message }) => {
            assert_eq!(provider, "Mock");
            assert_eq!(message, "gateway unavailable");
        }
        other => panic!("Expected delivery error, got {:?}", other),
    }
    assert!(!h.store.contains(PHONE).await);
    assert_eq!(h.service.verify(PHONE, Some("123456")).await, VerifyOutcome::NotFound);
}

#[tokio::test]
async fn test_delivery_failure_keeps_previous_record() {
    let h = harness();
    h.service.issue(PHONE).await.unwrap();
    let first_code = h.gateway.get_sent_code(PHONE).unwrap();

    h.gateway.set_should_fail(true);
    assert!(h.service.issue(PHONE).await.is_err());

    // The outstanding code is still the one that was actually delivered
    assert_eq!(
        h.service.verify(PHONE, Some(&first_code)).await,
        VerifyOutcome::Success
    );
}

#[tokio::test]
async fn test_store_untouched_while_delivery_in_flight() {
    let store = Arc::new(OtpStore::new());
    let gateway = Arc::new(ObservingGateway::new(store.clone()));
    let service = OtpService::new(gateway.clone(), store.clone(), OtpServiceConfig::default());

    service.issue(PHONE).await.unwrap();
    assert_eq!(
        service.verify(PHONE, Some("000000")).await,
        VerifyOutcome::IncorrectCode { remaining_attempts: 2 }
    );
    service.issue(PHONE).await.unwrap();

    // First send saw no record; the re-issue still saw the old record with its
    // failed attempt, so nothing was written before delivery succeeded.
    let seen = gateway.attempts_seen_during_send.lock().unwrap().clone();
    assert_eq!(seen, vec![None, Some(1)]);
    assert_eq!(store.attempts(PHONE).await, Some(0));
}

#[tokio::test]
async fn test_verify_success_consumes_code() {
    let h = harness();
    h.service.issue(PHONE).await.unwrap();
    let code = h.gateway.get_sent_code(PHONE).unwrap();

    assert_eq!(h.service.verify(PHONE, Some(&code)).await, VerifyOutcome::Success);
    assert!(!h.store.contains(PHONE).await);

    // Replay of the same code
    assert_eq!(h.service.verify(PHONE, Some(&code)).await, VerifyOutcome::NotFound);
}

#[tokio::test]
async fn test_verify_attempt_ceiling() {
    let h = harness();
    h.service.issue(PHONE).await.unwrap();
    let code = h.gateway.get_sent_code(PHONE).unwrap();

    // Generated codes never start with 0, so "000000" is always wrong
    assert_eq!(
        h.service.verify(PHONE, Some("000000")).await,
        VerifyOutcome::IncorrectCode { remaining_attempts: 2 }
    );
    assert_eq!(
        h.service.verify(PHONE, Some("000000")).await,
        VerifyOutcome::IncorrectCode { remaining_attempts: 1 }
    );
    assert_eq!(
        h.service.verify(PHONE, Some("000000")).await,
        VerifyOutcome::TooManyAttempts
    );

    assert!(!h.store.contains(PHONE).await);
    assert_eq!(h.service.verify(PHONE, Some(&code)).await, VerifyOutcome::NotFound);
}

#[tokio::test]
async fn test_verify_expired_code() {
    let h = harness();
    h.service.issue(PHONE).await.unwrap();
    let code = h.gateway.get_sent_code(PHONE).unwrap();

    h.clock.advance(Duration::minutes(5) + Duration::seconds(1));

    assert_eq!(h.service.verify(PHONE, Some(&code)).await, VerifyOutcome::Expired);
    assert!(!h.store.contains(PHONE).await);
    assert_eq!(h.service.verify(PHONE, Some(&code)).await, VerifyOutcome::NotFound);
}

#[tokio::test]
async fn test_verify_at_exact_expiry_still_accepted() {
    let h = harness();
    h.service.issue(PHONE).await.unwrap();
    let code = h.gateway.get_sent_code(PHONE).unwrap();

    h.clock.advance(Duration::minutes(5));

    assert_eq!(h.service.verify(PHONE, Some(&code)).await, VerifyOutcome::Success);
}

#[tokio::test]
async fn test_expiry_checked_before_code() {
    let h = harness();
    h.service.issue(PHONE).await.unwrap();

    h.clock.advance(Duration::minutes(10));

    // A wrong code against an expired record is reported as expiry, not a miss
    assert_eq!(h.service.verify(PHONE, Some("000000")).await, VerifyOutcome::Expired);
}

#[tokio::test]
async fn test_verify_missing_code() {
    let h = harness();

    // No record wins over a missing code
    assert_eq!(h.service.verify(PHONE, None).await, VerifyOutcome::NotFound);

    h.service.issue(PHONE).await.unwrap();
    assert_eq!(h.service.verify(PHONE, None).await, VerifyOutcome::BadRequest);
    assert_eq!(h.service.verify(PHONE, Some("")).await, VerifyOutcome::BadRequest);

    // Bad requests do not count as attempts
    assert_eq!(h.store.attempts(PHONE).await, Some(0));
}

#[tokio::test]
async fn test_reissue_invalidates_previous_code() {
    let h = harness();
    h.service.issue(PHONE).await.unwrap();
    let first_code = h.gateway.get_sent_code(PHONE).unwrap();

    h.service.issue(PHONE).await.unwrap();
    let second_code = h.gateway.get_sent_code(PHONE).unwrap();

    let outcome = h.service.verify(PHONE, Some(&first_code)).await;
    if first_code != second_code {
        assert_eq!(outcome, VerifyOutcome::IncorrectCode { remaining_attempts: 2 });
        assert_eq!(
            h.service.verify(PHONE, Some(&second_code)).await,
            VerifyOutcome::Success
        );
    }
}

#[tokio::test]
async fn test_reissue_resets_attempts_and_expiry() {
    let h = harness();
    h.service.issue(PHONE).await.unwrap();
    h.service.verify(PHONE, Some("000000")).await;
    h.service.verify(PHONE, Some("000000")).await;
    assert_eq!(h.store.attempts(PHONE).await, Some(2));

    h.clock.advance(Duration::minutes(4));
    let issued = h.service.issue(PHONE).await.unwrap();

    assert_eq!(h.store.attempts(PHONE).await, Some(0));
    assert_eq!(issued.expires_at, h.clock.now() + Duration::minutes(5));
}

#[tokio::test]
async fn test_identifiers_are_independent() {
    let h = harness();
    let other = "+442071838750";
    h.service.issue(PHONE).await.unwrap();
    h.service.issue(other).await.unwrap();
    let other_code = h.gateway.get_sent_code(other).unwrap();

    for _ in 0..3 {
        h.service.verify(PHONE, Some("000000")).await;
    }

    assert!(!h.store.contains(PHONE).await);
    assert_eq!(h.service.verify(other, Some(&other_code)).await, VerifyOutcome::Success);
}

#[tokio::test]
async fn test_custom_config() {
    let h = harness_with_config(OtpServiceConfig {
        code_length: 8,
        lifetime: Duration::minutes(1),
        max_attempts: 5,
    });
    h.service.issue(PHONE).await.unwrap();
    let code = h.gateway.get_sent_code(PHONE).unwrap();
    assert_eq!(code.len(), 8);

    assert_eq!(
        h.service.verify(PHONE, Some("00000000")).await,
        VerifyOutcome::IncorrectCode { remaining_attempts: 4 }
    );

    h.clock.advance(Duration::seconds(61));
    assert_eq!(h.service.verify(PHONE, Some(&code)).await, VerifyOutcome::Expired);
}

#[tokio::test]
async fn test_service_accessors() {
    let h = harness();
    assert_eq!(h.service.provider_name(), "Mock");
    assert_eq!(h.service.config().max_attempts, 3);
    assert!(Arc::ptr_eq(h.service.store(), &h.store));
}
