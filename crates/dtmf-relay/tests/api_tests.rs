//! Integration tests for the verification API.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use dtmf_relay::{
    api::{create_router, create_router_with_rate_limit, AppState, RateLimitState},
    RelayError, Registry, StartedVerification, VerificationProvider, VerificationRecord,
};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Provider that records requests and answers from a fixed script.
struct FakeProvider {
    fail: bool,
    requests: Mutex<Vec<(String, String)>>,
}

impl FakeProvider {
    fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl VerificationProvider for FakeProvider {
    async fn start_verification(
        &self,
        phone_number: &str,
        friendly_name: &str,
    ) -> Result<StartedVerification, RelayError> {
        self.requests
            .lock()
            .unwrap()
            .push((phone_number.to_string(), friendly_name.to_string()));

        if self.fail {
            return Err(RelayError::Provider(
                "21450: Phone number already verified".into(),
            ));
        }

        Ok(StartedVerification {
            session_id: "CA123".into(),
            verification_code: "482917".into(),
            friendly_name: friendly_name.to_string(),
        })
    }

    async fn health_check(&self) -> bool {
        !self.fail
    }
}

fn app(registry: Registry, provider: Arc<FakeProvider>, rate_limit: RateLimitState) -> Router {
    create_router_with_rate_limit(AppState::new(registry, provider), rate_limit)
}

fn start_verification(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/start-verification")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let registry = Registry::new();
    registry
        .put("CA123", VerificationRecord::new("+15551234567", "482917"))
        .await;
    let app = create_router(AppState::new(registry, FakeProvider::succeeding()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["pending_verifications"], 1);
    assert_eq!(json["provider_healthy"], true);
}

#[tokio::test]
async fn test_start_verification_stores_code_under_session() {
    let registry = Registry::new();
    let provider = FakeProvider::succeeding();
    let app = app(registry.clone(), provider.clone(), RateLimitState::permissive());

    let response = app
        .oneshot(start_verification(r#"{"phone_number": "+15551234567"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, "Third Party VOIP Number");

    let record = registry.get("CA123").await.unwrap();
    assert_eq!(record.phone_number, "+15551234567");
    assert_eq!(record.verification_code, "482917");

    assert_eq!(
        *provider.requests.lock().unwrap(),
        vec![(
            "+15551234567".to_string(),
            "Third Party VOIP Number".to_string()
        )]
    );
}

#[tokio::test]
async fn test_start_verification_with_friendly_name() {
    let registry = Registry::new();
    let provider = FakeProvider::succeeding();
    let app = app(registry, provider.clone(), RateLimitState::permissive());

    let response = app
        .oneshot(start_verification(
            r#"{"phone_number": "+1 (555) 123-4567", "friendly_name": "Office line"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, "Office line");
    assert_eq!(provider.requests.lock().unwrap()[0].0, "+15551234567");
}

#[tokio::test]
async fn test_provider_failure_stores_nothing() {
    let registry = Registry::new();
    let app = app(registry.clone(), FakeProvider::failing(), RateLimitState::permissive());

    let response = app
        .oneshot(start_verification(r#"{"phone_number": "+15551234567"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = json_body(response).await;
    assert_eq!(json["code"], "PROVIDER_ERROR");
    assert!(json["error"].as_str().unwrap().contains("already verified"));

    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_invalid_phone_number() {
    let registry = Registry::new();
    let provider = FakeProvider::succeeding();
    let app = app(registry.clone(), provider.clone(), RateLimitState::permissive());

    let response = app
        .oneshot(start_verification(r#"{"phone_number": "123"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_PHONE_NUMBER");
    assert!(provider.requests.lock().unwrap().is_empty());
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_number_without_country_code_is_rejected() {
    let registry = Registry::new();
    let provider = FakeProvider::succeeding();
    let app = app(registry.clone(), provider.clone(), RateLimitState::permissive());

    let response = app
        .oneshot(start_verification(r#"{"phone_number": "5551234567"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_PHONE_NUMBER");
    // never forwarded as +5551234567
    assert!(provider.requests.lock().unwrap().is_empty());
    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = app(
        Registry::new(),
        FakeProvider::succeeding(),
        RateLimitState::permissive(),
    );

    let response = app
        .oneshot(start_verification(r#"{"number": "+15551234567"}"#))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_rate_limit_applies_to_start_verification() {
    let registry = Registry::new();
    let app = app(registry, FakeProvider::succeeding(), RateLimitState::new(1));

    let first = app
        .clone()
        .oneshot(start_verification(r#"{"phone_number": "+15551234567"}"#))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .clone()
        .oneshot(start_verification(r#"{"phone_number": "+15551234567"}"#))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

    // health stays reachable
    let health = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}
