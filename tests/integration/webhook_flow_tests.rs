//! Webhook Flow Integration Tests
//!
//! Tests the full webhook processing flow through the router:
//! - Migration detection and dispatch
//! - Deduplication of repeated signatures
//! - Exclusion of the LP seed transfer
//! - Fail-soft enrichment and delivery
//! - Authorization header enforcement

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use migration_sentinel::config::AppConfig;
use migration_sentinel::constants::migration::RAYDIUM_MIGRATION_ACCOUNT;
use migration_sentinel::enrichment::MetadataSource;
use migration_sentinel::error::{AppError, AppResult};
use migration_sentinel::metrics::MetricsState;
use migration_sentinel::models::{FirstTransaction, HolderEntry, HolderInfo, TokenMetadata};
use migration_sentinel::notifications::{CompositeNotifier, NotificationMessage, NotificationService};
use migration_sentinel::server::{build_router, pipeline_with};

const MINT: &str = "7GCihgDB8fe6KNjn2MYtkzZcRjQy3t9GHdC8uHYmW2hr";

// =============================================================================
// TEST DOUBLES
// =============================================================================

/// Metadata source with canned data and call counting
struct MockSource {
    fail: bool,
    calls: AtomicUsize,
}

impl MockSource {
    fn healthy() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(AppError::Http("simulated network error".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MetadataSource for MockSource {
    async fn token_metadata(&self, _mint: &str) -> AppResult<TokenMetadata> {
        self.check()?;
        Ok(TokenMetadata {
            name: "Moon Cat".to_string(),
            symbol: "MCAT".to_string(),
        })
    }

    async fn first_transaction(&self, _mint: &str) -> AppResult<Option<FirstTransaction>> {
        self.check()?;
        Ok(Some(FirstTransaction {
            signature: "firstSig".to_string(),
            slot: 250_000_000,
            block_time: Some(chrono::Utc::now().timestamp() - 45 * 60),
        }))
    }

    async fn holder_distribution(&self, _mint: &str) -> AppResult<HolderInfo> {
        self.check()?;
        Ok(HolderInfo::from_accounts(vec![
            HolderEntry {
                owner: "HolderA111111111111111111111111111111111111".to_string(),
                amount: 206_900_000_000_000,
            },
            HolderEntry {
                owner: "HolderB111111111111111111111111111111111111".to_string(),
                amount: 10_000_000_000_000,
            },
        ]))
    }
}

/// Notification service that records messages, optionally failing
struct RecordingNotifier {
    fail: bool,
    sent: Mutex<Vec<String>>,
    attempts: AtomicUsize,
}

impl RecordingNotifier {
    fn new(fail: bool) -> Arc<Self> {
        Arc::new(Self {
            fail,
            sent: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    async fn send(&self, message: &NotificationMessage) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("Telegram API error: 500");
        }
        self.sent.lock().push(message.as_str().to_string());
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

fn app(
    source: Arc<MockSource>,
    notifier: Arc<RecordingNotifier>,
    auth_token: Option<&str>,
) -> Router {
    let config = AppConfig::default();
    let metrics = Arc::new(MetricsState::new());

    let mut composite = CompositeNotifier::new();
    composite.add_service(notifier);

    let pipeline = pipeline_with(&config, source, Arc::new(composite), metrics.clone());
    build_router(Arc::new(pipeline), metrics, auth_token)
}

fn migration_event(signature: &str, amount: f64) -> Value {
    json!({
        "signature": signature,
        "type": "TRANSFER",
        "tokenTransfers": [{
            "fromUserAccount": "BondingCurve1111111111111111111111111111111",
            "toUserAccount": RAYDIUM_MIGRATION_ACCOUNT,
            "mint": MINT,
            "tokenAmount": amount
        }]
    })
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// DETECTION TESTS
// =============================================================================

/// One migration and one unrelated event produce exactly one alert
#[tokio::test]
async fn test_batch_dispatches_single_migration() {
    let source = MockSource::healthy();
    let notifier = RecordingNotifier::new(false);
    let router = app(source.clone(), notifier.clone(), None);

    let batch = json!([
        migration_event("sigMigration", 793_100_000.0),
        {
            "signature": "sigUnrelated",
            "tokenTransfers": [{
                "toUserAccount": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
                "mint": MINT,
                "tokenAmount": 5.0
            }]
        }
    ]);

    let response = router.oneshot(post("/", batch)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "success"}));

    let sent = notifier.sent.lock();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Moon Cat (MCAT)"));
    assert!(sent[0].contains("<b>Holders:</b> 2"));
    assert!(sent[0].contains("♻️ LP"));
    assert!(sent[0].contains("<b>Time to bond:</b> 45m"));
    assert_eq!(source.calls(), 3);
}

/// A single event object is accepted as well as an array
#[tokio::test]
async fn test_single_object_payload() {
    let notifier = RecordingNotifier::new(false);
    let router = app(MockSource::healthy(), notifier.clone(), None);

    let response = router
        .oneshot(post("/webhook", migration_event("sigSingle", 1_000.0)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(notifier.sent.lock().len(), 1);
}

/// Replayed signature is a no-op without further enrichment calls
#[tokio::test]
async fn test_duplicate_signature_is_noop() {
    let source = MockSource::healthy();
    let notifier = RecordingNotifier::new(false);
    let router = app(source.clone(), notifier.clone(), None);

    let first = router
        .clone()
        .oneshot(post("/", json!([migration_event("sigDup", 1_000.0)])))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let calls_after_first = source.calls();

    let second = router
        .oneshot(post("/", json!([migration_event("sigDup", 1_000.0)])))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(json_body(second).await, json!({"status": "success"}));

    assert_eq!(notifier.sent.lock().len(), 1);
    assert_eq!(source.calls(), calls_after_first);
}

/// Duplicate within one batch is processed once
#[tokio::test]
async fn test_duplicate_within_batch() {
    let notifier = RecordingNotifier::new(false);
    let router = app(MockSource::healthy(), notifier.clone(), None);

    let batch = json!([
        migration_event("sigTwice", 1_000.0),
        migration_event("sigTwice", 1_000.0)
    ]);
    router.oneshot(post("/", batch)).await.unwrap();

    assert_eq!(notifier.sent.lock().len(), 1);
}

/// The 4042-token LP seed transfer never alerts
#[tokio::test]
async fn test_seed_transfer_excluded() {
    let source = MockSource::healthy();
    let notifier = RecordingNotifier::new(false);
    let router = app(source.clone(), notifier.clone(), None);

    let response = router
        .oneshot(post("/", json!([migration_event("sigSeed", 4042.0)])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(notifier.sent.lock().is_empty());
    assert_eq!(source.calls(), 0);
}

/// Events without token transfers or signature are ignored
#[tokio::test]
async fn test_malformed_events_ignored() {
    let notifier = RecordingNotifier::new(false);
    let router = app(MockSource::healthy(), notifier.clone(), None);

    let batch = json!([
        {"signature": "sigNoTransfers"},
        {"tokenTransfers": [{"toUserAccount": RAYDIUM_MIGRATION_ACCOUNT, "mint": MINT, "tokenAmount": 10}]},
        "not an object",
        migration_event("sigValid", 10.0)
    ]);

    let response = router.oneshot(post("/", batch)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(notifier.sent.lock().len(), 1);
}

// =============================================================================
// FAIL-SOFT TESTS
// =============================================================================

/// Enrichment failures fall back to defaults and still dispatch
#[tokio::test]
async fn test_enrichment_failure_still_dispatches() {
    let notifier = RecordingNotifier::new(false);
    let router = app(MockSource::failing(), notifier.clone(), None);

    let response = router
        .oneshot(post("/", json!([migration_event("sigFail", 1_000.0)])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = notifier.sent.lock();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("Unknown (Unknown)"));
    assert!(sent[0].contains("<b>Holders:</b> 0"));
    assert!(sent[0].contains("<b>Time to bond:</b> Unknown"));
}

/// Delivery failure is swallowed and the signature stays processed
#[tokio::test]
async fn test_dispatch_failure_returns_success() {
    let notifier = RecordingNotifier::new(true);
    let router = app(MockSource::healthy(), notifier.clone(), None);

    let response = router
        .clone()
        .oneshot(post("/", json!([migration_event("sigUndelivered", 1_000.0)])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"status": "success"}));
    assert_eq!(notifier.attempts.load(Ordering::SeqCst), 1);

    // No retry on redelivery
    router
        .oneshot(post("/", json!([migration_event("sigUndelivered", 1_000.0)])))
        .await
        .unwrap();
    assert_eq!(notifier.attempts.load(Ordering::SeqCst), 1);
}

/// Unparseable body answers 200 with an error status
#[tokio::test]
async fn test_invalid_json_reported_in_body() {
    let router = app(MockSource::healthy(), RecordingNotifier::new(false), None);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());
}

// =============================================================================
// AUTH TESTS
// =============================================================================

#[tokio::test]
async fn test_auth_header_required_when_configured() {
    let notifier = RecordingNotifier::new(false);
    let router = app(MockSource::healthy(), notifier.clone(), Some("hook-secret"));

    let missing = router
        .clone()
        .oneshot(post("/", json!([migration_event("sigAuth", 1_000.0)])))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let mut wrong = post("/", json!([migration_event("sigAuth", 1_000.0)]));
    wrong
        .headers_mut()
        .insert(header::AUTHORIZATION, "other".parse().unwrap());
    let wrong = router.clone().oneshot(wrong).await.unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert!(notifier.sent.lock().is_empty());

    let mut valid = post("/", json!([migration_event("sigAuth", 1_000.0)]));
    valid
        .headers_mut()
        .insert(header::AUTHORIZATION, "hook-secret".parse().unwrap());
    let valid = router.oneshot(valid).await.unwrap();
    assert_eq!(valid.status(), StatusCode::OK);
    assert_eq!(notifier.sent.lock().len(), 1);
}

#[tokio::test]
async fn test_health_open_when_auth_configured() {
    let router = app(MockSource::healthy(), RecordingNotifier::new(false), Some("hook-secret"));

    let response = router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// DIAGNOSTIC ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_and_test_endpoints() {
    let router = app(MockSource::healthy(), RecordingNotifier::new(false), None);

    let health = router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let body = json_body(health).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["processed_signatures"], 0);

    let test = router
        .clone()
        .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(test.status(), StatusCode::OK);
    assert_eq!(json_body(test).await, json!({"message": "Test endpoint working"}));

    let metrics = router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(metrics.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_response_carries_request_id() {
    let router = app(MockSource::healthy(), RecordingNotifier::new(false), None);

    let response = router
        .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
