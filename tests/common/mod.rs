#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use academic_progress::app::{router, AppState};
use academic_progress::auth::{AuthError, IdentityClaim, TokenValidator};
use academic_progress::config::AppConfig;
use academic_progress::database::{MemoryProgressStore, ProgressStore, StoreError};
use academic_progress::progress::ProgressRecord;
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const STUDENT_TOKEN: &str = "token-t1-u1";
pub const OTHER_STUDENT_TOKEN: &str = "token-t1-u2";
pub const OTHER_TENANT_TOKEN: &str = "token-t2-u1";
pub const EXPIRED_TOKEN: &str = "expired";
pub const VALIDATOR_DOWN_TOKEN: &str = "validator-down";

/// Validator double that answers from a fixed table and counts calls
pub struct StubValidator {
    claims: HashMap<String, IdentityClaim>,
    calls: AtomicUsize,
}

impl StubValidator {
    pub fn new() -> Self {
        let claims = HashMap::from([
            (STUDENT_TOKEN.to_string(), IdentityClaim::new("t1", "u1")),
            (OTHER_STUDENT_TOKEN.to_string(), IdentityClaim::new("t1", "u2")),
            (OTHER_TENANT_TOKEN.to_string(), IdentityClaim::new("t2", "u1")),
        ]);
        Self {
            claims,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenValidator for StubValidator {
    async fn validate(&self, token: &str) -> Result<IdentityClaim, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match token {
            EXPIRED_TOKEN => Err(AuthError::Rejected(Some("Token expired".to_string()))),
            VALIDATOR_DOWN_TOKEN => Err(AuthError::Unavailable("connect timeout".to_string())),
            other => self
                .claims
                .get(other)
                .cloned()
                .ok_or(AuthError::Rejected(None)),
        }
    }
}

/// Store that fails every call, as an unreachable database would
pub struct FailingStore;

#[async_trait]
impl ProgressStore for FailingStore {
    async fn put_if_absent(&self, _record: &ProgressRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection reset by peer".to_string()))
    }

    async fn query_partition(&self, _partition_key: &str) -> Result<Vec<ProgressRecord>, StoreError> {
        Err(StoreError::Unavailable("connection reset by peer".to_string()))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection reset by peer".to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub validator: Arc<StubValidator>,
    pub store: Arc<dyn ProgressStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryProgressStore::new()))
    }

    pub fn with_store(store: Arc<dyn ProgressStore>) -> Self {
        let validator = Arc::new(StubValidator::new());
        let state = AppState::new(validator.clone(), store.clone());
        let router = router(state, &AppConfig::default());
        Self {
            router,
            validator,
            store,
        }
    }

    pub async fn submit(&self, token: Option<&str>, body: &Value) -> (StatusCode, Value) {
        self.send(Method::POST, "/api/progress", token, Some(body.to_string()))
            .await
    }

    pub async fn read(&self, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, "/api/progress", token, None).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is JSON")
        };
        (status, value)
    }
}

/// The record from the reference scenario
pub fn algebra_payload() -> Value {
    json!({
        "tenant_id": "t1",
        "user_id": "u1",
        "level": 3,
        "course_id": "C101",
        "course_name": "Algebra",
        "credits": 4,
        "grade": 85,
        "status": "completed",
        "period": "2024-1"
    })
}

pub fn course_payload(level: i64, course_id: &str) -> Value {
    let mut body = algebra_payload();
    body["level"] = json!(level);
    body["course_id"] = json!(course_id);
    body["course_name"] = json!(format!("Course {}", course_id));
    body
}
