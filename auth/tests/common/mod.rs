#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use auth::{AuthSubject, Authenticator, StoreError, SubjectExistenceChecker, SubjectId, TokenCodec};
use axum::{
    Json, Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
    routing::get,
};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const SECRET: &[u8] = b"integration-test-secret";

pub fn codec() -> TokenCodec {
    TokenCodec::new(SECRET, 300)
}

pub fn token_for(id: i64) -> String {
    codec().issue(SubjectId::new(id).unwrap()).unwrap()
}

/// In-memory identity store that counts lookups.
#[derive(Clone, Default)]
pub struct MemoryStore {
    ids: Arc<HashSet<i64>>,
    pub lookups: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn with(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: Arc::new(ids.into_iter().collect()),
            lookups: Arc::default(),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubjectExistenceChecker for MemoryStore {
    async fn exists(&self, id: SubjectId) -> Result<bool, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        // Yield so concurrent requests interleave.
        tokio::task::yield_now().await;
        Ok(self.ids.contains(&id.as_i64()))
    }
}

pub struct FailingStore;

#[async_trait]
impl SubjectExistenceChecker for FailingStore {
    async fn exists(&self, _id: SubjectId) -> Result<bool, StoreError> {
        Err(StoreError::new(std::io::Error::other("connection refused")))
    }
}

async fn whoami(AuthSubject(id): AuthSubject, headers: HeaderMap) -> Json<Value> {
    let header = headers
        .get("subject")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Json(json!({"subject": id.as_i64(), "header": header}))
}

/// `/whoami` protected, `/public` not.
pub fn app(auth: Authenticator) -> Router {
    let protected = Router::new().route("/whoami", get(whoami));
    auth::middleware::apply(protected, auth).route("/public", get(|| async { "public" }))
}

pub async fn send(app: Router, token: Option<&str>) -> (StatusCode, Value) {
    send_with(app, token, &[]).await
}

pub async fn send_with(
    app: Router,
    token: Option<&str>,
    extra: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut req = Request::builder().uri("/whoami");
    if let Some(token) = token {
        req = req.header("token", token);
    }
    for (k, v) in extra {
        req = req.header(*k, *v);
    }

    let response = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// An identity service exposing the verification endpoint over `store`.
pub async fn spawn_identity_service<C>(store: C) -> String
where
    C: SubjectExistenceChecker + 'static,
{
    spawn_verification_endpoint(Authenticator::local(codec(), store)).await
}

/// Serve the verification endpoint backed by `auth`.
pub async fn spawn_verification_endpoint(auth: Authenticator) -> String {
    let router = Router::new()
        .route("/api/v1/auth", get(auth::endpoint::verify_token))
        .with_state(auth);
    format!("{}/api/v1/auth", spawn(router).await)
}
