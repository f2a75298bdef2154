//! # Test harness
//!
//! [`TestApp`] builds the full axum router over the in-memory repositories,
//! a cheap Argon2 profile and a notifier that records every broadcast, then
//! drives it in-process with `tower::ServiceExt::oneshot`.

#![cfg(feature = "web-axum")]

use std::sync::Arc;
use std::time::Duration;

use api_adapters::{router, AppState, Metrics};
use argon2::Params;
use async_trait::async_trait;
use auth_adapters::{Argon2PasswordHasher, JwtTokenService};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use domains::{DomainResult, Notifier, TokenService, WarningMessage};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{json, Value};
use services::{
    AccessGate, CommunityService, GovernanceService, KnowledgeService, NotificationDispatcher,
    UserService, WarningService,
};
use storage_adapters::{
    MemoryContentRepository, MemoryGovernanceRepository, MemoryKnowledgeRepository,
    MemoryUserRepository, MemoryWarningRepository,
};
use tokio::sync::{mpsc, Mutex};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "secret1";

/// One `broadcast_warning` call as the notifier saw it.
#[derive(Debug, Clone)]
pub struct Broadcast {
    pub recipients: Vec<String>,
    pub warning: WarningMessage,
}

pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<Broadcast>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn broadcast_warning(&self, recipients: &[String], warning: &WarningMessage) -> DomainResult<usize> {
        let _ = self.tx.send(Broadcast {
            recipients: recipients.to_vec(),
            warning: warning.clone(),
        });
        Ok(recipients.len())
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.text).unwrap_or(Value::Null)
    }
}

pub struct TestApp {
    router: Router,
    tokens: JwtTokenService,
    broadcasts: Mutex<mpsc::UnboundedReceiver<Broadcast>>,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserRepository::new());
        // Minimum Argon2 cost keeps the suite fast.
        let params = Params::new(8, 1, 1, None).unwrap();
        let hasher = Arc::new(Argon2PasswordHasher::with_params(params));
        let secret = SecretString::from(TEST_SECRET);
        let tokens = JwtTokenService::new(&secret, chrono::Duration::minutes(30));

        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = NotificationDispatcher::new(
            users.clone(),
            Arc::new(RecordingNotifier { tx }),
            Duration::from_secs(5),
        );

        let state = AppState {
            users: Arc::new(UserService::new(users.clone(), hasher)),
            gate: Arc::new(AccessGate::new(users, Arc::new(tokens.clone()))),
            community: Arc::new(CommunityService::new(Arc::new(MemoryContentRepository::new()))),
            governance: Arc::new(GovernanceService::new(Arc::new(MemoryGovernanceRepository::new()))),
            knowledge: Arc::new(KnowledgeService::new(Arc::new(MemoryKnowledgeRepository::new()))),
            warnings: Arc::new(WarningService::new(Arc::new(MemoryWarningRepository::new()), dispatcher)),
            metrics: Arc::new(Metrics::new()),
        };

        Self {
            router: router(state),
            tokens,
            broadcasts: Mutex::new(rx),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            text: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// JSON request, optionally authenticated.
    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    pub async fn register(&self, email: &str, role: &str) -> TestResponse {
        let body = json!({
            "email": email,
            "username": email.split('@').next().unwrap_or(email),
            "password": PASSWORD,
            "role": role,
        });
        self.call(Method::POST, "/api/v1/users/register", None, Some(body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v1/users/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={email}&password={password}")))
            .unwrap();
        self.send(request).await
    }

    /// Registers `email` with `role` and returns `(user id, access token)`.
    pub async fn signup(&self, email: &str, role: &str) -> (i64, String) {
        let registered = self.register(email, role).await;
        assert_eq!(registered.status, StatusCode::OK, "{}", registered.text);
        let id = registered.json()["id"].as_i64().unwrap();

        let login = self.login(email, PASSWORD).await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.text);
        let token = login.json()["access_token"].as_str().unwrap().to_owned();
        (id, token)
    }

    /// A fresh, correctly signed token for `user_id`, whether or not it exists.
    pub fn token_for(&self, user_id: i64) -> String {
        self.tokens.issue(user_id, self.tokens.default_ttl()).unwrap()
    }

    /// A correctly signed token for `user_id` that expired a minute ago.
    pub fn expired_token(&self, user_id: i64) -> String {
        self.tokens.issue(user_id, chrono::Duration::minutes(-1)).unwrap()
    }

    /// Waits for the next warning broadcast.
    pub async fn next_broadcast(&self) -> Option<Broadcast> {
        let mut rx = self.broadcasts.lock().await;
        tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.ok().flatten()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
