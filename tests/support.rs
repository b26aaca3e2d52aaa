#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A scripted stand-in for one platform API. Tests register a canned
/// response per "METHOD path" key; every request is recorded so tests
/// can assert call order, payload shape, and the zero-network-call
/// preconditions.
#[derive(Clone, Default)]
pub struct MockPlatform {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    responses: HashMap<String, (u16, Value)>,
    hits: Vec<Hit>,
}

#[derive(Clone, Debug)]
pub struct Hit {
    /// "METHOD path", e.g. "POST /v3/events/42/publish/".
    pub key: String,
    pub body: Value,
}

impl MockPlatform {
    pub fn respond(&self, key: &str, status: u16, body: Value) {
        self.inner
            .lock()
            .unwrap()
            .responses
            .insert(key.to_string(), (status, body));
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.inner.lock().unwrap().hits.clone()
    }

    pub fn hit_count(&self) -> usize {
        self.inner.lock().unwrap().hits.len()
    }

    pub fn hit_keys(&self) -> Vec<String> {
        self.hits().into_iter().map(|h| h.key).collect()
    }
}

async fn handle(State(mock): State<MockPlatform>, req: Request<Body>) -> Response {
    let (parts, body) = req.into_parts();
    let key = format!("{} {}", parts.method, parts.uri.path());
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    let mut inner = mock.inner.lock().unwrap();
    inner.hits.push(Hit {
        key: key.clone(),
        body,
    });
    match inner.responses.get(&key) {
        Some((status, payload)) => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::OK);
            (status, Json(payload.clone())).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A server config with no platform configured; tests fill in platform
/// credentials and point the API URLs at mocks.
pub fn base_config() -> eventfan::config::Config {
    eventfan::config::Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        auth_secret: "a-test-signing-secret-of-sufficient-length".to_string(),
        admin_email: "admin@example.com".to_string(),
        admin_password: "hunter2hunter2".to_string(),
        meetup: None,
        eventbrite: None,
        meetup_api_url: "http://unused.invalid".to_string(),
        eventbrite_api_url: "http://unused.invalid".to_string(),
    }
}

/// Binds the mock on an ephemeral loopback port and returns its base URL.
pub async fn spawn(mock: MockPlatform) -> String {
    let app = Router::new().fallback(handle).with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("mock should bind");
    let addr = listener.local_addr().expect("mock should have an address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}
