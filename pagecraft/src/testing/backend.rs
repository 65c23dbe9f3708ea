//! In-process stand-in for the template backend

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;

/// One request the backend received
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// HTTP method
    pub method: Method,
    /// Path relative to `/api`, e.g. `/templates/1/`
    pub path: String,
    /// `Authorization` header, if sent
    pub authorization: Option<String>,
    /// `Content-Type` header, if sent
    pub content_type: Option<String>,
    /// Body, lossily decoded
    pub body: String,
}

impl RecordedCall {
    /// Body parsed as JSON
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Clone)]
struct Reply {
    status: StatusCode,
    body: Value,
}

#[derive(Default)]
struct Shared {
    replies: HashMap<(Method, String), Reply>,
    calls: Vec<RecordedCall>,
}

/// Scripted backend serving `/api/...` on `127.0.0.1:<ephemeral>`
///
/// Unscripted routes answer 404 with a `detail` message. A scripted `null`
/// body is sent as an empty response.
pub struct FakeBackend {
    base_url: String,
    shared: Arc<Mutex<Shared>>,
}

impl FakeBackend {
    /// Bind and serve in a background task
    pub async fn start() -> Self {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let app = Router::new().fallback(handle).with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api"),
            shared,
        }
    }

    /// Base URL to configure clients with
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A client pointed at this backend
    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.base_url, Duration::from_secs(5)).unwrap()
    }

    /// Script the reply for `method path`
    pub fn reply(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        let reply = Reply {
            status: StatusCode::from_u16(status).unwrap(),
            body,
        };
        self.shared
            .lock()
            .replies
            .insert((method, path.to_string()), reply);
        self
    }

    /// Script a successful login for `username`
    pub fn accept_login(&self, username: &str, is_admin: bool, access: &str, refresh: &str) -> &Self {
        self.reply(
            Method::POST,
            "/auth/login/",
            200,
            json!({
                "access": access,
                "refresh": refresh,
                "user": {"id": 1, "username": username, "is_admin": is_admin}
            }),
        )
    }

    /// Every call received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.shared.lock().calls.clone()
    }

    /// Calls matching `method path`
    pub fn calls_to(&self, method: &Method, path: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == *method && call.path == path)
            .collect()
    }

    /// Number of calls matching `method path`
    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.calls_to(method, path).len()
    }
}

async fn handle(
    State(shared): State<Arc<Mutex<Shared>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/api")
        .unwrap_or_else(|| uri.path())
        .to_string();
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };

    let call = RecordedCall {
        method: method.clone(),
        path: path.clone(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let reply = {
        let mut shared = shared.lock();
        shared.calls.push(call);
        shared.replies.get(&(method, path)).cloned()
    };

    match reply {
        Some(reply) if reply.body.is_null() => reply.status.into_response(),
        Some(reply) => (reply.status, Json(reply.body)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
    }
}
