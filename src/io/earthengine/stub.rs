//! Loopback stand-in for Google's token endpoint and the Earth Engine REST API.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Bytes;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use super::auth::{JWT_BEARER_GRANT, ServiceAccountKey};

pub(crate) const PROJECT: &str = "p";
pub(crate) const TEST_PRIVATE_KEY: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/test_rsa_key.pem"
));
pub(crate) const TEST_PUBLIC_KEY: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/test_rsa_key.pub.pem"
));

/// Service-account key signed with the fixture RSA key, pointed at `token_uri`.
pub(crate) fn test_key(token_uri: &str) -> ServiceAccountKey {
    ServiceAccountKey {
        project_id: PROJECT.to_string(),
        private_key_id: Some("kid-1".to_string()),
        private_key: TEST_PRIVATE_KEY.to_string(),
        client_email: "svc@p.iam.gserviceaccount.com".to_string(),
        token_uri: token_uri.to_string(),
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// Issues `tok-1`, `tok-2`, ... from `POST /token` and answers every other
/// path from a table of canned replies.
pub(crate) struct GoogleStub {
    reject_tokens: bool,
    expires_in: i64,
    tokens_issued: AtomicUsize,
    assertions: Mutex<Vec<String>>,
    replies: Mutex<HashMap<String, (StatusCode, Value)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Default for GoogleStub {
    fn default() -> Self {
        Self {
            reject_tokens: false,
            expires_in: 3600,
            tokens_issued: AtomicUsize::new(0),
            assertions: Mutex::new(Vec::new()),
            replies: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl GoogleStub {
    /// Token endpoint answers every assertion with `invalid_grant`.
    pub fn rejecting_tokens() -> Self {
        Self {
            reject_tokens: true,
            ..Default::default()
        }
    }

    /// Tokens are issued with the given `expires_in`.
    pub fn with_token_lifetime(expires_in: i64) -> Self {
        Self {
            expires_in,
            ..Default::default()
        }
    }

    /// Canned reply for `path`, relative to the server root.
    pub fn reply(&self, path: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap();
        self.replies
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body));
    }

    pub fn tokens_issued(&self) -> usize {
        self.tokens_issued.load(Ordering::SeqCst)
    }

    pub fn assertions(&self) -> Vec<String> {
        self.assertions.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Serves the stub on an ephemeral loopback port and returns its base URL.
    pub async fn start(self: &Arc<Self>) -> String {
        let router = Router::new()
            .route("/token", post(issue_token))
            .fallback(api_call)
            .with_state(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn issue_token(
    State(stub): State<Arc<GoogleStub>>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if form.get("grant_type").map(String::as_str) != Some(JWT_BEARER_GRANT) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "unsupported_grant_type"})),
        );
    }
    if let Some(assertion) = form.get("assertion") {
        stub.assertions.lock().unwrap().push(assertion.clone());
    }
    if stub.reject_tokens {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant", "error_description": "Invalid JWT Signature."})),
        );
    }
    let n = stub.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
    (
        StatusCode::OK,
        Json(json!({
            "access_token": format!("tok-{n}"),
            "expires_in": stub.expires_in,
            "token_type": "Bearer",
        })),
    )
}

async fn api_call(
    State(stub): State<Arc<GoogleStub>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    stub.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });
    let reply = stub.replies.lock().unwrap().get(uri.path()).cloned();
    match reply {
        Some((status, reply)) => (status, Json(reply)),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": 404, "message": format!("No route for {}", uri.path())}})),
        ),
    }
}
