#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use http_body_util::BodyExt;
use naukri_cv_scraper::{AppState, api::routes::create_router, config::Config};
use serde_json::Value;
use tower::ServiceExt;

/// How the fake n8n webhook answers.
#[derive(Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, &'static str),
    Delayed(Duration, Value),
}

#[derive(Clone)]
struct WebhookState {
    reply: Reply,
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
    last_auth: Arc<Mutex<Option<String>>>,
}

pub struct MockWebhook {
    pub url: String,
    hits: Arc<AtomicUsize>,
    last_body: Arc<Mutex<Option<Value>>>,
    last_auth: Arc<Mutex<Option<String>>>,
}

impl MockWebhook {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().unwrap().clone()
    }

    pub fn last_auth(&self) -> Option<String> {
        self.last_auth.lock().unwrap().clone()
    }
}

async fn webhook(State(state): State<WebhookState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_body.lock().unwrap() = Some(body);
    *state.last_auth.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match state.reply {
        Reply::Json(status, value) => (status, Json(value)).into_response(),
        Reply::Text(status, text) => (status, text).into_response(),
        Reply::Delayed(delay, value) => {
            tokio::time::sleep(delay).await;
            Json(value).into_response()
        }
    }
}

/// Starts a fake n8n webhook on an ephemeral port.
pub async fn spawn_webhook(reply: Reply) -> MockWebhook {
    let state = WebhookState {
        reply,
        hits: Arc::new(AtomicUsize::new(0)),
        last_body: Arc::new(Mutex::new(None)),
        last_auth: Arc::new(Mutex::new(None)),
    };
    let mock = MockWebhook {
        url: String::new(),
        hits: state.hits.clone(),
        last_body: state.last_body.clone(),
        last_auth: state.last_auth.clone(),
    };

    let app = Router::new().route("/webhook/naukri-scrapper", post(webhook)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    let addr: SocketAddr = listener.local_addr().expect("local_addr failed");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    MockWebhook {
        url: format!("http://{}/webhook/naukri-scrapper", addr),
        ..mock
    }
}

/// A URL on a port that nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind failed");
    let addr = listener.local_addr().expect("local_addr failed");
    drop(listener);
    format!("http://{}/webhook/naukri-scrapper", addr)
}

pub fn app_for(config: Config) -> Router {
    create_router(AppState::new(config).expect("app state must build"))
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builder must not fail")
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("handler should respond");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("response body must be readable")
        .to_bytes();
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let text = std::str::from_utf8(bytes.as_ref()).unwrap_or("<non-utf8>");
    let value = serde_json::from_slice(bytes.as_ref())
        .unwrap_or_else(|err| panic!("invalid json: {err}; body={text}"));
    (status, value)
}

pub fn profiles(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| serde_json::json!({"name": format!("Candidate {i}"), "experience": "5 years"}))
            .collect(),
    )
}
