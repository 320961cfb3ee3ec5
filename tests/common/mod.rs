#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use openphotobox::api::ApiClient;
use openphotobox::session::{MemoryStore, SharedStorage};
use openphotobox::{AppContext, ClientConfig};

pub const GOOD_TOKEN: &str = "tok-1";

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct MockState {
    pub requests: Mutex<Vec<Recorded>>,
    pub needs_setup: AtomicBool,
    pub storage_configured: AtomicBool,
    pub event_connections: AtomicUsize,
    pub uploads: AtomicUsize,
}

/// In-process stand-in for the photo backend, bound to an ephemeral localhost port.
pub struct MockBackend {
    pub base: String,
    pub state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl Drop for MockBackend {
    fn drop(&mut self) { self.handle.abort(); }
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        state.storage_configured.store(true, Ordering::SeqCst);
        let app = Router::new()
            .route("/api/auth/login/", post(login))
            .route("/api/auth/logout/", post(|| async { StatusCode::NO_CONTENT }))
            .route("/api/auth/me/", get(me))
            .route("/api/setup/check/", get(setup_check))
            .route("/api/assets/storage/status/", get(storage_status))
            .route("/api/assets/upload_file/", post(upload_file))
            .route("/api/albums/", get(list_albums))
            .route("/api/albums/{id}/", delete(|| async { StatusCode::NO_CONTENT }))
            .route("/api/assets/{id}/", get(get_asset))
            .route("/api/events/stream/", get(events))
            .route("/api/plain/", get(|| async { "all good" }))
            .route("/media/full.jpg", get(|| async { ([(header::CONTENT_TYPE, "image/jpeg")], vec![0xffu8, 0xd8, 0xff]) }))
            .route("/media/slow.jpg", get(slow_image))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = TcpListener::bind(("127.0.0.1", 0)).await.expect("bind 127.0.0.1:0");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("mock backend error: {e:?}");
            }
        });
        MockBackend { base: format!("http://{}", addr), state, handle }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.base).expect("mock base url").with_reconnect_delay(Duration::from_millis(50))
    }

    pub fn client(&self, token: Option<&str>) -> ApiClient {
        let token = token.map(str::to_string);
        ApiClient::new(self.config(), Arc::new(move || token.clone())).expect("client")
    }

    pub fn context(&self) -> (AppContext, SharedStorage) {
        let storage = MemoryStore::shared();
        let ctx = AppContext::with_storage(self.config(), storage.clone()).expect("context");
        (ctx, storage)
    }

    pub fn requests(&self) -> Vec<Recorded> { self.state.requests.lock().clone() }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }
}

async fn record(State(state): State<Arc<MockState>>, req: Request, next: Next) -> Response {
    let rec = Recorded {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        authorization: req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_string),
    };
    state.requests.lock().push(rec);
    next.run(req).await
}

fn user_json() -> Value {
    json!({"id": 1, "username": "ana", "email": "ana@example.com", "is_admin": true})
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "ana" && body["password"] == "secret" {
        Json(json!({"token": GOOD_TOKEN, "user": user_json()})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid credentials"}))).into_response()
    }
}

async fn me(headers: HeaderMap) -> Response {
    let auth = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
    if auth == Some(format!("Token {}", GOOD_TOKEN).as_str()) {
        Json(json!({"user": user_json()})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"detail": "Authentication credentials were not provided."}))).into_response()
    }
}

async fn setup_check(State(state): State<Arc<MockState>>) -> Json<Value> {
    let needs = state.needs_setup.load(Ordering::SeqCst);
    Json(json!({"needs_setup": needs, "configured": !needs}))
}

async fn storage_status(State(state): State<Arc<MockState>>) -> Json<Value> {
    Json(json!({"configured": state.storage_configured.load(Ordering::SeqCst), "path": "/srv/photos"}))
}

async fn upload_file(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let ct = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or("");
    if !ct.starts_with("multipart/form-data") {
        return (StatusCode::UNSUPPORTED_MEDIA_TYPE, Json(json!({"error": "expected multipart"}))).into_response();
    }
    let text = String::from_utf8_lossy(&body);
    if text.contains("broken.jpg") {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "disk full"}))).into_response();
    }
    let n = state.uploads.fetch_add(1, Ordering::SeqCst) + 1;
    let id = format!("asset-{}", n);
    (
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "sha256": "abc123",
            "storage_url": format!("/media/{}.jpg", id),
            "mime_type": "image/jpeg",
            "has_caption": text.contains("\"caption\""),
        })),
    )
        .into_response()
}

async fn list_albums() -> Json<Value> {
    Json(json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [{
            "id": "al-1",
            "title": "Summer",
            "photo_count": 12,
            "created_at": "2024-06-01T10:00:00Z",
            "updated_at": "2024-06-02T10:00:00Z"
        }]
    }))
}

async fn get_asset(Path(id): Path<String>) -> Response {
    if id == "weird" {
        return Json(json!({"id": 5})).into_response();
    }
    Json(json!({
        "id": id,
        "filename": "beach.jpg",
        "storage_url": "/media/full.jpg",
        "thumbnail_url": "/media/thumb.jpg",
        "created_at": "2024-06-01T10:00:00Z",
        "updated_at": "2024-06-01T10:00:00Z"
    }))
    .into_response()
}

/// Sends one `asset_ready` event per connection and then closes the stream.
async fn events(State(state): State<Arc<MockState>>) -> Sse<futures::stream::Iter<std::vec::IntoIter<Result<Event, Infallible>>>> {
    state.event_connections.fetch_add(1, Ordering::SeqCst);
    let items = vec![
        Ok(Event::default().event("asset_ready").data(r#"{"id":"42"}"#)),
        Ok(Event::default().event("other").data("{}")),
    ];
    Sse::new(futures::stream::iter(items))
}

async fn slow_image() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_millis(300)).await;
    vec![1u8, 2, 3]
}

/// Polls `cond` every 10ms until it holds or `timeout` passes.
pub async fn wait_for(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    cond()
}
