//! HTTP transport shared by every endpoint module.
//!
//! All calls resolve to an [`ApiResponse`]; network failures, non-2xx statuses and
//! undecodable bodies are reported through it instead of being raised, so endpoint code
//! never has to care which of the three happened.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::types::ApiErrorBody;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Supplies the current auth token, if any, at request time.
pub type TokenSource = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Body type for endpoints whose payload is irrelevant (deletes, acknowledgements).
pub type NoContent = serde::de::IgnoredAny;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    /// HTTP status, absent when no response was received.
    pub status: Option<u16>,
    /// Parsed body of a failed response, kept for endpoints with richer error shapes.
    pub error_body: Option<Value>,
}

impl<T> ApiResponse<T> {
    pub fn ok(status: u16, data: Option<T>) -> Self {
        Self { success: true, data, error: None, status: Some(status), error_body: None }
    }

    pub fn failure(status: Option<u16>, error: impl Into<String>, error_body: Option<Value>) -> Self {
        Self { success: false, data: None, error: Some(error.into()), status, error_body }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            status: self.status,
            error_body: self.error_body,
        }
    }

    /// Converts a failed result into the matching [`ClientError`].
    pub fn error_value(&self) -> Option<ClientError> { self.error_or("Request failed") }

    /// [`error_value`](Self::error_value) with a caller-chosen message for failures
    /// that carry none. No status means the request never got a response.
    pub fn error_or(&self, fallback: &str) -> Option<ClientError> {
        if self.success { return None; }
        let msg = self.error.clone().filter(|m| !m.is_empty()).unwrap_or_else(|| fallback.to_string());
        Some(match self.status {
            Some(code) => ClientError::api(Some(code), msg),
            None => ClientError::transport(msg),
        })
    }

    /// The failed response body in the backend's standard error shape, when it has one.
    pub fn error_details(&self) -> Option<ApiErrorBody> {
        self.error_body.as_ref().filter(|b| b.is_object()).and_then(|b| serde_json::from_value(b.clone()).ok())
    }

    /// Success with an absent body yields `Ok(None)`.
    pub fn into_option(self) -> ClientResult<Option<T>> {
        if let Some(err) = self.error_value() { return Err(err); }
        Ok(self.data)
    }

    /// Like [`into_option`](Self::into_option) but a body is required.
    pub fn into_result(self) -> ClientResult<T> {
        self.into_option()?.ok_or_else(|| ClientError::decode("empty response body"))
    }
}

struct ClientInner {
    config: ClientConfig,
    http: reqwest::Client,
    token: TokenSource,
}

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("api_base", &self.inner.config.api_base).finish()
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, token: TokenSource) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { inner: Arc::new(ClientInner { config, http, token }) })
    }

    pub fn config(&self) -> &ClientConfig { &self.inner.config }

    pub fn token(&self) -> Option<String> { (self.inner.token)().filter(|t| !t.is_empty()) }

    pub(crate) fn http(&self) -> &reqwest::Client { &self.inner.http }

    pub(crate) fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.token() {
            match HeaderValue::from_str(&format!("Token {}", token)) {
                Ok(v) => { headers.insert(AUTHORIZATION, v); }
                Err(_) => warn!(target: "openphotobox::api", "auth token contains characters not allowed in a header; sending request unauthenticated"),
            }
        }
        headers
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResponse<T> {
        self.request(Method::GET, path, None).await
    }

    pub async fn get_with<T, Q>(&self, path: &str, params: Option<&Q>) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let target = match params {
            None => path.to_string(),
            Some(p) => match serde_json::to_value(p) {
                Ok(v) => with_query(path, &v),
                Err(e) => return ApiResponse::failure(None, format!("invalid query parameters: {}", e), None),
            },
        };
        self.request(Method::GET, &target, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: Option<&B>) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, path, body).await
    }

    pub async fn put<T, B>(&self, path: &str, body: Option<&B>) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, path, body).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: Option<&B>) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PATCH, path, body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResponse<T> {
        self.request(Method::DELETE, path, None).await
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = match body.map(serde_json::to_value).transpose() {
            Ok(v) => v.filter(|v| !v.is_null()),
            Err(e) => return ApiResponse::failure(None, format!("invalid request body: {}", e), None),
        };
        self.request(method, path, payload).await
    }

    async fn request<T: DeserializeOwned>(&self, method: Method, path: &str, body: Option<Value>) -> ApiResponse<T> {
        let url = self.inner.config.url_for(path);
        let mut headers = self.auth_headers();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut req = self.inner.http.request(method.clone(), &url).headers(headers);
        if let Some(b) = body {
            req = req.body(b.to_string());
        }
        match req.send().await {
            Ok(resp) => {
                let (status, parsed) = read_body(resp).await;
                debug!(target: "openphotobox::api", "{} {} -> {}", method, path, status.as_u16());
                finish(status, parsed, "Request")
            }
            Err(e) => {
                warn!(target: "openphotobox::api", "{} {} failed: {}", method, path, e);
                ApiResponse::failure(None, non_empty(e.to_string(), "Network error"), None)
            }
        }
    }

    /// Multipart POST. The content type is left to the multipart encoder so the boundary
    /// is set correctly.
    pub async fn upload<T: DeserializeOwned>(&self, path: &str, form: Form) -> ApiResponse<T> {
        let url = self.inner.config.url_for(path);
        let req = self.inner.http.post(&url).headers(self.auth_headers()).multipart(form);
        match req.send().await {
            Ok(resp) => {
                let (status, parsed) = read_body(resp).await;
                debug!(target: "openphotobox::api", "UPLOAD {} -> {}", path, status.as_u16());
                finish(status, parsed, "Upload")
            }
            Err(e) => {
                warn!(target: "openphotobox::api", "UPLOAD {} failed: {}", path, e);
                ApiResponse::failure(None, non_empty(e.to_string(), "Upload failed"), None)
            }
        }
    }

    /// Authenticated raw GET of an absolute or base-relative URL.
    pub async fn fetch_bytes(&self, url: &str) -> ClientResult<Vec<u8>> {
        let target = if url.starts_with("http://") || url.starts_with("https://") { url.to_string() } else { self.inner.config.url_for(url) };
        let resp = self.inner.http.get(&target).headers(self.auth_headers()).send().await
            .map_err(|e| ClientError::transport(non_empty(e.to_string(), "Network error")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::api(Some(status.as_u16()), status_fallback("Request", status)));
        }
        let bytes = resp.bytes().await.map_err(|e| ClientError::transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Reads a response body: JSON when advertised, nothing for 204, text otherwise.
/// Unreadable bodies become `None`.
async fn read_body(resp: reqwest::Response) -> (StatusCode, Option<Value>) {
    let status = resp.status();
    let is_json = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);
    let body = if is_json {
        resp.json::<Value>().await.ok().filter(|v| !v.is_null())
    } else if status == StatusCode::NO_CONTENT {
        None
    } else {
        resp.text().await.ok().filter(|t| !t.is_empty()).map(Value::String)
    };
    (status, body)
}

fn finish<T: DeserializeOwned>(status: StatusCode, body: Option<Value>, action: &str) -> ApiResponse<T> {
    let code = status.as_u16();
    if !status.is_success() {
        let msg = error_message(body.as_ref()).unwrap_or_else(|| status_fallback(action, status));
        return ApiResponse::failure(Some(code), msg, body);
    }
    match body {
        None => ApiResponse::ok(code, None),
        Some(v) => match T::deserialize(&v) {
            Ok(data) => ApiResponse::ok(code, Some(data)),
            Err(e) => {
                warn!(target: "openphotobox::api", "response body did not match the expected shape: {}", e);
                ApiResponse::failure(Some(code), format!("invalid response body: {}", e), Some(v))
            }
        },
    }
}

fn status_fallback(action: &str, status: StatusCode) -> String {
    format!("{} failed: {} {}", action, status.as_u16(), status.canonical_reason().unwrap_or("")).trim_end().to_string()
}

/// Backend error text, checked in order `detail`, `message`, `error`.
pub(crate) fn error_message(body: Option<&Value>) -> Option<String> {
    let obj = body?.as_object()?;
    ["detail", "message", "error"].iter().find_map(|k| match obj.get(*k)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::String(_) | Value::Null | Value::Bool(false) => None,
        other => Some(other.to_string()),
    })
}

fn non_empty(msg: String, fallback: &str) -> String {
    if msg.trim().is_empty() { fallback.to_string() } else { msg }
}

/// Appends the encoded form of `params` to `path`.
pub(crate) fn with_query(path: &str, params: &Value) -> String {
    let q = encode_query(params);
    if q.is_empty() { return path.to_string(); }
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, sep, q)
}

/// Flattens a JSON object into `k=v&...`, dropping nulls.
pub fn encode_query(params: &Value) -> String {
    let Value::Object(map) = params else { return String::new() };
    map.iter()
        .filter_map(|(k, v)| query_value(v).map(|s| format!("{}={}", urlencoding::encode(k), urlencoding::encode(&s))))
        .collect::<Vec<_>>()
        .join("&")
}

fn query_value(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(v.to_string()),
        Value::Array(items) => Some(items.iter().map(|i| query_value(i).unwrap_or_default()).collect::<Vec<_>>().join(",")),
        Value::Object(_) => Some(v.to_string()),
    }
}
