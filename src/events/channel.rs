//! Long-lived server-sent event connection with fixed-delay reconnects.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::RwLock;
use reqwest::header::{HeaderValue, ACCEPT};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};

use super::sse::{SseDecoder, SseEvent};

pub const EVENTS_PATH: &str = "/api/events/stream/";
pub const ASSET_READY: &str = "asset_ready";

pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

struct ListenerEntry {
    id: u64,
    event: String,
    listener: Listener,
}

struct ChannelInner {
    client: ApiClient,
    listeners: RwLock<Vec<ListenerEntry>>,
    next_id: AtomicU64,
    reconnect_delay: Duration,
}

/// Fans parsed events out to in-process subscribers. Cloning shares the subscriber list.
#[derive(Clone)]
pub struct EventChannel {
    inner: Arc<ChannelInner>,
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.listener_count())
            .field("reconnect_delay", &self.inner.reconnect_delay)
            .finish()
    }
}

/// Handle returned by [`EventChannel::subscribe`]; dropping it keeps the listener.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    channel: Weak<ChannelInner>,
}

impl Subscription {
    /// Removes the listener. Returns false when it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(inner) = self.channel.upgrade() else { return false };
        let mut ls = inner.listeners.write();
        let before = ls.len();
        ls.retain(|e| e.id != self.id);
        ls.len() != before
    }
}

/// Event data is JSON. A JSON string whose text is itself an encoded object or array
/// is decoded once more; any other string stays a string.
pub fn parse_payload(data: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(data).ok()? {
        Value::String(inner) => match serde_json::from_str::<Value>(&inner) {
            Ok(v @ (Value::Object(_) | Value::Array(_))) => Some(v),
            _ => Some(Value::String(inner)),
        },
        other => Some(other),
    }
}

impl EventChannel {
    pub fn new(client: ApiClient) -> Self {
        let reconnect_delay = client.config().events_reconnect_delay;
        Self {
            inner: Arc::new(ChannelInner {
                client,
                listeners: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
                reconnect_delay,
            }),
        }
    }

    pub fn reconnect_delay(&self) -> Duration { self.inner.reconnect_delay }

    pub fn listener_count(&self) -> usize { self.inner.listeners.read().len() }

    pub fn subscribe(&self, event: &str, listener: impl Fn(&Value) + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.write().push(ListenerEntry { id, event: event.to_string(), listener: Arc::new(listener) });
        Subscription { id, channel: Arc::downgrade(&self.inner) }
    }

    pub fn on_asset_ready(&self, listener: impl Fn(&Value) + Send + Sync + 'static) -> Subscription {
        self.subscribe(ASSET_READY, listener)
    }

    /// Delivers one decoded event to every listener registered for its name and returns
    /// how many completed. A panicking listener is logged and skipped.
    pub fn dispatch(&self, ev: &SseEvent) -> usize {
        let targets: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .iter()
            .filter(|e| e.event == ev.event)
            .map(|e| e.listener.clone())
            .collect();
        if targets.is_empty() {
            return 0;
        }
        let Some(payload) = parse_payload(&ev.data) else {
            debug!(target: "openphotobox::events", "dropping '{}' event with unparsable payload", ev.event);
            return 0;
        };
        let mut delivered = 0;
        for listener in targets {
            match catch_unwind(AssertUnwindSafe(|| listener(&payload))) {
                Ok(()) => delivered += 1,
                Err(panic_payload) => {
                    let msg = if let Some(s) = panic_payload.downcast_ref::<&str>() { *s }
                              else if let Some(s) = panic_payload.downcast_ref::<String>() { s.as_str() }
                              else { "panic" };
                    error!(target: "openphotobox::events", "listener for '{}' panicked: {}", ev.event, msg);
                }
            }
        }
        delivered
    }

    /// Starts [`run`](Self::run) on the tokio runtime.
    pub fn spawn(&self) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.run().await })
    }

    /// Keeps the stream open forever. Every disconnect, clean or not, is followed by the
    /// same fixed delay before the next attempt.
    pub async fn run(self) {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            match self.connect_once().await {
                Ok(()) => info!(target: "openphotobox::events", "event stream closed by server"),
                Err(e) => warn!(target: "openphotobox::events", "event stream error (attempt {}): {}", attempt, e),
            }
            tokio::time::sleep(self.inner.reconnect_delay).await;
        }
    }

    async fn connect_once(&self) -> ClientResult<()> {
        let client = &self.inner.client;
        let url = client.config().url_for(EVENTS_PATH);
        let resp = client
            .http()
            .get(&url)
            .headers(client.auth_headers())
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .send()
            .await
            .map_err(|e| ClientError::transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::api(Some(status.as_u16()), format!("event stream rejected: {}", status)));
        }
        info!(target: "openphotobox::events", "event stream connected: {}", url);
        let mut decoder = SseDecoder::new();
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ClientError::transport(e.to_string()))?;
            for ev in decoder.feed(&chunk) {
                self.dispatch(&ev);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use std::sync::Mutex;

    fn channel() -> EventChannel {
        let cfg = ClientConfig::new("http://127.0.0.1:9").unwrap();
        EventChannel::new(ApiClient::new(cfg, Arc::new(|| None)).unwrap())
    }

    fn asset_ready(data: &str) -> SseEvent {
        SseEvent { event: ASSET_READY.into(), data: data.into(), id: None }
    }

    #[test]
    fn payload_forms() {
        assert_eq!(parse_payload(r#"{"id":"42"}"#), Some(serde_json::json!({"id": "42"})));
        assert_eq!(parse_payload(r#""{\"id\":\"42\"}""#), Some(serde_json::json!({"id": "42"})));
        assert_eq!(parse_payload(r#""plain""#), Some(Value::String("plain".into())));
        assert_eq!(parse_payload(r#""42""#), Some(Value::String("42".into())));
        assert_eq!(parse_payload(r#""true""#), Some(Value::String("true".into())));
        assert_eq!(parse_payload(r#""[1,2]""#), Some(serde_json::json!([1, 2])));
        assert_eq!(parse_payload("7"), Some(serde_json::json!(7)));
        assert_eq!(parse_payload("{oops"), None);
    }

    #[test]
    fn every_matching_listener_runs_once() {
        let ch = channel();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for _ in 0..2 {
            let sink = seen.clone();
            ch.on_asset_ready(move |p| sink.lock().unwrap().push(p.clone()));
        }
        let other = seen.clone();
        ch.subscribe("other", move |p| other.lock().unwrap().push(p.clone()));

        assert_eq!(ch.dispatch(&asset_ready(r#"{"id": "42"}"#)), 2);
        assert_eq!(*seen.lock().unwrap(), vec![serde_json::json!({"id": "42"}); 2]);
        assert_eq!(ch.dispatch(&asset_ready("not json")), 0);
    }

    #[test]
    fn panicking_listener_does_not_block_the_rest() {
        let ch = channel();
        let hits = Arc::new(AtomicU64::new(0));
        ch.on_asset_ready(|_| panic!("listener bug"));
        let h = hits.clone();
        ch.on_asset_ready(move |_| { h.fetch_add(1, Ordering::SeqCst); });
        assert_eq!(ch.dispatch(&asset_ready("{}")), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unsubscribe_removes_only_that_listener() {
        let ch = channel();
        let a = ch.on_asset_ready(|_| {});
        let _b = ch.on_asset_ready(|_| {});
        assert_eq!(ch.listener_count(), 2);
        assert!(a.unsubscribe());
        assert_eq!(ch.listener_count(), 1);
        assert_eq!(ch.reconnect_delay(), Duration::from_secs(3));
    }
}
