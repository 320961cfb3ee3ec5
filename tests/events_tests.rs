mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::{wait_for, MockBackend};
use parking_lot::Mutex;
use serde_json::{json, Value};

#[tokio::test]
async fn asset_ready_reaches_each_subscriber_and_stream_reconnects() {
    let mock = MockBackend::start().await;
    let (ctx, _) = mock.context();
    let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(AtomicUsize::new(0));

    let sink = seen.clone();
    let _a = ctx.events.on_asset_ready(move |p| sink.lock().push(p.clone()));
    let counter = second.clone();
    let _b = ctx.events.on_asset_ready(move |_| { counter.fetch_add(1, Ordering::SeqCst); });

    let handle = ctx.start_events();
    let state = mock.state.clone();
    assert!(wait_for(Duration::from_secs(5), || state.event_connections.load(Ordering::SeqCst) >= 2).await);
    handle.abort();

    let got = seen.lock().clone();
    assert!(got.len() >= 1);
    assert!(got.iter().all(|p| *p == json!({"id": "42"})));
    assert_eq!(got.len(), second.load(Ordering::SeqCst));
}

#[tokio::test]
async fn unsubscribed_listener_is_not_called() {
    let mock = MockBackend::start().await;
    let (ctx, _) = mock.context();
    let hits = Arc::new(AtomicUsize::new(0));
    let h = hits.clone();
    let sub = ctx.events.on_asset_ready(move |_| { h.fetch_add(1, Ordering::SeqCst); });
    assert!(sub.unsubscribe());
    assert_eq!(ctx.events.listener_count(), 0);

    let handle = ctx.start_events();
    let state = mock.state.clone();
    assert!(wait_for(Duration::from_secs(5), || state.event_connections.load(Ordering::SeqCst) >= 1).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    handle.abort();
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
