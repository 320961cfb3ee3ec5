//! Server-push notifications (`/api/events/stream/`).

mod channel;
mod sse;

pub use channel::{parse_payload, EventChannel, Listener, Subscription, ASSET_READY, EVENTS_PATH};
pub use sse::{SseDecoder, SseEvent};
