//! Session state for the signed-in user: in-memory store, persistent backing storage.

mod storage;
mod store;

pub use storage::{FileStore, KeyValueStore, MemoryStore, SharedStorage, LEGACY_TOKEN_KEY, TOKEN_KEY, USER_KEY};
pub use store::{ObserverId, SessionObserver, SessionState, SessionStore, LOGIN_PATH};
