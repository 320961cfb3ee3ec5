//! Persistent key/value storage for the session, the equivalent of a browser's local
//! storage. Values are opaque strings; the session store decides what goes in them.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// Canonical token key.
pub const TOKEN_KEY: &str = "auth-token";
/// Token key written by older clients; still written and read for compatibility.
pub const LEGACY_TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "user_data";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;
    fn remove(&self, key: &str) -> ClientResult<()>;
    fn keys(&self) -> Vec<String>;
}

pub type SharedStorage = Arc<dyn KeyValueStore>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    map: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
    pub fn shared() -> SharedStorage { Arc::new(Self::new()) }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> { self.map.read().get(key).cloned() }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.map.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.map.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> { self.map.read().keys().cloned().collect() }
}

/// JSON object on disk, rewritten in full on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    map: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens `path`, starting empty when the file is missing or unreadable.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let map = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, String>>(&text) {
                Ok(m) => m,
                Err(e) => {
                    warn!(target: "openphotobox::session", "session file {} is corrupt ({}); starting empty", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(target: "openphotobox::session", "cannot read session file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        debug!(target: "openphotobox::session", "session file {} opened with {} keys", path.display(), map.len());
        Self { path, map: RwLock::new(map) }
    }

    pub fn shared(path: impl AsRef<Path>) -> SharedStorage { Arc::new(Self::open(path)) }

    pub fn path(&self) -> &Path { &self.path }

    fn flush(&self, map: &BTreeMap<String, String>) -> ClientResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| ClientError::storage(format!("cannot create {}: {}", dir.display(), e)))?;
        }
        let text = serde_json::to_string_pretty(map)?;
        // replace atomically via a sibling temp file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text).map_err(|e| ClientError::storage(format!("cannot write {}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| ClientError::storage(format!("cannot replace {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> { self.map.read().get(key).cloned() }

    // memory only changes once the file write has succeeded
    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut map = self.map.write();
        let mut next = map.clone();
        next.insert(key.to_string(), value.to_string());
        self.flush(&next)?;
        *map = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        let mut map = self.map.write();
        if !map.contains_key(key) { return Ok(()); }
        let mut next = map.clone();
        next.remove(key);
        self.flush(&next)?;
        *map = next;
        Ok(())
    }

    fn keys(&self) -> Vec<String> { self.map.read().keys().cloned().collect() }
}
