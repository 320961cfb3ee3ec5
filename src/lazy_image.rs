//! Thumbnail-first image loading with a debounced full-resolution preload.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::types::Asset;
use crate::api::ApiClient;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSource {
    pub thumbnail_url: Option<String>,
    pub original_url: Option<String>,
    pub storage_url: Option<String>,
    /// Generic URL used when nothing more specific exists.
    pub src: Option<String>,
}

impl ImageSource {
    fn pick(candidates: &[&Option<String>]) -> String {
        candidates.iter().find_map(|c| c.as_deref().filter(|s| !s.is_empty())).unwrap_or_default().to_string()
    }

    pub fn thumbnail(&self) -> String { Self::pick(&[&self.thumbnail_url, &self.src]) }

    pub fn full(&self) -> String { Self::pick(&[&self.original_url, &self.storage_url, &self.src]) }
}

impl From<&Asset> for ImageSource {
    fn from(a: &Asset) -> Self {
        ImageSource {
            thumbnail_url: a.thumbnail_url.clone(),
            original_url: a.original_url.clone(),
            storage_url: a.storage_url.clone(),
            src: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LazyImageOptions {
    pub load_delay: Duration,
    pub preload_on_hover: bool,
    pub load_on_viewport: bool,
}

impl Default for LazyImageOptions {
    fn default() -> Self {
        Self { load_delay: Duration::from_millis(1000), preload_on_hover: true, load_on_viewport: false }
    }
}

#[derive(Debug, Default)]
struct LazyState {
    current_url: String,
    full_url: String,
    full_bytes: Option<Arc<Vec<u8>>>,
    loaded: bool,
    loading: bool,
    /// Bumped on reset/cancel so late completions are ignored.
    generation: u64,
}

pub struct LazyImage {
    client: ApiClient,
    options: LazyImageOptions,
    state: Arc<Mutex<LazyState>>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for LazyImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.state.lock();
        f.debug_struct("LazyImage")
            .field("current_url", &s.current_url)
            .field("loaded", &s.loaded)
            .field("loading", &s.loading)
            .finish()
    }
}

impl LazyImage {
    pub fn new(client: ApiClient, source: &ImageSource, options: LazyImageOptions) -> Self {
        let img = Self { client, options, state: Arc::new(Mutex::new(LazyState::default())), pending: Mutex::new(None) };
        img.set_source(source);
        img
    }

    pub fn options(&self) -> LazyImageOptions { self.options }
    pub fn current_url(&self) -> String { self.state.lock().current_url.clone() }
    pub fn is_full_loaded(&self) -> bool { self.state.lock().loaded }
    pub fn is_full_loading(&self) -> bool { self.state.lock().loading }
    pub fn full_image(&self) -> Option<Arc<Vec<u8>>> { self.state.lock().full_bytes.clone() }

    /// Switches to another image: back to its thumbnail, pending work dropped.
    pub fn set_source(&self, source: &ImageSource) {
        self.abort_pending();
        let mut s = self.state.lock();
        s.generation += 1;
        s.current_url = source.thumbnail();
        s.full_url = source.full();
        s.full_bytes = None;
        s.loaded = false;
        s.loading = false;
    }

    /// Schedules the full-image fetch after `load_delay`; a newer call restarts the wait.
    pub fn start_loading(&self) {
        {
            let s = self.state.lock();
            if s.loaded || s.loading || s.full_url.is_empty() {
                return;
            }
        }
        let client = self.client.clone();
        let state = self.state.clone();
        let delay = self.options.load_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            load_full(&client, &state).await;
        });
        if let Some(prev) = self.pending.lock().replace(handle) {
            prev.abort();
        }
    }

    /// Fetches the full image right away. Returns whether it is now shown.
    pub async fn load_now(&self) -> bool { load_full(&self.client, &self.state).await }

    pub fn cancel(&self) {
        self.abort_pending();
        let mut s = self.state.lock();
        if s.loading {
            s.generation += 1;
            s.loading = false;
        }
    }

    pub fn on_hover(&self) {
        if self.options.preload_on_hover && !self.is_full_loaded() {
            self.start_loading();
        }
    }

    /// Leaving does not cancel; the user may come back.
    pub fn on_leave(&self) {}

    pub fn on_viewport_enter(&self) {
        if self.options.load_on_viewport && !self.is_full_loaded() {
            self.start_loading();
        }
    }

    pub async fn on_click(&self) -> bool {
        if self.is_full_loaded() {
            return true;
        }
        self.cancel();
        self.load_now().await
    }

    fn abort_pending(&self) {
        if let Some(h) = self.pending.lock().take() {
            h.abort();
        }
    }
}

impl Drop for LazyImage {
    fn drop(&mut self) { self.abort_pending(); }
}

async fn load_full(client: &ApiClient, state: &Mutex<LazyState>) -> bool {
    let (url, generation) = {
        let mut s = state.lock();
        if s.loaded || s.loading || s.full_url.is_empty() {
            return s.loaded;
        }
        s.loading = true;
        (s.full_url.clone(), s.generation)
    };
    let res = client.fetch_bytes(&url).await;
    let mut s = state.lock();
    if s.generation != generation {
        debug!(target: "openphotobox::image", "discarding stale preload of {}", url);
        return false;
    }
    s.loading = false;
    match res {
        Ok(bytes) => {
            s.current_url = url;
            s.full_bytes = Some(Arc::new(bytes));
            s.loaded = true;
            true
        }
        Err(e) => {
            warn!(target: "openphotobox::image", "Failed to load full image {}: {}", url, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_fallbacks() {
        let s = ImageSource { storage_url: Some("/media/a.jpg".into()), src: Some("/x.jpg".into()), ..Default::default() };
        assert_eq!(s.thumbnail(), "/x.jpg");
        assert_eq!(s.full(), "/media/a.jpg");
        let s = ImageSource { thumbnail_url: Some(String::new()), ..Default::default() };
        assert_eq!(s.thumbnail(), "");
        assert_eq!(s.full(), "");
    }
}
