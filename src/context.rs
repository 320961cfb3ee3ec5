//! Application context: everything the client needs, built once at start-up and passed
//! explicitly to whoever needs it.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{Api, ApiClient, TokenSource};
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::events::EventChannel;
use crate::guards::{RenderSide, RouteGuards};
use crate::lazy_image::{ImageSource, LazyImage, LazyImageOptions};
use crate::session::{FileStore, SessionStore, SharedStorage, TOKEN_KEY};
use crate::upload::SmartUpload;

#[derive(Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub storage: SharedStorage,
    pub api: Api,
    pub session: Arc<SessionStore>,
    pub events: EventChannel,
    pub guards: RouteGuards,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("stored_keys", &self.storage.keys().len())
            .field("session", &self.session)
            .field("events", &self.events)
            .finish()
    }
}

impl AppContext {
    /// Context backed by the session file named in `config`.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let storage = FileStore::shared(&config.session_file);
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: ClientConfig, storage: SharedStorage) -> ClientResult<Self> {
        let token_storage = storage.clone();
        let token: TokenSource = Arc::new(move || token_storage.get(TOKEN_KEY));
        let client = ApiClient::new(config.clone(), token)?;
        let api = Api::new(client.clone());
        let session = Arc::new(SessionStore::new(api.auth.clone(), storage.clone()));
        let restored = session.initialize_auth();
        let events = EventChannel::new(client);
        let guards = RouteGuards::new(session.clone(), api.setup.clone(), RenderSide::Client);
        info!(target: "openphotobox::context", "client ready: api_base={} session_restored={}", config.api_base, restored);
        Ok(Self { config, storage, api, session, events, guards })
    }

    pub fn client(&self) -> &ApiClient { &self.api.client }

    /// Opens the event stream in the background.
    pub fn start_events(&self) -> JoinHandle<()> { self.events.spawn() }

    pub fn uploader(&self) -> SmartUpload { SmartUpload::new(self.api.storage.clone(), self.api.upload.clone()) }

    pub fn lazy_image(&self, source: &ImageSource, options: LazyImageOptions) -> LazyImage {
        LazyImage::new(self.api.client.clone(), source, options)
    }
}
