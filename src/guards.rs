//! Navigation guards evaluated before a view is entered.
//!
//! Guards only act on the client side; a server-side render always continues so the
//! server never answers with a redirect loop.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, warn};

use crate::api::SetupApi;
use crate::session::{SessionStore, LEGACY_TOKEN_KEY, LOGIN_PATH, TOKEN_KEY};

pub const SETUP_PATH: &str = "/setup";
pub const HOME_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSide {
    Server,
    Client,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Continue,
    Redirect(String),
}

impl GuardOutcome {
    pub fn redirect(to: impl Into<String>) -> Self { GuardOutcome::Redirect(to.into()) }
    pub fn is_continue(&self) -> bool { matches!(self, GuardOutcome::Continue) }
}

/// Navigation target: path, full path (with query) and the decoded query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub full_path: String,
    pub query: HashMap<String, String>,
}

impl Route {
    /// Parses a local path such as `/albums?sort=new`. Empty input is the home path.
    pub fn parse(full_path: &str) -> Self {
        let full = if full_path.trim().is_empty() { HOME_PATH.to_string() } else { full_path.trim().to_string() };
        let parsed = Url::parse("http://local").and_then(|base| base.join(&full));
        match parsed {
            Ok(url) => Route {
                path: url.path().to_string(),
                full_path: full,
                query: url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect(),
            },
            Err(_) => Route { path: full.clone(), full_path: full, query: HashMap::new() },
        }
    }
}

fn login_redirect(to: &Route) -> GuardOutcome {
    GuardOutcome::Redirect(format!("{}?redirect={}", LOGIN_PATH, urlencoding::encode(&to.full_path)))
}

/// Only same-site absolute paths are followed; anything else goes home.
fn local_target(target: &str) -> Option<&str> {
    (target.starts_with('/') && !target.starts_with("//")).then_some(target)
}

#[derive(Debug, Clone)]
pub struct RouteGuards {
    session: Arc<SessionStore>,
    setup: SetupApi,
    side: RenderSide,
}

impl RouteGuards {
    pub fn new(session: Arc<SessionStore>, setup: SetupApi, side: RenderSide) -> Self {
        Self { session, setup, side }
    }

    pub fn side(&self) -> RenderSide { self.side }

    /// Requires a signed-in user; otherwise sends them to the login view with the
    /// requested path as the return target.
    pub async fn auth(&self, to: &Route) -> GuardOutcome {
        if self.side == RenderSide::Server {
            return GuardOutcome::Continue;
        }
        if self.session.token().is_none() && self.has_persisted_token() {
            self.session.initialize_auth();
        }
        if self.session.token().is_some() && self.session.user().is_none() {
            if let Err(e) = self.session.get_profile().await {
                debug!(target: "openphotobox::guards", "auth guard: profile refresh failed for {}: {}", to.full_path, e);
                return login_redirect(to);
            }
        }
        if !self.session.is_authenticated() {
            debug!(target: "openphotobox::guards", "auth guard: unauthenticated visit to {}", to.full_path);
            return login_redirect(to);
        }
        GuardOutcome::Continue
    }

    /// Keeps signed-in users away from guest-only views such as login.
    pub async fn guest(&self, to: &Route) -> GuardOutcome {
        if self.side == RenderSide::Server || !self.session.is_authenticated() {
            return GuardOutcome::Continue;
        }
        let target = to.query.get("redirect").and_then(|r| local_target(r)).unwrap_or(HOME_PATH);
        GuardOutcome::redirect(target)
    }

    /// Sends visitors to the setup view while the backend reports it is unconfigured.
    /// A failed status check also redirects there.
    pub async fn setup(&self, to: &Route) -> GuardOutcome {
        if self.side == RenderSide::Server || to.path == SETUP_PATH {
            return GuardOutcome::Continue;
        }
        if self.session.is_authenticated() {
            return GuardOutcome::Continue;
        }
        let resp = self.setup.check().await;
        match (resp.success, resp.data) {
            (true, Some(status)) if status.needs_setup => GuardOutcome::redirect(SETUP_PATH),
            (true, Some(_)) => GuardOutcome::Continue,
            _ => {
                warn!(target: "openphotobox::guards", "setup check failed: {}", resp.error.as_deref().unwrap_or("empty response"));
                GuardOutcome::redirect(SETUP_PATH)
            }
        }
    }

    fn has_persisted_token(&self) -> bool {
        let storage = self.session.storage();
        storage.get(TOKEN_KEY).or_else(|| storage.get(LEGACY_TOKEN_KEY)).is_some_and(|t| !t.is_empty())
    }
}
