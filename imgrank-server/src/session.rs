//! Session tracking
//!
//! Each browser gets a session token in the `imgrank_session` cookie. The
//! token keys a seen-set of image names already dealt to that browser,
//! created the first time the store is asked about the token. The seen-set
//! only grows; sessions are never pruned.

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{
        header::{COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::batch::select_batch;
use crate::AppState;

/// Cookie carrying the session token
pub const SESSION_COOKIE: &str = "imgrank_session";

/// Opaque per-browser session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Mint a fresh random token
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a token from its string form
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().map(Self)
    }

    /// Find the session cookie among the request's `Cookie` headers
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Self::parse(value))
    }

    /// `Set-Cookie` header value for this token
    pub fn cookie(&self) -> String {
        format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.0)
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Storage for per-session seen-sets
///
/// Implementations create an empty seen-set the first time a token is
/// used. Sets are never shared between tokens.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current seen-set for the token
    async fn seen(&self, token: SessionToken) -> HashSet<String>;

    /// Replace the token's seen-set
    async fn set_seen(&self, token: SessionToken, seen: HashSet<String>);

    /// Add images to the token's seen-set
    async fn mark_seen(&self, token: SessionToken, images: &[String]) {
        let mut seen = self.seen(token).await;
        seen.extend(images.iter().cloned());
        self.set_seen(token, seen).await;
    }

    /// Pick the next batch from `eligible` and record it as seen
    ///
    /// Stores that can hold a lock across the read and the write should
    /// override this so concurrent draws for one token never overlap.
    async fn draw(&self, token: SessionToken, eligible: &[String]) -> Vec<String> {
        let mut seen = self.seen(token).await;
        let batch = select_batch(eligible, &seen, &mut rand::thread_rng());
        seen.extend(batch.iter().cloned());
        self.set_seen(token, seen).await;
        batch
    }
}

/// In-process session store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionToken, HashSet<String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions seen so far
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn seen(&self, token: SessionToken) -> HashSet<String> {
        if let Some(seen) = self.sessions.read().await.get(&token) {
            return seen.clone();
        }
        self.sessions
            .write()
            .await
            .entry(token)
            .or_default()
            .clone()
    }

    async fn set_seen(&self, token: SessionToken, seen: HashSet<String>) {
        self.sessions.write().await.insert(token, seen);
    }

    async fn mark_seen(&self, token: SessionToken, images: &[String]) {
        self.sessions
            .write()
            .await
            .entry(token)
            .or_default()
            .extend(images.iter().cloned());
    }

    async fn draw(&self, token: SessionToken, eligible: &[String]) -> Vec<String> {
        let mut sessions = self.sessions.write().await;
        let seen = sessions.entry(token).or_default();
        let batch = select_batch(eligible, seen, &mut rand::thread_rng());
        seen.extend(batch.iter().cloned());
        batch
    }
}

/// Session middleware
///
/// Resolves the caller's session token (minting one when the cookie is
/// absent or malformed) and hands it to handlers through request
/// extensions. New tokens are returned to the browser in a `Set-Cookie`
/// header. The seen-set itself is only created when a batch is drawn.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = SessionToken::from_headers(request.headers());
    let token = existing.unwrap_or_default();

    request.extensions_mut().insert(token);

    let mut response = next.run(request).await;

    if existing.is_none() {
        debug!(session = %token, "Started new session");
        if let Ok(value) = HeaderValue::from_str(&token.cookie()) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    response
}
