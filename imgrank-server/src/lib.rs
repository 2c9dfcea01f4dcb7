//! imgrank-server library - image ranking web service
//!
//! Deals unseen images to each browser session in batches, accepts ranked
//! batches, and keeps a persistent points leaderboard.

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod batch;
pub mod error;
pub mod session;

pub use crate::error::{ApiError, ApiResult};
use crate::session::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Tally database connection pool
    pub db: SqlitePool,
    /// Folder the images are listed and served from
    pub image_folder: Arc<PathBuf>,
    /// Per-session seen-sets
    pub sessions: Arc<dyn SessionStore>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, image_folder: PathBuf, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            db,
            image_folder: Arc::new(image_folder),
            sessions,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// Every route except `/health` runs inside the session middleware.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let app = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/image/:filename", get(api::serve_image))
        .route("/next_batch", get(api::next_batch))
        .route("/rank", post(api::rank_images))
        .route("/leaderboard", get(api::get_leaderboard))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_middleware,
        ));

    Router::new()
        .merge(app)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
