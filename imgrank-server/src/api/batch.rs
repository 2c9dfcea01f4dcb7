//! Batch dealing endpoint

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::batch::next_batch_for_session;
use crate::session::SessionToken;
use crate::{ApiResult, AppState};

/// Next batch response
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub images: Vec<String>,
}

/// GET /next_batch
///
/// Deals up to five images this session has not seen yet.
pub async fn next_batch(
    State(state): State<AppState>,
    Extension(token): Extension<SessionToken>,
) -> ApiResult<Json<BatchResponse>> {
    let images = next_batch_for_session(&state, token).await?;
    Ok(Json(BatchResponse { images }))
}
