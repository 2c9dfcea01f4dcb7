//! Ranking submission endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use imgrank_common::db::apply_ranking;
use imgrank_common::TallyEntry;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiError, ApiResult, AppState};

/// Ranking submission, best image first
#[derive(Debug, Deserialize)]
pub struct RankRequest {
    #[serde(rename = "rankedImages", default)]
    pub ranked_images: Vec<String>,
}

/// Ranking result with the updated leaderboard
#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub status: &'static str,
    pub leaderboard: Vec<TallyEntry>,
}

/// POST /rank
///
/// Awards 5, 4, 3, 2, 1 points by position and returns the leaderboard.
/// Oversized submissions or repeated names get 400; a store that was
/// never initialized gets 503.
pub async fn rank_images(
    State(state): State<AppState>,
    payload: Result<Json<RankRequest>, JsonRejection>,
) -> ApiResult<Json<RankResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let leaderboard = apply_ranking(&state.db, &request.ranked_images).await?;
    info!("Recorded ranking of {} images", request.ranked_images.len());

    Ok(Json(RankResponse {
        status: "success",
        leaderboard,
    }))
}
