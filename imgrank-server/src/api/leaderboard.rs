//! Leaderboard endpoint

use axum::{extract::State, Json};
use imgrank_common::db::read_leaderboard;
use imgrank_common::TallyEntry;
use serde::Serialize;

use crate::{ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<TallyEntry>,
}

/// GET /leaderboard
///
/// Empty until the first ranking lands (or before the store exists).
pub async fn get_leaderboard(State(state): State<AppState>) -> ApiResult<Json<LeaderboardResponse>> {
    let leaderboard = read_leaderboard(&state.db).await?;
    Ok(Json(LeaderboardResponse { leaderboard }))
}
