//! Batch selection
//!
//! A batch is up to [`BATCH_SIZE`] eligible images the session has not been
//! shown, sampled uniformly without replacement.

use imgrank_common::images::list_eligible_images;
use imgrank_common::scoring::BATCH_SIZE;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

use crate::session::SessionToken;
use crate::{ApiError, ApiResult, AppState};

/// Draw the next batch from `eligible`, skipping names in `seen`
///
/// Returns [`BATCH_SIZE`] names when enough remain, otherwise every
/// remaining name (possibly none).
pub fn select_batch<R: Rng + ?Sized>(
    eligible: &[String],
    seen: &HashSet<String>,
    rng: &mut R,
) -> Vec<String> {
    let available: Vec<&String> = eligible
        .iter()
        .filter(|name| !seen.contains(name.as_str()))
        .collect();

    available
        .choose_multiple(rng, BATCH_SIZE)
        .map(|name| (*name).clone())
        .collect()
}

/// Deal the next batch to a session and record it as seen
pub async fn next_batch_for_session(state: &AppState, token: SessionToken) -> ApiResult<Vec<String>> {
    let folder = state.image_folder.clone();
    let eligible = tokio::task::spawn_blocking(move || list_eligible_images(&folder))
        .await
        .map_err(|e| ApiError::Internal(format!("Image listing task failed: {}", e)))??;

    let batch = state.sessions.draw(token, &eligible).await;

    debug!(
        session = %token,
        dealt = batch.len(),
        eligible = eligible.len(),
        "Dealt batch"
    );

    Ok(batch)
}
