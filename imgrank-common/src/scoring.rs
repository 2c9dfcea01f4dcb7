//! Point schedule for ranked submissions

use crate::{Error, Result};
use std::collections::HashSet;

/// Number of images dealt per batch, and the longest accepted ranking
pub const BATCH_SIZE: usize = 5;

/// Points awarded by rank position, best first
pub const POINT_SCHEDULE: [i64; BATCH_SIZE] = [5, 4, 3, 2, 1];

/// Points for the 0-indexed rank position, `None` past the schedule
pub fn points_for_position(position: usize) -> Option<i64> {
    POINT_SCHEDULE.get(position).copied()
}

/// Reject submissions the schedule cannot score
///
/// A submission may hold at most [`BATCH_SIZE`] names and no name twice.
pub fn validate_submission(ranked: &[String]) -> Result<()> {
    if ranked.len() > BATCH_SIZE {
        return Err(Error::InvalidInput(format!(
            "Ranking has {} images, at most {} allowed",
            ranked.len(),
            BATCH_SIZE
        )));
    }

    let mut seen = HashSet::with_capacity(ranked.len());
    for name in ranked {
        if !seen.insert(name.as_str()) {
            return Err(Error::InvalidInput(format!(
                "Image ranked more than once: {}",
                name
            )));
        }
    }

    Ok(())
}

/// Pair each submitted name with the points it earns
pub fn score_submission(ranked: &[String]) -> Result<Vec<(&str, i64)>> {
    validate_submission(ranked)?;
    Ok(ranked
        .iter()
        .enumerate()
        .filter_map(|(position, name)| {
            points_for_position(position).map(|points| (name.as_str(), points))
        })
        .collect())
}
