//! Image file serving

use axum::{
    body::Body,
    extract::{Path, Request, State},
    response::Response,
};
use imgrank_common::images::resolve_image_path;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

use crate::{ApiError, ApiResult, AppState};

/// GET /image/:filename
///
/// Streams a file from the image folder. Content type, conditional and
/// range requests are handled by `ServeFile`. Unknown names (and names
/// that would leave the folder) get 404 `{"error": "Image not found"}`.
pub async fn serve_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    request: Request,
) -> ApiResult<Response> {
    let Some(path) = resolve_image_path(&state.image_folder, &filename) else {
        debug!("Image not found: {}", filename);
        return Err(ApiError::NotFound("Image not found".to_string()));
    };

    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => Ok(response.map(Body::new)),
        Err(never) => match never {},
    }
}
