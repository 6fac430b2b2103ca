use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Router,
};
use tracing::{debug, instrument};

use super::{
    dto::StoredFile,
    services::{self, UploadItem},
};
use crate::{auth::AuthUser, error::AppError, response::ApiResponse, state::AppState};

// Room for several maximum-size files plus multipart framing; each file is
// checked against the per-file limit afterwards.
const FILES_PER_REQUEST: usize = 10;
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn write_routes(upload_max_bytes: usize) -> Router<AppState> {
    let body_limit = upload_max_bytes
        .saturating_mul(FILES_PER_REQUEST)
        .saturating_add(MULTIPART_OVERHEAD);
    Router::new()
        .route("/files", post(upload_files))
        .layer(DefaultBodyLimit::max(body_limit))
}

/// POST /files, multipart with one or more `files` parts.
#[instrument(skip(state, mp))]
pub async fn upload_files(
    State(state): State<AppState>,
    user: AuthUser,
    mp: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<Vec<StoredFile>>, AppError> {
    let mut mp = mp.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut items = Vec::new();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if !matches!(field.name(), Some("files") | Some("files[]")) {
            debug!(name = ?field.name(), "skipping multipart field");
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let body = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        items.push(UploadItem { file_name, body });
    }

    let stored = services::store_files(&state, &user, items).await?;
    Ok(ApiResponse::ok(stored))
}
