use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{dto::CreateGroupRequest, repo_types::Group, services};
use crate::{auth::AuthUser, error::AppError, response::ApiResponse, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups))
        .route("/groups/:id", get(get_group))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/groups", post(create_group))
}

#[instrument(skip(state))]
pub async fn list_groups(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Group>>, AppError> {
    Ok(ApiResponse::ok(services::list_groups(&state).await?))
}

#[instrument(skip(state))]
pub async fn get_group(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<ApiResponse<Group>, AppError> {
    let Path(id) = id?;
    Ok(ApiResponse::ok(services::find_group_by_id(&state, id).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_group(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateGroupRequest>, JsonRejection>,
) -> Result<ApiResponse<Group>, AppError> {
    let Json(req) = payload?;
    let group = services::create_group(&state, &user, req).await?;
    Ok(ApiResponse::success(StatusCode::CREATED, group))
}
