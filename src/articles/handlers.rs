use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ArticleRequest, CreatedArticle},
    repo_types::Article,
    services,
};
use crate::{auth::AuthUser, error::AppError, response::ApiResponse, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles))
        .route("/articles/:slug", get(get_article))
}

/// Mounted under the authenticated prefix.
pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", post(create_article))
        .route("/articles/:id", put(update_article).delete(delete_article))
}

#[instrument(skip(state))]
pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<Article>>, AppError> {
    let articles = services::get_articles(&state).await?;
    Ok(ApiResponse::ok(articles))
}

#[instrument(skip(state))]
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<Article>, AppError> {
    let article = services::find_article_by_slug(&state, slug.trim_matches(' ')).await?;
    Ok(ApiResponse::ok(article))
}

#[instrument(skip(state, payload))]
pub async fn create_article(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<ArticleRequest>, JsonRejection>,
) -> Result<ApiResponse<CreatedArticle>, AppError> {
    let Json(req) = payload?;
    let created = services::create_article(&state, &user, req).await?;
    Ok(ApiResponse::success(StatusCode::CREATED, created))
}

#[instrument(skip(state, payload))]
pub async fn update_article(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<ArticleRequest>, JsonRejection>,
) -> Result<ApiResponse<Article>, AppError> {
    let Path(id) = id?;
    let Json(req) = payload?;
    let article = services::update_article_by_id(&state, id, &user, req).await?;
    Ok(ApiResponse::ok(article))
}

#[instrument(skip(state))]
pub async fn delete_article(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    services::delete_article_by_id(&state, id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}
