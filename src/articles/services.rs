//! Article CRUD. Writes are scoped to the requesting user by the repository's
//! ownership predicate; a miss reads the same as a missing article.

use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use super::{
    dto::{ArticleRequest, CreatedArticle},
    repo_types::{Article, ArticleChanges, NewArticle},
    slug::{extract_timestamp, make_slug},
};
use crate::{
    auth::AuthUser,
    error::{AppError, ErrorDetail, RepoError, TRY_AGAIN},
    state::AppState,
};

const ARTICLE_NOT_FOUND: &str = "article not found";

fn optional_content(content: String) -> Option<String> {
    (!content.is_empty()).then_some(content)
}

fn require_title(req: &ArticleRequest) -> Result<(), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::validation(
            "validation error",
            vec![ErrorDetail::required("title")],
        ));
    }
    Ok(())
}

#[instrument(skip(st))]
pub async fn get_articles(st: &AppState) -> Result<Vec<Article>, AppError> {
    st.articles.list().await.map_err(|e| {
        error!(error = %e, "listing articles failed");
        AppError::BadRequest(e.to_string())
    })
}

#[instrument(skip(st))]
pub async fn find_article_by_slug(st: &AppState, slug: &str) -> Result<Article, AppError> {
    let created_at = extract_timestamp(slug)?;

    let mut rows = match st.articles.find_by_created_at(created_at).await {
        Ok(rows) => rows,
        Err(RepoError::Unavailable(e)) => {
            error!(error = %e, created_at, "article lookup could not reach the database");
            return Err(AppError::Transient(TRY_AGAIN.into()));
        }
        Err(e) => {
            warn!(error = %e, created_at, "article lookup failed");
            return Err(AppError::NotFound(ARTICLE_NOT_FOUND.into()));
        }
    };

    if rows.len() > 1 {
        let ids: Vec<i64> = rows.iter().map(|a| a.id).collect();
        warn!(created_at, ?ids, "slug timestamp matches several articles, returning lowest id");
    }
    if rows.is_empty() {
        return Err(AppError::NotFound(ARTICLE_NOT_FOUND.into()));
    }
    Ok(rows.swap_remove(0))
}

#[instrument(skip(st, req), fields(user_id = user.id))]
pub async fn create_article(
    st: &AppState,
    user: &AuthUser,
    req: ArticleRequest,
) -> Result<CreatedArticle, AppError> {
    require_title(&req)?;

    let created_at = OffsetDateTime::now_utc().unix_timestamp();
    let slug = make_slug(&req.title, created_at);
    let article = NewArticle {
        title: req.title.clone(),
        content: optional_content(req.content.clone()),
        author: user.id,
        slug: slug.clone(),
        created_at,
    };

    match st.articles.create(&article).await {
        Ok(id) => {
            info!(article_id = id, %slug, "article created");
            Ok(CreatedArticle { id, slug })
        }
        Err(e) => {
            error!(error = %e, "creating article failed");
            Err(AppError::validation(
                "cannot create article, please try again",
                vec![
                    ErrorDetail::new("title", &req.title, "article was not saved"),
                    ErrorDetail::new("content", &req.content, "article was not saved"),
                ],
            ))
        }
    }
}

#[instrument(skip(st, req), fields(user_id = user.id))]
pub async fn update_article_by_id(
    st: &AppState,
    id: i64,
    user: &AuthUser,
    req: ArticleRequest,
) -> Result<Article, AppError> {
    require_title(&req)?;

    let changes = ArticleChanges {
        title: req.title,
        content: optional_content(req.content),
    };
    match st.articles.update_owned(id, user.id, &changes).await {
        Ok(Some(article)) => {
            info!(article_id = id, slug = %article.slug, "article updated");
            Ok(article)
        }
        Ok(None) => {
            warn!(article_id = id, "update matched no article owned by user");
            Err(AppError::NotFound(ARTICLE_NOT_FOUND.into()))
        }
        Err(e) => {
            error!(error = %e, article_id = id, "updating article failed");
            Err(AppError::NotFound(ARTICLE_NOT_FOUND.into()))
        }
    }
}

#[instrument(skip(st), fields(user_id = user.id))]
pub async fn delete_article_by_id(st: &AppState, id: i64, user: &AuthUser) -> Result<(), AppError> {
    match st.articles.delete_owned(id, user.id).await {
        Ok(0) => {
            warn!(article_id = id, "delete matched no article owned by user");
            Err(AppError::NotFound(ARTICLE_NOT_FOUND.into()))
        }
        Ok(_) => {
            info!(article_id = id, "article deleted");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, article_id = id, "deleting article failed");
            Err(AppError::NotFound(ARTICLE_NOT_FOUND.into()))
        }
    }
}
