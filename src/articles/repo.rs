use axum::async_trait;
use sqlx::PgPool;

use super::repo_types::{Article, ArticleChanges, NewArticle};
use super::slug::slugify_title;
use crate::error::RepoError;

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Article>, RepoError>;

    /// Every article created in the given second, lowest id first.
    async fn find_by_created_at(&self, created_at: i64) -> Result<Vec<Article>, RepoError>;

    async fn create(&self, article: &NewArticle) -> Result<i64, RepoError>;

    /// Deletes the article only when `author` owns it. Returns rows affected.
    async fn delete_owned(&self, id: i64, author: i64) -> Result<u64, RepoError>;

    /// Updates title and content and rebuilds the slug around the stored
    /// timestamp. `None` when nothing matched id and author.
    async fn update_owned(
        &self,
        id: i64,
        author: i64,
        changes: &ArticleChanges,
    ) -> Result<Option<Article>, RepoError>;
}

#[derive(Clone)]
pub struct PgArticleRepository {
    db: PgPool,
}

impl PgArticleRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArticleRepository for PgArticleRepository {
    async fn list(&self) -> Result<Vec<Article>, RepoError> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, content, author, slug, created_at
            FROM articles
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_created_at(&self, created_at: i64) -> Result<Vec<Article>, RepoError> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, content, author, slug, created_at
            FROM articles
            WHERE created_at = $1
            ORDER BY id
            "#,
        )
        .bind(created_at)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn create(&self, article: &NewArticle) -> Result<i64, RepoError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO articles (title, content, author, slug, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.author)
        .bind(&article.slug)
        .bind(article.created_at)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn delete_owned(&self, id: i64, author: i64) -> Result<u64, RepoError> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1 AND author = $2")
            .bind(id)
            .bind(author)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }

    async fn update_owned(
        &self,
        id: i64,
        author: i64,
        changes: &ArticleChanges,
    ) -> Result<Option<Article>, RepoError> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET title = $3,
                content = $4,
                slug = $5 || '-' || created_at::text
            WHERE id = $1 AND author = $2
            RETURNING id, title, content, author, slug, created_at
            "#,
        )
        .bind(id)
        .bind(author)
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(slugify_title(&changes.title))
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }
}
