use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub author: i64,
    pub slug: String,
    /// Unix seconds; also the lookup key behind the slug.
    pub created_at: i64,
}

/// Row to insert; the id comes back from the database.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: Option<String>,
    pub author: i64,
    pub slug: String,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct ArticleChanges {
    pub title: String,
    pub content: Option<String>,
}
