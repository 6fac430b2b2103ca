use serde::{Deserialize, Serialize};

/// Body for creating or updating an article.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ArticleRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreatedArticle {
    pub id: i64,
    pub slug: String,
}
