use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub profile_picture: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by: i64,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub title: String,
    pub description: String,
    pub profile_picture: Option<String>,
    pub created_by: i64,
}
