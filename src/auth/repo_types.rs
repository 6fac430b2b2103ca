use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,                    // unique user ID
    pub username: String,           // unique login name
    #[serde(skip_serializing)]
    pub password: String,           // Argon2 hash, not exposed in JSON
    pub created_at: OffsetDateTime, // creation timestamp
}
