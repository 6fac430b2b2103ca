use axum::async_trait;
use sqlx::PgPool;

use super::repo_types::{Group, NewGroup};
use crate::error::RepoError;

#[async_trait]
pub trait GroupRepository: Send + Sync {
    async fn create(&self, group: &NewGroup) -> Result<Group, RepoError>;
    async fn list(&self) -> Result<Vec<Group>, RepoError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, RepoError>;
}

#[derive(Clone)]
pub struct PgGroupRepository {
    db: PgPool,
}

impl PgGroupRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    async fn create(&self, group: &NewGroup) -> Result<Group, RepoError> {
        let row = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (title, description, profile_picture, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, profile_picture, created_at, created_by
            "#,
        )
        .bind(&group.title)
        .bind(&group.description)
        .bind(&group.profile_picture)
        .bind(group.created_by)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let rows = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, title, description, profile_picture, created_at, created_by
            FROM groups
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, RepoError> {
        let row = sqlx::query_as::<_, Group>(
            r#"
            SELECT id, title, description, profile_picture, created_at, created_by
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }
}
