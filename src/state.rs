use std::sync::Arc;

use sqlx::PgPool;

use crate::articles::repo::{ArticleRepository, PgArticleRepository};
use crate::auth::{
    jwt::JwtKeys,
    repo::{PgUserRepository, UserRepository},
};
use crate::config::AppConfig;
use crate::groups::repo::{GroupRepository, PgGroupRepository};
use crate::storage::{build_storage, StorageClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
    pub users: Arc<dyn UserRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init(config: AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let storage = build_storage(&config.storage).await?;
        Ok(Self {
            jwt: JwtKeys::new(&config.jwt),
            users: Arc::new(PgUserRepository::new(db.clone())),
            articles: Arc::new(PgArticleRepository::new(db.clone())),
            groups: Arc::new(PgGroupRepository::new(db)),
            storage,
            config: Arc::new(config),
        })
    }
}


#[cfg(test)]
impl AppState {
    /// State wired to in-memory repositories and a storage that drops writes.
    pub fn fake() -> Self {
        let (state, _) = fakes::build();
        state
    }
}
