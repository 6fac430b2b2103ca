mod app;
mod articles;
mod auth;
mod config;
mod db;
mod error;
mod files;
mod groups;
mod response;
mod state;
mod storage;
mod telemetry;

use crate::config::{AppConfig, LogConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    telemetry::init_tracing(&LogConfig::from_env())?;

    let config = AppConfig::from_env()?;
    let addr = config.bind_addr();

    let db = db::connect(&config).await?;
    db::health_check(&db).await?;
    db::migrate(&db).await?;

    let state = AppState::init(config, db).await?;
    app::serve(app::build_app(state), &addr).await
}
