use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;
use crate::games::service::GameService;
use crate::games::store::PgGameStore;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub games: GameService,
}

impl AppState {
    /// Connect once at startup; the pool is reused for the process lifetime
    /// and dropped on shutdown.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        let games = GameService::new(Arc::new(PgGameStore::new(db.clone())));
        Ok(Self { db, config, games })
    }
}
