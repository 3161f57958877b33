use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use time::Duration;

use crate::{
    auth::session::{MemorySessionStore, PgSessionStore, SessionState},
    config::{AppConfig, StorageBackend},
    db::{MemoryRepository, PgRepository, RepositoryState},
};

#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub sessions: SessionState,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects the configured backend. For postgres this also applies
    /// pending migrations.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let ttl = Duration::minutes(config.session.ttl_minutes);
        match config.backend {
            StorageBackend::Postgres => {
                let url = config
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL must be set for the postgres backend")?;
                let db = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;
                sqlx::migrate!("./migrations")
                    .run(&db)
                    .await
                    .context("run migrations")?;
                tracing::info!("database ready");

                Ok(Self::from_parts(
                    Arc::new(PgRepository::new(db.clone())),
                    Arc::new(PgSessionStore::new(db, ttl)),
                    Arc::new(config),
                ))
            }
            StorageBackend::Memory => {
                tracing::warn!("using in-memory storage; data is lost on restart");
                Ok(Self::memory_with(config))
            }
        }
    }

    pub fn from_parts(repo: RepositoryState, sessions: SessionState, config: Arc<AppConfig>) -> Self {
        Self {
            repo,
            sessions,
            config,
        }
    }

    /// Fresh in-memory state with default test settings.
    pub fn in_memory() -> Self {
        Self::memory_with(AppConfig::in_memory())
    }

    fn memory_with(config: AppConfig) -> Self {
        let ttl = Duration::minutes(config.session.ttl_minutes);
        Self::from_parts(
            Arc::new(MemoryRepository::new()),
            Arc::new(MemorySessionStore::new(ttl)),
            Arc::new(config),
        )
    }
}
