//! Server-side sessions: an opaque token in the cookie maps to a user id.

use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use rand::{distributions::Alphanumeric, Rng};
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

const TOKEN_LEN: usize = 48;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Opens a session for `user_id` and returns its token.
    async fn create(&self, user_id: Uuid) -> anyhow::Result<String>;
    /// The user behind `token`, or `None` if unknown or expired.
    async fn resolve(&self, token: &str) -> anyhow::Result<Option<Uuid>>;
    /// Ends the session. Returns false if it did not exist.
    async fn revoke(&self, token: &str) -> anyhow::Result<bool>;
}

pub type SessionState = Arc<dyn SessionStore>;

pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Sessions kept in the `sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    db: PgPool,
    ttl: Duration,
}

impl PgSessionStore {
    pub fn new(db: PgPool, ttl: Duration) -> Self {
        Self { db, ttl }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, user_id: Uuid) -> anyhow::Result<String> {
        let pruned = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.db)
            .await
            .context("prune expired sessions")?
            .rows_affected();
        if pruned > 0 {
            debug!(pruned, "expired sessions pruned");
        }

        let token = generate_token();
        let expires_at = OffsetDateTime::now_utc() + self.ttl;
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.db)
        .await
        .context("insert session")?;
        debug!(%user_id, "session created");
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> anyhow::Result<Option<Uuid>> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id
              FROM sessions
             WHERE token = $1 AND expires_at > now()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await
        .context("resolve session")?;
        Ok(user_id)
    }

    async fn revoke(&self, token: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.db)
            .await
            .context("delete session")?;
        Ok(res.rows_affected() > 0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    user_id: Uuid,
    expires_at: OffsetDateTime,
}

/// Process-local sessions. Lost on restart.
pub struct MemorySessionStore {
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let token = generate_token();
        let entry = Entry {
            user_id,
            expires_at: now + self.ttl,
        };
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.expires_at > now);
        entries.insert(token.clone(), entry);
        debug!(%user_id, "session created");
        Ok(token)
    }

    async fn resolve(&self, token: &str) -> anyhow::Result<Option<Uuid>> {
        let now = OffsetDateTime::now_utc();
        let entry = self.entries.read().await.get(token).copied();
        match entry {
            Some(e) if e.expires_at > now => Ok(Some(e.user_id)),
            Some(_) => {
                self.entries.write().await.remove(token);
                debug!("expired session dropped");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn revoke(&self, token: &str) -> anyhow::Result<bool> {
        Ok(self.entries.write().await.remove(token).is_some())
    }
}
