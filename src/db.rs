use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    auth::repo_types::{NewUser, User},
    recipes::repo_types::{NewRecipe, Recipe},
};

mod memory;

pub use memory::MemoryRepository;

const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum RepoError {
    /// A uniqueness constraint rejected the write; nothing was stored.
    #[error("{0}")]
    Conflict(String),

    /// A recipe referenced a user that does not exist.
    #[error("owner {0} does not exist")]
    UnknownOwner(Uuid),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Typed persistence operations for users and recipes.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Inserts the user atomically; a taken username yields [`RepoError::Conflict`].
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Deletes the user together with its recipes. Returns false if absent.
    ///
    /// Sessions live in the [`crate::auth::session::SessionStore`]; the postgres
    /// schema cascades them, and a session whose user is gone never authenticates.
    async fn delete_user(&self, id: Uuid) -> RepoResult<bool>;

    async fn create_recipe(&self, recipe: NewRecipe) -> RepoResult<Recipe>;
    /// Recipes owned by `user_id`, oldest first.
    async fn list_recipes_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Recipe>>;
}

pub type RepositoryState = Arc<dyn Repository>;

#[derive(Clone)]
pub struct PgRepository {
    db: PgPool,
}

impl PgRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|c| c == code)
}

fn map_unique_violation(err: sqlx::Error, message: &str) -> RepoError {
    if has_code(&err, PG_UNIQUE_VIOLATION) {
        RepoError::Conflict(message.to_string())
    } else {
        RepoError::Database(err)
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, password_hash, image_url, bio)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, password_hash, image_url, bio, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.image_url)
        .bind(&user.bio)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "Username already exists"))
    }

    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, image_url, bio, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, image_url, bio, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        // recipes and sessions go with it via ON DELETE CASCADE
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> RepoResult<Recipe> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (id, user_id, title, instructions, minutes_to_complete)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, instructions, minutes_to_complete, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recipe.user_id)
        .bind(&recipe.title)
        .bind(&recipe.instructions)
        .bind(recipe.minutes_to_complete)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if has_code(&e, PG_FOREIGN_KEY_VIOLATION) {
                RepoError::UnknownOwner(recipe.user_id)
            } else {
                RepoError::Database(e)
            }
        })?;
        Ok(row)
    }

    async fn list_recipes_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Recipe>> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, user_id, title, instructions, minutes_to_complete, created_at
            FROM recipes
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
