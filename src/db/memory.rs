use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepoError, RepoResult, Repository};
use crate::{
    auth::repo_types::{NewUser, User},
    recipes::repo_types::{NewRecipe, Recipe},
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    recipes: Vec<Recipe>,
}

/// Process-local repository for tests and demos. Every write holds the one
/// lock for its whole check-and-insert.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Conflict("Username already exists".into()));
        }
        let row = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            image_url: user.image_url,
            bio: user.bio,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_user_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.recipes.retain(|r| r.user_id != id);
        Ok(true)
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> RepoResult<Recipe> {
        let mut tables = self.tables.write().await;
        // mirrors the recipes.user_id foreign key
        if !tables.users.contains_key(&recipe.user_id) {
            return Err(RepoError::UnknownOwner(recipe.user_id));
        }
        let row = Recipe {
            id: Uuid::new_v4(),
            user_id: recipe.user_id,
            title: recipe.title,
            instructions: recipe.instructions,
            minutes_to_complete: recipe.minutes_to_complete,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.recipes.push(row.clone());
        Ok(row)
    }

    async fn list_recipes_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Recipe>> {
        let tables = self.tables.read().await;
        Ok(tables
            .recipes
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}
