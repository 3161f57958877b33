use std::fmt;

use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use sqlx::FromRow;
use time::OffsetDateTime;
use tracing::error;
use uuid::Uuid;

/// User record in the database.
///
/// Has no `Serialize` impl and no accessor for the hash;
/// API output goes through [`crate::auth::dto::UserView`].
#[derive(Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub(crate) password_hash: String, // argon2 PHC string
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: OffsetDateTime,
}

impl User {
    /// Checks `plain` against the stored hash. A corrupt hash counts as a mismatch.
    pub fn verify_password(&self, plain: &str) -> bool {
        let parsed = match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(user_id = %self.id, error = %e, "stored password hash unreadable");
                return false;
            }
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("image_url", &self.image_url)
            .field("bio", &self.bio)
            .finish_non_exhaustive()
    }
}

/// A user that has not been persisted yet.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub(crate) password_hash: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, image_url: Option<String>, bio: Option<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: String::new(),
            image_url,
            bio,
        }
    }

    /// Write-only: stores an argon2id PHC string under a fresh salt, never the
    /// plain text.
    pub fn set_password(&mut self, plain: &str) -> anyhow::Result<()> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| anyhow!("argon2 hash failed: {e}"))?;
        self.password_hash = hash.to_string();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn has_password(&self) -> bool {
        !self.password_hash.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted(new: NewUser) -> User {
        User {
            id: Uuid::new_v4(),
            username: new.username,
            password_hash: new.password_hash,
            image_url: new.image_url,
            bio: new.bio,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn set_password_stores_a_hash() {
        let mut new = NewUser::new("chef1", None, None);
        assert!(!new.has_password());
        new.set_password("p@ss").unwrap();
        assert!(new.has_password());
        assert_ne!(new.password_hash, "p@ss");

        let user = persisted(new);
        assert!(user.verify_password("p@ss"));
        assert!(!user.verify_password("P@ss"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let mut a = NewUser::new("a", None, None);
        let mut b = NewUser::new("b", None, None);
        a.set_password("p@ss").unwrap();
        b.set_password("p@ss").unwrap();
        assert!(a.password_hash.starts_with("$argon2id$"));
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let mut user = persisted(NewUser::new("chef1", None, None));
        user.password_hash = "not-a-valid-hash".into();
        assert!(!user.verify_password("not-a-valid-hash"));
    }

    #[test]
    fn empty_hash_never_verifies() {
        let user = persisted(NewUser::new("ghost", None, None));
        assert!(!user.verify_password(""));
    }

    #[test]
    fn debug_output_omits_hash() {
        let mut new = NewUser::new("chef1", None, Some("likes soup".into()));
        new.set_password("p@ss").unwrap();
        let user = persisted(new);
        let dbg = format!("{user:?}");
        assert!(dbg.contains("chef1"));
        assert!(!dbg.contains("argon2"));
        assert!(!dbg.contains("password"));
    }
}
