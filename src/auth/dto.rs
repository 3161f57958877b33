use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::User;
use crate::recipes::{dto::RecipeSummary, repo_types::Recipe};

/// Request body for signup. Fields are optional so missing ones surface as a
/// validation error instead of a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

/// Request body for login. Absent or `null` fields are bad credentials, not a
/// malformed body.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// A user as returned by the API: no password, and its recipes without their
/// owner back-reference.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
    pub recipes: Vec<RecipeSummary>,
}

impl UserView {
    pub fn new(user: User, recipes: Vec<Recipe>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            image_url: user.image_url,
            bio: user.bio,
            recipes: recipes.into_iter().map(RecipeSummary::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::NewUser;
    use time::OffsetDateTime;

    fn user() -> User {
        let mut new = NewUser::new("chef1", Some("http://img".into()), None);
        new.set_password("p@ss").unwrap();
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
    fn user_view_has_no_password_and_no_backlinks() {
        let user = user();
        let recipe = Recipe {
            id: Uuid::new_v4(),
            user_id: user.id,
            title: "soup".into(),
            instructions: "x".repeat(50),
            minutes_to_complete: None,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(UserView::new(user.clone(), vec![recipe])).unwrap();

        let obj = json.as_object().unwrap();
        assert!(obj.keys().all(|k| !k.contains("password")));
        assert_eq!(json["username"], "chef1");
        assert_eq!(json["image_url"], "http://img");
        assert!(json["bio"].is_null());
        assert_eq!(json["recipes"][0]["title"], "soup");
        assert_eq!(json["recipes"][0]["user_id"], user.id.to_string());
        assert!(json["recipes"][0].get("user").is_none());
    }

    #[test]
    fn signup_request_tolerates_missing_fields() {
        let req: SignupRequest = serde_json::from_str(r#"{"username":"chef1"}"#).unwrap();
        assert_eq!(req.username.as_deref(), Some("chef1"));
        assert!(req.password.is_none());

        let login: LoginRequest = serde_json::from_str("{}").unwrap();
        assert!(login.username.is_none());
        let login: LoginRequest =
            serde_json::from_str(r#"{"username":null,"password":"x"}"#).unwrap();
        assert!(login.username.is_none());
        assert_eq!(login.password.as_deref(), Some("x"));
    }
}
