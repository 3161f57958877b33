use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::Recipe;
use crate::auth::repo_types::User;

#[derive(Debug, Default, Deserialize)]
pub struct CreateRecipeRequest {
    pub title: Option<String>,
    pub instructions: Option<String>,
    pub minutes_to_complete: Option<i32>,
}

/// Recipe nested under its owner; carries only the owner id.
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: Uuid,
}

impl From<Recipe> for RecipeSummary {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title,
            instructions: r.instructions,
            minutes_to_complete: r.minutes_to_complete,
            user_id: r.user_id,
        }
    }
}

/// Owner embedded in a standalone recipe, without the owner's recipe list.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerView {
    pub id: Uuid,
    pub username: String,
    pub image_url: Option<String>,
    pub bio: Option<String>,
}

impl From<&User> for OwnerView {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            image_url: u.image_url.clone(),
            bio: u.bio.clone(),
        }
    }
}

/// A recipe serialized on its own.
#[derive(Debug, Serialize)]
pub struct RecipeView {
    pub id: Uuid,
    pub title: String,
    pub instructions: String,
    pub minutes_to_complete: Option<i32>,
    pub user_id: Uuid,
    pub user: OwnerView,
}

impl RecipeView {
    pub fn new(recipe: Recipe, owner: OwnerView) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            instructions: recipe.instructions,
            minutes_to_complete: recipe.minutes_to_complete,
            user_id: recipe.user_id,
            user: owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn recipe_view_embeds_owner_without_recipes() {
        let owner = OwnerView {
            id: Uuid::new_v4(),
            username: "chef1".into(),
            image_url: None,
            bio: Some("soup person".into()),
        };
        let recipe = Recipe {
            id: Uuid::new_v4(),
            user_id: owner.id,
            title: "soup".into(),
            instructions: "x".repeat(50),
            minutes_to_complete: Some(45),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(RecipeView::new(recipe, owner.clone())).unwrap();

        assert_eq!(json["minutes_to_complete"], 45);
        assert_eq!(json["user_id"], owner.id.to_string());
        assert_eq!(json["user"]["username"], "chef1");
        assert!(json["user"].get("recipes").is_none());
        assert!(json["user"].get("password_hash").is_none());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn minutes_are_optional_and_unconstrained() {
        let req: CreateRecipeRequest =
            serde_json::from_str(r#"{"title":"t","instructions":"i","minutes_to_complete":-5}"#)
                .unwrap();
        assert_eq!(req.minutes_to_complete, Some(-5));

        let req: CreateRecipeRequest = serde_json::from_str(r#"{"title":"t"}"#).unwrap();
        assert!(req.minutes_to_complete.is_none());
        assert!(req.instructions.is_none());
    }
}
