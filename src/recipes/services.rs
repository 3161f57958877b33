use uuid::Uuid;

use super::{dto::CreateRecipeRequest, repo_types::NewRecipe};
use crate::error::AppError;

pub const MIN_INSTRUCTIONS_LEN: usize = 50;

pub(crate) const INVALID_RECIPE: &str =
    "Title and Instructions must be present with at least 50 characters";

/// Validates a create request for `user_id`. Length is counted in characters.
pub(crate) fn new_recipe_from(user_id: Uuid, req: CreateRecipeRequest) -> Result<NewRecipe, AppError> {
    let title = req.title.filter(|t| !t.is_empty());
    let instructions = req
        .instructions
        .filter(|i| i.chars().count() >= MIN_INSTRUCTIONS_LEN);

    match (title, instructions) {
        (Some(title), Some(instructions)) => Ok(NewRecipe {
            user_id,
            title,
            instructions,
            minutes_to_complete: req.minutes_to_complete,
        }),
        _ => Err(AppError::Validation(INVALID_RECIPE.into())),
    }
}
