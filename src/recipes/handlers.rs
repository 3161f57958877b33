use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateRecipeRequest, OwnerView, RecipeView},
    services::new_recipe_from,
};
use crate::{auth::extractors::CurrentUser, error::AppError, state::AppState};

pub fn recipe_routes() -> Router<AppState> {
    Router::new().route("/recipes", get(list_recipes).post(create_recipe))
}

#[instrument(skip_all, fields(user_id = %current.user.id))]
pub async fn list_recipes(
    State(state): State<AppState>,
    current: CurrentUser,
) -> Result<Json<Vec<RecipeView>>, AppError> {
    let owner = OwnerView::from(&current.user);
    let recipes = state.repo.list_recipes_by_user(current.user.id).await?;
    let items = recipes
        .into_iter()
        .map(|r| RecipeView::new(r, owner.clone()))
        .collect();
    Ok(Json(items))
}

#[instrument(skip_all, fields(user_id = %current.user.id))]
pub async fn create_recipe(
    State(state): State<AppState>,
    current: CurrentUser,
    payload: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecipeView>), AppError> {
    let Json(payload) = payload?;
    let new_recipe = new_recipe_from(current.user.id, payload)?;
    let recipe = state.repo.create_recipe(new_recipe).await?;
    info!(recipe_id = %recipe.id, "recipe created");
    Ok((
        StatusCode::CREATED,
        Json(RecipeView::new(recipe, OwnerView::from(&current.user))),
    ))
}
