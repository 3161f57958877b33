use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{SignupRequest, UserView},
    repo_types::{NewUser, User},
};
use crate::{error::AppError, state::AppState};

pub(crate) const MISSING_CREDENTIALS: &str = "Username and Password are required";
pub(crate) const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Turns a signup body into a hashed, unsaved user. A blank username is
/// missing; any non-empty password is accepted as is.
pub(crate) fn new_user_from(req: SignupRequest) -> Result<NewUser, AppError> {
    let username = req.username.filter(|u| !u.trim().is_empty());
    let password = req.password.filter(|p| !p.is_empty());
    let (Some(username), Some(password)) = (username, password) else {
        return Err(AppError::Validation(MISSING_CREDENTIALS.into()));
    };
    let mut user = NewUser::new(username, req.image_url, req.bio);
    user.set_password(&password)?;
    Ok(user)
}

pub(crate) async fn signup(state: &AppState, req: SignupRequest) -> Result<User, AppError> {
    let new_user = new_user_from(req)?;
    let username = new_user.username.clone();
    let user = state.repo.create_user(new_user).await.map_err(|e| {
        warn!(%username, error = %e, "signup rejected");
        AppError::from(e)
    })?;
    info!(user_id = %user.id, username = %user.username, "user signed up");
    Ok(user)
}

/// Looks up and verifies credentials. Unknown user and wrong password are
/// indistinguishable to the caller.
pub(crate) async fn authenticate(
    state: &AppState,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<User, AppError> {
    let (Some(username), Some(password)) = (username, password) else {
        warn!("login without username or password");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };
    let user = state.repo.find_user_by_username(username).await?;
    match user {
        Some(u) if u.verify_password(password) => Ok(u),
        Some(u) => {
            warn!(user_id = %u.id, "login invalid password");
            Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()))
        }
        None => {
            warn!(%username, "login unknown username");
            Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()))
        }
    }
}

pub(crate) async fn user_view(state: &AppState, user: User) -> Result<UserView, AppError> {
    let recipes = state.repo.list_recipes_by_user(user.id).await?;
    Ok(UserView::new(user, recipes))
}

pub(crate) async fn load_user(state: &AppState, user_id: Uuid) -> Result<Option<User>, AppError> {
    Ok(state.repo.find_user_by_id(user_id).await?)
}
