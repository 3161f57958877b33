use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::warn;

use super::{repo_types::User, services};
use crate::{config::SessionConfig, error::AppError, state::AppState};

pub(crate) const UNAUTHORIZED: &str = "Unauthorized";

/// The user behind the request's session cookie.
pub struct CurrentUser {
    pub user: User,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(&state.config.session.cookie_name)
            .map(|c| c.value().to_owned())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized(UNAUTHORIZED.into()))?;

        let Some(user_id) = state.sessions.resolve(&token).await? else {
            return Err(AppError::Unauthorized(UNAUTHORIZED.into()));
        };

        // a session can outlive its user in the in-memory backend
        let Some(user) = services::load_user(state, user_id).await? else {
            warn!(%user_id, "session for missing user");
            state.sessions.revoke(&token).await?;
            return Err(AppError::Unauthorized(UNAUTHORIZED.into()));
        };

        Ok(CurrentUser { user, token })
    }
}

pub(crate) fn session_cookie(cfg: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(cfg.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(cfg.ttl_minutes))
        .build()
}

pub(crate) fn removal_cookie(cfg: &SessionConfig) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), "")).path("/").build()
}
