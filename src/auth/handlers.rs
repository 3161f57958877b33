use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument};

use super::{
    dto::{LoginRequest, MessageResponse, SignupRequest, UserView},
    extractors::{removal_cookie, session_cookie, CurrentUser},
    services,
};
use crate::{error::AppError, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", delete(logout))
        .route("/check_session", get(check_session))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let Json(payload) = payload?;
    services::signup(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully".into(),
        }),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<UserView>), AppError> {
    let Json(payload) = payload?;
    let user = services::authenticate(
        &state,
        payload.username.as_deref(),
        payload.password.as_deref(),
    )
    .await?;

    // a fresh login replaces whatever session this client already held
    let cookie_name = &state.config.session.cookie_name;
    if let Some(old) = jar.get(cookie_name).map(|c| c.value().to_owned()) {
        state.sessions.revoke(&old).await?;
    }

    let token = state.sessions.create(user.id).await?;
    let jar = jar.add(session_cookie(&state.config.session, token));

    info!(user_id = %user.id, username = %user.username, "user logged in");
    let view = services::user_view(&state, user).await?;
    Ok((jar, Json(view)))
}

#[instrument(skip_all)]
pub async fn check_session(
    State(state): State<AppState>,
    CurrentUser { user, .. }: CurrentUser,
) -> Result<Json<UserView>, AppError> {
    Ok(Json(services::user_view(&state, user).await?))
}

#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentUser { user, token }: CurrentUser,
) -> Result<(StatusCode, CookieJar), AppError> {
    state.sessions.revoke(&token).await?;
    info!(user_id = %user.id, "user logged out");
    Ok((StatusCode::NO_CONTENT, jar.remove(removal_cookie(&state.config.session))))
}
