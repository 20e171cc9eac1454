//! Login / logout endpoints.

use api_types::auth::{LoginRequest, LoginResponse};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::BalanceWatcher;

use crate::{
    ServerError,
    server::{BearerToken, ServerState},
    users::user_view,
};

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let outcome = state.engine.login(&payload.email, &payload.password).await?;

    // Start this user's balance poll for the lifetime of the session.
    // Profiles without an account (possible for bootstrap admins) simply
    // don't get one.
    if let Ok(account) = state.engine.account_for_user(&outcome.user.id).await {
        let mut watchers = state.watchers.lock().await;
        if !watchers.contains_key(&outcome.user.id)
            && let Ok(watcher) = BalanceWatcher::spawn(
                state.engine.clone(),
                account.id.to_string(),
                state.poll_period,
            )
            .await
        {
            watchers.insert(outcome.user.id.clone(), watcher);
        }
    }

    Ok(Json(LoginResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
        user: user_view(outcome.user)?,
    }))
}

pub async fn logout(
    Extension(user): Extension<engine::users::Model>,
    Extension(token): Extension<BearerToken>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.logout(&token.0).await?;

    // Dropping the watcher aborts its poll task.
    state.watchers.lock().await.remove(&user.id);

    Ok(StatusCode::NO_CONTENT)
}
