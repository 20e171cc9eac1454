//! Admin user management endpoints.

use api_types::user::{Role as ApiRole, UserCreate, UserUpdate, UserView, UsersResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CreateUserCmd, DEFAULT_STARTING_BALANCE_MINOR, Role};

use crate::{ServerError, server::ServerState};

fn map_role(role: Role) -> ApiRole {
    match role {
        Role::User => ApiRole::User,
        Role::Admin => ApiRole::Admin,
        Role::MasterAdmin => ApiRole::MasterAdmin,
    }
}

fn unmap_role(role: ApiRole) -> Role {
    match role {
        ApiRole::User => Role::User,
        ApiRole::Admin => Role::Admin,
        ApiRole::MasterAdmin => Role::MasterAdmin,
    }
}

pub(crate) fn user_view(user: engine::users::Model) -> Result<UserView, ServerError> {
    let role = map_role(user.role()?);
    Ok(UserView {
        id: user.id,
        email: user.email,
        name: user.name,
        role,
        is_active: user.is_active,
        last_seen: user.last_seen,
        created_at: user.created_at,
    })
}

pub async fn list(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<UsersResponse>, ServerError> {
    let users = state
        .engine
        .list_users(user.role()?)
        .await?
        .into_iter()
        .map(user_view)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(UsersResponse { users }))
}

pub async fn create(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let created = state
        .engine
        .create_user(
            user.role()?,
            CreateUserCmd {
                email: payload.email,
                name: payload.name,
                password: payload.password,
                role: payload.role.map(unmap_role).unwrap_or(Role::User),
                starting_balance_minor: payload
                    .starting_balance_minor
                    .unwrap_or(DEFAULT_STARTING_BALANCE_MINOR),
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user_view(created)?)))
}

pub async fn update(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let actor = user.role()?;

    let mut updated = None;
    if payload.name.is_some() || payload.email.is_some() {
        updated = Some(
            state
                .engine
                .update_user_profile(actor, &id, payload.name.as_deref(), payload.email.as_deref())
                .await?,
        );
    }
    if let Some(active) = payload.is_active {
        updated = Some(state.engine.set_user_active(actor, &id, active).await?);
    }

    let Some(updated) = updated else {
        return Err(ServerError::Generic("no fields to update".to_string()));
    };

    Ok(Json(user_view(updated)?))
}

/// The caller's own profile.
pub async fn profile(
    Extension(user): Extension<engine::users::Model>,
) -> Result<Json<UserView>, ServerError> {
    Ok(Json(user_view(user)?))
}

/// Self-service edit. Role and active flag are not reachable from here.
pub async fn update_profile_self(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    if payload.is_active.is_some() {
        return Err(ServerError::Generic(
            "cannot change own active flag".to_string(),
        ));
    }
    if payload.name.is_none() && payload.email.is_none() {
        return Err(ServerError::Generic("no fields to update".to_string()));
    }

    let updated = state
        .engine
        .update_my_profile(&user.id, payload.name.as_deref(), payload.email.as_deref())
        .await?;

    Ok(Json(user_view(updated)?))
}

pub async fn remove(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(user.role()?, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
