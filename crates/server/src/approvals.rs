//! Admin approval console endpoints.

use api_types::{
    notice::{NoticeView, NoticesResponse},
    transaction::{
        Direction as ApiDirection, SimulateNew, TransactionListQuery, TransactionListResponse,
    },
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Direction, SimulateCmd};
use uuid::Uuid;

use crate::{ServerError, account::tx_view, server::ServerState};

pub async fn list_pending(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let (txs, next_cursor) = state
        .engine
        .list_pending_transactions(
            user.role()?,
            query.limit.unwrap_or(50),
            query.cursor.as_deref(),
        )
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(tx_view).collect(),
        next_cursor,
    }))
}

pub async fn approve(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .approve_transaction(user.role()?, id, &user.email)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn reject(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .reject_transaction(user.role()?, id, &user.email)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn simulate(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<SimulateNew>,
) -> Result<(StatusCode, Json<api_types::transaction::TransactionView>), ServerError> {
    let tx = state
        .engine
        .simulate_transaction(
            user.role()?,
            SimulateCmd {
                user_id: payload.user_id,
                direction: match payload.direction {
                    ApiDirection::Incoming => Direction::Incoming,
                    ApiDirection::Outgoing => Direction::Outgoing,
                },
                amount_minor: payload.amount_minor,
                description: payload.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(tx_view(tx))))
}

pub async fn notices(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<NoticesResponse>, ServerError> {
    if !user.role()?.is_admin() {
        return Err(ServerError::Engine(engine::EngineError::Forbidden(
            "admin role required".to_string(),
        )));
    }

    let notices = state
        .engine
        .notices()
        .snapshot()
        .into_iter()
        .map(|notice| NoticeView {
            message: notice.message,
            created_at: notice.created_at,
        })
        .collect();

    Ok(Json(NoticesResponse { notices }))
}
