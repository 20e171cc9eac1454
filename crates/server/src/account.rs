//! Account dashboard endpoints: balance, refresh, transactions, stats.

use api_types::{
    account::{AccountView, BalanceRefreshQuery, BalanceRefreshResponse},
    stats::StatsView,
    transaction::{
        Direction as ApiDirection, Status as ApiStatus, TransactionListQuery,
        TransactionListResponse, TransactionView,
    },
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::{Direction, Transaction, TransactionListFilter, TransactionStatus};

use crate::{ServerError, server::ServerState};

pub(crate) fn map_direction(direction: Direction) -> ApiDirection {
    match direction {
        Direction::Incoming => ApiDirection::Incoming,
        Direction::Outgoing => ApiDirection::Outgoing,
    }
}

pub(crate) fn map_status(status: TransactionStatus) -> ApiStatus {
    match status {
        TransactionStatus::Pending => ApiStatus::Pending,
        TransactionStatus::Successful => ApiStatus::Successful,
        TransactionStatus::Rejected => ApiStatus::Rejected,
    }
}

pub(crate) fn tx_view(tx: Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        direction: map_direction(tx.direction),
        amount_minor: tx.amount_minor,
        recipient_name: tx.recipient.name,
        recipient_bank: tx.recipient.bank,
        recipient_account: tx.recipient.account_number,
        recipient_country: tx.recipient.country,
        routing_code: tx.recipient.routing_code,
        description: tx.description,
        status: map_status(tx.status),
        created_at: tx.created_at,
    }
}

pub async fn get(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account_for_user(&user.id).await?;
    Ok(Json(AccountView {
        id: account.id.to_string(),
        account_number: account.account_number,
        balance_minor: account.balance_minor,
        updated_at: account.updated_at,
    }))
}

/// Watcher-backed balance check.
///
/// Serves the last value observed by the session's periodic poll; `changed`
/// tells the client whether a re-render is warranted at all.
pub async fn refresh(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<BalanceRefreshQuery>,
) -> Result<Json<BalanceRefreshResponse>, ServerError> {
    let cached = {
        let watchers = state.watchers.lock().await;
        watchers.get(&user.id).map(|watcher| watcher.latest())
    };
    let balance_minor = match cached {
        Some(balance) => balance,
        None => state.engine.account_for_user(&user.id).await?.balance_minor,
    };

    let changed = query
        .last_seen_minor
        .is_none_or(|seen| seen != balance_minor);

    Ok(Json(BalanceRefreshResponse {
        balance_minor,
        changed,
    }))
}

pub async fn list_transactions(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let account = state.engine.account_for_user(&user.id).await?;

    let filter = TransactionListFilter {
        direction: query.direction.map(|d| match d {
            ApiDirection::Incoming => Direction::Incoming,
            ApiDirection::Outgoing => Direction::Outgoing,
        }),
        status: query.status.map(|s| match s {
            ApiStatus::Pending => TransactionStatus::Pending,
            ApiStatus::Successful => TransactionStatus::Successful,
            ApiStatus::Rejected => TransactionStatus::Rejected,
        }),
    };

    let (txs, next_cursor) = state
        .engine
        .list_transactions_for_account_page(
            &account.id.to_string(),
            query.limit.unwrap_or(50),
            query.cursor.as_deref(),
            &filter,
        )
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(tx_view).collect(),
        next_cursor,
    }))
}

pub async fn stats(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<StatsView>, ServerError> {
    let account = state.engine.account_for_user(&user.id).await?;
    let stats = state.engine.account_stats(&account.id.to_string()).await?;

    Ok(Json(StatsView {
        incoming_total_minor: stats.incoming_total_minor,
        outgoing_total_minor: stats.outgoing_total_minor,
        pending_count: stats.pending_count,
        total_count: stats.total_count,
    }))
}
