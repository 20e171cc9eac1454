use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::{Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ResultEngine, Transaction,
    transactions::{self, Direction, TransactionStatus},
};

use super::{Engine, with_tx};

/// Filters for listing an account's transactions.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransactionListFilter {
    /// If present, only transactions in this direction.
    pub direction: Option<Direction>,
    /// If present, only transactions with this status.
    pub status: Option<TransactionStatus>,
}

/// Opaque pagination cursor, newest → older by `(created_at DESC, id DESC)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(super) struct TransactionsCursor {
    pub(super) created_at: DateTime<Utc>,
    pub(super) transaction_id: String,
}

impl TransactionsCursor {
    pub(super) fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    pub(super) fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid transactions cursor".to_string()))
    }

    /// Restricts `query` to rows strictly older than the cursor position.
    pub(super) fn apply<Q: QueryFilter>(self, query: Q) -> Q {
        query.filter(
            Condition::any()
                .add(transactions::Column::CreatedAt.lt(self.created_at))
                .add(
                    Condition::all()
                        .add(transactions::Column::CreatedAt.eq(self.created_at))
                        .add(transactions::Column::Id.lt(self.transaction_id)),
                ),
        )
    }
}

/// Collects `limit` rows out of a `limit + 1` query result and builds the
/// next cursor when more rows remain.
pub(super) fn paginate(
    rows: Vec<transactions::Model>,
    limit: u64,
) -> ResultEngine<(Vec<Transaction>, Option<String>)> {
    let has_more = rows.len() > limit as usize;

    let mut out: Vec<Transaction> = Vec::with_capacity(rows.len().min(limit as usize));
    for model in rows.into_iter().take(limit as usize) {
        out.push(Transaction::try_from(model)?);
    }

    let next_cursor = out.last().map(|tx| TransactionsCursor {
        created_at: tx.created_at,
        transaction_id: tx.id.to_string(),
    });
    let next_cursor = if has_more {
        next_cursor.map(|c| c.encode()).transpose()?
    } else {
        None
    };

    Ok((out, next_cursor))
}

impl Engine {
    /// Lists an account's transactions, newest first, with cursor-based
    /// pagination.
    pub async fn list_transactions_for_account_page(
        &self,
        account_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &TransactionListFilter,
    ) -> ResultEngine<(Vec<Transaction>, Option<String>)> {
        with_tx!(self, |db_tx| {
            // Existence check doubles as the not-found error path.
            self.find_account(&db_tx, account_id).await?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::AccountId.eq(account_id.to_string()))
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                query = TransactionsCursor::decode(cursor)?.apply(query);
            }
            if let Some(direction) = filter.direction {
                query = query.filter(transactions::Column::Direction.eq(direction.as_str()));
            }
            if let Some(status) = filter.status {
                query = query.filter(transactions::Column::Status.eq(status.as_str()));
            }

            let rows: Vec<transactions::Model> = query.all(&db_tx).await?;
            paginate(rows, limit)
        })
    }
}
