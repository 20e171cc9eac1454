//! The Approval Workflow.
//!
//! Reviewers see pending transactions newest-first and either finalize
//! (status flip, the debit stands) or reverse (refund plus status flip,
//! atomically). Status transitions are one-way: a resolved transaction can
//! never be resolved again, and the second reviewer to race on the same row
//! is told so.

use sea_orm::{
    QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction,
    transactions::{self, Direction, Recipient, TransactionStatus},
    users::Role,
};

use super::{
    Engine, access::ensure_admin, normalize_optional_text,
    transactions::{TransactionsCursor, paginate},
    with_tx,
};

/// Dashboard aggregate for one account.
///
/// Always recomputed from the full transaction set — approvals and
/// rejections happen out of band, so no incremental cache can be trusted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccountStats {
    /// Sum of resolved-successful incoming amounts, minor units.
    pub incoming_total_minor: i64,
    /// Sum of resolved-successful outgoing amounts, minor units.
    pub outgoing_total_minor: i64,
    pub pending_count: u64,
    pub total_count: u64,
}

/// Admin-injected transaction (the original dashboard's "simulate" page).
#[derive(Clone, Debug)]
pub struct SimulateCmd {
    pub user_id: String,
    pub direction: Direction,
    pub amount_minor: i64,
    pub description: Option<String>,
}

impl Engine {
    /// Lists pending transactions, newest first, cursor-paginated.
    pub async fn list_pending_transactions(
        &self,
        actor: Role,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<Transaction>, Option<String>)> {
        ensure_admin(actor)?;

        let limit_plus_one = limit.saturating_add(1);
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
            .order_by_desc(transactions::Column::CreatedAt)
            .order_by_desc(transactions::Column::Id)
            .limit(limit_plus_one);

        if let Some(cursor) = cursor {
            query = TransactionsCursor::decode(cursor)?.apply(query);
        }

        let rows: Vec<transactions::Model> = query.all(&self.database).await?;
        paginate(rows, limit)
    }

    /// Finalizes a pending transaction. The debit was applied at creation
    /// time, so no balance changes here.
    pub async fn approve_transaction(
        &self,
        actor: Role,
        tx_id: Uuid,
        reviewer: &str,
    ) -> ResultEngine<()> {
        ensure_admin(actor)?;

        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(tx_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
            if TransactionStatus::try_from(model.status.as_str())?.is_terminal() {
                return Err(EngineError::AlreadyResolved(
                    "transaction already resolved".to_string(),
                ));
            }

            let res = transactions::Entity::update_many()
                .col_expr(
                    transactions::Column::Status,
                    Expr::value(TransactionStatus::Successful.as_str()),
                )
                .filter(transactions::Column::Id.eq(tx_id.to_string()))
                .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::AlreadyResolved(
                    "transaction already resolved".to_string(),
                ));
            }
            Ok::<_, EngineError>(())
        })?;

        self.notices
            .record(format!("Transaction {tx_id} approved by {reviewer}"));
        Ok(())
    }

    /// Reverses a pending transaction.
    ///
    /// For outgoing transactions the originating account is credited back by
    /// the transaction amount; refund and status flip share one DB
    /// transaction, so either both happen or neither does.
    pub async fn reject_transaction(
        &self,
        actor: Role,
        tx_id: Uuid,
        reviewer: &str,
    ) -> ResultEngine<()> {
        ensure_admin(actor)?;

        let refunded = with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(tx_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
            if TransactionStatus::try_from(model.status.as_str())?.is_terminal() {
                return Err(EngineError::AlreadyResolved(
                    "transaction already resolved".to_string(),
                ));
            }

            let direction = Direction::try_from(model.direction.as_str())?;
            if direction == Direction::Outgoing {
                self.credit_account(&db_tx, &model.account_id, model.amount_minor)
                    .await?;
            }

            let res = transactions::Entity::update_many()
                .col_expr(
                    transactions::Column::Status,
                    Expr::value(TransactionStatus::Rejected.as_str()),
                )
                .filter(transactions::Column::Id.eq(tx_id.to_string()))
                .filter(transactions::Column::Status.eq(TransactionStatus::Pending.as_str()))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                // Lost the race to another reviewer; rolls the refund back.
                return Err(EngineError::AlreadyResolved(
                    "transaction already resolved".to_string(),
                ));
            }
            Ok::<_, EngineError>(direction == Direction::Outgoing)
        })?;

        let refund_note = if refunded { ", amount refunded" } else { "" };
        self.notices
            .record(format!("Transaction {tx_id} rejected by {reviewer}{refund_note}"));
        Ok(())
    }

    /// Recomputes the dashboard aggregate from the full transaction set.
    pub async fn account_stats(&self, account_id: &str) -> ResultEngine<AccountStats> {
        let backend = self.database.get_database_backend();

        let sum_for = |direction: Direction| {
            Statement::from_sql_and_values(
                backend,
                "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
                 FROM transactions \
                 WHERE account_id = ? AND direction = ? AND status = ?",
                vec![
                    account_id.into(),
                    direction.as_str().into(),
                    TransactionStatus::Successful.as_str().into(),
                ],
            )
        };

        let incoming_total_minor: i64 = {
            let row = self.database.query_one(sum_for(Direction::Incoming)).await?;
            row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0)
        };
        let outgoing_total_minor: i64 = {
            let row = self.database.query_one(sum_for(Direction::Outgoing)).await?;
            row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0)
        };

        let pending_count: i64 = {
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT COUNT(*) AS count FROM transactions WHERE account_id = ? AND status = ?",
                vec![
                    account_id.into(),
                    TransactionStatus::Pending.as_str().into(),
                ],
            );
            let row = self.database.query_one(stmt).await?;
            row.and_then(|r| r.try_get("", "count").ok()).unwrap_or(0)
        };
        let total_count: i64 = {
            let stmt = Statement::from_sql_and_values(
                backend,
                "SELECT COUNT(*) AS count FROM transactions WHERE account_id = ?",
                vec![account_id.into()],
            );
            let row = self.database.query_one(stmt).await?;
            row.and_then(|r| r.try_get("", "count").ok()).unwrap_or(0)
        };

        Ok(AccountStats {
            incoming_total_minor,
            outgoing_total_minor,
            pending_count: pending_count.max(0) as u64,
            total_count: total_count.max(0) as u64,
        })
    }

    /// Injects a pending transaction on behalf of a user (admin tooling).
    ///
    /// An outgoing simulation performs the same conditional debit as a real
    /// transfer; an incoming one only creates the record.
    pub async fn simulate_transaction(
        &self,
        actor: Role,
        cmd: SimulateCmd,
    ) -> ResultEngine<Transaction> {
        ensure_admin(actor)?;
        if cmd.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }

        let tx = with_tx!(self, |db_tx| {
            // Visibility doubles as the authorization check: an admin cannot
            // inject transactions for accounts it cannot see.
            let user = self
                .require_visible_user(&db_tx, actor, &cmd.user_id)
                .await?;
            let account = self.find_account_for_user(&db_tx, &user.id).await?;

            if cmd.direction == Direction::Outgoing {
                self.debit_account(&db_tx, &account.id, cmd.amount_minor)
                    .await?;
            }

            let tx = Transaction::new(
                account.id.clone(),
                cmd.direction,
                cmd.amount_minor,
                Recipient {
                    name: "Bank Transfer".to_string(),
                    bank: "Internal".to_string(),
                    account_number: account.account_number.clone(),
                    country: "US".to_string(),
                    routing_code: None,
                },
                normalize_optional_text(cmd.description.as_deref()),
            )?;
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            Ok::<_, EngineError>(tx)
        })?;

        self.notices.record(format!(
            "Simulated {} transaction of {} for user {}",
            tx.direction.as_str(),
            crate::MoneyCents::new(tx.amount_minor),
            cmd.user_id
        ));
        Ok(tx)
    }
}
