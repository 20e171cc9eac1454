use chrono::Utc;
use rand::Rng;
use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};

use crate::{Account, EngineError, ResultEngine, accounts};

use super::Engine;

impl Engine {
    /// Returns the account owned by a user.
    pub async fn account_for_user(&self, user_id: &str) -> ResultEngine<Account> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Account::try_from(model)
    }

    /// Reads the current stored balance. Read-only; this is what the balance
    /// watcher polls.
    pub async fn account_balance(&self, account_id: &str) -> ResultEngine<i64> {
        let model = accounts::Entity::find_by_id(account_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Ok(model.balance_minor)
    }

    pub(super) async fn find_account(
        &self,
        db: &DatabaseTransaction,
        account_id: &str,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    pub(super) async fn find_account_for_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    /// Compare-and-set debit.
    ///
    /// The `balance_minor >= amount` filter makes the debit conditional on
    /// the *stored* balance, so a concurrent admin refund or second transfer
    /// can never be lost — one of the writers loses the race instead.
    pub(super) async fn debit_account(
        &self,
        db: &DatabaseTransaction,
        account_id: &str,
        amount_minor: i64,
    ) -> ResultEngine<()> {
        let res = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).sub(amount_minor),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .filter(accounts::Column::BalanceMinor.gte(amount_minor))
            .exec(db)
            .await?;

        if res.rows_affected == 0 {
            // Distinguish a missing account from a lost race on the balance.
            let exists = accounts::Entity::find_by_id(account_id.to_string())
                .one(db)
                .await?
                .is_some();
            return Err(if exists {
                EngineError::InsufficientFunds("amount exceeds available balance".to_string())
            } else {
                EngineError::KeyNotFound("account not exists".to_string())
            });
        }
        Ok(())
    }

    /// Credits an account (refund path). Unconditional apart from existence.
    pub(super) async fn credit_account(
        &self,
        db: &DatabaseTransaction,
        account_id: &str,
        amount_minor: i64,
    ) -> ResultEngine<()> {
        let res = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::BalanceMinor,
                Expr::col(accounts::Column::BalanceMinor).add(amount_minor),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(account_id.to_string()))
            .exec(db)
            .await?;

        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("account not exists".to_string()));
        }
        Ok(())
    }

    /// Generates a display number: `ACC` followed by ten digits.
    pub(super) fn new_account_number() -> String {
        let mut rng = rand::thread_rng();
        let digits: String = (0..10)
            .map(|_| char::from(b'0' + rng.gen_range(0..10)))
            .collect();
        format!("ACC{digits}")
    }
}
