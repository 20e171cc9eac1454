//! User management (admin console + self-service profile).
//!
//! Every cross-user operation funnels through the visibility predicates in
//! `users::Role`, so the master-admin exemption lives in one place instead
//! of being string-compared at each call site.

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Account, EngineError, ResultEngine, accounts, messages, otp_codes, sessions, transactions,
    users::{self, Role},
};

use super::{
    Engine,
    access::{ensure_admin, sha256_hex},
    normalize_required, with_tx,
};

/// Default starting balance for newly created accounts: $5000.00.
pub const DEFAULT_STARTING_BALANCE_MINOR: i64 = 500_000;

#[derive(Clone, Debug)]
pub struct CreateUserCmd {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    pub starting_balance_minor: i64,
}

impl Engine {
    /// Creates a user together with its account.
    ///
    /// Ordinary admins can only create plain users; handing out elevated
    /// roles is a master-admin privilege.
    pub async fn create_user(&self, actor: Role, cmd: CreateUserCmd) -> ResultEngine<users::Model> {
        if !actor.may_grant(cmd.role) {
            return Err(EngineError::Forbidden(format!(
                "not allowed to grant role {}",
                cmd.role.as_str()
            )));
        }

        let email = normalize_required(&cmd.email, "email")?.to_lowercase();
        let name = normalize_required(&cmd.name, "name")?;
        if cmd.password.is_empty() {
            return Err(EngineError::MissingField("password".to_string()));
        }
        if cmd.starting_balance_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "starting balance must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            if users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(email));
            }

            let user = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                email: ActiveValue::Set(email),
                name: ActiveValue::Set(name),
                password_hash: ActiveValue::Set(sha256_hex(&cmd.password)),
                role: ActiveValue::Set(cmd.role.as_str().to_string()),
                is_active: ActiveValue::Set(true),
                last_seen: ActiveValue::Set(None),
                created_at: ActiveValue::Set(Utc::now()),
            };
            let user = user.insert(&db_tx).await?;

            let account = Account::new(
                user.id.clone(),
                Self::new_account_number(),
                cmd.starting_balance_minor,
            );
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;

            Ok(user)
        })
    }

    /// Lists profiles visible to the actor, newest first.
    ///
    /// Ordinary admins get the master-admin rows filtered out at the query,
    /// matching what `Role::can_view` would say row by row.
    pub async fn list_users(&self, actor: Role) -> ResultEngine<Vec<users::Model>> {
        ensure_admin(actor)?;

        let mut query = users::Entity::find().order_by_desc(users::Column::CreatedAt);
        if actor != Role::MasterAdmin {
            query = query.filter(users::Column::Role.ne(Role::MasterAdmin.as_str()));
        }

        Ok(query.all(&self.database).await?)
    }

    pub async fn user_by_id(&self, user_id: &str) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Enables or disables a profile. Disabled users fail authentication on
    /// their next request.
    pub async fn set_user_active(
        &self,
        actor: Role,
        user_id: &str,
        active: bool,
    ) -> ResultEngine<users::Model> {
        ensure_admin(actor)?;

        with_tx!(self, |db_tx| {
            let user = self.require_editable_user(&db_tx, actor, user_id).await?;
            let mut user: users::ActiveModel = user.into();
            user.is_active = ActiveValue::Set(active);
            Ok(user.update(&db_tx).await?)
        })
    }

    /// Admin-side profile edit (name and/or email).
    pub async fn update_user_profile(
        &self,
        actor: Role,
        user_id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> ResultEngine<users::Model> {
        ensure_admin(actor)?;

        with_tx!(self, |db_tx| {
            let user = self.require_editable_user(&db_tx, actor, user_id).await?;
            self.apply_profile_update(&db_tx, user, name, email).await
        })
    }

    /// Self-service profile edit. Role and active flag are not reachable
    /// from here.
    pub async fn update_my_profile(
        &self,
        user_id: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> ResultEngine<users::Model> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;
            self.apply_profile_update(&db_tx, user, name, email).await
        })
    }

    async fn apply_profile_update(
        &self,
        db_tx: &DatabaseTransaction,
        user: users::Model,
        name: Option<&str>,
        email: Option<&str>,
    ) -> ResultEngine<users::Model> {
        let user_id = user.id.clone();
        let mut active: users::ActiveModel = user.into();

        if let Some(name) = name {
            active.name = ActiveValue::Set(normalize_required(name, "name")?);
        }
        if let Some(email) = email {
            let email = normalize_required(email, "email")?.to_lowercase();
            let taken = users::Entity::find()
                .filter(users::Column::Email.eq(email.clone()))
                .filter(users::Column::Id.ne(user_id))
                .one(db_tx)
                .await?
                .is_some();
            if taken {
                return Err(EngineError::ExistingKey(email));
            }
            active.email = ActiveValue::Set(email);
        }

        Ok(active.update(db_tx).await?)
    }

    /// Deletes a profile and everything hanging off it (account,
    /// transactions, codes, messages, sessions).
    pub async fn delete_user(&self, actor: Role, user_id: &str) -> ResultEngine<()> {
        ensure_admin(actor)?;

        with_tx!(self, |db_tx| {
            let user = self.require_editable_user(&db_tx, actor, user_id).await?;

            if let Some(account) = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user.id.clone()))
                .one(&db_tx)
                .await?
            {
                transactions::Entity::delete_many()
                    .filter(transactions::Column::AccountId.eq(account.id.clone()))
                    .exec(&db_tx)
                    .await?;
                accounts::Entity::delete_by_id(account.id).exec(&db_tx).await?;
            }

            otp_codes::Entity::delete_many()
                .filter(otp_codes::Column::UserId.eq(user.id.clone()))
                .exec(&db_tx)
                .await?;
            messages::Entity::delete_many()
                .filter(messages::Column::UserId.eq(user.id.clone()))
                .exec(&db_tx)
                .await?;
            sessions::Entity::delete_many()
                .filter(sessions::Column::UserId.eq(user.id.clone()))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user.id).exec(&db_tx).await?;

            Ok(())
        })
    }
}
