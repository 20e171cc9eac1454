//! The module contains the `Account` struct and its persistence model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::EngineError;

/// A checking account.
///
/// One account per user in this design. The balance is denormalized here and
/// only ever mutated through conditional updates (debit on transfer
/// completion, credit on rejection), never from an in-memory copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Stable identifier, a UUID generated once and persisted as a string.
    pub id: Uuid,
    pub user_id: String,
    /// Human-facing display number (`ACC` followed by ten digits).
    pub account_number: String,
    pub balance_minor: i64,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_id: String, account_number: String, balance_minor: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            account_number,
            balance_minor,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub account_number: String,
    pub balance_minor: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            account_number: ActiveValue::Set(value.account_number.clone()),
            balance_minor: ActiveValue::Set(value.balance_minor),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("account not exists".to_string()))?,
            user_id: model.user_id,
            account_number: model.account_number,
            balance_minor: model.balance_minor,
            updated_at: model.updated_at,
        })
    }
}
