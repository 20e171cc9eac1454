//! Transaction primitives.
//!
//! A `Transaction` records a single money movement against an account. The
//! status lattice is one-way: `pending` resolves to `successful` or
//! `rejected` and never leaves a terminal state. The amount is immutable
//! after creation.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "incoming" => Ok(Self::Incoming),
            "outgoing" => Ok(Self::Outgoing),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Successful,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Rejected => "rejected",
        }
    }

    /// Terminal statuses never transition again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Successful | Self::Rejected)
    }
}

impl TryFrom<&str> for TransactionStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "successful" => Ok(Self::Successful),
            "rejected" => Ok(Self::Rejected),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction status: {other}"
            ))),
        }
    }
}

/// Recipient descriptor for an outgoing transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub bank: String,
    pub account_number: String,
    /// ISO-3166 alpha-2 destination country.
    pub country: String,
    /// Local routing code, validated against the country table when present.
    pub routing_code: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: String,
    pub direction: Direction,
    pub amount_minor: i64,
    pub recipient: Recipient,
    pub description: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        account_id: String,
        direction: Direction,
        amount_minor: i64,
        recipient: Recipient,
        description: Option<String>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            account_id,
            direction,
            amount_minor,
            recipient,
            description,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub account_id: String,
    pub direction: String,
    pub amount_minor: i64,
    pub recipient_name: String,
    pub recipient_bank: String,
    pub recipient_account: String,
    pub recipient_country: String,
    pub routing_code: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            account_id: ActiveValue::Set(tx.account_id.clone()),
            direction: ActiveValue::Set(tx.direction.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            recipient_name: ActiveValue::Set(tx.recipient.name.clone()),
            recipient_bank: ActiveValue::Set(tx.recipient.bank.clone()),
            recipient_account: ActiveValue::Set(tx.recipient.account_number.clone()),
            recipient_country: ActiveValue::Set(tx.recipient.country.clone()),
            routing_code: ActiveValue::Set(tx.recipient.routing_code.clone()),
            description: ActiveValue::Set(tx.description.clone()),
            status: ActiveValue::Set(tx.status.as_str().to_string()),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::KeyNotFound("transaction not exists".to_string()))?,
            account_id: model.account_id,
            direction: Direction::try_from(model.direction.as_str())?,
            amount_minor: model.amount_minor,
            recipient: Recipient {
                name: model.recipient_name,
                bank: model.recipient_bank,
                account_number: model.recipient_account,
                country: model.recipient_country,
                routing_code: model.routing_code,
            },
            description: model.description,
            status: TransactionStatus::try_from(model.status.as_str())?,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient() -> Recipient {
        Recipient {
            name: "Jane Doe".to_string(),
            bank: "First National".to_string(),
            account_number: "ACC0000000001".to_string(),
            country: "US".to_string(),
            routing_code: Some("021000021".to_string()),
        }
    }

    #[test]
    fn new_transaction_starts_pending() {
        let tx = Transaction::new(
            "acc".to_string(),
            Direction::Outgoing,
            4000,
            recipient(),
            None,
        )
        .unwrap();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(!tx.status.is_terminal());
    }

    #[test]
    fn new_transaction_rejects_non_positive_amounts() {
        for amount in [0, -1] {
            let err = Transaction::new(
                "acc".to_string(),
                Direction::Outgoing,
                amount,
                recipient(),
                None,
            )
            .unwrap_err();
            assert!(matches!(err, EngineError::InvalidAmount(_)));
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Successful,
            TransactionStatus::Rejected,
        ] {
            assert_eq!(
                TransactionStatus::try_from(status.as_str()).unwrap(),
                status
            );
        }
    }
}
