//! One-time code records.
//!
//! Only the SHA-256 hash of a code is ever persisted; the plaintext exists
//! just long enough to be handed to the out-of-band delivery channel. The
//! validated transfer details the code protects ride along as JSON so that
//! `complete` can be driven with nothing but the code id and the submitted
//! digits.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

/// Number of digits in a generated code.
pub const CODE_LENGTH: usize = 6;
/// Minutes a code stays valid after issuance.
pub const CODE_TTL_MINUTES: i64 = 5;
/// Failed comparisons allowed before the code locks.
pub const MAX_ATTEMPTS: i32 = 3;

/// A freshly issued code, plaintext included.
///
/// The plaintext is returned to the caller exactly once for out-of-band
/// delivery and is never persisted.
#[derive(Clone, Debug)]
pub struct IssuedCode {
    pub id: Uuid,
    pub plaintext: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "otp_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub code_hash: String,
    pub expires_at: DateTimeUtc,
    pub attempts: i32,
    pub consumed: bool,
    /// Serialized `TransferDetails` guarded by this code.
    pub transfer_json: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
