//! Login session records.
//!
//! The client holds an opaque bearer token; only its SHA-256 hash is stored.
//! A session row proves nothing on its own — every privileged request reloads
//! the owning profile and re-checks role and active flag, so a stale or
//! tampered token never outruns the store.

use sea_orm::entity::prelude::*;

/// Days a session stays valid after login.
pub const SESSION_TTL_DAYS: i64 = 30;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: DateTimeUtc,
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
