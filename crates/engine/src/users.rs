//! User profiles and the role lattice.
//!
//! Role semantics: `master_admin` is exempt from the visibility restrictions
//! applied to ordinary admins — an `admin` can neither see nor modify a
//! `master_admin` profile. All role checks go through [`Role::can_view`] /
//! [`Role::can_edit`] so the exemption lives in exactly one place.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    MasterAdmin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::MasterAdmin => "master_admin",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::MasterAdmin)
    }

    /// Whether an actor with this role may see a profile with `target` role.
    ///
    /// Ordinary admins cannot see master admins; users see nobody (their own
    /// profile is always visible and is not routed through this predicate).
    pub fn can_view(self, target: Role) -> bool {
        match self {
            Self::MasterAdmin => true,
            Self::Admin => target != Self::MasterAdmin,
            Self::User => false,
        }
    }

    /// Whether an actor with this role may modify a profile with `target`
    /// role.
    pub fn can_edit(self, target: Role) -> bool {
        // Editing implies viewing; the matrices coincide today but are kept
        // as separate entry points so they can diverge without a hunt.
        self.can_view(target)
    }

    /// Whether an actor with this role may create a user with `granted` role.
    ///
    /// Only master admins hand out elevated roles.
    pub fn may_grant(self, granted: Role) -> bool {
        match self {
            Self::MasterAdmin => true,
            Self::Admin => granted == Self::User,
            Self::User => false,
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "master_admin" => Ok(Self::MasterAdmin),
            other => Err(EngineError::Forbidden(format!("invalid role: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub last_seen: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
    #[sea_orm(has_many = "super::messages::Entity")]
    Messages,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parses the stored role string.
    pub fn role(&self) -> Result<Role, EngineError> {
        Role::try_from(self.role.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_admin_sees_and_edits_everyone() {
        for target in [Role::User, Role::Admin, Role::MasterAdmin] {
            assert!(Role::MasterAdmin.can_view(target));
            assert!(Role::MasterAdmin.can_edit(target));
        }
    }

    #[test]
    fn admin_cannot_touch_master_admin() {
        assert!(Role::Admin.can_view(Role::User));
        assert!(Role::Admin.can_edit(Role::Admin));
        assert!(!Role::Admin.can_view(Role::MasterAdmin));
        assert!(!Role::Admin.can_edit(Role::MasterAdmin));
    }

    #[test]
    fn only_master_admin_grants_elevated_roles() {
        assert!(Role::Admin.may_grant(Role::User));
        assert!(!Role::Admin.may_grant(Role::Admin));
        assert!(!Role::Admin.may_grant(Role::MasterAdmin));
        assert!(Role::MasterAdmin.may_grant(Role::Admin));
        assert!(!Role::User.may_grant(Role::User));
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::User, Role::Admin, Role::MasterAdmin] {
            assert_eq!(Role::try_from(role.as_str()).unwrap(), role);
        }
        assert!(Role::try_from("superuser").is_err());
    }
}
