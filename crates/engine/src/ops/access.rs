use sea_orm::{DatabaseTransaction, prelude::*};
use sha2::{Digest, Sha256};

use crate::{EngineError, ResultEngine, users, users::Role};

use super::Engine;

/// Hex SHA-256 digest, used for one-time codes, passwords and session
/// tokens alike.
pub(super) fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub(super) fn ensure_admin(actor: Role) -> ResultEngine<()> {
    if !actor.is_admin() {
        return Err(EngineError::Forbidden("admin role required".to_string()));
    }
    Ok(())
}

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Loads a user the actor is allowed to see.
    ///
    /// Profiles outside the actor's visibility are reported as missing, so a
    /// probing admin cannot distinguish "hidden" from "absent".
    pub(super) async fn require_visible_user(
        &self,
        db: &DatabaseTransaction,
        actor: Role,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        let user = self.require_user(db, user_id).await?;
        if !actor.can_view(user.role()?) {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(user)
    }

    /// Loads a user the actor is allowed to modify.
    pub(super) async fn require_editable_user(
        &self,
        db: &DatabaseTransaction,
        actor: Role,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        let user = self.require_visible_user(db, actor, user_id).await?;
        if !actor.can_edit(user.role()?) {
            return Err(EngineError::Forbidden(
                "not allowed to modify this user".to_string(),
            ));
        }
        Ok(user)
    }
}
