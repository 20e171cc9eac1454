//! Login sessions.
//!
//! Tokens are opaque: 32 random bytes, base64-encoded, handed to the client
//! once. The store keeps only the token's SHA-256 hash. `authenticate` is
//! called by the server middleware on every privileged request and always
//! reloads the owning profile, so role changes and deactivation take effect
//! immediately regardless of what the client's token claims.

use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sea_orm::{ActiveValue, QueryFilter, prelude::*, sea_query::Expr};

use crate::{
    EngineError, ResultEngine,
    sessions::{self, SESSION_TTL_DAYS},
    users,
};

use super::{Engine, access::sha256_hex, normalize_required};

/// A successful login: the one-time-visible token plus the profile.
#[derive(Clone, Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: users::Model,
}

fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

impl Engine {
    /// Credential sign-in.
    ///
    /// The same `Forbidden` comes back for a wrong email and a wrong
    /// password, so the endpoint is not an account oracle.
    pub async fn login(&self, email: &str, password: &str) -> ResultEngine<LoginOutcome> {
        let email = normalize_required(email, "email")?.to_lowercase();
        if password.is_empty() {
            return Err(EngineError::MissingField("password".to_string()));
        }

        let invalid = || EngineError::Forbidden("invalid email or password".to_string());

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .ok_or_else(invalid)?;

        if user.password_hash != sha256_hex(password) {
            return Err(invalid());
        }
        if !user.is_active {
            return Err(EngineError::Forbidden("account disabled".to_string()));
        }

        let token = new_token();
        let now = Utc::now();
        let expires_at = now + Duration::days(SESSION_TTL_DAYS);

        let session = sessions::ActiveModel {
            token_hash: ActiveValue::Set(sha256_hex(&token)),
            user_id: ActiveValue::Set(user.id.clone()),
            expires_at: ActiveValue::Set(expires_at),
            created_at: ActiveValue::Set(now),
        };
        session.insert(&self.database).await?;

        self.touch_last_seen(&user.id).await?;

        Ok(LoginOutcome {
            token,
            expires_at,
            user,
        })
    }

    /// Validates a bearer token and returns the (re-loaded) profile.
    ///
    /// The token is untrusted input: expiry, the session row and the
    /// profile's active flag are all re-checked against the store.
    pub async fn authenticate(&self, token: &str) -> ResultEngine<users::Model> {
        let invalid = || EngineError::Forbidden("invalid session".to_string());

        let session = sessions::Entity::find_by_id(sha256_hex(token))
            .one(&self.database)
            .await?
            .ok_or_else(invalid)?;

        if Utc::now() > session.expires_at {
            sessions::Entity::delete_by_id(session.token_hash)
                .exec(&self.database)
                .await?;
            return Err(EngineError::Expired("session expired".to_string()));
        }

        let user = users::Entity::find_by_id(session.user_id)
            .one(&self.database)
            .await?
            .ok_or_else(invalid)?;
        if !user.is_active {
            return Err(EngineError::Forbidden("account disabled".to_string()));
        }

        self.touch_last_seen(&user.id).await?;
        Ok(user)
    }

    /// Ends a session. Unknown tokens are a no-op, so logout is idempotent.
    pub async fn logout(&self, token: &str) -> ResultEngine<()> {
        sessions::Entity::delete_by_id(sha256_hex(token))
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Tracks online status (the dashboards surface `last_seen`).
    pub async fn touch_last_seen(&self, user_id: &str) -> ResultEngine<()> {
        users::Entity::update_many()
            .col_expr(users::Column::LastSeen, Expr::value(Some(Utc::now())))
            .filter(users::Column::Id.eq(user_id.to_string()))
            .exec(&self.database)
            .await?;
        Ok(())
    }
}
