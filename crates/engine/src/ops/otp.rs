//! The Code Issuer.
//!
//! A code is usable at most once, only before expiry, and only while the
//! attempt counter is below the limit. All state changes go through
//! conditional updates so the guarantees hold under concurrent submissions
//! (double-click, duplicated request).

use chrono::{Duration, Utc};
use rand::Rng;
use sea_orm::{ActiveValue, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    otp_codes::{self, CODE_TTL_MINUTES, IssuedCode, MAX_ATTEMPTS},
    transfers::TransferDetails,
};

use super::{Engine, access::sha256_hex};

/// A verified code's payload: who initiated the transfer and what they asked
/// for.
#[derive(Clone, Debug)]
pub struct PendingTransfer {
    pub user_id: String,
    pub details: TransferDetails,
}

fn generate_code() -> String {
    // Six digits, leading digit never zero, matching the range the original
    // delivery template promises.
    let mut rng = rand::thread_rng();
    rng.gen_range(100_000..1_000_000u32).to_string()
}

impl Engine {
    /// Issues a fresh code for a validated transfer.
    ///
    /// Persists the hash, never the plaintext; the plaintext is returned once
    /// for out-of-band delivery.
    pub async fn issue_code(
        &self,
        user_id: &str,
        details: &TransferDetails,
    ) -> ResultEngine<IssuedCode> {
        let plaintext = generate_code();
        let now = Utc::now();
        let expires_at = now + Duration::minutes(CODE_TTL_MINUTES);
        let id = Uuid::new_v4();

        let transfer_json = serde_json::to_string(details).map_err(|err| {
            EngineError::InvalidAmount(format!("unserializable transfer details: {err}"))
        })?;

        let model = otp_codes::ActiveModel {
            id: ActiveValue::Set(id.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            code_hash: ActiveValue::Set(sha256_hex(&plaintext)),
            expires_at: ActiveValue::Set(expires_at),
            attempts: ActiveValue::Set(0),
            consumed: ActiveValue::Set(false),
            transfer_json: ActiveValue::Set(transfer_json),
            created_at: ActiveValue::Set(now),
        };
        model.insert(&self.database).await?;

        Ok(IssuedCode {
            id,
            plaintext,
            expires_at,
        })
    }

    /// Verifies a submitted code.
    ///
    /// Every failed comparison increments `attempts` exactly once; success
    /// consumes the code exactly once. Re-verifying a consumed code fails
    /// with `AlreadyUsed` no matter what was submitted.
    pub async fn verify_code(
        &self,
        code_id: Uuid,
        submitted: &str,
    ) -> ResultEngine<PendingTransfer> {
        let model = otp_codes::Entity::find_by_id(code_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("code not exists".to_string()))?;

        if model.consumed {
            return Err(EngineError::AlreadyUsed("code already used".to_string()));
        }
        if Utc::now() > model.expires_at {
            return Err(EngineError::Expired("code expired".to_string()));
        }
        if model.attempts >= MAX_ATTEMPTS {
            return Err(EngineError::TooManyAttempts("code locked".to_string()));
        }

        if sha256_hex(submitted.trim()) != model.code_hash {
            // The WHERE guard keeps the attempt limit exact when two
            // submissions race past the read above.
            let res = otp_codes::Entity::update_many()
                .col_expr(
                    otp_codes::Column::Attempts,
                    Expr::col(otp_codes::Column::Attempts).add(1),
                )
                .filter(otp_codes::Column::Id.eq(code_id.to_string()))
                .filter(otp_codes::Column::Consumed.eq(false))
                .filter(otp_codes::Column::Attempts.lt(MAX_ATTEMPTS))
                .exec(&self.database)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::TooManyAttempts("code locked".to_string()));
            }
            return Err(EngineError::InvalidCode("incorrect code".to_string()));
        }

        // Success is recorded exactly once; a concurrent duplicate loses the
        // conditional update and is told the code was already used.
        let res = otp_codes::Entity::update_many()
            .col_expr(otp_codes::Column::Consumed, Expr::value(true))
            .filter(otp_codes::Column::Id.eq(code_id.to_string()))
            .filter(otp_codes::Column::Consumed.eq(false))
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::AlreadyUsed("code already used".to_string()));
        }

        let details: TransferDetails = serde_json::from_str(&model.transfer_json)
            .map_err(|_| EngineError::KeyNotFound("transfer details not exists".to_string()))?;

        Ok(PendingTransfer {
            user_id: model.user_id,
            details,
        })
    }

    /// Marks a code unusable without verifying it.
    ///
    /// Used for abandonment and for rolling back a code whose delivery
    /// failed. Idempotent: invalidating a consumed code is fine.
    pub(super) async fn invalidate_code(&self, code_id: Uuid) -> ResultEngine<()> {
        let res = otp_codes::Entity::update_many()
            .col_expr(otp_codes::Column::Consumed, Expr::value(true))
            .filter(otp_codes::Column::Id.eq(code_id.to_string()))
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("code not exists".to_string()));
        }
        Ok(())
    }
}
