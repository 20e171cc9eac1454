//! The Transfer Orchestrator.
//!
//! `initiate` validates and gets a code in front of the user; `complete`
//! turns a verified code into a debit plus a pending transaction, atomically.
//! The debit happens at completion, not at initiation — an abandoned transfer
//! leaves no partial state behind by construction.

use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, routing,
    notify::SentCode,
    otp_codes::{CODE_TTL_MINUTES, IssuedCode},
    transactions::{Direction, Recipient},
    transfers::TransferDetails,
};

use super::{Engine, normalize_optional_text, normalize_required, with_tx};

impl Engine {
    /// Validates transfer details against the current stored balance.
    ///
    /// Returns the normalized details (trimmed fields, empty optionals
    /// dropped) so later stages work with canonical input.
    pub async fn validate_transfer(
        &self,
        user_id: &str,
        details: &TransferDetails,
    ) -> ResultEngine<TransferDetails> {
        let recipient_name = normalize_required(&details.recipient_name, "recipient name")?;
        let recipient_bank = normalize_required(&details.recipient_bank, "recipient bank")?;
        let recipient_account =
            normalize_required(&details.recipient_account, "recipient account")?;
        let recipient_country =
            normalize_required(&details.recipient_country, "destination country")?;

        if details.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }

        routing::validate_routing_code(&recipient_country, details.routing_code.as_deref())?;

        let account = self.account_for_user(user_id).await?;
        if details.amount_minor > account.balance_minor {
            return Err(EngineError::InsufficientFunds(
                "amount exceeds available balance".to_string(),
            ));
        }

        Ok(TransferDetails {
            recipient_name,
            recipient_bank,
            recipient_account,
            amount_minor: details.amount_minor,
            recipient_country,
            routing_code: normalize_optional_text(details.routing_code.as_deref()),
            description: normalize_optional_text(details.description.as_deref()),
        })
    }

    /// Validates, issues a one-time code and delivers it out-of-band.
    ///
    /// The send is awaited before issuance is declared successful; on
    /// delivery failure the fresh code is made unusable and the caller gets
    /// `DeliveryFailure`. No balance is touched here.
    pub async fn initiate_transfer(
        &self,
        user_id: &str,
        details: TransferDetails,
    ) -> ResultEngine<IssuedCode> {
        let sender = self.code_sender()?;
        let details = self.validate_transfer(user_id, &details).await?;

        let user = crate::users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

        let issued = self.issue_code(user_id, &details).await?;

        let payload = SentCode {
            to_email: user.email.clone(),
            user_name: user.name.clone(),
            recipient_name: details.recipient_name.clone(),
            amount_minor: details.amount_minor,
            plaintext: issued.plaintext.clone(),
            valid_minutes: CODE_TTL_MINUTES,
        };
        if let Err(err) = sender.send_code(&payload).await {
            // The code was never seen by anyone; leave it behind but
            // unusable before surfacing the failure.
            self.invalidate_code(issued.id).await?;
            return Err(EngineError::DeliveryFailure(err.to_string()));
        }

        Ok(issued)
    }

    /// Verifies the submitted code and commits the transfer.
    ///
    /// Debit and transaction insert share one DB transaction: both happen or
    /// neither does. On any verify failure the flow stays at `CodeSent` —
    /// nothing is created and no balance changes.
    pub async fn complete_transfer(
        &self,
        code_id: Uuid,
        submitted: &str,
    ) -> ResultEngine<Transaction> {
        let pending = self.verify_code(code_id, submitted).await?;

        with_tx!(self, |db_tx| {
            let account = self.find_account_for_user(&db_tx, &pending.user_id).await?;
            self.debit_account(&db_tx, &account.id, pending.details.amount_minor)
                .await?;

            let details = pending.details;
            let tx = Transaction::new(
                account.id.clone(),
                Direction::Outgoing,
                details.amount_minor,
                Recipient {
                    name: details.recipient_name,
                    bank: details.recipient_bank,
                    account_number: details.recipient_account,
                    country: details.recipient_country,
                    routing_code: details.routing_code,
                },
                details.description,
            )?;
            crate::transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            Ok(tx)
        })
    }

    /// Abandons a transfer at the `CodeSent` stage.
    ///
    /// The code becomes unusable; balances and transactions are untouched.
    pub async fn cancel_transfer(&self, code_id: Uuid) -> ResultEngine<()> {
        self.invalidate_code(code_id).await
    }
}
