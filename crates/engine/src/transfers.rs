//! Transfer request primitives.
//!
//! A transfer attempt moves through `Draft -> DetailsEntered -> CodeSent ->
//! Completed | Abandoned`. The first two states live on the client; the
//! engine picks up at `CodeSent` (a live one-time-code row carrying these
//! details), turns `Completed` into a pending transaction, and `Abandoned`
//! into a cancelled code. No balance is touched before `Completed`.

use serde::{Deserialize, Serialize};

/// User-entered details of an outgoing transfer, validated by the
/// orchestrator before a code is issued.
///
/// Serialized onto the one-time-code row between `initiate` and `complete`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDetails {
    pub recipient_name: String,
    pub recipient_bank: String,
    pub recipient_account: String,
    pub amount_minor: i64,
    /// ISO-3166 alpha-2 destination country.
    pub recipient_country: String,
    /// Local routing code; whether it is required depends on the country.
    pub routing_code: Option<String>,
    pub description: Option<String>,
}
