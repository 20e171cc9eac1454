use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{CodeSender, EngineError, NoticeBoard, ResultEngine};

mod access;
mod accounts;
mod approvals;
mod messages;
mod otp;
mod sessions;
mod transactions;
mod transfers;
mod users;

pub use approvals::{AccountStats, SimulateCmd};
pub use otp::PendingTransfer;
pub use sessions::LoginOutcome;
pub use transactions::TransactionListFilter;
pub use users::{CreateUserCmd, DEFAULT_STARTING_BALANCE_MINOR};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    code_sender: Option<Arc<dyn CodeSender>>,
    notices: NoticeBoard,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The in-app admin notice list.
    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub(crate) fn code_sender(&self) -> ResultEngine<&Arc<dyn CodeSender>> {
        self.code_sender
            .as_ref()
            .ok_or_else(|| EngineError::DeliveryFailure("no code sender configured".to_string()))
    }
}

fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::MissingField(label.to_string()));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    code_sender: Option<Arc<dyn CodeSender>>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Out-of-band delivery channel for one-time codes.
    ///
    /// Optional: an engine without one can serve everything except
    /// `initiate_transfer`.
    pub fn code_sender(mut self, sender: Arc<dyn CodeSender>) -> EngineBuilder {
        self.code_sender = Some(sender);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            code_sender: self.code_sender,
            notices: NoticeBoard::default(),
        })
    }
}
