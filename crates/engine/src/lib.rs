pub use accounts::Account;
pub use error::EngineError;
pub use messages::Message;
pub use money::MoneyCents;
pub use notify::{AdminNotice, CodeSender, DeliveryError, NoticeBoard, SentCode};
pub use ops::{
    AccountStats, CreateUserCmd, DEFAULT_STARTING_BALANCE_MINOR, Engine, EngineBuilder,
    LoginOutcome, PendingTransfer, SimulateCmd, TransactionListFilter,
};
pub use otp_codes::IssuedCode;
pub use routing::{RoutingRule, routing_rule, validate_routing_code};
pub use transactions::{Direction, Recipient, Transaction, TransactionStatus};
pub use transfers::TransferDetails;
pub use users::Role;
pub use watch::{BalanceWatcher, DEFAULT_POLL_PERIOD};

pub mod accounts;
mod error;
pub mod messages;
mod money;
mod notify;
mod ops;
pub mod otp_codes;
pub mod routing;
pub mod sessions;
pub mod transactions;
mod transfers;
pub mod users;
mod watch;

type ResultEngine<T> = Result<T, EngineError>;
