use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        User,
        Admin,
        MasterAdmin,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub email: String,
        pub name: String,
        pub role: Role,
        pub is_active: bool,
        /// RFC3339 UTC timestamp of the last authenticated request.
        pub last_seen: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserCreate {
        pub email: String,
        pub name: String,
        pub password: String,
        /// Defaults to `user`. Elevated roles require a master admin.
        pub role: Option<Role>,
        /// Minor units; defaults to the standard starting balance.
        pub starting_balance_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UsersResponse {
        pub users: Vec<UserView>,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        /// Opaque bearer token; returned exactly once, never re-readable.
        pub token: String,
        pub expires_at: DateTime<Utc>,
        pub user: user::UserView,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: String,
        pub account_number: String,
        pub balance_minor: i64,
        pub updated_at: DateTime<Utc>,
    }

    /// Query for the watcher-backed refresh endpoint.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceRefreshQuery {
        /// The balance the client last rendered, in minor units.
        pub last_seen_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceRefreshResponse {
        pub balance_minor: i64,
        /// True when the balance differs from `last_seen_minor`.
        pub changed: bool,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub recipient_name: String,
        pub recipient_bank: String,
        pub recipient_account: String,
        pub amount_minor: i64,
        /// ISO-3166 alpha-2 destination country.
        pub recipient_country: String,
        pub routing_code: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferInitiated {
        /// Handle for `complete`/`cancel`. The code itself only travels
        /// out-of-band.
        pub code_id: Uuid,
        pub expires_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferComplete {
        pub code_id: Uuid,
        pub code: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferCancel {
        pub code_id: Uuid,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Direction {
        Incoming,
        Outgoing,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Status {
        Pending,
        Successful,
        Rejected,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub direction: Direction,
        pub amount_minor: i64,
        pub recipient_name: String,
        pub recipient_bank: String,
        pub recipient_account: String,
        pub recipient_country: String,
        pub routing_code: Option<String>,
        pub description: Option<String>,
        pub status: Status,
        pub created_at: DateTime<Utc>,
    }

    /// Query parameters for transaction listings.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        ///
        /// Newest → older pagination.
        pub cursor: Option<String>,
        pub direction: Option<Direction>,
        pub status: Option<Status>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }

    /// Admin-injected transaction.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SimulateNew {
        pub user_id: String,
        pub direction: Direction,
        pub amount_minor: i64,
        pub description: Option<String>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatsView {
        pub incoming_total_minor: i64,
        pub outgoing_total_minor: i64,
        pub pending_count: u64,
        pub total_count: u64,
    }
}

pub mod message {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageView {
        pub id: Uuid,
        pub message_text: String,
        pub is_read: bool,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessagesResponse {
        pub messages: Vec<MessageView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UnreadResponse {
        pub unread: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageSend {
        pub user_id: String,
        pub text: String,
    }
}

pub mod routing {
    use super::*;

    /// UI hints for a destination country's routing-code field.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct RoutingRuleView {
        pub country: String,
        pub label: String,
        pub placeholder: String,
        pub required: bool,
    }
}

pub mod notice {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NoticesResponse {
        pub notices: Vec<NoticeView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NoticeView {
        pub message: String,
        pub created_at: DateTime<Utc>,
    }
}
