//! Notification collaborators.
//!
//! Two channels with very different guarantees:
//! - [`CodeSender`] delivers one-time codes out-of-band and is awaited before
//!   code issuance is declared successful;
//! - [`NoticeBoard`] collects in-app admin notices, fire-and-forget, and
//!   never blocks or fails the calling workflow.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Delivery failure reported by a [`CodeSender`] implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DeliveryError(pub String);

/// Everything a delivery channel needs to put a code in front of the user.
#[derive(Clone, Debug)]
pub struct SentCode {
    pub to_email: String,
    pub user_name: String,
    pub recipient_name: String,
    pub amount_minor: i64,
    /// The plaintext code. Never persisted; exists only for this call.
    pub plaintext: String,
    pub valid_minutes: i64,
}

/// Out-of-band delivery channel for one-time codes.
///
/// The engine awaits the send before reporting issuance as successful; a
/// failure rolls the freshly issued code back to an unusable state.
#[async_trait::async_trait]
pub trait CodeSender: Send + Sync {
    async fn send_code(&self, code: &SentCode) -> Result<(), DeliveryError>;
}

/// An in-app notice shown on the admin dashboard.
#[derive(Clone, Debug, Serialize)]
pub struct AdminNotice {
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// In-memory admin notice list.
///
/// Appends must never block or fail the workflow that produced them, so a
/// poisoned lock is treated as "drop the notice" rather than an error.
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: Mutex<Vec<AdminNotice>>,
}

impl NoticeBoard {
    pub fn record(&self, message: impl Into<String>) {
        let Ok(mut notices) = self.notices.lock() else {
            return;
        };
        notices.push(AdminNotice {
            message: message.into(),
            created_at: Utc::now(),
        });
    }

    /// Returns the notices newest-first.
    pub fn snapshot(&self) -> Vec<AdminNotice> {
        let Ok(notices) = self.notices.lock() else {
            return Vec::new();
        };
        let mut out = notices.clone();
        out.reverse();
        out
    }

    pub fn clear(&self) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.clear();
        }
    }
}
