//! Periodic balance watcher.
//!
//! Replaces the UI-driven refresh poll with an owned task: every `period` it
//! reads the stored balance (read-only, never writes) and publishes into a
//! `watch` channel only when the value differs from the last observed one.
//! Teardown is cooperative — dropping the watcher aborts the task, which is
//! how a logout stops its session's poll.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{Engine, ResultEngine};

/// Poll interval used when the caller has no opinion.
pub const DEFAULT_POLL_PERIOD: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct BalanceWatcher {
    rx: watch::Receiver<i64>,
    handle: JoinHandle<()>,
}

impl BalanceWatcher {
    /// Starts watching an account's balance.
    ///
    /// The channel is seeded with the current balance, so `latest` is
    /// meaningful immediately and subscribers only wake on actual changes.
    pub async fn spawn(
        engine: Arc<Engine>,
        account_id: String,
        period: Duration,
    ) -> ResultEngine<Self> {
        let initial = engine.account_balance(&account_id).await?;
        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick of `interval` fires immediately; consume it so
            // the loop starts one full period after spawn.
            ticker.tick().await;

            loop {
                ticker.tick().await;

                // Transient store errors are skipped; the next tick retries.
                let Ok(balance) = engine.account_balance(&account_id).await else {
                    continue;
                };
                if *tx.borrow() != balance && tx.send(balance).is_err() {
                    break;
                }
            }
        });

        Ok(Self { rx, handle })
    }

    /// A receiver that wakes only when the balance changes.
    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.rx.clone()
    }

    /// The most recently observed balance, in minor units.
    pub fn latest(&self) -> i64 {
        *self.rx.borrow()
    }

    /// Stops the poll task.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for BalanceWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
