// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

use sea_orm::{Database, DatabaseConnection};

use engine::{
    CodeSender, CreateUserCmd, DeliveryError, Engine, Role, SentCode, TransferDetails,
};
use migration::MigratorTrait;

/// Records delivered codes so tests can complete transfers; flips to failing
/// mode to exercise the delivery-failure rollback.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<SentCode>>,
    fail: AtomicBool,
}

impl RecordingSender {
    pub fn last(&self) -> SentCode {
        self.sent
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no code was sent")
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl CodeSender for RecordingSender {
    async fn send_code(&self, code: &SentCode) -> Result<(), DeliveryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeliveryError("email API unreachable".to_string()));
        }
        self.sent.lock().unwrap().push(code.clone());
        Ok(())
    }
}

pub async fn engine_with_db() -> (Engine, Arc<RecordingSender>, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let sender = Arc::new(RecordingSender::default());
    let engine = Engine::builder()
        .database(db.clone())
        .code_sender(sender.clone())
        .build()
        .await
        .unwrap();
    (engine, sender, db)
}

/// Creates a user with the given balance (minor units) and returns the
/// profile.
pub async fn seed_user(
    engine: &Engine,
    email: &str,
    role: Role,
    balance_minor: i64,
) -> engine::users::Model {
    engine
        .create_user(
            Role::MasterAdmin,
            CreateUserCmd {
                email: email.to_string(),
                name: email.split('@').next().unwrap_or(email).to_string(),
                password: "hunter2!".to_string(),
                role,
                starting_balance_minor: balance_minor,
            },
        )
        .await
        .unwrap()
}

/// A transfer to the US with a valid ABA routing code.
pub fn us_transfer(amount_minor: i64) -> TransferDetails {
    TransferDetails {
        recipient_name: "Jane Doe".to_string(),
        recipient_bank: "First National".to_string(),
        recipient_account: "ACC0000000001".to_string(),
        amount_minor,
        recipient_country: "US".to_string(),
        routing_code: Some("021000021".to_string()),
        description: Some("rent".to_string()),
    }
}
