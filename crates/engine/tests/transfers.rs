mod common;

use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, EntityTrait, Statement};

use common::{engine_with_db, seed_user, us_transfer};
use engine::{Direction, EngineError, Role, TransactionStatus, TransferDetails};

#[tokio::test]
async fn validate_accepts_transfer_within_balance() {
    let (engine, _sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let normalized = engine
        .validate_transfer(&user.id, &us_transfer(4_000))
        .await
        .unwrap();
    assert_eq!(normalized.amount_minor, 4_000);
    assert_eq!(normalized.recipient_country, "US");
}

#[tokio::test]
async fn validate_rejects_amount_over_balance() {
    let (engine, sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let err = engine
        .initiate_transfer(&user.id, us_transfer(15_000))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientFunds("amount exceeds available balance".to_string())
    );

    // No code was issued and the balance is untouched.
    assert_eq!(sender.sent_count(), 0);
    let account = engine.account_for_user(&user.id).await.unwrap();
    assert_eq!(account.balance_minor, 10_000);
}

#[tokio::test]
async fn validate_rejects_missing_fields_and_bad_amounts() {
    let (engine, _sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let mut details = us_transfer(4_000);
    details.recipient_name = "  ".to_string();
    assert_eq!(
        engine.validate_transfer(&user.id, &details).await.unwrap_err(),
        EngineError::MissingField("recipient name".to_string())
    );

    let mut details = us_transfer(4_000);
    details.recipient_bank = String::new();
    assert_eq!(
        engine.validate_transfer(&user.id, &details).await.unwrap_err(),
        EngineError::MissingField("recipient bank".to_string())
    );

    let details = us_transfer(0);
    assert_eq!(
        engine.validate_transfer(&user.id, &details).await.unwrap_err(),
        EngineError::InvalidAmount("amount must be > 0".to_string())
    );
}

#[tokio::test]
async fn validate_enforces_country_routing_rules() {
    let (engine, _sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    // US: required, 9 digits.
    let mut details = us_transfer(4_000);
    details.routing_code = Some("12345".to_string());
    assert!(matches!(
        engine.validate_transfer(&user.id, &details).await.unwrap_err(),
        EngineError::InvalidRoutingCode(_)
    ));

    let mut details = us_transfer(4_000);
    details.routing_code = None;
    assert!(matches!(
        engine.validate_transfer(&user.id, &details).await.unwrap_err(),
        EngineError::InvalidRoutingCode(_)
    ));

    // DE: optional, so an empty code passes.
    let details = TransferDetails {
        recipient_country: "DE".to_string(),
        routing_code: None,
        ..us_transfer(4_000)
    };
    assert!(engine.validate_transfer(&user.id, &details).await.is_ok());
}

#[tokio::test]
async fn complete_debits_balance_and_creates_pending_transaction() {
    let (engine, sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let issued = engine
        .initiate_transfer(&user.id, us_transfer(4_000))
        .await
        .unwrap();

    // Initiation alone never touches the balance.
    let account = engine.account_for_user(&user.id).await.unwrap();
    assert_eq!(account.balance_minor, 10_000);

    let code = sender.last();
    assert_eq!(code.to_email, "alice@example.com");
    assert_eq!(code.plaintext.len(), 6);

    let tx = engine
        .complete_transfer(issued.id, &code.plaintext)
        .await
        .unwrap();
    assert_eq!(tx.direction, Direction::Outgoing);
    assert_eq!(tx.amount_minor, 4_000);
    assert_eq!(tx.status, TransactionStatus::Pending);
    assert_eq!(tx.recipient.name, "Jane Doe");

    let account = engine.account_for_user(&user.id).await.unwrap();
    assert_eq!(account.balance_minor, 6_000);
}

#[tokio::test]
async fn complete_twice_fails_with_already_used() {
    let (engine, sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let issued = engine
        .initiate_transfer(&user.id, us_transfer(4_000))
        .await
        .unwrap();
    let code = sender.last();

    engine
        .complete_transfer(issued.id, &code.plaintext)
        .await
        .unwrap();
    let err = engine
        .complete_transfer(issued.id, &code.plaintext)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyUsed("code already used".to_string()));

    // Only one debit happened.
    let account = engine.account_for_user(&user.id).await.unwrap();
    assert_eq!(account.balance_minor, 6_000);
}

#[tokio::test]
async fn fourth_attempt_is_locked_out_even_with_correct_code() {
    let (engine, sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let issued = engine
        .initiate_transfer(&user.id, us_transfer(4_000))
        .await
        .unwrap();
    let code = sender.last();

    for _ in 0..3 {
        let err = engine
            .complete_transfer(issued.id, "000000")
            .await
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidCode("incorrect code".to_string()));
    }

    let err = engine
        .complete_transfer(issued.id, &code.plaintext)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::TooManyAttempts("code locked".to_string()));

    let account = engine.account_for_user(&user.id).await.unwrap();
    assert_eq!(account.balance_minor, 10_000);
}

#[tokio::test]
async fn wrong_then_correct_code_still_completes() {
    let (engine, sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let issued = engine
        .initiate_transfer(&user.id, us_transfer(4_000))
        .await
        .unwrap();
    let code = sender.last();

    let err = engine
        .complete_transfer(issued.id, "000000")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::InvalidCode("incorrect code".to_string()));

    engine
        .complete_transfer(issued.id, &code.plaintext)
        .await
        .unwrap();
    let account = engine.account_for_user(&user.id).await.unwrap();
    assert_eq!(account.balance_minor, 6_000);
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let (engine, sender, db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let issued = engine
        .initiate_transfer(&user.id, us_transfer(4_000))
        .await
        .unwrap();
    let code = sender.last();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE otp_codes SET expires_at = ? WHERE id = ?",
        vec![
            (Utc::now() - Duration::minutes(1)).into(),
            issued.id.to_string().into(),
        ],
    ))
    .await
    .unwrap();

    let err = engine
        .complete_transfer(issued.id, &code.plaintext)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::Expired("code expired".to_string()));

    let account = engine.account_for_user(&user.id).await.unwrap();
    assert_eq!(account.balance_minor, 10_000);
}

#[tokio::test]
async fn delivery_failure_rolls_the_code_back() {
    let (engine, sender, db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    sender.set_failing(true);
    let err = engine
        .initiate_transfer(&user.id, us_transfer(4_000))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::DeliveryFailure(_)));

    // The orphaned record is unusable: whatever was persisted is consumed.
    let rows = engine::otp_codes::Entity::find().all(&db).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].consumed);

    let account = engine.account_for_user(&user.id).await.unwrap();
    assert_eq!(account.balance_minor, 10_000);
}

#[tokio::test]
async fn cancelled_transfer_leaves_no_partial_state() {
    let (engine, sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let issued = engine
        .initiate_transfer(&user.id, us_transfer(4_000))
        .await
        .unwrap();
    let code = sender.last();

    engine.cancel_transfer(issued.id).await.unwrap();

    let err = engine
        .complete_transfer(issued.id, &code.plaintext)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::AlreadyUsed("code already used".to_string()));

    let account = engine.account_for_user(&user.id).await.unwrap();
    assert_eq!(account.balance_minor, 10_000);
    let (txs, _) = engine
        .list_transactions_for_account_page(
            &account.id.to_string(),
            50,
            None,
            &engine::TransactionListFilter::default(),
        )
        .await
        .unwrap();
    assert!(txs.is_empty());
}

#[tokio::test]
async fn unknown_code_id_is_not_found() {
    let (engine, _sender, _db) = engine_with_db().await;

    let err = engine
        .complete_transfer(uuid::Uuid::new_v4(), "123456")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("code not exists".to_string()));
}
