mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::{ConnectionTrait, Statement};

use common::{engine_with_db, seed_user};
use engine::{BalanceWatcher, CreateUserCmd, EngineError, Role};

#[tokio::test]
async fn login_issues_a_usable_session_token() {
    let (engine, _sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let outcome = engine.login("alice@example.com", "hunter2!").await.unwrap();
    assert_eq!(outcome.user.id, user.id);
    assert!(outcome.expires_at > Utc::now());

    let authed = engine.authenticate(&outcome.token).await.unwrap();
    assert_eq!(authed.id, user.id);
    assert!(authed.last_seen.is_some());
}

#[tokio::test]
async fn login_rejects_bad_credentials_uniformly() {
    let (engine, _sender, _db) = engine_with_db().await;
    seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let expected = EngineError::Forbidden("invalid email or password".to_string());
    assert_eq!(
        engine
            .login("alice@example.com", "wrong")
            .await
            .unwrap_err(),
        expected
    );
    assert_eq!(
        engine
            .login("nobody@example.com", "hunter2!")
            .await
            .unwrap_err(),
        expected
    );
}

#[tokio::test]
async fn deactivated_users_cannot_log_in_or_keep_sessions() {
    let (engine, _sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let outcome = engine.login("alice@example.com", "hunter2!").await.unwrap();

    engine
        .set_user_active(Role::Admin, &user.id, false)
        .await
        .unwrap();

    // The existing session dies on its next use...
    assert_eq!(
        engine.authenticate(&outcome.token).await.unwrap_err(),
        EngineError::Forbidden("account disabled".to_string())
    );
    // ...and a fresh login is refused too.
    assert_eq!(
        engine
            .login("alice@example.com", "hunter2!")
            .await
            .unwrap_err(),
        EngineError::Forbidden("account disabled".to_string())
    );
}

#[tokio::test]
async fn expired_sessions_are_rejected_and_cleaned_up() {
    let (engine, _sender, db) = engine_with_db().await;
    seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let outcome = engine.login("alice@example.com", "hunter2!").await.unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE sessions SET expires_at = ?",
        vec![(Utc::now() - chrono::Duration::minutes(1)).into()],
    ))
    .await
    .unwrap();

    assert_eq!(
        engine.authenticate(&outcome.token).await.unwrap_err(),
        EngineError::Expired("session expired".to_string())
    );
    // The second attempt hits the deleted row, not the expiry path.
    assert_eq!(
        engine.authenticate(&outcome.token).await.unwrap_err(),
        EngineError::Forbidden("invalid session".to_string())
    );
}

#[tokio::test]
async fn logout_revokes_the_session() {
    let (engine, _sender, _db) = engine_with_db().await;
    seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let outcome = engine.login("alice@example.com", "hunter2!").await.unwrap();
    engine.logout(&outcome.token).await.unwrap();

    assert_eq!(
        engine.authenticate(&outcome.token).await.unwrap_err(),
        EngineError::Forbidden("invalid session".to_string())
    );
}

#[tokio::test]
async fn admin_listing_hides_master_admins() {
    let (engine, _sender, _db) = engine_with_db().await;
    seed_user(&engine, "root@example.com", Role::MasterAdmin, 0).await;
    seed_user(&engine, "admin@example.com", Role::Admin, 0).await;
    seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let seen_by_admin = engine.list_users(Role::Admin).await.unwrap();
    assert!(
        seen_by_admin
            .iter()
            .all(|user| user.role != Role::MasterAdmin.as_str())
    );
    assert_eq!(seen_by_admin.len(), 2);

    let seen_by_master = engine.list_users(Role::MasterAdmin).await.unwrap();
    assert_eq!(seen_by_master.len(), 3);

    assert_eq!(
        engine.list_users(Role::User).await.unwrap_err(),
        EngineError::Forbidden("admin role required".to_string())
    );
}

#[tokio::test]
async fn admin_cannot_touch_a_master_admin_profile() {
    let (engine, _sender, _db) = engine_with_db().await;
    let root = seed_user(&engine, "root@example.com", Role::MasterAdmin, 0).await;

    // Hidden profiles read as missing, not as forbidden.
    assert_eq!(
        engine
            .set_user_active(Role::Admin, &root.id, false)
            .await
            .unwrap_err(),
        EngineError::KeyNotFound("user not exists".to_string())
    );
    assert_eq!(
        engine.delete_user(Role::Admin, &root.id).await.unwrap_err(),
        EngineError::KeyNotFound("user not exists".to_string())
    );

    // A master admin can manage other master admins.
    let other = seed_user(&engine, "root2@example.com", Role::MasterAdmin, 0).await;
    let updated = engine
        .set_user_active(Role::MasterAdmin, &other.id, false)
        .await
        .unwrap();
    assert!(!updated.is_active);
}

#[tokio::test]
async fn only_master_admins_grant_elevated_roles() {
    let (engine, _sender, _db) = engine_with_db().await;

    let err = engine
        .create_user(
            Role::Admin,
            CreateUserCmd {
                email: "new-admin@example.com".to_string(),
                name: "New Admin".to_string(),
                password: "hunter2!".to_string(),
                role: Role::Admin,
                starting_balance_minor: 0,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));

    let created = engine
        .create_user(
            Role::MasterAdmin,
            CreateUserCmd {
                email: "new-admin@example.com".to_string(),
                name: "New Admin".to_string(),
                password: "hunter2!".to_string(),
                role: Role::Admin,
                starting_balance_minor: 0,
            },
        )
        .await
        .unwrap();
    assert_eq!(created.role, Role::Admin.as_str());
}

#[tokio::test]
async fn self_profile_update_checks_email_uniqueness() {
    let (engine, _sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;
    seed_user(&engine, "bob@example.com", Role::User, 10_000).await;

    let updated = engine
        .update_my_profile(&user.id, Some("Alice Liddell"), None)
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice Liddell");
    assert_eq!(updated.email, "alice@example.com");

    let err = engine
        .update_my_profile(&user.id, None, Some("bob@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("bob@example.com".to_string()));
}

#[tokio::test]
async fn duplicate_emails_are_rejected() {
    let (engine, _sender, _db) = engine_with_db().await;
    seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    let err = engine
        .create_user(
            Role::MasterAdmin,
            CreateUserCmd {
                email: "Alice@Example.com".to_string(),
                name: "Alice Again".to_string(),
                password: "hunter2!".to_string(),
                role: Role::User,
                starting_balance_minor: 0,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey("alice@example.com".to_string())
    );
}

#[tokio::test]
async fn delete_user_removes_the_account_too() {
    let (engine, _sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    engine.delete_user(Role::Admin, &user.id).await.unwrap();

    assert_eq!(
        engine.user_by_id(&user.id).await.unwrap_err(),
        EngineError::KeyNotFound("user not exists".to_string())
    );
    assert_eq!(
        engine.account_for_user(&user.id).await.unwrap_err(),
        EngineError::KeyNotFound("account not exists".to_string())
    );
}

#[tokio::test]
async fn messages_flow_marks_read_on_open() {
    let (engine, _sender, _db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;

    engine
        .send_message(Role::Admin, &user.id, "Your transaction was approved")
        .await
        .unwrap();
    engine
        .send_message(Role::Admin, &user.id, "Welcome to Credovae")
        .await
        .unwrap();

    assert_eq!(engine.unread_message_count(&user.id).await.unwrap(), 2);

    let messages = engine.list_messages(&user.id, true).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].message_text, "Welcome to Credovae");

    assert_eq!(engine.unread_message_count(&user.id).await.unwrap(), 0);

    assert_eq!(
        engine
            .send_message(Role::User, &user.id, "hi")
            .await
            .unwrap_err(),
        EngineError::Forbidden("admin role required".to_string())
    );
}

#[tokio::test]
async fn balance_watcher_publishes_only_on_change() {
    let (engine, _sender, db) = engine_with_db().await;
    let user = seed_user(&engine, "alice@example.com", Role::User, 10_000).await;
    let account = engine.account_for_user(&user.id).await.unwrap();

    let engine = Arc::new(engine);
    let watcher = BalanceWatcher::spawn(
        engine.clone(),
        account.id.to_string(),
        Duration::from_millis(20),
    )
    .await
    .unwrap();
    assert_eq!(watcher.latest(), 10_000);

    let mut rx = watcher.subscribe();

    // Unchanged balance: the channel stays quiet for several poll periods.
    let quiet = tokio::time::timeout(Duration::from_millis(100), rx.changed()).await;
    assert!(quiet.is_err());

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE accounts SET balance_minor = ? WHERE id = ?",
        vec![6_000i64.into(), account.id.to_string().into()],
    ))
    .await
    .unwrap();

    tokio::time::timeout(Duration::from_secs(2), rx.changed())
        .await
        .expect("watcher noticed the change")
        .unwrap();
    assert_eq!(*rx.borrow(), 6_000);
    assert_eq!(watcher.latest(), 6_000);

    // After stop, further mutations go unnoticed.
    watcher.stop();
    db.execute(Statement::from_sql_and_values(
        backend,
        "UPDATE accounts SET balance_minor = ? WHERE id = ?",
        vec![1i64.into(), account.id.to_string().into()],
    ))
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(watcher.latest(), 6_000);
}
