//! End-to-end account flows through the `StockWatch` facade.

use stockwatch::adapters::InMemoryStore;
use stockwatch::application::{ResponseStatus, StockWatch};
use stockwatch::domain::account::ActivityType;
use stockwatch::domain::foundation::{ErrorKind, UserId};
use stockwatch::domain::subscription::PlanType;

async fn register(service: &StockWatch, email: &str) -> UserId {
    service
        .create_account("Jane Doe", email, "$2b$12$original", true)
        .await
        .into_data()
        .expect("registration succeeds")
        .user
        .id
}

#[tokio::test]
async fn registration_provisions_settings_and_free_plan() {
    let store = InMemoryStore::with_default_catalogue();
    let service = StockWatch::in_memory(&store);

    let created = service
        .create_account("Jane Doe", "Jane@Example.com", "$2b$12$original", true)
        .await;
    assert!(created.is_success());
    let created = created.into_data().unwrap();
    assert_eq!(created.user.email.as_str(), "jane@example.com");
    assert!(created.subscription_id.is_some());

    let settings = service.get_settings(created.user.id).await.into_data().unwrap();
    assert!(settings.email_notifications);
    assert_eq!(settings.timezone, "UTC");

    let info = service
        .get_subscription_info(created.user.id)
        .await
        .into_data()
        .unwrap();
    assert_eq!(info.plan_type, PlanType::Free);
    assert_eq!(info.max_products, 2);
    assert!(!info.has_ai_enhancement);
}

#[tokio::test]
async fn duplicate_email_differing_in_case_is_rejected_without_insert() {
    let store = InMemoryStore::with_default_catalogue();
    let service = StockWatch::in_memory(&store);
    let original = register(&service, "jane@example.com").await;

    let response = service
        .create_account("Impostor", "JANE@example.COM", "$2b$12$other", false)
        .await;

    assert_eq!(response.status, ResponseStatus::Error);
    assert_eq!(response.error_kind, Some(ErrorKind::BusinessRule));
    assert!(response.message.contains("already exists"));
    assert_eq!(store.user_count().await, 1);

    let failure = store
        .activity_entries()
        .await
        .into_iter()
        .find(|e| e.activity_type == ActivityType::RegistrationFailed)
        .expect("failure is logged");
    assert_eq!(failure.user_id, Some(original));
}

#[tokio::test]
async fn invalid_email_is_a_validation_error() {
    let service = StockWatch::in_memory(&InMemoryStore::with_default_catalogue());
    let response = service
        .create_account("Jane Doe", "not-an-email", "$2b$12$original", false)
        .await;

    assert_eq!(response.error_kind, Some(ErrorKind::Validation));
    assert!(response.data.is_none());
}

#[tokio::test]
async fn login_lookup_and_record() {
    let store = InMemoryStore::with_default_catalogue();
    let service = StockWatch::in_memory(&store);
    let user_id = register(&service, "jane@example.com").await;

    let credentials = service
        .verify_login("  JANE@example.com ")
        .await
        .into_data()
        .unwrap();
    assert_eq!(credentials.user_id, user_id);
    assert_eq!(credentials.password_hash.expose(), "$2b$12$original");

    let recorded = service.record_login(user_id).await.into_data().unwrap();
    let user = service.get_user_by_id(user_id).await.into_data().unwrap();
    assert_eq!(user.last_login_at, Some(recorded.last_login_at));

    let unknown = service.verify_login("nobody@example.com").await;
    assert_eq!(unknown.error_kind, Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn disabled_accounts_cannot_record_logins() {
    let store = InMemoryStore::with_default_catalogue();
    let service = StockWatch::in_memory(&store);
    let user_id = register(&service, "jane@example.com").await;
    store.deactivate_user(&user_id).await;

    let response = service.record_login(user_id).await;
    assert_eq!(response.status, ResponseStatus::Error);
}

#[tokio::test]
async fn password_reset_round_trip() {
    let store = InMemoryStore::with_default_catalogue();
    let service = StockWatch::in_memory(&store);
    let user_id = register(&service, "jane@example.com").await;

    let issued = service
        .request_password_reset("jane@example.com")
        .await
        .into_data()
        .unwrap()
        .issued
        .expect("known account gets a token");

    let verified = service
        .verify_reset_token(&issued.token)
        .await
        .into_data()
        .unwrap();
    assert_eq!(verified.user_id, user_id);
    assert_eq!(verified.full_name, "Jane Doe");

    let reset = service.reset_password(&issued.token, "$2b$12$replaced").await;
    assert!(reset.is_success());
    assert_eq!(
        store.password_hash_of(&user_id).await.as_deref(),
        Some("$2b$12$replaced")
    );

    let reused = service.reset_password(&issued.token, "$2b$12$again").await;
    assert_eq!(reused.error_kind, Some(ErrorKind::NotFound));
    assert_eq!(
        store.password_hash_of(&user_id).await.as_deref(),
        Some("$2b$12$replaced")
    );
}

#[tokio::test]
async fn reset_request_for_unknown_email_reveals_nothing() {
    let service = StockWatch::in_memory(&InMemoryStore::with_default_catalogue());
    register(&service, "jane@example.com").await;

    let unknown = service.request_password_reset("ghost@example.com").await;
    let issued = service.request_password_reset("jane@example.com").await;

    assert!(unknown.is_success());
    assert_eq!(unknown.message, issued.message);
    assert!(unknown.into_data().unwrap().issued.is_none());
}

#[tokio::test]
async fn free_form_activity_is_appended() {
    let store = InMemoryStore::with_default_catalogue();
    let service = StockWatch::in_memory(&store);
    let user_id = register(&service, "jane@example.com").await;

    let response = service
        .record_activity(user_id, "logout", Some("Signed out from web"))
        .await;
    assert!(response.is_success());

    let last = store.activity_entries().await.pop().unwrap();
    assert_eq!(last.activity_type, ActivityType::Logout);
    assert_eq!(last.user_id, Some(user_id));
}
