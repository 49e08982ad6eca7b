mod helpers;

use helpers::*;
use std::time::Duration;
use tallybook::application::services::record_service::MAX_RECORD_IMAGES;
use tallybook::application::services::LockService;
use tallybook::domain::entities::{CategoryRequest, EntryKind, RecordRequest, DATE_FORMAT};
use tallybook::domain::ports::clock::Clock;
use tallybook::infrastructure::http::middleware::ApiError;

const FOOD: &str = "00000000-0000-0000-0000-000000000101";
const SALARY: &str = "00000000-0000-0000-0000-000000000201";

fn expense(book_id: &str, amount_cents: i64, date: &str) -> RecordRequest {
    RecordRequest {
        book_id: book_id.to_string(),
        category_id: FOOD.to_string(),
        kind: EntryKind::Expense,
        amount_cents,
        date: Some(date.to_string()),
        comment: " lunch ".to_string(),
        images: vec![],
    }
}

#[tokio::test]
async fn test_add_and_get_record() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let book_id = default_book_id(&app, &alice.uid).await;

    let mut request = expense(&book_id, 1250, "2024-03-07");
    request.images = vec!["/upload/202403/a.png".to_string(), "  ".to_string()];
    let added = app.state.record_service.add(&alice.uid, request).await.unwrap();

    assert_eq!(added.amount_cents, 1250);
    assert_eq!(added.kind, EntryKind::Expense);
    assert_eq!(added.category_title, "Food");
    assert_eq!(added.icon, "icon-food");
    assert_eq!(added.comment, "lunch");
    assert_eq!(added.oper_date, "2024-03-07");
    assert_eq!(added.date_text, "Mar 07, Thursday");
    assert_eq!(added.user, "nick-alice");
    assert_eq!(added.images, vec!["/upload/202403/a.png".to_string()]);

    let fetched = app.state.record_service.get(&alice.uid, &added.id).await.unwrap();
    assert_eq!(fetched.id, added.id);
    assert_eq!(fetched.images.len(), 1);
}

#[tokio::test]
async fn test_missing_date_defaults_to_today() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let book_id = default_book_id(&app, &alice.uid).await;

    let mut request = expense(&book_id, 300, "");
    request.date = None;
    let added = app.state.record_service.add(&alice.uid, request).await.unwrap();

    let today = app.clock.now().date_naive().format(DATE_FORMAT).to_string();
    assert_eq!(added.oper_date, today);
}

#[tokio::test]
async fn test_invalid_records_are_rejected() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let book_id = default_book_id(&app, &alice.uid).await;
    let records = &app.state.record_service;

    let err = records
        .add(&alice.uid, expense(&book_id, -1, "2024-03-07"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = records
        .add(&alice.uid, expense(&book_id, 100, "07/03/2024"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let mut too_many = expense(&book_id, 100, "2024-03-07");
    too_many.images = (0..=MAX_RECORD_IMAGES).map(|i| format!("/upload/{}.png", i)).collect();
    let err = records.add(&alice.uid, too_many).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    // An income category on an expense record
    let mut mismatched = expense(&book_id, 100, "2024-03-07");
    mismatched.category_id = SALARY.to_string();
    let err = records.add(&alice.uid, mismatched).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let mut unknown = expense(&book_id, 100, "2024-03-07");
    unknown.category_id = "missing".to_string();
    let err = records.add(&alice.uid, unknown).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_records_need_book_membership() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let book_id = default_book_id(&app, &alice.uid).await;

    let err = app
        .state
        .record_service
        .add(&bob.uid, expense(&book_id, 100, "2024-03-07"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let added = app
        .state
        .record_service
        .add(&alice.uid, expense(&book_id, 100, "2024-03-07"))
        .await
        .unwrap();
    let err = app.state.record_service.get(&bob.uid, &added.id).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn test_custom_category_of_another_user_is_not_usable() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let book_id = default_book_id(&app, &alice.uid).await;

    let bobs = app
        .state
        .category_service
        .create(
            &bob.uid,
            CategoryRequest {
                kind: EntryKind::Expense,
                title: "Pets".to_string(),
                icon: None,
            },
        )
        .await
        .unwrap();

    let mut request = expense(&book_id, 100, "2024-03-07");
    request.category_id = bobs.id;
    let err = app.state.record_service.add(&alice.uid, request).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_author_and_owner_may_change_records() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let carol = login(&app, "carol").await;
    let books = &app.state.book_service;
    let records = &app.state.record_service;
    let book_id = default_book_id(&app, &alice.uid).await;

    let invite = books.issue_invite(&alice.uid, &book_id).await.unwrap();
    books.attend(&bob.uid, &invite.code).await.unwrap();
    books.attend(&carol.uid, &invite.code).await.unwrap();

    let bobs = records
        .add(&bob.uid, expense(&book_id, 500, "2024-03-07"))
        .await
        .unwrap();

    // Carol is a member but neither author nor owner
    let err = records
        .edit(&carol.uid, &bobs.id, expense(&book_id, 1, "2024-03-07"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    let err = records.remove(&carol.uid, &bobs.id).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    // Carol can still read it
    records.get(&carol.uid, &bobs.id).await.unwrap();

    let mut change = expense(&book_id, 800, "2024-03-08");
    change.images = vec!["/upload/202403/b.png".to_string()];
    let edited = records.edit(&alice.uid, &bobs.id, change).await.unwrap();
    assert_eq!(edited.amount_cents, 800);
    assert_eq!(edited.oper_date, "2024-03-08");
    assert_eq!(edited.user_id, bob.uid);
    assert_eq!(edited.images, vec!["/upload/202403/b.png".to_string()]);

    // Editing again replaces the attachments
    let edited = records
        .edit(&bob.uid, &bobs.id, expense(&book_id, 900, "2024-03-08"))
        .await
        .unwrap();
    assert!(edited.images.is_empty());

    records.remove(&bob.uid, &bobs.id).await.unwrap();
    let err = records.get(&alice.uid, &bobs.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_records_cannot_move_between_books() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let book_id = default_book_id(&app, &alice.uid).await;
    let other = app.state.book_service.create_book(&alice.uid, "Other").await.unwrap();

    let added = app
        .state
        .record_service
        .add(&alice.uid, expense(&book_id, 100, "2024-03-07"))
        .await
        .unwrap();

    let err = app
        .state
        .record_service
        .edit(&alice.uid, &added.id, expense(&other.id, 100, "2024-03-07"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));
}

#[tokio::test]
async fn test_add_is_rejected_while_a_previous_add_holds_the_lock() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let book_id = default_book_id(&app, &alice.uid).await;

    let locks = LockService::new(
        app.lock_store.clone(),
        app.config.lock_namespace.clone(),
        Duration::from_secs(app.config.lock_ttl_seconds),
    );
    let held = locks
        .acquire(&locks.request(&alice.uid, "record:add"))
        .await
        .unwrap();

    let err = app
        .state
        .record_service
        .add(&alice.uid, expense(&book_id, 100, "2024-03-07"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::TooManyRequests(_)));

    // Once the holder's TTL runs out the next add goes through
    app.clock.advance(Duration::from_secs(app.config.lock_ttl_seconds));
    app.state
        .record_service
        .add(&alice.uid, expense(&book_id, 100, "2024-03-07"))
        .await
        .unwrap();

    assert_eq!(
        locks.release(&held).await.unwrap(),
        tallybook::domain::entities::ReleaseOutcome::ExpiredContended
    );
}
