mod helpers;

use helpers::*;
use std::time::Duration;
use tallybook::domain::entities::{ApplicationStatus, ModifyBookRequest, DEFAULT_BOOK_TITLE};
use tallybook::infrastructure::http::middleware::ApiError;

#[tokio::test]
async fn test_first_login_creates_user_and_default_book() {
    let app = setup_test_app().await;

    let first = login(&app, "alice").await;
    assert_eq!(first.nickname, "nick-alice");
    assert!(!first.token.token.is_empty());

    let books = app.state.book_service.list_books(&first.uid, false).await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, DEFAULT_BOOK_TITLE);
    assert!(books[0].admin);
    assert_eq!(books[0].owner_id, first.uid);

    // Second login finds the same user and does not create another book
    let second = login(&app, "alice").await;
    assert_eq!(second.uid, first.uid);
    let books = app.state.book_service.list_books(&first.uid, false).await.unwrap();
    assert_eq!(books.len(), 1);
}

#[tokio::test]
async fn test_login_rejections() {
    let app = setup_test_app().await;

    let err = app.state.user_service.login("  ").await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = app.state.user_service.login(REJECTED_CODE).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn test_token_authenticates_user() {
    let app = setup_test_app().await;
    let session = login(&app, "alice").await;

    let user = app
        .state
        .user_service
        .authenticate(&session.token.token)
        .await
        .unwrap();
    assert_eq!(user.id, session.uid);

    let err = app
        .state
        .user_service
        .authenticate("not-a-token")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn test_create_and_rename_book() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let books = &app.state.book_service;

    let book = books.create_book(&alice.uid, " Travel ").await.unwrap();
    assert_eq!(book.title, "Travel");

    let err = books.create_book(&alice.uid, "").await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let renamed = books
        .modify_book(
            &alice.uid,
            &book.id,
            ModifyBookRequest {
                title: "Trips".to_string(),
                member_ids: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.title, "Trips");

    let listed = books.list_books(&alice.uid, true).await.unwrap();
    assert!(listed.iter().any(|b| b.id == book.id && b.title == "Trips"));
}

#[tokio::test]
async fn test_only_owner_modifies_book() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let book_id = default_book_id(&app, &alice.uid).await;

    let err = app
        .state
        .book_service
        .modify_book(
            &bob.uid,
            &book_id,
            ModifyBookRequest {
                title: "Mine".to_string(),
                member_ids: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn test_modify_book_drops_unlisted_members() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let carol = login(&app, "carol").await;
    let books = &app.state.book_service;
    let book_id = default_book_id(&app, &alice.uid).await;

    let invite = books.issue_invite(&alice.uid, &book_id).await.unwrap();
    books.attend(&bob.uid, &invite.code).await.unwrap();
    books.attend(&carol.uid, &invite.code).await.unwrap();
    assert_eq!(books.members(&alice.uid, &book_id).await.unwrap().len(), 3);

    // Keep bob only; the owner stays even though not listed
    books
        .modify_book(
            &alice.uid,
            &book_id,
            ModifyBookRequest {
                title: "Family".to_string(),
                member_ids: Some(vec![bob.uid.clone(), "stranger".to_string()]),
            },
        )
        .await
        .unwrap();

    let members = books.members(&alice.uid, &book_id).await.unwrap();
    let ids: Vec<&str> = members.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(members.len(), 2);
    assert!(ids.contains(&alice.uid.as_str()));
    assert!(ids.contains(&bob.uid.as_str()));
    assert!(members[0].admin);
}

#[tokio::test]
async fn test_modify_book_is_rejected_while_locked() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let book_id = default_book_id(&app, &alice.uid).await;

    let locks = tallybook::application::services::LockService::new(
        app.lock_store.clone(),
        app.config.lock_namespace.clone(),
        Duration::from_secs(5),
    );
    let held = locks
        .acquire(&locks.request(&alice.uid, &format!("book:{}:members", book_id)))
        .await
        .unwrap();

    let err = app
        .state
        .book_service
        .modify_book(
            &alice.uid,
            &book_id,
            ModifyBookRequest {
                title: "Other".to_string(),
                member_ids: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::TooManyRequests(_)));

    locks.release(&held).await.unwrap();
}

#[tokio::test]
async fn test_last_owned_book_cannot_be_removed() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let books = &app.state.book_service;
    let default_id = default_book_id(&app, &alice.uid).await;

    let err = books.remove_book(&alice.uid, &default_id).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let extra = books.create_book(&alice.uid, "Extra").await.unwrap();
    books.remove_book(&alice.uid, &extra.id).await.unwrap();

    let listed = books.list_books(&alice.uid, false).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, default_id);

    let err = books.members(&alice.uid, &extra.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_attend_through_invite() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let books = &app.state.book_service;
    let book_id = default_book_id(&app, &alice.uid).await;

    let invite = books.issue_invite(&alice.uid, &book_id).await.unwrap();
    assert_eq!(invite.expires_in, app.config.invite_ttl_seconds);

    let info = books.invite_info(&invite.code).await.unwrap();
    assert_eq!(info.book_id, book_id);
    assert_eq!(info.nickname, "nick-alice");

    let joined = books.attend(&bob.uid, &invite.code).await.unwrap();
    assert_eq!(joined.id, book_id);
    assert!(!joined.admin);

    // The shared book shows up for bob, but not among the ones he administers
    assert_eq!(books.list_books(&bob.uid, false).await.unwrap().len(), 2);
    assert_eq!(books.list_books(&bob.uid, true).await.unwrap().len(), 1);

    let err = books.attend(&bob.uid, &invite.code).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    // The owner following their own link is a no-op
    let own = books.attend(&alice.uid, &invite.code).await.unwrap();
    assert!(own.admin);
}

#[tokio::test]
async fn test_only_owner_issues_invites() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let book_id = default_book_id(&app, &alice.uid).await;

    let err = app
        .state
        .book_service
        .issue_invite(&bob.uid, &book_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}

#[tokio::test]
async fn test_expired_or_tampered_invite_is_rejected() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let books = &app.state.book_service;
    let book_id = default_book_id(&app, &alice.uid).await;

    let invite = books.issue_invite(&alice.uid, &book_id).await.unwrap();

    let mut tampered = invite.code.clone();
    tampered.push('0');
    let err = books.attend(&bob.uid, &tampered).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    app.clock
        .advance(Duration::from_secs(app.config.invite_ttl_seconds as u64 + 1));
    let err = books.attend(&bob.uid, &invite.code).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(msg) if msg.contains("expired")));
}

#[tokio::test]
async fn test_member_quits_and_owner_removes_member() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let carol = login(&app, "carol").await;
    let books = &app.state.book_service;
    let book_id = default_book_id(&app, &alice.uid).await;

    let invite = books.issue_invite(&alice.uid, &book_id).await.unwrap();
    books.attend(&bob.uid, &invite.code).await.unwrap();
    books.attend(&carol.uid, &invite.code).await.unwrap();

    let err = books.quit(&alice.uid, &book_id, &alice.uid).await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    let err = books.quit(&bob.uid, &book_id, &carol.uid).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    books.quit(&bob.uid, &book_id, &bob.uid).await.unwrap();
    books.quit(&alice.uid, &book_id, &carol.uid).await.unwrap();

    let members = books.members(&alice.uid, &book_id).await.unwrap();
    assert_eq!(members.len(), 1);

    let err = books.members(&bob.uid, &book_id).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let err = books.quit(&alice.uid, &book_id, &bob.uid).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_application_approval_adds_member() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let books = &app.state.book_service;
    let book_id = default_book_id(&app, &alice.uid).await;

    let application = books.apply(&bob.uid, &book_id, " let me in ").await.unwrap();
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.comment, "let me in");

    let err = books.apply(&bob.uid, &book_id, "again").await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    let err = books.list_applications(&bob.uid, &book_id).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let pending = books.list_applications(&alice.uid, &book_id).await.unwrap();
    assert_eq!(pending.len(), 1);

    let err = books.examine(&bob.uid, &application.id, true).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let examined = books.examine(&alice.uid, &application.id, true).await.unwrap();
    assert_eq!(examined.status, ApplicationStatus::Approved);
    books.member_book(&bob.uid, &book_id).await.unwrap();

    let err = books.examine(&alice.uid, &application.id, false).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    let err = books.apply(&bob.uid, &book_id, "").await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn test_rejected_application_leaves_membership_unchanged() {
    let app = setup_test_app().await;
    let alice = login(&app, "alice").await;
    let bob = login(&app, "bob").await;
    let books = &app.state.book_service;
    let book_id = default_book_id(&app, &alice.uid).await;

    let application = books.apply(&bob.uid, &book_id, "").await.unwrap();
    let examined = books.examine(&alice.uid, &application.id, false).await.unwrap();
    assert_eq!(examined.status, ApplicationStatus::Rejected);

    let err = books.member_book(&bob.uid, &book_id).await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    // A rejected applicant may try again
    books.apply(&bob.uid, &book_id, "please").await.unwrap();
}
