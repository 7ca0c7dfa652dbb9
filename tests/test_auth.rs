mod common;

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use fintrack_sdk::auth::SignUp;
use fintrack_sdk::models::UserMetadata;
use fintrack_sdk::{AuthEvent, FinTrackError, SessionHub};
use serde_json::json;

use common::{fixture, seed_category, session_for, signed_in, test_user, user_id, EMAIL, PASSWORD};

#[test]
fn test_sign_in_publishes_session() {
    let fx = fixture();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let _sub = fx
        .sessions
        .subscribe(move |event, session| sink.lock().unwrap().push((event, session.is_some())));

    fx.ft.auth().sign_in(EMAIL, PASSWORD).unwrap();
    assert!(fx.sessions.is_signed_in());
    assert_eq!(fx.ft.current_user().unwrap().id, user_id());

    fx.ft.auth().sign_out().unwrap();
    assert!(!fx.sessions.is_signed_in());
    assert_eq!(
        *events.lock().unwrap(),
        vec![(AuthEvent::SignedIn, true), (AuthEvent::SignedOut, false)]
    );
    assert_eq!(fx.auth.sign_out_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_wrong_password_surfaces_remote_message() {
    let fx = fixture();
    let err = fx.ft.auth().sign_in(EMAIL, "nope-nope").unwrap_err();
    assert_eq!(err.user_message(), "Invalid login credentials");
    assert!(!fx.sessions.is_signed_in());
}

#[test]
fn test_dropping_subscription_unsubscribes() {
    let hub = Arc::new(SessionHub::new());
    let sub = hub.subscribe(|_, _| {});
    let other = hub.subscribe(|_, _| {});
    assert_eq!(hub.listener_count(), 2);
    drop(sub);
    assert_eq!(hub.listener_count(), 1);
    other.unsubscribe();
    assert_eq!(hub.listener_count(), 0);
}

#[test]
fn test_listener_may_unsubscribe_during_notification() {
    let hub = Arc::new(SessionHub::new());
    let slot: Arc<Mutex<Option<fintrack_sdk::Subscription>>> = Arc::new(Mutex::new(None));
    let inner = slot.clone();
    let sub = hub.subscribe(move |_, _| {
        inner.lock().unwrap().take();
    });
    *slot.lock().unwrap() = Some(sub);

    hub.publish(AuthEvent::SignedOut, None);
    assert_eq!(hub.listener_count(), 0);
}

#[test]
fn test_signed_out_clears_session_whatever_is_passed() {
    let hub = SessionHub::new();
    let user = test_user(user_id(), EMAIL);
    hub.publish(AuthEvent::SignedIn, Some(session_for(&user, 60)));
    hub.publish(AuthEvent::SignedOut, Some(session_for(&user, 60)));
    assert!(hub.session().is_none());
}

#[test]
fn test_current_user_none_when_signed_out() {
    let fx = fixture();
    assert!(fx.ft.current_user().is_none());
    assert!(matches!(fx.ft.require_user(), Err(FinTrackError::Unauthenticated)));
}

#[test]
fn test_expired_session_is_refreshed() {
    let fx = fixture();
    let user = test_user(user_id(), EMAIL);
    fx.ft.auth().restore_session(session_for(&user, -10));

    let session = fx.ft.auth().session().unwrap().unwrap();
    assert!(!session.is_expired());
    assert_eq!(fx.auth.refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(fx.ft.current_user().unwrap().id, user_id());
}

#[test]
fn test_expired_session_without_refresh_token_is_dropped() {
    let fx = fixture();
    let mut session = session_for(&test_user(user_id(), EMAIL), -10);
    session.refresh_token = None;
    fx.ft.auth().restore_session(session);

    assert!(fx.ft.auth().session().unwrap().is_none());
    assert!(!fx.sessions.is_signed_in());
}

#[test]
fn test_user_lookup_retries_once_after_failure() {
    let fx = fixture();
    let user = test_user(user_id(), EMAIL);
    let mut session = session_for(&user, -10);
    // unknown refresh token: the refresh fails, so lookup falls back to the user endpoint
    session.refresh_token = Some("bogus".into());
    fx.ft.auth().restore_session(session);
    fx.auth.get_user_failures.store(1, Ordering::SeqCst);

    let found = fx.ft.current_user();
    assert_eq!(found.map(|u| u.id), Some(user_id()));
    assert_eq!(fx.auth.get_user_calls.load(Ordering::SeqCst), 2);
    assert_eq!(fx.auth.refresh_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_user_lookup_gives_up_after_two_attempts() {
    let fx = fixture();
    let mut session = session_for(&test_user(user_id(), EMAIL), -10);
    session.refresh_token = Some("bogus".into());
    fx.ft.auth().restore_session(session);
    fx.auth.get_user_failures.store(5, Ordering::SeqCst);

    assert!(fx.ft.current_user().is_none());
    assert_eq!(fx.auth.get_user_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_sign_up_flows() {
    let fx = fixture();
    let meta = UserMetadata {
        name: Some("Grace".into()),
        ..UserMetadata::default()
    };
    let outcome = fx
        .ft
        .auth()
        .sign_up("grace@example.com", "hopper1", &meta, None)
        .unwrap();
    assert!(matches!(outcome, SignUp::SignedIn(_)));
    assert_eq!(
        fx.sessions.user().unwrap().user_metadata.name.as_deref(),
        Some("Grace")
    );

    fx.ft.auth().sign_out().unwrap();
    fx.auth.require_confirmation.store(true, Ordering::SeqCst);
    let outcome = fx
        .ft
        .auth()
        .sign_up("linus@example.com", "torvalds", &meta, Some("/auth/callback"))
        .unwrap();
    assert!(matches!(outcome, SignUp::ConfirmationRequired(_)));
    assert!(!fx.sessions.is_signed_in());
}

#[test]
fn test_sign_up_validation() {
    let fx = fixture();
    let meta = UserMetadata::default();
    let short = fx.ft.auth().sign_up("a@b.c", "12345", &meta, None);
    assert!(matches!(short, Err(FinTrackError::Validation(_))));
    let bad_email = fx.ft.auth().sign_up("not-an-email", "123456", &meta, None);
    assert!(matches!(bad_email, Err(FinTrackError::Validation(_))));
}

#[test]
fn test_update_password_rules() {
    let fx = signed_in();
    let auth = fx.ft.auth();
    assert!(matches!(auth.update_password("abc", "abc"), Err(FinTrackError::Validation(_))));
    assert!(matches!(
        auth.update_password("abcdef", "abcdeg"),
        Err(FinTrackError::Validation(_))
    ));
    auth.update_password("new-secret", "new-secret").unwrap();

    auth.sign_out().unwrap();
    auth.sign_in(EMAIL, "new-secret").unwrap();
}

#[test]
fn test_update_profile_publishes_user_updated() {
    let fx = signed_in();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let _sub = fx.sessions.subscribe(move |event, _| sink.lock().unwrap().push(event));

    let meta = UserMetadata {
        name: Some("Ada L.".into()),
        phone: Some("+221 77 000 00 00".into()),
        currency: Some("EUR".into()),
        language: Some("en".into()),
    };
    let user = fx.ft.auth().update_profile(meta.clone()).unwrap();
    assert_eq!(user.user_metadata, meta);
    assert_eq!(fx.sessions.user().unwrap().user_metadata, meta);
    assert_eq!(*events.lock().unwrap(), vec![AuthEvent::UserUpdated]);
}

#[test]
fn test_settings_require_session() {
    let fx = fixture();
    let err = fx.ft.auth().update_profile(UserMetadata::default()).unwrap_err();
    assert!(matches!(err, FinTrackError::Unauthenticated));
}

#[test]
fn test_reset_password_and_provider_url() {
    let fx = fixture();
    fx.ft
        .auth()
        .reset_password(EMAIL, "https://app.test/auth/update-password")
        .unwrap();
    assert_eq!(*fx.auth.reset_emails.lock().unwrap(), vec![EMAIL.to_string()]);

    let url = fx
        .ft
        .auth()
        .provider_sign_in_url("google", "https://app.test/auth/callback")
        .unwrap();
    assert!(url.contains("provider=google"));
}

#[test]
fn test_delete_account_calls_rpc_then_signs_out() {
    let fx = signed_in();
    seed_category(&fx.store, user_id(), "Food");
    fx.store
        .register_rpc("delete_user_account", |store, _| {
            let q = fintrack_sdk::QueryBuilder::new("categories").build();
            fintrack_sdk::RemoteStore::delete(store, &q)?;
            Ok(json!(null))
        })
        .unwrap();

    fx.ft.delete_account().unwrap();
    assert!(fx.store.rows("categories").unwrap().is_empty());
    assert!(!fx.sessions.is_signed_in());
}

#[test]
fn test_delete_account_failure_keeps_session() {
    let fx = signed_in();
    assert!(fx.ft.delete_account().is_err());
    assert!(fx.sessions.is_signed_in());
}

#[test]
fn test_password_recovery_then_update() {
    let fx = fixture();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let _sub = fx.sessions.subscribe(move |event, _| sink.lock().unwrap().push(event));

    let user = test_user(user_id(), EMAIL);
    fx.ft.auth().begin_password_recovery(session_for(&user, 600));
    fx.ft.auth().update_password("recovered", "recovered").unwrap();

    assert_eq!(
        *events.lock().unwrap(),
        vec![AuthEvent::PasswordRecovery, AuthEvent::UserUpdated]
    );
    fx.ft.auth().sign_out().unwrap();
    fx.ft.auth().sign_in(EMAIL, "recovered").unwrap();
}
