use super::*;

fn user(uid: &str) -> Arc<dyn ClientUser> {
    Arc::new(StaticClientUser::new(uid))
}

// =============================================================================
// ClientIdentitySource
// =============================================================================

#[test]
fn source_starts_uninitialized_without_user() {
    let source = ClientIdentitySource::new();
    let state = source.current();
    assert!(!state.initialized);
    assert!(state.user.is_none());
    assert!(!source.is_initialized());
}

#[test]
fn first_callback_initializes_even_without_user() {
    let source = ClientIdentitySource::new();
    source.on_id_token_changed(None);
    let state = source.current();
    assert!(state.initialized);
    assert!(state.user.is_none());
}

#[test]
fn user_toggles_after_init_and_init_sticks() {
    let source = ClientIdentitySource::new();
    source.on_id_token_changed(Some(user("alice")));
    assert_eq!(source.current().user.unwrap().profile().uid, "alice");

    source.on_id_token_changed(None);
    let state = source.current();
    assert!(state.initialized);
    assert!(state.user.is_none());
}

#[tokio::test]
async fn subscribers_see_latest_snapshot() {
    let source = ClientIdentitySource::new();
    let mut rx = source.subscribe();

    source.on_id_token_changed(Some(user("alice")));
    source.on_id_token_changed(Some(user("bob")));

    rx.changed().await.unwrap();
    let state = rx.borrow_and_update().clone();
    assert!(state.initialized);
    assert_eq!(state.user.unwrap().profile().uid, "bob");
}

// =============================================================================
// StaticClientUser
// =============================================================================

#[tokio::test]
async fn static_user_returns_fixed_token() {
    let mut u = StaticClientUser::new("alice");
    u.token = "tok-1".into();
    assert_eq!(u.get_id_token(true).await.unwrap(), "tok-1");
    assert_eq!(u.profile().uid, "alice");
    assert!(u.claims().is_empty());
}

#[test]
fn state_debug_shows_uid_only() {
    let state = ClientIdentityState::initialized(Some(user("alice")));
    let rendered = format!("{state:?}");
    assert!(rendered.contains("alice"));
    assert!(rendered.contains("initialized: true"));
}
