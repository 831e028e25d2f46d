use super::*;
use crate::user::{IdentityInput, VerifiedIdentity, create_auth_user};

fn alice() -> AuthUser {
    create_auth_user(IdentityInput::Verified {
        identity: VerifiedIdentity { uid: "alice".into(), ..VerifiedIdentity::default() },
        token: None,
    })
}

#[test]
fn reader_sees_initial_value() {
    let ctx = AuthUserContext::new(AuthUser::anonymous(false));
    let reader = ctx.reader();
    assert!(!reader.get().is_authed());
    assert!(!reader.has_changed().unwrap());
}

#[test]
fn publishing_equal_value_does_not_notify() {
    let ctx = AuthUserContext::new(alice());
    let reader = ctx.reader();
    assert!(!ctx.publish(&alice()));
    assert!(!reader.has_changed().unwrap());
}

#[test]
fn publishing_new_value_notifies() {
    let ctx = AuthUserContext::new(AuthUser::anonymous(false));
    let mut reader = ctx.reader();
    assert!(ctx.publish(&alice()));
    assert!(reader.has_changed().unwrap());
    assert_eq!(reader.get_and_mark_seen().id(), Some("alice"));
    assert!(!reader.has_changed().unwrap());
}

#[tokio::test]
async fn changed_resolves_with_new_value() {
    let ctx = AuthUserContext::new(AuthUser::anonymous(false));
    let mut reader = ctx.reader();
    ctx.publish(&alice());
    let user = reader.changed().await.unwrap();
    assert_eq!(user.id(), Some("alice"));
}

#[tokio::test]
async fn changed_errors_after_writer_dropped() {
    let ctx = AuthUserContext::new(AuthUser::anonymous(false));
    let mut reader = ctx.reader();
    drop(ctx);
    assert!(reader.changed().await.is_err());
    assert!(!reader.get().is_authed());
}
