use super::*;
use crate::gate::AuthGate;
use crate::client::ClientIdentityState;
use crate::config::GateConfig;
use crate::strategy::Bucket;
use crate::user::IdentitySource;

fn alice() -> VerifiedIdentity {
    VerifiedIdentity { uid: "alice".into(), email: Some("alice@example.com".into()), ..VerifiedIdentity::default() }
}

fn snapshot_of(outcome: ServerOutcome) -> String {
    match outcome {
        ServerOutcome::Props { auth_user } => auth_user,
        ServerOutcome::Redirect { destination, .. } => panic!("unexpected redirect to {destination}"),
    }
}

// =============================================================================
// Config validation
// =============================================================================

#[test]
fn server_config_rejects_client_only_strategies() {
    let err = ServerGateConfig::builder().when_authed(AuthAction::ShowLoader).build().unwrap_err();
    assert_eq!(err, ConfigError::InvalidStrategy { option: "when_authed", action: AuthAction::ShowLoader });

    let err = ServerGateConfig::builder().when_unauthed(AuthAction::ReturnNull).build().unwrap_err();
    assert_eq!(err, ConfigError::InvalidStrategy { option: "when_unauthed", action: AuthAction::ReturnNull });
}

#[test]
fn server_config_requires_destinations() {
    let err = ServerGateConfig::builder().when_unauthed(AuthAction::RedirectToLogin).build().unwrap_err();
    assert_eq!(err, ConfigError::MissingDestination { option: "when_unauthed", destination: "login" });

    let defaults = RedirectDefaults { login_path: Some("/login".into()), app_path: None };
    assert!(
        ServerGateConfig::builder()
            .when_unauthed(AuthAction::RedirectToLogin)
            .defaults(defaults)
            .build()
            .is_ok()
    );
}

// =============================================================================
// decide
// =============================================================================

#[test]
fn unauthed_request_redirects_to_login() {
    let gate = ServerGate::new(
        ServerGateConfig::builder().when_unauthed(AuthAction::RedirectToLogin).login("/login").build().unwrap(),
    );
    assert_eq!(gate.decide(None, None), ServerOutcome::Redirect { destination: "/login".into(), permanent: false });
}

#[test]
fn authed_request_redirects_to_app() {
    let gate = ServerGate::new(
        ServerGateConfig::builder()
            .when_authed(AuthAction::RedirectToApp)
            .app(Destination::resolver(|user| format!("/home/{}", user.id().unwrap_or_default())))
            .build()
            .unwrap(),
    );
    assert_eq!(
        gate.decide(Some(alice()), Some("tok".into())),
        ServerOutcome::Redirect { destination: "/home/alice".into(), permanent: false }
    );
}

#[test]
fn render_returns_snapshot_with_token() {
    let gate = ServerGate::new(ServerGateConfig::builder().build().unwrap());
    let snapshot = snapshot_of(gate.decide(Some(alice()), Some("tok".into())));
    let user = create_auth_user(IdentityInput::ServerSnapshot(snapshot));
    assert_eq!(user.id(), Some("alice"));
    assert_eq!(user.token(), Some("tok"));
}

#[test]
fn render_can_omit_token() {
    let gate = ServerGate::new(ServerGateConfig::builder().include_token(false).build().unwrap());
    let snapshot = snapshot_of(gate.decide(Some(alice()), Some("tok".into())));
    assert!(!snapshot.contains("tok\""));
    assert!(create_auth_user(IdentityInput::ServerSnapshot(snapshot)).token().is_none());
}

#[test]
fn empty_resolved_destination_renders_instead() {
    let gate = ServerGate::new(
        ServerGateConfig::builder()
            .when_unauthed(AuthAction::RedirectToLogin)
            .login(Destination::resolver(|_| String::new()))
            .build()
            .unwrap(),
    );
    let snapshot = snapshot_of(gate.decide(None, None));
    assert!(!create_auth_user(IdentityInput::ServerSnapshot(snapshot)).is_authed());
}

// =============================================================================
// Hand-off to the client gate
// =============================================================================

#[test]
fn server_snapshot_feeds_client_gate_before_init() {
    let server = ServerGate::new(ServerGateConfig::builder().build().unwrap());
    let snapshot = snapshot_of(server.decide(Some(alice()), None));

    let mut gate: AuthGate<()> = AuthGate::new(GateConfig::builder().build().unwrap(), |_: &str| {}, Some(snapshot));
    let decision = gate.evaluate(&ClientIdentityState::uninitialized());
    assert_eq!(decision.bucket, Bucket::Authed);
    assert_eq!(decision.identity.source(), IdentitySource::Server);
    assert_eq!(decision.identity.email(), Some("alice@example.com"));
}
