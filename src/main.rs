//! Replays one hydration sequence through a mounted gate and logs each decision.
//!
//! - `AUTHGATE_SNAPSHOT`: server snapshot handed to the gate (optional)
//! - `AUTHGATE_CLIENT_UID`: user the simulated SDK reports; unset means signed out
//! - `AUTHGATE_INIT_DELAY_MS`: delay before the SDK initializes, default 50
//! - `AUTH_LOGIN_PATH` / `AUTH_APP_PATH`: redirect defaults

use std::sync::Arc;
use std::time::Duration;

use authgate::{
    AuthAction, AuthGate, AuthUserReader, ClientIdentitySource, ClientUser, Decision, GateConfig, RedirectDefaults,
    StaticClientUser, mount,
};

const DEFAULT_INIT_DELAY_MS: u64 = 50;
const FALLBACK_LOGIN_PATH: &str = "/login";

fn page(reader: &AuthUserReader, title: &str) -> String {
    format!("<{title} user={}>", reader.get().id().unwrap_or("anonymous"))
}

fn log_decision(stage: &str, decision: &Decision) {
    tracing::info!(
        stage,
        bucket = %decision.bucket,
        action = %decision.action,
        output = ?decision.output,
        uid = ?decision.identity.id(),
        redirected_to = ?decision.redirected_to,
        "gate decision"
    );
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let defaults = RedirectDefaults::from_env();
    let snapshot = std::env::var("AUTHGATE_SNAPSHOT").ok();
    let client_uid = std::env::var("AUTHGATE_CLIENT_UID")
        .ok()
        .filter(|v| !v.is_empty());
    let init_delay_ms: u64 = std::env::var("AUTHGATE_INIT_DELAY_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_INIT_DELAY_MS);

    let login = defaults
        .login_path
        .clone()
        .unwrap_or_else(|| FALLBACK_LOGIN_PATH.into());
    let config = GateConfig::builder()
        .when_unauthed_before_init(AuthAction::ShowLoader)
        .when_unauthed_after_init(AuthAction::RedirectToLogin)
        .loader(|| "<spinner>".to_string())
        .login(login)
        .defaults(defaults)
        .build()
        .expect("invalid gate config");

    let navigator = |path: &str| tracing::info!(%path, "navigate");
    let source = ClientIdentitySource::new();
    let gate = mount(AuthGate::new(config, navigator, snapshot), source.subscribe());
    let mut decisions = gate.decisions();

    log_decision("mount", &gate.latest());
    tracing::info!(view = ?gate.render(page, "dashboard").into_view(), "first render");

    tokio::time::sleep(Duration::from_millis(init_delay_ms)).await;
    let user = client_uid.map(|uid| Arc::new(StaticClientUser::new(uid)) as Arc<dyn ClientUser>);
    source.on_id_token_changed(user);

    if decisions.changed().await.is_ok() {
        log_decision("client initialized", &decisions.borrow_and_update());
    }
    tracing::info!(view = ?gate.render(page, "dashboard").into_view(), "render after init");

    gate.unmount();
}
