//! Server-side gate — the render-time counterpart of `AuthGate`.
//!
//! DESIGN
//! ======
//! During server rendering the only identity available is the one an
//! external layer verified from the request (cookie, header, ...). The
//! server gate either redirects before any HTML is produced, or hands the
//! page a serialized `AuthUser` to pass down as the client gate's snapshot.
//! There is no "before init" on the server, so it has one unauthed option.

use tracing::{debug, warn};

use crate::config::{Destination, RedirectDefaults};
use crate::error::ConfigError;
use crate::strategy::AuthAction;
use crate::user::{AuthUser, IdentityInput, VerifiedIdentity, create_auth_user};

/// Result of a server-side decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerOutcome {
    /// Render the page; `auth_user` is the snapshot for the client gate.
    Props { auth_user: String },
    Redirect { destination: String, permanent: bool },
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone)]
pub struct ServerGateConfig {
    when_authed: AuthAction,
    when_unauthed: AuthAction,
    include_token: bool,
    login: Option<Destination>,
    app: Option<Destination>,
}

impl ServerGateConfig {
    #[must_use]
    pub fn builder() -> ServerGateConfigBuilder {
        ServerGateConfigBuilder::new()
    }
}

/// Builder for [`ServerGateConfig`]. Both strategies default to `RENDER`
/// and the token is included in the snapshot.
#[derive(Debug, Clone)]
pub struct ServerGateConfigBuilder {
    config: ServerGateConfig,
    defaults: RedirectDefaults,
}

impl ServerGateConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ServerGateConfig {
                when_authed: AuthAction::Render,
                when_unauthed: AuthAction::Render,
                include_token: true,
                login: None,
                app: None,
            },
            defaults: RedirectDefaults::default(),
        }
    }

    #[must_use]
    pub fn when_authed(mut self, action: AuthAction) -> Self {
        self.config.when_authed = action;
        self
    }

    #[must_use]
    pub fn when_unauthed(mut self, action: AuthAction) -> Self {
        self.config.when_unauthed = action;
        self
    }

    /// Whether the snapshot carries the ID token.
    #[must_use]
    pub fn include_token(mut self, include: bool) -> Self {
        self.config.include_token = include;
        self
    }

    #[must_use]
    pub fn login(mut self, destination: impl Into<Destination>) -> Self {
        self.config.login = Some(destination.into());
        self
    }

    #[must_use]
    pub fn app(mut self, destination: impl Into<Destination>) -> Self {
        self.config.app = Some(destination.into());
        self
    }

    #[must_use]
    pub fn defaults(mut self, defaults: RedirectDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `when_authed` is not `RENDER`/`REDIRECT_TO_APP`,
    /// `when_unauthed` is not `RENDER`/`REDIRECT_TO_LOGIN`, or a redirect has
    /// no destination.
    pub fn build(self) -> Result<ServerGateConfig, ConfigError> {
        let mut config = self.config;
        if config.login.is_none() {
            config.login = self.defaults.login_path.map(Destination::Path);
        }
        if config.app.is_none() {
            config.app = self.defaults.app_path.map(Destination::Path);
        }

        if !matches!(config.when_authed, AuthAction::Render | AuthAction::RedirectToApp) {
            return Err(ConfigError::InvalidStrategy { option: "when_authed", action: config.when_authed });
        }
        if !matches!(config.when_unauthed, AuthAction::Render | AuthAction::RedirectToLogin) {
            return Err(ConfigError::InvalidStrategy { option: "when_unauthed", action: config.when_unauthed });
        }
        if config.when_authed == AuthAction::RedirectToApp && config.app.is_none() {
            return Err(ConfigError::MissingDestination { option: "when_authed", destination: "app" });
        }
        if config.when_unauthed == AuthAction::RedirectToLogin && config.login.is_none() {
            return Err(ConfigError::MissingDestination { option: "when_unauthed", destination: "login" });
        }
        Ok(config)
    }
}

impl Default for ServerGateConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// GATE
// =============================================================================

#[derive(Debug, Clone)]
pub struct ServerGate {
    config: ServerGateConfig,
}

impl ServerGate {
    #[must_use]
    pub fn new(config: ServerGateConfig) -> Self {
        Self { config }
    }

    /// Decide for one request. `identity` is `None` when the request carried
    /// no valid credentials.
    #[must_use]
    pub fn decide(&self, identity: Option<VerifiedIdentity>, token: Option<String>) -> ServerOutcome {
        let user = match identity {
            Some(identity) => create_auth_user(IdentityInput::Verified { identity, token }),
            None => AuthUser::anonymous(false),
        };

        let destination = match (user.is_authed(), self.config.when_authed, self.config.when_unauthed) {
            (true, AuthAction::RedirectToApp, _) => self.config.app.as_ref(),
            (false, _, AuthAction::RedirectToLogin) => self.config.login.as_ref(),
            _ => None,
        };
        if let Some(destination) = destination {
            let path = destination.resolve(&user);
            if !path.is_empty() {
                debug!(uid = ?user.id(), %path, "server-side auth redirect");
                return ServerOutcome::Redirect { destination: path, permanent: false };
            }
            warn!(uid = ?user.id(), "server redirect destination resolved empty; rendering instead");
        }

        let auth_user = if self.config.include_token { user.serialize() } else { user.serialize_without_token() };
        ServerOutcome::Props { auth_user }
    }
}

#[cfg(test)]
#[path = "ssr_test.rs"]
mod tests;
