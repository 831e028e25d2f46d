//! Per-gate configuration, validated once when the gate is built.
//!
//! DESIGN
//! ======
//! `GateConfigBuilder` collects the bucket strategies and the effect
//! parameters (loader, login/app destinations). `build()` checks that every
//! parameter a configured strategy needs is present, so a render pass never
//! discovers a missing loader or destination. The result is immutable.
//!
//! Crate-wide default destinations come from the environment through
//! `RedirectDefaults::from_env` and fill in whatever a gate leaves unset.

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::strategy::{AuthAction, Bucket};
use crate::user::AuthUser;

pub const LOGIN_PATH_ENV: &str = "AUTH_LOGIN_PATH";
pub const APP_PATH_ENV: &str = "AUTH_APP_PATH";

/// Produces the loader view shown for `SHOW_LOADER`.
pub type Loader<V> = Arc<dyn Fn() -> V + Send + Sync>;

// =============================================================================
// DESTINATION
// =============================================================================

/// Where a redirect navigates to.
#[derive(Clone)]
pub enum Destination {
    Path(String),
    /// Computed from the effective identity when the redirect fires.
    Resolve(Arc<dyn Fn(&AuthUser) -> String + Send + Sync>),
}

impl Destination {
    #[must_use]
    pub fn resolver(f: impl Fn(&AuthUser) -> String + Send + Sync + 'static) -> Self {
        Self::Resolve(Arc::new(f))
    }

    #[must_use]
    pub fn resolve(&self, user: &AuthUser) -> String {
        match self {
            Self::Path(path) => path.clone(),
            Self::Resolve(f) => f(user),
        }
    }
}

impl From<&str> for Destination {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for Destination {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Resolve(_) => f.write_str("Resolve(..)"),
        }
    }
}

// =============================================================================
// DEFAULTS
// =============================================================================

/// Default login/app paths shared by every gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectDefaults {
    pub login_path: Option<String>,
    pub app_path: Option<String>,
}

impl RedirectDefaults {
    /// Load from `AUTH_LOGIN_PATH` and `AUTH_APP_PATH`. Unset or empty
    /// variables leave the corresponding default unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self { login_path: env_path(LOGIN_PATH_ENV), app_path: env_path(APP_PATH_ENV) }
    }
}

fn env_path(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// GATE CONFIG
// =============================================================================

/// Validated configuration for one gated component.
pub struct GateConfig<V> {
    when_authed: AuthAction,
    when_authed_before_redirect: AuthAction,
    when_unauthed_before_init: AuthAction,
    when_unauthed_after_init: AuthAction,
    loader: Option<Loader<V>>,
    login: Option<Destination>,
    app: Option<Destination>,
}

impl<V> GateConfig<V> {
    #[must_use]
    pub fn builder() -> GateConfigBuilder<V> {
        GateConfigBuilder::new()
    }

    /// All strategies `RENDER`: the wrapped component always renders.
    #[must_use]
    pub fn render_always() -> Self {
        Self {
            when_authed: AuthAction::Render,
            when_authed_before_redirect: AuthAction::ReturnNull,
            when_unauthed_before_init: AuthAction::Render,
            when_unauthed_after_init: AuthAction::Render,
            loader: None,
            login: None,
            app: None,
        }
    }

    #[must_use]
    pub fn strategy_for(&self, bucket: Bucket) -> AuthAction {
        match bucket {
            Bucket::Authed => self.when_authed,
            Bucket::UnauthedBeforeInit => self.when_unauthed_before_init,
            Bucket::UnauthedAfterInit => self.when_unauthed_after_init,
        }
    }

    #[must_use]
    pub fn when_authed_before_redirect(&self) -> AuthAction {
        self.when_authed_before_redirect
    }

    #[must_use]
    pub fn loader(&self) -> Option<&Loader<V>> {
        self.loader.as_ref()
    }

    #[must_use]
    pub fn login(&self) -> Option<&Destination> {
        self.login.as_ref()
    }

    #[must_use]
    pub fn app(&self) -> Option<&Destination> {
        self.app.as_ref()
    }
}

impl<V> Clone for GateConfig<V> {
    fn clone(&self) -> Self {
        Self {
            when_authed: self.when_authed,
            when_authed_before_redirect: self.when_authed_before_redirect,
            when_unauthed_before_init: self.when_unauthed_before_init,
            when_unauthed_after_init: self.when_unauthed_after_init,
            loader: self.loader.clone(),
            login: self.login.clone(),
            app: self.app.clone(),
        }
    }
}

impl<V> fmt::Debug for GateConfig<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("when_authed", &self.when_authed)
            .field("when_authed_before_redirect", &self.when_authed_before_redirect)
            .field("when_unauthed_before_init", &self.when_unauthed_before_init)
            .field("when_unauthed_after_init", &self.when_unauthed_after_init)
            .field("loader", &self.loader.is_some())
            .field("login", &self.login)
            .field("app", &self.app)
            .finish()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Builder for [`GateConfig`]. Every strategy defaults to `RENDER`;
/// `when_authed_before_redirect` defaults to `RETURN_NULL`.
pub struct GateConfigBuilder<V> {
    config: GateConfig<V>,
    defaults: RedirectDefaults,
}

impl<V> GateConfigBuilder<V> {
    #[must_use]
    pub fn new() -> Self {
        Self { config: GateConfig::render_always(), defaults: RedirectDefaults::default() }
    }

    #[must_use]
    pub fn when_authed(mut self, action: AuthAction) -> Self {
        self.config.when_authed = action;
        self
    }

    /// What to render while a `REDIRECT_TO_APP` navigation is in flight.
    #[must_use]
    pub fn when_authed_before_redirect(mut self, action: AuthAction) -> Self {
        self.config.when_authed_before_redirect = action;
        self
    }

    #[must_use]
    pub fn when_unauthed_before_init(mut self, action: AuthAction) -> Self {
        self.config.when_unauthed_before_init = action;
        self
    }

    #[must_use]
    pub fn when_unauthed_after_init(mut self, action: AuthAction) -> Self {
        self.config.when_unauthed_after_init = action;
        self
    }

    #[must_use]
    pub fn loader(mut self, loader: impl Fn() -> V + Send + Sync + 'static) -> Self {
        self.config.loader = Some(Arc::new(loader));
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

    /// Fallback destinations for whatever `login`/`app` leave unset.
    #[must_use]
    pub fn defaults(mut self, defaults: RedirectDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a strategy is not allowed for its option,
    /// or a configured strategy is missing its loader or destination.
    pub fn build(self) -> Result<GateConfig<V>, ConfigError> {
        let mut config = self.config;
        if config.login.is_none() {
            config.login = self.defaults.login_path.map(Destination::Path);
        }
        if config.app.is_none() {
            config.app = self.defaults.app_path.map(Destination::Path);
        }

        let options = [
            ("when_authed", config.when_authed, AuthAction::RedirectToLogin),
            ("when_unauthed_before_init", config.when_unauthed_before_init, AuthAction::RedirectToApp),
            ("when_unauthed_after_init", config.when_unauthed_after_init, AuthAction::RedirectToApp),
        ];
        for (option, action, forbidden) in options {
            if action == forbidden {
                return Err(ConfigError::InvalidStrategy { option, action });
            }
        }
        if config.when_authed_before_redirect.is_redirect() {
            return Err(ConfigError::InvalidStrategy {
                option: "when_authed_before_redirect",
                action: config.when_authed_before_redirect,
            });
        }

        let redirecting_to_app = config.when_authed == AuthAction::RedirectToApp;
        let mut shows_loader = options
            .iter()
            .filter(|(_, action, _)| *action == AuthAction::ShowLoader)
            .map(|(option, _, _)| *option);
        let before_redirect_loader = (redirecting_to_app
            && config.when_authed_before_redirect == AuthAction::ShowLoader)
            .then_some("when_authed_before_redirect");
        if let Some(option) = shows_loader.next().or(before_redirect_loader) {
            if config.loader.is_none() {
                return Err(ConfigError::MissingLoader { option });
            }
        }

        if let Some(&(option, _, _)) = options
            .iter()
            .find(|(_, action, _)| *action == AuthAction::RedirectToLogin)
        {
            if config.login.is_none() {
                return Err(ConfigError::MissingDestination { option, destination: "login" });
            }
        }
        if redirecting_to_app && config.app.is_none() {
            return Err(ConfigError::MissingDestination { option: "when_authed", destination: "app" });
        }

        Ok(config)
    }
}

impl<V> Default for GateConfigBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
