//! Decision engine — picks the effective identity and what a gated view shows.
//!
//! DESIGN
//! ======
//! Each evaluation takes the latest client snapshot and:
//! 1. selects the identity source: the client once it has initialized
//!    (present or absent user), otherwise the server snapshot, otherwise
//!    anonymous;
//! 2. publishes that identity on the context channel (no-op if unchanged);
//! 3. classifies it into a `Bucket` and applies the configured `AuthAction`.
//!
//! Redirects are one-shot per entry into a bucket. The gate keeps the last
//! bucket it classified and only navigates when the new bucket differs, so
//! repeated renders in the same state never re-navigate while leaving and
//! re-entering does.
//!
//! A client that reports `initialized: false` after `true` is taken at its
//! word: the gate falls back to the server snapshot. That is a contract
//! violation of the source, not something the gate repairs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::client::{ClientIdentityState, SessionControl};
use crate::config::{GateConfig, Loader};
use crate::context::{AuthUserContext, AuthUserReader};
use crate::strategy::{AuthAction, Bucket};
use crate::user::{AuthUser, IdentityInput, create_auth_user};

// =============================================================================
// NAVIGATION
// =============================================================================

/// The host's navigation primitive. Failures are the navigator's concern;
/// the gate never retries.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, path: &str) {
        self(path);
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// What the gated view renders, without the view itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    Component,
    Loader,
    Nothing,
}

/// A materialized render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<V> {
    Component(V),
    Loader(V),
    Nothing,
}

impl<V> Rendered<V> {
    #[must_use]
    pub fn kind(&self) -> RenderKind {
        match self {
            Self::Component(_) => RenderKind::Component,
            Self::Loader(_) => RenderKind::Loader,
            Self::Nothing => RenderKind::Nothing,
        }
    }

    #[must_use]
    pub fn into_view(self) -> Option<V> {
        match self {
            Self::Component(v) | Self::Loader(v) => Some(v),
            Self::Nothing => None,
        }
    }
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub bucket: Bucket,
    pub action: AuthAction,
    pub output: RenderKind,
    /// The identity published to the context channel.
    pub identity: AuthUser,
    /// Path navigated to during this evaluation, if a redirect fired.
    pub redirected_to: Option<String>,
}

/// Reader and loader captured after an evaluation, so the view can be built
/// without holding the gate.
pub(crate) struct ViewParts<V> {
    reader: AuthUserReader,
    loader: Option<Loader<V>>,
}

impl<V> ViewParts<V> {
    pub(crate) fn build<P>(
        self,
        output: RenderKind,
        component: impl FnOnce(&AuthUserReader, P) -> V,
        props: P,
    ) -> Rendered<V> {
        match output {
            RenderKind::Component => Rendered::Component(component(&self.reader, props)),
            RenderKind::Loader => match self.loader {
                Some(loader) => Rendered::Loader(loader()),
                None => Rendered::Nothing,
            },
            RenderKind::Nothing => Rendered::Nothing,
        }
    }
}

// =============================================================================
// GATE
// =============================================================================

/// Wraps one component and decides what it renders on every pass.
pub struct AuthGate<V> {
    config: GateConfig<V>,
    navigator: Arc<dyn Navigator>,
    server_user: Option<AuthUser>,
    session: Option<Arc<dyn SessionControl>>,
    context: AuthUserContext,
    last_bucket: Option<Bucket>,
    mounted: Arc<AtomicBool>,
}

impl<V> AuthGate<V> {
    /// Create a gate for one component instance. The snapshot is parsed once;
    /// a malformed one behaves as if absent.
    #[must_use]
    pub fn new(config: GateConfig<V>, navigator: impl Navigator + 'static, server_snapshot: Option<String>) -> Self {
        let server_user = server_snapshot
            .map(|raw| create_auth_user(IdentityInput::ServerSnapshot(raw)))
            .filter(AuthUser::is_authed);
        let initial = server_user
            .clone()
            .unwrap_or_else(|| AuthUser::anonymous(false));
        Self {
            config,
            navigator: Arc::new(navigator),
            server_user,
            session: None,
            context: AuthUserContext::new(initial),
            last_bucket: None,
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Attach the client session so published identities can sign out.
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn SessionControl>) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig<V> {
        &self.config
    }

    /// Read handle for the subtree rendered under this gate.
    #[must_use]
    pub fn reader(&self) -> AuthUserReader {
        self.context.reader()
    }

    #[must_use]
    pub fn last_bucket(&self) -> Option<Bucket> {
        self.last_bucket
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Stop navigating. Later evaluations still classify and publish.
    pub fn unmount(&self) {
        if self.mounted.swap(false, Ordering::SeqCst) {
            debug!(last_bucket = ?self.last_bucket, "auth gate unmounted");
        }
    }

    pub(crate) fn mounted_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.mounted)
    }

    /// Recompute the effective identity and the decision for `client`.
    pub fn evaluate(&mut self, client: &ClientIdentityState) -> Decision {
        let identity = self.resolve_identity(client);
        self.context.publish(&identity);

        let bucket = Bucket::classify(identity.is_authed(), client.initialized);
        let action = self.config.strategy_for(bucket);
        let entered = self.last_bucket != Some(bucket);
        if entered {
            debug!(from = ?self.last_bucket, to = %bucket, %action, "auth bucket entered");
        }
        self.last_bucket = Some(bucket);

        let redirected_to = if entered { self.redirect(action, &identity) } else { None };
        let output = self.output_for(action);
        Decision { bucket, action, output, identity, redirected_to }
    }

    /// Evaluate and render `component` (or the loader, or nothing).
    pub fn render<P>(
        &mut self,
        client: &ClientIdentityState,
        component: impl FnOnce(&AuthUserReader, P) -> V,
        props: P,
    ) -> Rendered<V> {
        let decision = self.evaluate(client);
        self.materialize(decision.output, component, props)
    }

    /// Turn a `RenderKind` into a view.
    pub fn materialize<P>(
        &self,
        output: RenderKind,
        component: impl FnOnce(&AuthUserReader, P) -> V,
        props: P,
    ) -> Rendered<V> {
        self.view_parts().build(output, component, props)
    }

    /// Everything needed to build a view, detached from the gate.
    pub(crate) fn view_parts(&self) -> ViewParts<V> {
        ViewParts { reader: self.reader(), loader: self.config.loader().cloned() }
    }

    fn resolve_identity(&self, client: &ClientIdentityState) -> AuthUser {
        let identity = if client.initialized {
            match &client.user {
                Some(user) => create_auth_user(IdentityInput::Client { user: Arc::clone(user), initialized: true }),
                None => AuthUser::anonymous(true),
            }
        } else {
            self.server_user
                .clone()
                .unwrap_or_else(|| AuthUser::anonymous(false))
        };
        match &self.session {
            Some(session) => identity.with_session(Arc::clone(session)),
            None => identity,
        }
    }

    fn output_for(&self, action: AuthAction) -> RenderKind {
        match action {
            AuthAction::Render => RenderKind::Component,
            AuthAction::ShowLoader => RenderKind::Loader,
            AuthAction::ReturnNull | AuthAction::RedirectToLogin => RenderKind::Nothing,
            AuthAction::RedirectToApp => match self.config.when_authed_before_redirect() {
                AuthAction::Render => RenderKind::Component,
                AuthAction::ShowLoader => RenderKind::Loader,
                _ => RenderKind::Nothing,
            },
        }
    }

    fn redirect(&self, action: AuthAction, identity: &AuthUser) -> Option<String> {
        let destination = match action {
            AuthAction::RedirectToLogin => self.config.login(),
            AuthAction::RedirectToApp => self.config.app(),
            _ => return None,
        };
        let Some(destination) = destination else {
            warn!(%action, "redirect strategy without a destination; skipping");
            return None;
        };
        let path = destination.resolve(identity);
        if path.is_empty() {
            warn!(%action, "redirect destination resolved to an empty path; skipping");
            return None;
        }
        if !self.is_mounted() {
            warn!(%action, %path, "auth gate unmounted; redirect suppressed");
            return None;
        }
        info!(%action, %path, uid = ?identity.id(), "auth redirect");
        self.navigator.navigate(&path);
        Some(path)
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
