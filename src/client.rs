//! Client identity source — the live side of auth resolution.
//!
//! DESIGN
//! ======
//! The identity SDK runs outside this crate. It reports users through the
//! `ClientUser` seam and pushes every token change into a
//! `ClientIdentitySource`, which fans the latest `{ user, initialized }`
//! snapshot out over a `tokio::sync::watch` channel. Watch semantics match
//! what the gate needs: receivers always see the most recent snapshot and
//! intermediate ones may be skipped.
//!
//! `initialized` flips to `true` on the first token-change callback and is
//! never cleared by this source. A third-party source that reverts it is
//! taken literally by the gate.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::debug;

use crate::error::AuthError;

// =============================================================================
// SDK SEAMS
// =============================================================================

/// Profile fields read from a client SDK user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub phone_number: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

/// A signed-in user as reported by the client identity SDK.
#[async_trait::async_trait]
pub trait ClientUser: Send + Sync {
    fn profile(&self) -> UserProfile;

    /// Decoded token claims. Standard claims are filtered out by the factory.
    fn claims(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Fetch an ID token, refreshing it when `force_refresh` is set or the
    /// cached one has expired.
    async fn get_id_token(&self, force_refresh: bool) -> Result<String, AuthError>;
}

/// Ends the client session held by the identity SDK.
#[async_trait::async_trait]
pub trait SessionControl: Send + Sync {
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Plain-data `ClientUser` with a fixed token.
#[derive(Debug, Clone, Default)]
pub struct StaticClientUser {
    pub profile: UserProfile,
    pub claims: Map<String, Value>,
    pub token: String,
}

impl StaticClientUser {
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self { profile: UserProfile { uid: uid.into(), ..UserProfile::default() }, ..Self::default() }
    }
}

#[async_trait::async_trait]
impl ClientUser for StaticClientUser {
    fn profile(&self) -> UserProfile {
        self.profile.clone()
    }

    fn claims(&self) -> Map<String, Value> {
        self.claims.clone()
    }

    async fn get_id_token(&self, _force_refresh: bool) -> Result<String, AuthError> {
        Ok(self.token.clone())
    }
}

// =============================================================================
// STATE
// =============================================================================

/// One snapshot of the client SDK's auth state.
#[derive(Clone, Default)]
pub struct ClientIdentityState {
    pub user: Option<Arc<dyn ClientUser>>,
    pub initialized: bool,
}

impl ClientIdentityState {
    /// The state before the SDK has reported anything.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn initialized(user: Option<Arc<dyn ClientUser>>) -> Self {
        Self { user, initialized: true }
    }
}

impl fmt::Debug for ClientIdentityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentityState")
            .field("user", &self.user.as_ref().map(|u| u.profile().uid))
            .field("initialized", &self.initialized)
            .finish()
    }
}

// =============================================================================
// SOURCE
// =============================================================================

/// Publisher the identity SDK's token-change listener feeds.
pub struct ClientIdentitySource {
    tx: watch::Sender<ClientIdentityState>,
}

impl ClientIdentitySource {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ClientIdentityState::uninitialized());
        Self { tx }
    }

    /// Receiver positioned at the current snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ClientIdentityState> {
        self.tx.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> ClientIdentityState {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.tx.borrow().initialized
    }

    /// Forward an SDK token-change callback. The first call marks the
    /// source initialized, even when it reports no user.
    pub fn on_id_token_changed(&self, user: Option<Arc<dyn ClientUser>>) {
        let uid = user.as_ref().map(|u| u.profile().uid);
        let previous = self.tx.send_replace(ClientIdentityState::initialized(user));
        if previous.initialized {
            debug!(uid = ?uid, "client identity changed");
        } else {
            debug!(uid = ?uid, "client identity source initialized");
        }
    }
}

impl Default for ClientIdentitySource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
