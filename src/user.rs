//! Canonical identity value and the factory that builds it.
//!
//! DESIGN
//! ======
//! `AuthUser` is the one shape every caller sees, whether the identity came
//! from a server-rendered snapshot, a server-verified token, the live client
//! SDK, or nobody at all. Capabilities (`get_id_token`, `serialize`,
//! `sign_out`) exist on every value, including the anonymous one, so
//! callers never branch on presence before calling them.
//!
//! Values are immutable. A change in either source produces a new
//! `AuthUser`; equality ignores the capability handles so an unchanged
//! identity compares equal across rebuilds.
//!
//! ERROR HANDLING
//! ==============
//! Snapshots are best-effort hints. One that fails structural validation
//! yields the anonymous value and a `warn!`, never an error.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::{ClientUser, SessionControl};
use crate::error::AuthError;

/// Claims set by the identity provider itself. Only custom claims are kept.
pub const STANDARD_CLAIMS: [&str; 14] = [
    "iss",
    "aud",
    "auth_time",
    "user_id",
    "sub",
    "iat",
    "exp",
    "email",
    "email_verified",
    "phone_number",
    "name",
    "picture",
    "firebase",
    "uid",
];

// =============================================================================
// INPUTS
// =============================================================================

/// Which source an `AuthUser` was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Server,
    Client,
    Anonymous,
}

/// An identity an external server-side layer has already verified, with its
/// decoded token claims.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: bool,
    pub phone_number: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub claims: Map<String, Value>,
}

/// Input to [`create_auth_user`]. At most one user source per build.
#[derive(Clone)]
pub enum IdentityInput {
    /// A snapshot produced by [`AuthUser::serialize`] during server rendering.
    ServerSnapshot(String),
    /// A server-verified identity and the token it was verified from.
    Verified { identity: VerifiedIdentity, token: Option<String> },
    /// The live client SDK user.
    Client { user: Arc<dyn ClientUser>, initialized: bool },
    Anonymous { initialized: bool },
}

// =============================================================================
// SERIALIZED SHAPE
// =============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializedAuthUser {
    id: Option<String>,
    #[serde(default)]
    claims: Map<String, Value>,
    email: Option<String>,
    #[serde(default)]
    email_verified: bool,
    phone_number: Option<String>,
    display_name: Option<String>,
    #[serde(rename = "photoURL")]
    photo_url: Option<String>,
    #[serde(default)]
    client_initialized: bool,
    #[serde(rename = "_token", skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

// =============================================================================
// AUTH USER
// =============================================================================

/// Canonical, capability-bearing user representation.
#[derive(Clone)]
pub struct AuthUser {
    id: Option<String>,
    email: Option<String>,
    email_verified: bool,
    phone_number: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    claims: Map<String, Value>,
    token: Option<String>,
    client_initialized: bool,
    source: IdentitySource,
    client_user: Option<Arc<dyn ClientUser>>,
    session: Option<Arc<dyn SessionControl>>,
}

impl AuthUser {
    /// The empty identity.
    #[must_use]
    pub fn anonymous(client_initialized: bool) -> Self {
        Self {
            id: None,
            email: None,
            email_verified: false,
            phone_number: None,
            display_name: None,
            photo_url: None,
            claims: Map::new(),
            token: None,
            client_initialized,
            source: IdentitySource::Anonymous,
            client_user: None,
            session: None,
        }
    }

    /// Attach the client session handle `sign_out` delegates to.
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn SessionControl>) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn email_verified(&self) -> bool {
        self.email_verified
    }

    #[must_use]
    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[must_use]
    pub fn photo_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }

    #[must_use]
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Token carried from the server side. Client-built values carry none;
    /// use [`AuthUser::get_id_token`] to fetch one.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    #[must_use]
    pub fn client_initialized(&self) -> bool {
        self.client_initialized
    }

    #[must_use]
    pub fn source(&self) -> IdentitySource {
        self.source
    }

    #[must_use]
    pub fn is_authed(&self) -> bool {
        self.id.is_some()
    }

    /// Fetch an ID token from whichever source built this value.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenFetch` if the client SDK fails.
    pub async fn get_id_token(&self, force_refresh: bool) -> Result<Option<String>, AuthError> {
        match &self.client_user {
            Some(user) => user.get_id_token(force_refresh).await.map(Some),
            None => Ok(self.token.clone()),
        }
    }

    /// Serialize to a snapshot string, token included.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.to_snapshot(true)
    }

    /// Serialize without the token, for snapshots that reach untrusted storage.
    #[must_use]
    pub fn serialize_without_token(&self) -> String {
        self.to_snapshot(false)
    }

    /// End the client session.
    ///
    /// Without an attached session handle this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SignOut` if the session handle fails.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        match &self.session {
            Some(session) => session.sign_out().await,
            None => {
                debug!(uid = ?self.id, "sign out without a client session; nothing to do");
                Ok(())
            }
        }
    }

    fn to_snapshot(&self, include_token: bool) -> String {
        let shape = SerializedAuthUser {
            id: self.id.clone(),
            claims: self.claims.clone(),
            email: self.email.clone(),
            email_verified: self.email_verified,
            phone_number: self.phone_number.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
            client_initialized: self.client_initialized,
            token: if include_token { self.token.clone() } else { None },
        };
        // String keys and JSON values only; serialization cannot fail.
        serde_json::to_string(&shape).unwrap_or_default()
    }

    fn from_snapshot(raw: &str) -> Self {
        let shape = match serde_json::from_str::<SerializedAuthUser>(raw) {
            Ok(shape) => shape,
            Err(e) => {
                warn!(error = %e, "malformed server snapshot; treating as anonymous");
                return Self::anonymous(false);
            }
        };
        let Some(id) = shape.id.filter(|id| !id.is_empty()) else {
            return Self::anonymous(shape.client_initialized);
        };
        Self {
            id: Some(id),
            email: shape.email,
            email_verified: shape.email_verified,
            phone_number: shape.phone_number,
            display_name: shape.display_name,
            photo_url: shape.photo_url,
            claims: shape.claims,
            token: shape.token,
            client_initialized: shape.client_initialized,
            source: IdentitySource::Server,
            client_user: None,
            session: None,
        }
    }

    fn from_verified(identity: VerifiedIdentity, token: Option<String>) -> Self {
        if identity.uid.is_empty() {
            return Self::anonymous(false);
        }
        Self {
            id: Some(identity.uid),
            email: identity.email,
            email_verified: identity.email_verified,
            phone_number: identity.phone_number,
            display_name: identity.display_name,
            photo_url: identity.photo_url,
            claims: filter_standard_claims(identity.claims),
            token,
            client_initialized: false,
            source: IdentitySource::Server,
            client_user: None,
            session: None,
        }
    }

    fn from_client(user: Arc<dyn ClientUser>, initialized: bool) -> Self {
        let profile = user.profile();
        if profile.uid.is_empty() {
            return Self::anonymous(initialized);
        }
        Self {
            id: Some(profile.uid),
            email: profile.email,
            email_verified: profile.email_verified,
            phone_number: profile.phone_number,
            display_name: profile.display_name,
            photo_url: profile.photo_url,
            claims: filter_standard_claims(user.claims()),
            token: None,
            client_initialized: initialized,
            source: IdentitySource::Client,
            client_user: Some(user),
            session: None,
        }
    }
}

impl PartialEq for AuthUser {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.email == other.email
            && self.email_verified == other.email_verified
            && self.phone_number == other.phone_number
            && self.display_name == other.display_name
            && self.photo_url == other.photo_url
            && self.claims == other.claims
            && self.token == other.token
            && self.client_initialized == other.client_initialized
            && self.source == other.source
    }
}

impl fmt::Debug for AuthUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthUser")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("email_verified", &self.email_verified)
            .field("phone_number", &self.phone_number)
            .field("display_name", &self.display_name)
            .field("photo_url", &self.photo_url)
            .field("claims", &self.claims)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("client_initialized", &self.client_initialized)
            .field("source", &self.source)
            .field("has_session", &self.session.is_some())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// FACTORY
// =============================================================================

/// Build an `AuthUser` from exactly one source, or none.
#[must_use]
pub fn create_auth_user(input: IdentityInput) -> AuthUser {
    match input {
        IdentityInput::ServerSnapshot(raw) => AuthUser::from_snapshot(&raw),
        IdentityInput::Verified { identity, token } => AuthUser::from_verified(identity, token),
        IdentityInput::Client { user, initialized } => AuthUser::from_client(user, initialized),
        IdentityInput::Anonymous { initialized } => AuthUser::anonymous(initialized),
    }
}

/// Drop provider-set claims, keeping custom ones.
#[must_use]
pub fn filter_standard_claims(mut claims: Map<String, Value>) -> Map<String, Value> {
    claims.retain(|key, _| !STANDARD_CLAIMS.contains(&key.as_str()));
    claims
}

#[cfg(test)]
#[path = "user_test.rs"]
mod tests;
