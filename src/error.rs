//! Error types for gate configuration and identity capabilities.
//!
//! ERROR HANDLING
//! ==============
//! Configuration mistakes surface once, when a gate is built, so a render
//! pass never fails on a missing loader or destination. Capability errors
//! come from the identity SDK seams and are returned to the caller as-is;
//! the engine itself never retries them.
//!
//! Malformed server snapshots have no variant here: they degrade to the
//! anonymous identity inside the factory and are only logged.

use crate::strategy::AuthAction;

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Raised by `GateConfigBuilder::build` and `ServerGateConfigBuilder::build`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The strategy cannot be used for this option (e.g. `REDIRECT_TO_APP`
    /// for an unauthenticated bucket).
    #[error("\"{option}\" cannot be {action}")]
    InvalidStrategy { option: &'static str, action: AuthAction },

    /// `SHOW_LOADER` is configured but no loader was supplied.
    #[error("\"{option}\" is SHOW_LOADER but no loader was configured")]
    MissingLoader { option: &'static str },

    /// A redirect strategy is configured but its destination is unset.
    #[error("\"{option}\" redirects to the {destination} page but no {destination} destination was configured")]
    MissingDestination { option: &'static str, destination: &'static str },

    /// A strategy name could not be parsed.
    #[error("unknown auth action: {0}")]
    UnknownAction(String),
}

// =============================================================================
// CAPABILITY ERRORS
// =============================================================================

/// Errors returned by `AuthUser` capabilities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The identity SDK failed to produce an ID token.
    #[error("id token fetch failed: {0}")]
    TokenFetch(String),

    /// The identity SDK failed to end the session.
    #[error("sign out failed: {0}")]
    SignOut(String),
}
