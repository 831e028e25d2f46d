//! Render strategies and the auth buckets they are chosen for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// AUTH ACTION
// =============================================================================

/// What a gated view does for a given auth bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthAction {
    /// Render the wrapped component with its props.
    #[default]
    Render,
    /// Render nothing.
    ReturnNull,
    /// Render the configured loader.
    ShowLoader,
    /// Render nothing and navigate to the login destination.
    RedirectToLogin,
    /// Navigate to the app destination.
    RedirectToApp,
}

impl AuthAction {
    pub const ALL: [Self; 5] =
        [Self::Render, Self::ReturnNull, Self::ShowLoader, Self::RedirectToLogin, Self::RedirectToApp];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Render => "RENDER",
            Self::ReturnNull => "RETURN_NULL",
            Self::ShowLoader => "SHOW_LOADER",
            Self::RedirectToLogin => "REDIRECT_TO_LOGIN",
            Self::RedirectToApp => "REDIRECT_TO_APP",
        }
    }

    #[must_use]
    pub fn is_redirect(self) -> bool {
        matches!(self, Self::RedirectToLogin | Self::RedirectToApp)
    }
}

impl fmt::Display for AuthAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownAction(s.to_string()))
    }
}

// =============================================================================
// BUCKET
// =============================================================================

/// Classification of the effective identity at one evaluation.
///
/// `UnauthedBeforeInit -> UnauthedAfterInit` is the only forced transition;
/// `Authed` is entered and left freely as the client user signs in and out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Authed,
    UnauthedBeforeInit,
    UnauthedAfterInit,
}

impl Bucket {
    /// Classify in order: authed first, then by client initialization.
    #[must_use]
    pub fn classify(authed: bool, client_initialized: bool) -> Self {
        if authed {
            Self::Authed
        } else if client_initialized {
            Self::UnauthedAfterInit
        } else {
            Self::UnauthedBeforeInit
        }
    }

    /// Name of the config option that governs this bucket.
    #[must_use]
    pub fn option_name(self) -> &'static str {
        match self {
            Self::Authed => "when_authed",
            Self::UnauthedBeforeInit => "when_unauthed_before_init",
            Self::UnauthedAfterInit => "when_unauthed_after_init",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authed => f.write_str("authed"),
            Self::UnauthedBeforeInit => f.write_str("unauthed_before_init"),
            Self::UnauthedAfterInit => f.write_str("unauthed_after_init"),
        }
    }
}

#[cfg(test)]
#[path = "strategy_test.rs"]
mod tests;
