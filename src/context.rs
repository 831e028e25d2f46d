//! Context channel carrying the effective `AuthUser` to descendants.
//!
//! The gate owns the only `AuthUserContext` (the write side). Everything
//! rendered under it gets an `AuthUserReader`, which has accessors and no
//! setters. Publishing an identity equal to the current one does not wake
//! readers.

use tokio::sync::watch;
use tracing::debug;

use crate::user::AuthUser;

/// Write side, owned by the gate.
pub(crate) struct AuthUserContext {
    tx: watch::Sender<AuthUser>,
}

impl AuthUserContext {
    pub(crate) fn new(initial: AuthUser) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replace the published identity. Returns `true` if readers were
    /// notified, `false` if the value was unchanged.
    pub(crate) fn publish(&self, user: &AuthUser) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if current == user {
                false
            } else {
                *current = user.clone();
                true
            }
        });
        if changed {
            debug!(uid = ?user.id(), source = ?user.source(), "auth user context updated");
        }
        changed
    }

    pub(crate) fn reader(&self) -> AuthUserReader {
        AuthUserReader { rx: self.tx.subscribe() }
    }
}

/// Read-only handle on the effective identity.
#[derive(Clone)]
pub struct AuthUserReader {
    rx: watch::Receiver<AuthUser>,
}

impl AuthUserReader {
    /// The identity as of now.
    #[must_use]
    pub fn get(&self) -> AuthUser {
        self.rx.borrow().clone()
    }

    /// Whether a new identity has been published since the last `get_and_mark_seen`
    /// or `changed`.
    ///
    /// # Errors
    ///
    /// Returns an error if the gate has been dropped.
    pub fn has_changed(&self) -> Result<bool, watch::error::RecvError> {
        self.rx.has_changed()
    }

    /// Read the identity and mark it seen.
    pub fn get_and_mark_seen(&mut self) -> AuthUser {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next published identity.
    ///
    /// # Errors
    ///
    /// Returns an error once the gate has been dropped.
    pub async fn changed(&mut self) -> Result<AuthUser, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
