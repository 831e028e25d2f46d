//! Mounted gate — keeps an `AuthGate` in sync with a client identity source.
//!
//! DESIGN
//! ======
//! `mount` evaluates once against the current client snapshot, then spawns a
//! task that re-evaluates on every change notification and publishes each
//! `Decision` on a watch channel. The owning tree can also drive render
//! passes through `MountedGate::render`; both paths share the gate behind a
//! mutex and read the client snapshot only after taking it, so an evaluation
//! can never run on a state older than the one the previous holder saw. The
//! gated component is built after the guard is released, which keeps a
//! re-entrant render from deadlocking and the reactive task from stalling.
//!
//! Unmounting (explicitly or on drop) clears the gate's mounted flag before
//! aborting the task, so an evaluation already in flight cannot navigate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::client::ClientIdentityState;
use crate::context::AuthUserReader;
use crate::gate::{AuthGate, Decision, Rendered};

/// A gate subscribed to a client identity source.
pub struct MountedGate<V> {
    gate: Arc<Mutex<AuthGate<V>>>,
    client: watch::Receiver<ClientIdentityState>,
    decisions: Arc<watch::Sender<Decision>>,
    reader: AuthUserReader,
    mounted: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Mount `gate` on `client`.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
pub fn mount<V: 'static>(gate: AuthGate<V>, mut client: watch::Receiver<ClientIdentityState>) -> MountedGate<V> {
    let mounted = gate.mounted_flag();
    let reader = gate.reader();
    let gate = Arc::new(Mutex::new(gate));

    let state = client.borrow_and_update().clone();
    let initial = lock(&gate).evaluate(&state);
    debug!(bucket = %initial.bucket, action = %initial.action, "auth gate mounted");

    let decisions = Arc::new(watch::channel(initial).0);
    let task = tokio::spawn(react(Arc::clone(&gate), client.clone(), Arc::clone(&decisions), Arc::clone(&mounted)));

    MountedGate { gate, client, decisions, reader, mounted, task }
}

async fn react<V>(
    gate: Arc<Mutex<AuthGate<V>>>,
    mut client: watch::Receiver<ClientIdentityState>,
    decisions: Arc<watch::Sender<Decision>>,
    mounted: Arc<AtomicBool>,
) {
    while client.changed().await.is_ok() {
        if !mounted.load(Ordering::SeqCst) {
            break;
        }
        let mut guard = lock(&gate);
        let state = client.borrow_and_update().clone();
        let decision = guard.evaluate(&state);
        decisions.send_replace(decision);
        drop(guard);
    }
    debug!("auth gate stopped reacting to client identity changes");
}

fn lock<V>(gate: &Mutex<AuthGate<V>>) -> MutexGuard<'_, AuthGate<V>> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<V> MountedGate<V> {
    /// Decisions as they are recomputed.
    #[must_use]
    pub fn decisions(&self) -> watch::Receiver<Decision> {
        self.decisions.subscribe()
    }

    #[must_use]
    pub fn latest(&self) -> Decision {
        self.decisions.borrow().clone()
    }

    /// Read handle for the subtree rendered under this gate.
    #[must_use]
    pub fn reader(&self) -> AuthUserReader {
        self.reader.clone()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Render pass driven by the owning tree, against the newest client state.
    pub fn render<P>(&self, component: impl FnOnce(&AuthUserReader, P) -> V, props: P) -> Rendered<V> {
        let (output, parts) = {
            let mut gate = lock(&self.gate);
            let state = self.client.borrow().clone();
            let decision = gate.evaluate(&state);
            let output = decision.output;
            self.decisions.send_replace(decision);
            (output, gate.view_parts())
        };
        parts.build(output, component, props)
    }

    /// Stop reacting to the client source. No redirect fires afterwards.
    pub fn unmount(&self) {
        lock(&self.gate).unmount();
        self.task.abort();
    }
}

impl<V> Drop for MountedGate<V> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
#[path = "mount_test.rs"]
mod tests;
