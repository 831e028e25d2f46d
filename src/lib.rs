//! # authgate
//!
//! Auth resolution and render-strategy decisions for server-rendered views
//! that hydrate on the client.
//!
//! A page arrives with a snapshot of the user rendered on the server, then
//! the client identity SDK initializes some time later. `AuthGate` merges
//! the two into one `AuthUser` (client wins once initialized), publishes it
//! to the views under it, and decides whether the wrapped view renders,
//! renders nothing, shows a loader, or redirects. `ServerGate` makes the
//! matching decision during server rendering.

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod gate;
pub mod mount;
pub mod ssr;
pub mod strategy;
pub mod user;

pub use client::{ClientIdentitySource, ClientIdentityState, ClientUser, SessionControl, StaticClientUser, UserProfile};
pub use config::{Destination, GateConfig, GateConfigBuilder, RedirectDefaults};
pub use context::AuthUserReader;
pub use error::{AuthError, ConfigError};
pub use gate::{AuthGate, Decision, Navigator, RenderKind, Rendered};
pub use mount::{MountedGate, mount};
pub use ssr::{ServerGate, ServerGateConfig, ServerOutcome};
pub use strategy::{AuthAction, Bucket};
pub use user::{AuthUser, IdentityInput, IdentitySource, VerifiedIdentity, create_auth_user};
