//! Reloadable security decision store.
//!
//! Holds group memberships, IP whitelists and password digests in
//! immutable in-memory snapshots, answers lock-free queries against them,
//! and swaps whole snapshots atomically when an administrator triggers a
//! refresh.

pub mod admin;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod policy;
pub mod refresh;
pub mod store;

pub use config::schema::ServiceConfig;
pub use lifecycle::{Gatekeeper, Shutdown};
pub use policy::{AuthenticationDenied, AuthorizationDenied, GroupMapping, IpWhitelist, PasswordPolicy};
pub use refresh::{RefreshRegistry, RefreshResponse};
