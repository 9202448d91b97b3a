//! Administrative refresh dispatch.
//!
//! # Data Flow
//! ```text
//! admin API / SIGHUP / dataset watcher
//!     → RefreshRegistry::dispatch(identifier, args)
//!     → registered callback (per-identifier gate held)
//!     → config source reload → policy.reload(section)
//!     → RefreshResponse { status: 0 | -1, message }
//! ```
//!
//! # Design Decisions
//! - Lookup table of callbacks keyed by identifier, last registration wins
//! - Reloads for one identifier queue behind each other; different
//!   identifiers run in parallel
//! - Every failure, panics included, becomes a -1 response

pub mod registry;
pub mod response;

pub use registry::{RefreshCallback, RefreshError, RefreshRegistry};
pub use response::RefreshResponse;

/// Refresh identifier of the whitelist policy.
pub const REFRESH_WHITE_LIST: &str = "REFRESH_WHITE_LIST";

/// Refresh identifier of the password policy.
pub const REFRESH_PASSWORD: &str = "REFRESH_PASSWORD";

/// Refresh identifier of the group mapping.
pub const REFRESH_USER_GROUPS: &str = "REFRESH_USER_GROUPS";
