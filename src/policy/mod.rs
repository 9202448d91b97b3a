//! Security policies served from reloadable snapshots.
//!
//! # Data Flow
//! ```text
//! Query (request handler threads):
//!     groups.rs     get_groups(user)              → set of groups
//!     whitelist.rs  check_access(address, user)   → Ok | AuthorizationDenied
//!     password.rs   check_password(user, secret)  → Ok | AuthenticationDenied
//!
//! Reload (refresh dispatcher):
//!     policy.reload(config section)
//!     → store::read_dataset → snapshot builder → SnapshotStore::replace
//! ```
//!
//! # Design Decisions
//! - Queries touch only the published snapshot: no I/O, no locks
//! - Reload errors are logged and returned to the dispatcher, never to
//!   query callers
//! - Denials are typed errors carrying the user and reason

pub mod digest;
pub mod error;
pub mod groups;
pub mod password;
pub mod whitelist;

pub use digest::{DigestAlgorithm, Digester};
pub use error::{AuthenticationDenied, AuthorizationDenied, DigestUnavailable, ReloadError};
pub use groups::{GroupMapping, GroupSnapshot};
pub use password::{PasswordEntry, PasswordPolicy, PasswordSnapshot};
pub use whitelist::{FixedWhitelist, IpWhitelist, VariableWhitelist};
