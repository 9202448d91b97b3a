//! Source address whitelisting.
//!
//! # Responsibilities
//! - Decide whether `user` may connect from `address`
//! - Rebuild the fixed and variable whitelists from their files on reload
//!
//! # Check Order
//! ```text
//! enabled == false             → allow
//! address in fixed whitelist   → allow (any user)
//! user in variable[address]    → allow
//! otherwise                    → AuthorizationDenied
//! ```
//!
//! # Design Decisions
//! - Addresses are compared as exact strings, no normalization
//! - The two files reload independently; one failing keeps only its own
//!   previous snapshot
//! - An empty fixed whitelist is refused, an empty variable one is accepted
//! - Disabling skips all file access and keeps the loaded snapshots

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::WhitelistConfig;
use crate::observability::metrics;
use crate::policy::error::{AuthorizationDenied, ReloadError};
use crate::store::{configured_path, read_dataset, LineFormat, LoadError, Record, SnapshotStore};

const FIXED_DATASET: &str = "fixed_whitelist";
const VARIABLE_DATASET: &str = "variable_whitelist";

/// Addresses trusted for every user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedWhitelist {
    addresses: HashSet<String>,
}

impl FixedWhitelist {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            addresses: records.into_iter().map(|r| r.key).collect(),
        }
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(address)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

/// Users trusted per address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableWhitelist {
    address_users: HashMap<String, HashSet<String>>,
}

impl VariableWhitelist {
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut address_users: HashMap<String, HashSet<String>> = HashMap::new();
        for record in records {
            address_users.entry(record.key).or_default().extend(record.values);
        }
        Self { address_users }
    }

    pub fn users(&self, address: &str) -> Option<&HashSet<String>> {
        self.address_users.get(address)
    }

    /// Number of addresses.
    pub fn len(&self) -> usize {
        self.address_users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.address_users.is_empty()
    }
}

/// Whitelist policy.
#[derive(Debug, Default)]
pub struct IpWhitelist {
    enabled: AtomicBool,
    fixed: SnapshotStore<FixedWhitelist>,
    variable: SnapshotStore<VariableWhitelist>,
}

impl IpWhitelist {
    /// Create a disabled whitelist with no entries.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Check whether `user` may connect from `address`.
    pub fn check_access(&self, address: &str, user: &str) -> Result<(), AuthorizationDenied> {
        // 1. Enforcement off: allow everything.
        if !self.is_enabled() {
            return Ok(());
        }

        // 2. Fixed whitelist trusts any user.
        if self.fixed.read().contains(address) {
            return Ok(());
        }

        // 3. Variable whitelist needs the exact (address, user) pair.
        match self.variable.read().users(address) {
            Some(users) if users.contains(user) => Ok(()),
            Some(_) => Err(AuthorizationDenied::UserNotAllowed {
                address: address.to_string(),
                user: user.to_string(),
            }),
            None => Err(AuthorizationDenied::UnknownAddress {
                address: address.to_string(),
                user: user.to_string(),
            }),
        }
    }

    /// Current fixed whitelist.
    pub fn fixed_snapshot(&self) -> std::sync::Arc<FixedWhitelist> {
        self.fixed.read_full()
    }

    /// Current variable whitelist.
    pub fn variable_snapshot(&self) -> std::sync::Arc<VariableWhitelist> {
        self.variable.read_full()
    }

    /// Reload the enable flag and, when enabled, both whitelist files.
    pub fn reload(&self, config: &WhitelistConfig) -> Result<(), ReloadError> {
        self.enabled.store(config.enabled, Ordering::Release);
        tracing::info!(enabled = config.enabled, "Whitelist checking configured");

        if !config.enabled {
            return Ok(());
        }

        let mut failures = Vec::new();
        if let Err(e) = self.reload_fixed(config) {
            tracing::error!(error = %e, "Failed to reload fixed whitelist, keeping current entries");
            failures.push(e);
        }
        if let Err(e) = self.reload_variable(config) {
            tracing::error!(error = %e, "Failed to reload variable whitelist, keeping current entries");
            failures.push(e);
        }
        ReloadError::check(failures)
    }

    fn reload_fixed(&self, config: &WhitelistConfig) -> Result<(), LoadError> {
        let result = self.load_fixed(config);
        metrics::record_reload(FIXED_DATASET, result.is_ok());
        result
    }

    fn reload_variable(&self, config: &WhitelistConfig) -> Result<(), LoadError> {
        let result = self.load_variable(config);
        metrics::record_reload(VARIABLE_DATASET, result.is_ok());
        result
    }

    fn load_fixed(&self, config: &WhitelistConfig) -> Result<(), LoadError> {
        let path = configured_path(config.fixed_file.as_deref(), "whitelist.fixed_file")?;
        let parsed = read_dataset(path, LineFormat::List, FIXED_DATASET)?;
        let snapshot = FixedWhitelist::from_records(parsed.records);

        // A truncated file must not silently drop all fixed trust.
        if snapshot.is_empty() {
            return Err(LoadError::EmptyFixedWhitelist {
                path: path.to_path_buf(),
            });
        }

        tracing::info!(path = %path.display(), addresses = snapshot.len(), "Loaded fixed whitelist");
        metrics::record_snapshot_entries(FIXED_DATASET, snapshot.len());
        self.fixed.replace(snapshot);
        Ok(())
    }

    fn load_variable(&self, config: &WhitelistConfig) -> Result<(), LoadError> {
        let path = configured_path(config.variable_file.as_deref(), "whitelist.variable_file")?;
        let parsed = read_dataset(path, LineFormat::KeyValues { delimiter: ':' }, VARIABLE_DATASET)?;
        let snapshot = VariableWhitelist::from_records(parsed.records);

        tracing::info!(path = %path.display(), addresses = snapshot.len(), "Loaded variable whitelist");
        metrics::record_snapshot_entries(VARIABLE_DATASET, snapshot.len());
        self.variable.replace(snapshot);
        Ok(())
    }
}
