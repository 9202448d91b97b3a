//! User to group mapping backed by a flat file.
//!
//! # Responsibilities
//! - Resolve a user's groups from the current snapshot
//! - Rebuild the snapshot from `user=group1,group2` lines on reload
//!
//! # Design Decisions
//! - No enable flag: an empty snapshot simply yields no groups
//! - Unknown users get an empty set, never an error
//! - A user listed on several lines accumulates all of their groups

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::GroupsConfig;
use crate::observability::metrics;
use crate::policy::error::ReloadError;
use crate::store::{configured_path, read_dataset, LineFormat, Record, SnapshotStore};

const DATASET: &str = "groups";
const FORMAT: LineFormat = LineFormat::KeyValues { delimiter: '=' };

/// Immutable user → groups dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSnapshot {
    user_groups: HashMap<String, HashSet<String>>,
}

impl GroupSnapshot {
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut user_groups: HashMap<String, HashSet<String>> = HashMap::new();
        for record in records {
            user_groups.entry(record.key).or_default().extend(record.values);
        }
        Self { user_groups }
    }

    pub fn groups(&self, user: &str) -> Option<&HashSet<String>> {
        self.user_groups.get(user)
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.user_groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_groups.is_empty()
    }
}

/// Group membership policy.
#[derive(Debug, Default)]
pub struct GroupMapping {
    snapshot: SnapshotStore<GroupSnapshot>,
}

impl GroupMapping {
    /// Create a mapping with no users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups of `user`; empty if the user is unknown.
    pub fn get_groups(&self, user: &str) -> HashSet<String> {
        self.snapshot
            .read()
            .groups(user)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `user` belongs to `group`.
    pub fn has_group(&self, user: &str, group: &str) -> bool {
        self.snapshot
            .read()
            .groups(user)
            .is_some_and(|groups| groups.contains(group))
    }

    /// Current snapshot, for inspection.
    pub fn snapshot(&self) -> std::sync::Arc<GroupSnapshot> {
        self.snapshot.read_full()
    }

    /// Rebuild the mapping from the configured file.
    ///
    /// On failure the current snapshot stays published.
    pub fn reload(&self, config: &GroupsConfig) -> Result<(), ReloadError> {
        let result = self.load(config.file.as_deref());
        metrics::record_reload(DATASET, result.is_ok());
        result.map_err(|e| {
            tracing::error!(error = %e, "Failed to reload group mapping, keeping current mapping");
            ReloadError::from(e)
        })
    }

    fn load(&self, file: Option<&Path>) -> Result<(), crate::store::LoadError> {
        let path = configured_path(file, "groups.file")?;
        let parsed = read_dataset(path, FORMAT, DATASET)?;
        let snapshot = GroupSnapshot::from_records(parsed.records);

        tracing::info!(path = %path.display(), users = snapshot.len(), "Loaded group mapping");
        metrics::record_snapshot_entries(DATASET, snapshot.len());

        // switch reference
        self.snapshot.replace(snapshot);
        Ok(())
    }
}
