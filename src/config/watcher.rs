//! Dataset file watcher for hot reload.
//!
//! Watches the directory of every configured dataset file (editors
//! usually replace files, which a direct file watch would lose) and
//! dispatches the owning refresh identifier when a file changes.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::schema::ServiceConfig;
use crate::refresh::{RefreshRegistry, REFRESH_PASSWORD, REFRESH_USER_GROUPS, REFRESH_WHITE_LIST};

/// A dataset file and the identifier that reloads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pub path: PathBuf,
    pub identifier: &'static str,
}

/// Collect the dataset files named by `config`.
pub fn watch_targets(config: &ServiceConfig) -> Vec<WatchTarget> {
    let candidates = [
        (config.groups.file.as_ref(), REFRESH_USER_GROUPS),
        (config.whitelist.fixed_file.as_ref(), REFRESH_WHITE_LIST),
        (config.whitelist.variable_file.as_ref(), REFRESH_WHITE_LIST),
        (config.password.file.as_ref(), REFRESH_PASSWORD),
    ];

    candidates
        .into_iter()
        .filter_map(|(path, identifier)| {
            path.filter(|p| !p.as_os_str().is_empty()).map(|p| WatchTarget {
                path: absolute(p),
                identifier,
            })
        })
        .collect()
}

fn absolute(path: &Path) -> PathBuf {
    // Canonicalize the directory only: the file itself may not exist yet.
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => {
            let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
            dir.canonicalize()
                .map(|d| d.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Identifiers affected by a change to any of `paths`.
pub fn affected_identifiers(targets: &[WatchTarget], paths: &[PathBuf]) -> BTreeSet<&'static str> {
    paths
        .iter()
        .flat_map(|changed| {
            targets
                .iter()
                .filter(move |t| &t.path == changed)
                .map(|t| t.identifier)
        })
        .collect()
}

/// A watcher that dispatches refreshes when dataset files change.
pub struct DatasetWatcher {
    targets: Vec<WatchTarget>,
    registry: Arc<RefreshRegistry>,
    poll_interval: Duration,
}

impl DatasetWatcher {
    pub fn new(targets: Vec<WatchTarget>, registry: Arc<RefreshRegistry>, poll_interval: Duration) -> Self {
        Self {
            targets,
            registry,
            poll_interval,
        }
    }

    /// Start watching in the background.
    ///
    /// The returned watcher must be kept alive for events to flow.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let targets = self.targets.clone();
        let registry = self.registry.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    for identifier in affected_identifiers(&targets, &event.paths) {
                        tracing::info!(identifier, "Dataset file change detected, reloading...");
                        let response = registry.dispatch(identifier, &[]);
                        if !response.is_success() {
                            tracing::error!(
                                identifier,
                                message = %response.message,
                                "Reload after file change failed. Keeping current snapshot."
                            );
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(self.poll_interval),
        )?;

        let dirs: BTreeSet<&Path> = self.targets.iter().filter_map(|t| t.path.parent()).collect();
        for dir in dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            tracing::info!(path = ?dir, "Dataset watcher started");
        }
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    #[test]
    fn test_targets_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ServiceConfig::default();
        config.groups.file = Some(dir.path().join("groups"));
        config.whitelist.fixed_file = Some(dir.path().join("fixed"));
        config.whitelist.variable_file = Some(PathBuf::new());

        let targets = watch_targets(&config);
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[0].identifier, REFRESH_USER_GROUPS);
        assert_eq!(targets[1].identifier, REFRESH_WHITE_LIST);
        assert!(targets[0].path.is_absolute());
    }

    #[test]
    fn test_affected_identifiers_dedups() {
        let targets = vec![
            WatchTarget { path: "/d/fixed".into(), identifier: REFRESH_WHITE_LIST },
            WatchTarget { path: "/d/variable".into(), identifier: REFRESH_WHITE_LIST },
            WatchTarget { path: "/d/passwords".into(), identifier: REFRESH_PASSWORD },
        ];
        let changed = vec![
            PathBuf::from("/d/fixed"),
            PathBuf::from("/d/variable"),
            PathBuf::from("/d/unrelated"),
        ];
        let ids = affected_identifiers(&targets, &changed);
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![REFRESH_WHITE_LIST]);
    }

    #[test]
    fn test_file_change_dispatches_owner() {
        let dir = tempfile::tempdir().unwrap();
        let groups = dir.path().join("groups");
        std::fs::write(&groups, "alice=g1\n").unwrap();

        let mut config = ServiceConfig::default();
        config.groups.file = Some(groups.clone());

        let registry = Arc::new(RefreshRegistry::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        registry.register(REFRESH_USER_GROUPS, move |_: &[String]| {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let untouched = Arc::new(AtomicUsize::new(0));
        let other = untouched.clone();
        registry.register(REFRESH_PASSWORD, move |_: &[String]| {
            other.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let _watcher = DatasetWatcher::new(watch_targets(&config), registry, Duration::from_millis(50))
            .run()
            .unwrap();
        // let the backend settle before the change
        std::thread::sleep(Duration::from_millis(100));
        std::fs::write(&groups, "alice=g1,g2\n").unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while calls.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(calls.load(Ordering::SeqCst) >= 1, "no dispatch after file change");
        assert_eq!(untouched.load(Ordering::SeqCst), 0);
    }
}
