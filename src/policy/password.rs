//! Password authentication against a digest file.
//!
//! # Check Order
//! ```text
//! enabled == false                 → allow
//! user has no entry                → UnknownUser
//! entry.enabled == false           → allow (checking waived for user)
//! entry has no digest              → PasswordNotSet
//! no password supplied             → PasswordNotSupplied
//! digest(password) != entry digest → PasswordIncorrect
//! otherwise                        → allow
//! ```
//!
//! # File Format
//! `user:digest:enabled`, where a digest equal to or ending in `null`
//! (or empty) means no password is configured and `enabled` is `true`
//! case-insensitively, anything else `false`.
//!
//! # Design Decisions
//! - The digest algorithm is fixed at construction; an unusable one fails fast
//! - Disabling clears the snapshot so a later enable fails closed until a
//!   successful load

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::PasswordConfig;
use crate::observability::metrics;
use crate::policy::digest::Digester;
use crate::policy::error::{AuthenticationDenied, DigestUnavailable, ReloadError};
use crate::store::{configured_path, read_dataset, LineFormat, LoadError, Record, SnapshotStore};

const DATASET: &str = "passwords";
const FORMAT: LineFormat = LineFormat::Fields { delimiter: ':', count: 3 };
const EMPTY_PASSWORD: &str = "null";

/// Stored credentials of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordEntry {
    /// Lowercase hex digest, `None` when no password is configured.
    pub digest: Option<String>,
    /// Whether password checking applies to this user.
    pub enabled: bool,
}

impl PasswordEntry {
    fn from_fields(digest: &str, enabled: &str) -> Self {
        let digest = if digest.is_empty() || digest.ends_with(EMPTY_PASSWORD) {
            None
        } else {
            Some(digest.to_string())
        };
        Self {
            digest,
            enabled: enabled.eq_ignore_ascii_case("true"),
        }
    }
}

/// Immutable user → credentials dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordSnapshot {
    users: HashMap<String, PasswordEntry>,
}

impl PasswordSnapshot {
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut users = HashMap::new();
        for record in records {
            if let [digest, enabled] = record.values.as_slice() {
                users.insert(record.key, PasswordEntry::from_fields(digest, enabled));
            }
        }
        Self { users }
    }

    pub fn get(&self, user: &str) -> Option<&PasswordEntry> {
        self.users.get(user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Password policy.
#[derive(Debug)]
pub struct PasswordPolicy {
    enabled: AtomicBool,
    digester: Digester,
    snapshot: SnapshotStore<PasswordSnapshot>,
}

impl PasswordPolicy {
    /// Create a disabled policy using the named digest algorithm.
    pub fn new(digest_algorithm: &str) -> Result<Self, DigestUnavailable> {
        let digester = Digester::from_name(digest_algorithm)?;
        Ok(Self::with_digester(digester))
    }

    pub fn with_digester(digester: Digester) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            digester,
            snapshot: SnapshotStore::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn digester(&self) -> &Digester {
        &self.digester
    }

    /// Current credentials snapshot.
    pub fn snapshot(&self) -> Arc<PasswordSnapshot> {
        self.snapshot.read_full()
    }

    /// Authenticate `user` with the supplied plaintext password.
    pub fn check_password(&self, user: &str, password: Option<&str>) -> Result<(), AuthenticationDenied> {
        if !self.is_enabled() {
            return Ok(());
        }

        let snapshot = self.snapshot.read();
        let entry = snapshot.get(user).ok_or_else(|| AuthenticationDenied::UnknownUser {
            user: user.to_string(),
        })?;

        if !entry.enabled {
            return Ok(());
        }

        let stored = entry.digest.as_deref().ok_or_else(|| AuthenticationDenied::PasswordNotSet {
            user: user.to_string(),
        })?;

        let supplied = match password {
            Some(p) if !p.is_empty() => p,
            _ => {
                return Err(AuthenticationDenied::PasswordNotSupplied {
                    user: user.to_string(),
                })
            }
        };

        if self.digester.hex_digest(supplied) != stored {
            return Err(AuthenticationDenied::PasswordIncorrect {
                user: user.to_string(),
            });
        }

        Ok(())
    }

    /// Reload the enable flag and, when enabled, the password file.
    ///
    /// Disabling clears the credentials.
    pub fn reload(&self, config: &PasswordConfig) -> Result<(), ReloadError> {
        self.enabled.store(config.enabled, Ordering::Release);
        tracing::info!(enabled = config.enabled, "Password checking configured");

        if !config.enabled {
            self.snapshot.clear();
            metrics::record_snapshot_entries(DATASET, 0);
            return Ok(());
        }

        let result = self.load(config.file.as_deref());
        metrics::record_reload(DATASET, result.is_ok());
        result.map_err(|e| {
            tracing::error!(error = %e, "Failed to reload passwords, keeping current entries");
            ReloadError::from(e)
        })
    }

    fn load(&self, file: Option<&Path>) -> Result<(), LoadError> {
        let path = configured_path(file, "password.file")?;
        let parsed = read_dataset(path, FORMAT, DATASET)?;
        let snapshot = PasswordSnapshot::from_records(parsed.records);

        tracing::info!(path = %path.display(), users = snapshot.len(), "Loaded passwords");
        metrics::record_snapshot_entries(DATASET, snapshot.len());

        // change reference
        self.snapshot.replace(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::digest::DigestAlgorithm;

    fn md5(s: &str) -> String {
        Digester::new(DigestAlgorithm::Md5).hex_digest(s)
    }

    fn password_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("passwords");
        let contents = format!(
            "# user1:{a}:true\n\
             user2:{a}\n\
             user3:{b}:true:extra\n\
             user4:null:true\n\
             user5:{c}:true\n\
             user6:{e}:false\n\
             user7::true\n\
             user8:null:false\n\
             user9:{c}:TRUE\n\
             user10:{c}:\n\
             user11::\n",
            a = md5("aaaaaa"),
            b = md5("bbbbbb"),
            c = md5("cccccc"),
            e = md5("eeeeee"),
        );
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn enabled_policy(dir: &tempfile::TempDir) -> PasswordPolicy {
        let policy = PasswordPolicy::new("md5").unwrap();
        let config = PasswordConfig {
            enabled: true,
            file: Some(password_file(dir)),
            ..Default::default()
        };
        policy.reload(&config).unwrap();
        policy
    }

    #[test]
    fn test_disabled_allows_everything() {
        let policy = PasswordPolicy::new("md5").unwrap();
        assert!(policy.check_password("userxxx", Some("xxxxxx")).is_ok());
        assert!(policy.check_password("useryyy", None).is_ok());
    }

    #[test]
    fn test_unknown_algorithm_fails_fast() {
        assert!(PasswordPolicy::new("whirlpool").is_err());
    }

    #[test]
    fn test_check_order() {
        let dir = tempfile::tempdir().unwrap();
        let policy = enabled_policy(&dir);

        let reason = |user: &str, pw: Option<&str>| policy.check_password(user, pw).unwrap_err().reason();

        assert_eq!(reason("usernotexists", Some("cccccc")), "user not recognized");
        assert_eq!(reason("user1", Some("aaaaaa")), "user not recognized"); // comment
        assert_eq!(reason("user2", None), "user not recognized"); // too few fields
        assert_eq!(reason("user3", Some("bbbbbb")), "user not recognized"); // too many fields
        assert_eq!(reason("user10", Some("wrong")), "user not recognized"); // truncated
        assert_eq!(reason("user11", None), "user not recognized");
        assert_eq!(reason("user4", None), "no password configured for user");
        assert_eq!(reason("user7", Some("x")), "no password configured for user");

        assert!(policy.check_password("user5", Some("cccccc")).is_ok());
        assert_eq!(reason("user5", Some("dddddd")), "password incorrect");
        assert_eq!(reason("user5", None), "no password supplied");
        assert_eq!(reason("user5", Some("")), "no password supplied");

        assert!(policy.check_password("user6", None).is_ok());
        assert!(policy.check_password("user6", Some("wrong")).is_ok());
        assert!(policy.check_password("user8", None).is_ok());
        assert!(policy.check_password("user9", Some("cccccc")).is_ok());
    }

    #[test]
    fn test_digest_sentinel_suffix() {
        let entry = PasswordEntry::from_fields("xnull", "true");
        assert_eq!(entry.digest, None);
        let entry = PasswordEntry::from_fields("abc", "yes");
        assert_eq!(entry.digest.as_deref(), Some("abc"));
        assert!(!entry.enabled);
    }

    #[test]
    fn test_enabled_without_file_fails_closed() {
        let policy = PasswordPolicy::new("md5").unwrap();
        let config = PasswordConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(policy.reload(&config).is_err());
        assert!(policy.check_password("user5", Some("cccccc")).is_err());
    }

    #[test]
    fn test_disable_clears_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let policy = enabled_policy(&dir);
        assert_eq!(policy.snapshot().len(), 6);

        policy.reload(&PasswordConfig::default()).unwrap();
        assert!(policy.snapshot().is_empty());
        assert!(policy.check_password("usernotexists", Some("cccccc")).is_ok());

        // re-enable with a broken path: stale credentials must not come back
        let config = PasswordConfig {
            enabled: true,
            file: Some(dir.path().join("missing")),
            ..Default::default()
        };
        assert!(policy.reload(&config).is_err());
        assert_eq!(
            policy.check_password("user5", Some("cccccc")).unwrap_err().reason(),
            "user not recognized"
        );
    }
}
