//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration for the gatekeeper service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    /// User to group mapping.
    pub groups: GroupsConfig,

    /// IP address whitelisting.
    pub whitelist: WhitelistConfig,

    /// Password authentication.
    pub password: PasswordConfig,

    /// Administrative HTTP surface.
    pub admin: AdminConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Dataset file watching.
    pub watch: WatchConfig,
}

/// Group mapping configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GroupsConfig {
    /// Mapping file, one `user=group1,group2` per line.
    pub file: Option<PathBuf>,
}

/// Whitelist configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct WhitelistConfig {
    /// Enforce the whitelist. Disabled means every check passes.
    pub enabled: bool,

    /// Addresses trusted for any user, one per line.
    pub fixed_file: Option<PathBuf>,

    /// Per-address users, one `address:user1,user2` per line.
    pub variable_file: Option<PathBuf>,
}

/// Password configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PasswordConfig {
    /// Enforce password checks. Disabled means every check passes.
    pub enabled: bool,

    /// Password file, one `user:digest:enabled` per line.
    pub file: Option<PathBuf>,

    /// Digest algorithm of the stored digests.
    pub digest_algorithm: String,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            file: None,
            digest_algorithm: "md5".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // WARNING: This is a placeholder! Change this in production.
            api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            bind_address: "127.0.0.1:8181".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9181".to_string(),
        }
    }
}

/// Dataset watcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WatchConfig {
    /// Reload a dataset when its file changes.
    pub enabled: bool,

    /// Poll interval for backends that poll.
    pub poll_interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            poll_interval_secs: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert!(!config.whitelist.enabled);
        assert!(!config.password.enabled);
        assert_eq!(config.password.digest_algorithm, "md5");
    }

    #[test]
    fn test_full_config() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [groups]
            file = "/etc/gatekeeper/groups"

            [whitelist]
            enabled = true
            fixed_file = "/etc/gatekeeper/fixed"
            variable_file = "/etc/gatekeeper/variable"

            [password]
            enabled = true
            file = "/etc/gatekeeper/passwords"

            [watch]
            enabled = true
            "#,
        )
        .unwrap();

        assert!(config.whitelist.enabled);
        assert_eq!(config.groups.file, Some(PathBuf::from("/etc/gatekeeper/groups")));
        assert_eq!(config.password.file, Some(PathBuf::from("/etc/gatekeeper/passwords")));
        assert_eq!(config.watch.poll_interval_secs, 2);
    }
}
