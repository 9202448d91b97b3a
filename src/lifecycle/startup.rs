//! Service construction and lifecycle.
//!
//! # Responsibilities
//! - Load configuration and build the three policies
//! - Run the initial load of every dataset
//! - Register one refresh callback per policy
//! - Unregister them on shutdown
//!
//! # Design Decisions
//! - Fail fast: an unreadable config or unusable digest algorithm is fatal
//! - Dataset load failures at startup are logged only; policies start empty
//! - Policies are plain values owned here, so tests can run many instances

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ConfigError, ConfigSource, ServiceConfig};
use crate::policy::{DigestAlgorithm, DigestUnavailable, GroupMapping, IpWhitelist, PasswordPolicy};
use crate::refresh::{
    RefreshRegistry, RefreshResponse, REFRESH_PASSWORD, REFRESH_USER_GROUPS, REFRESH_WHITE_LIST,
};

/// Fatal startup failure.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Password policy unavailable: {0}")]
    Digest(#[from] DigestUnavailable),
}

/// Point-in-time view of the published snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub version: &'static str,
    pub group_users: usize,
    pub whitelist_enabled: bool,
    pub fixed_addresses: usize,
    pub variable_addresses: usize,
    pub password_enabled: bool,
    pub password_users: usize,
    pub refresh_identifiers: Vec<String>,
}

/// The hosted security decision store.
pub struct Gatekeeper {
    groups: Arc<GroupMapping>,
    whitelist: Arc<IpWhitelist>,
    passwords: Arc<PasswordPolicy>,
    registry: Arc<RefreshRegistry>,
    source: Arc<dyn ConfigSource>,
}

impl Gatekeeper {
    /// Build the policies, load their datasets and register refresh handlers.
    pub fn init(source: Arc<dyn ConfigSource>, registry: Arc<RefreshRegistry>) -> Result<Self, StartupError> {
        let config = source.load()?;
        let passwords = PasswordPolicy::new(&config.password.digest_algorithm)?;

        let service = Self {
            groups: Arc::new(GroupMapping::new()),
            whitelist: Arc::new(IpWhitelist::new()),
            passwords: Arc::new(passwords),
            registry,
            source,
        };

        service.initial_load(&config);
        service.register_handlers();

        tracing::info!(identifiers = ?service.registry.identifiers(), "Gatekeeper initialized");
        Ok(service)
    }

    fn initial_load(&self, config: &ServiceConfig) {
        // Failures are already logged by the policies.
        let _ = self.groups.reload(&config.groups);
        let _ = self.whitelist.reload(&config.whitelist);
        let _ = self.passwords.reload(&config.password);
    }

    fn register_handlers(&self) {
        let (groups, source) = (self.groups.clone(), self.source.clone());
        self.registry.register(REFRESH_USER_GROUPS, move |_: &[String]| {
            let config = source.load()?;
            groups.reload(&config.groups)?;
            Ok(())
        });

        let (whitelist, source) = (self.whitelist.clone(), self.source.clone());
        self.registry.register(REFRESH_WHITE_LIST, move |_: &[String]| {
            let config = source.load()?;
            whitelist.reload(&config.whitelist)?;
            Ok(())
        });

        let (passwords, source) = (self.passwords.clone(), self.source.clone());
        self.registry.register(REFRESH_PASSWORD, move |_: &[String]| {
            let config = source.load()?;
            if config.password.digest_algorithm.parse::<DigestAlgorithm>().ok()
                != Some(passwords.digester().algorithm())
            {
                tracing::warn!(
                    configured = %config.password.digest_algorithm,
                    "Digest algorithm changes take effect on restart only"
                );
            }
            passwords.reload(&config.password)?;
            Ok(())
        });
    }

    /// Dispatch every registered refresh identifier.
    pub fn reload_all(&self) -> Vec<(String, RefreshResponse)> {
        self.registry
            .identifiers()
            .into_iter()
            .map(|id| {
                let response = self.registry.dispatch(&id, &[]);
                (id, response)
            })
            .collect()
    }

    /// Unregister the refresh handlers owned by this service.
    pub fn shutdown(&self) {
        for id in [REFRESH_USER_GROUPS, REFRESH_WHITE_LIST, REFRESH_PASSWORD] {
            self.registry.unregister(id);
        }
        tracing::info!("Gatekeeper refresh handlers unregistered");
    }

    pub fn groups(&self) -> &Arc<GroupMapping> {
        &self.groups
    }

    pub fn whitelist(&self) -> &Arc<IpWhitelist> {
        &self.whitelist
    }

    pub fn passwords(&self) -> &Arc<PasswordPolicy> {
        &self.passwords
    }

    pub fn registry(&self) -> &Arc<RefreshRegistry> {
        &self.registry
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            version: env!("CARGO_PKG_VERSION"),
            group_users: self.groups.snapshot().len(),
            whitelist_enabled: self.whitelist.is_enabled(),
            fixed_addresses: self.whitelist.fixed_snapshot().len(),
            variable_addresses: self.whitelist.variable_snapshot().len(),
            password_enabled: self.passwords.is_enabled(),
            password_users: self.passwords.snapshot().len(),
            refresh_identifiers: self.registry.identifiers(),
        }
    }
}
