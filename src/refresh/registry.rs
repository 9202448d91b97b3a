//! Refresh callback registry.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::observability::metrics;
use crate::policy::ReloadError;
use crate::refresh::response::RefreshResponse;

/// Failure of a refresh callback.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Configuration unavailable: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Reload(#[from] ReloadError),
}

/// A reload routine invoked with the command's arguments.
pub type RefreshCallback = Arc<dyn Fn(&[String]) -> Result<(), RefreshError> + Send + Sync>;

struct Registration {
    callback: RefreshCallback,
    /// Serializes runs of this identifier; survives re-registration.
    gate: Arc<Mutex<()>>,
}

/// Maps refresh identifiers to reload callbacks.
#[derive(Default)]
pub struct RefreshRegistry {
    handlers: DashMap<String, Arc<Registration>>,
}

impl RefreshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `identifier`, replacing any previous one.
    pub fn register<F>(&self, identifier: impl Into<String>, callback: F)
    where
        F: Fn(&[String]) -> Result<(), RefreshError> + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        let callback: RefreshCallback = Arc::new(callback);

        tracing::debug!(identifier = %identifier, "Registering refresh handler");
        // Gate lookup and insert happen under one shard lock.
        match self.handlers.entry(identifier) {
            Entry::Occupied(mut entry) => {
                let gate = entry.get().gate.clone();
                entry.insert(Arc::new(Registration { callback, gate }));
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Registration {
                    callback,
                    gate: Arc::default(),
                }));
            }
        }
    }

    /// Remove the handler for `identifier`. Returns whether one existed.
    pub fn unregister(&self, identifier: &str) -> bool {
        self.handlers.remove(identifier).is_some()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.handlers.contains_key(identifier)
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.handlers.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Run the handler registered under `identifier`.
    ///
    /// Blocks while another run of the same identifier is in progress.
    pub fn dispatch(&self, identifier: &str, args: &[String]) -> RefreshResponse {
        // Clone out of the map so no shard lock is held while reloading.
        let registration = match self.handlers.get(identifier) {
            Some(entry) => entry.value().clone(),
            None => {
                tracing::warn!(identifier, "Refresh requested for unknown identifier");
                let response = RefreshResponse::unknown_identifier(identifier);
                metrics::record_refresh_command(identifier, false, response.status);
                return response;
            }
        };

        let response = {
            let _running = registration
                .gate
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            tracing::info!(identifier, args = ?args, "Refresh started");
            match catch_unwind(AssertUnwindSafe(|| (registration.callback)(args))) {
                Ok(Ok(())) => RefreshResponse::success(),
                Ok(Err(e)) => {
                    tracing::error!(identifier, error = %e, "Refresh failed");
                    RefreshResponse::failure(format!("Refresh failed: {}", e))
                }
                Err(panic) => {
                    let msg = panic_message(panic.as_ref());
                    tracing::error!(identifier, panic = %msg, "Refresh handler panicked");
                    RefreshResponse::failure(format!("Refresh failed: {}", msg))
                }
            }
        };

        tracing::info!(identifier, status = response.status, "Refresh finished");
        metrics::record_refresh_command(identifier, true, response.status);
        response
    }
}

impl std::fmt::Debug for RefreshRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshRegistry")
            .field("identifiers", &self.identifiers())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
