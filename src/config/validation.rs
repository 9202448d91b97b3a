//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate bind addresses and intervals
//! - Check the digest algorithm can be built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Missing dataset paths are not errors here; reload reports them and
//!   keeps the previous snapshot

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::policy::digest::DigestAlgorithm;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("admin.api_key must not be empty when the admin API is enabled")]
    EmptyApiKey,

    #[error("password.digest_algorithm: unsupported algorithm {0:?}")]
    UnsupportedDigest(String),

    #[error("watch.poll_interval_secs must be greater than zero")]
    ZeroPollInterval,
}

/// Check a deserialized configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.admin.enabled {
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field: "admin.bind_address",
                value: config.admin.bind_address.clone(),
            });
        }
        if config.admin.api_key.trim().is_empty() {
            errors.push(ValidationError::EmptyApiKey);
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.password.digest_algorithm.parse::<DigestAlgorithm>().is_err() {
        errors.push(ValidationError::UnsupportedDigest(
            config.password.digest_algorithm.clone(),
        ));
    }

    if config.watch.enabled && config.watch.poll_interval_secs == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
