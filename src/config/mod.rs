//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! On every refresh command:
//!     ConfigSource::load() re-reads the file
//!     → the policy's section (enable flag, dataset paths)
//!     → policy reload
//!
//! On dataset file change (optional):
//!     watcher.rs detects change → refresh dispatch
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError, ConfigSource, FileConfigSource};
pub use schema::{
    AdminConfig, GroupsConfig, ObservabilityConfig, PasswordConfig, ServiceConfig, WatchConfig,
    WhitelistConfig,
};
pub use validation::{validate_config, ValidationError};
