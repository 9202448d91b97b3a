//! Snapshot storage subsystem.
//!
//! # Data Flow
//! ```text
//! Reload path (single writer):
//!     dataset file on disk
//!     → loader.rs (read whole file, abort on I/O or UTF-8 failure)
//!     → parser.rs (per-line records, invalid lines skipped)
//!     → policy snapshot builder (immutable structure)
//!     → snapshot.rs replace() (one atomic pointer swap)
//!
//! Read path (many readers):
//!     snapshot.rs read() → immutable snapshot → in-memory lookup
//! ```
//!
//! # Design Decisions
//! - Snapshots are never mutated after publication; a reload builds a new one
//! - A bad line is skipped, a bad file aborts the reload and keeps the old snapshot
//! - Readers take no locks and do no I/O

pub mod loader;
pub mod parser;
pub mod snapshot;

pub use loader::{configured_path, read_dataset, LoadError};
pub use parser::{parse, InvalidLine, LineFormat, Parsed, Record};
pub use snapshot::SnapshotStore;
