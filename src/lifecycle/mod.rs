//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build policies → Initial dataset load → Register refresh handlers
//!
//! Signals (signals.rs):
//!     SIGHUP → reload every dataset
//!     SIGTERM/SIGINT → trigger graceful shutdown
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop admin API → Unregister handlers → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then policies, then listeners
//! - The service object is explicitly owned; there are no global instances

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{SignalEvent, Signals};
pub use startup::{Gatekeeper, StartupError, StatusReport};
