//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Reload path produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (reload outcomes, snapshot sizes, invalid lines)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - The query path emits nothing: it must stay lock and allocation free
//! - Metrics are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
