//! Gatekeeper daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   admin API ─┐
//!   SIGHUP ────┼─▶ RefreshRegistry ─▶ policy.reload ─▶ loader + parser ─▶ SnapshotStore::replace
//!   watcher ───┘
//!
//!   request handlers ─▶ get_groups / check_access / check_password ─▶ SnapshotStore::read
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use gatekeeper::admin::{serve_admin, AdminState};
use gatekeeper::config::watcher::{watch_targets, DatasetWatcher};
use gatekeeper::config::{ConfigSource, FileConfigSource};
use gatekeeper::lifecycle::{Gatekeeper, Shutdown, SignalEvent, Signals};
use gatekeeper::observability::{logging, metrics};
use gatekeeper::refresh::RefreshRegistry;

#[derive(Parser)]
#[command(name = "gatekeeper")]
#[command(about = "Reloadable group, whitelist and password decision store", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "/etc/gatekeeper/gatekeeper.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let source = Arc::new(FileConfigSource::new(&args.config));
    let config = source.load()?;

    logging::init_tracing(&config.observability.log_level);
    tracing::info!(config = %args.config.display(), "gatekeeper v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        // validated by load_config
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let registry = Arc::new(RefreshRegistry::new());
    let service = Arc::new(Gatekeeper::init(source, registry.clone())?);
    let shutdown = Shutdown::new();

    let _watcher = if config.watch.enabled {
        let watcher = DatasetWatcher::new(
            watch_targets(&config),
            registry.clone(),
            Duration::from_secs(config.watch.poll_interval_secs),
        );
        match watcher.run() {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::error!(error = %e, "Failed to start dataset watcher");
                None
            }
        }
    } else {
        None
    };

    let admin_task = if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = AdminState::new(service.clone(), config.admin.api_key.as_str());
        let shutdown = shutdown.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = serve_admin(listener, state, &shutdown).await {
                tracing::error!(error = %e, "Admin API failed");
            }
        }))
    } else {
        None
    };

    let mut signals = Signals::new()?;
    loop {
        match signals.recv().await {
            SignalEvent::Reload => {
                tracing::info!("SIGHUP received, reloading all datasets");
                let service = service.clone();
                let responses = tokio::task::spawn_blocking(move || service.reload_all()).await?;
                for (identifier, response) in responses {
                    tracing::info!(identifier = %identifier, status = response.status, message = %response.message, "Reload result");
                }
            }
            SignalEvent::Shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    shutdown.trigger();
    if let Some(task) = admin_task {
        let _ = task.await;
    }
    service.shutdown();

    tracing::info!("Shutdown complete");
    Ok(())
}
