//! Administrative HTTP surface.
//!
//! # Routes
//! - `GET  /admin/status`: snapshot summary
//! - `GET  /admin/refresh`: registered refresh identifiers
//! - `POST /admin/refresh/{identifier}`: run a refresh command
//! - `GET  /admin/groups/{user}`: groups of a user
//!
//! All routes require `Authorization: Bearer <api_key>`.

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::lifecycle::{Gatekeeper, Shutdown};
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub service: Arc<Gatekeeper>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(service: Arc<Gatekeeper>, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            service,
            api_key: api_key.into(),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/refresh", get(list_identifiers))
        .route("/admin/refresh/{identifier}", post(post_refresh))
        .route("/admin/groups/{user}", get(get_groups))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API until `shutdown` is triggered.
pub async fn serve_admin(listener: TcpListener, state: AdminState, shutdown: &Shutdown) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(shutdown.signalled())
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
