//! Administrative HTTP surface.
//!
//! Served on its own listener so it can stay bound to loopback while the
//! proxy listens publicly.
//!
//! | Route | Effect |
//! |---|---|
//! | `GET /admin/status` | strategy, sticky flag, per-backend status |
//! | `POST /admin/backends` | register `{url, weight?}`, starts alive |
//! | `DELETE /admin/backends` | unregister `{url}` |

pub mod auth;
pub mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::config::AdminConfig;
use crate::lifecycle::shutdown;
use crate::load_balancer::pool::BackendPool;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub pool: Arc<BackendPool>,
    pub sticky: bool,
    pub api_key: Option<Arc<str>>,
}

impl AdminState {
    pub fn new(pool: Arc<BackendPool>, sticky: bool, config: &AdminConfig) -> Self {
        Self {
            pool,
            sticky,
            api_key: config.api_key.as_deref().map(Arc::from),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/backends", post(add_backend).delete(remove_backend))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

/// Serve the admin router until `shutdown` fires.
pub async fn serve(
    state: AdminState,
    listener: TcpListener,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    if state.api_key.is_none() {
        tracing::warn!(address = %addr, "Admin API has no api_key; it is unauthenticated");
    }
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(shutdown::wait(shutdown))
        .await
}
