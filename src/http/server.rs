//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Spawn active health monitoring alongside the listener
//! - Stop both on the shutdown signal

use axum::{routing::any, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::health::active::HealthMonitor;
use crate::http::dispatch::dispatch;
use crate::http::forward::{Forwarder, HyperForwarder};
use crate::http::request::MakeRequestUuidV4;
use crate::lifecycle::shutdown;
use crate::lifecycle::startup::build_pool;
use crate::load_balancer::pool::BackendPool;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<BackendPool>,
    pub forwarder: Arc<dyn Forwarder>,
    pub sticky: bool,
    pub cookie_max_age_secs: u64,
}

impl AppState {
    pub fn new(
        pool: Arc<BackendPool>,
        forwarder: Arc<dyn Forwarder>,
        sticky: bool,
        cookie_max_age_secs: u64,
    ) -> Self {
        Self {
            pool,
            forwarder,
            sticky,
            cookie_max_age_secs,
        }
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/{*path}", any(dispatch))
        .route("/", any(dispatch))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
}

/// HTTP server for the load balancer.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    pool: Arc<BackendPool>,
}

impl HttpServer {
    /// Create a server whose pool and forwarder come from `config`.
    pub fn new(config: ProxyConfig) -> Self {
        let pool = Arc::new(build_pool(&config));
        let forwarder = Arc::new(HyperForwarder::new(Duration::from_secs(
            config.timeouts.forward_secs,
        )));
        Self::with_parts(config, pool, forwarder)
    }

    /// Create a server around an existing pool and forwarder.
    fn with_parts(
        config: ProxyConfig,
        pool: Arc<BackendPool>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Self {
        let state = AppState::new(
            pool.clone(),
            forwarder,
            config.sticky,
            config.session.cookie_max_age_secs,
        );
        let router = build_router(state);
        Self {
            router,
            config,
            pool,
        }
    }

    /// Shared handle to the backend pool (for the admin API and reloads).
    pub fn pool(&self) -> Arc<BackendPool> {
        self.pool.clone()
    }

    /// Run the server, accepting connections on the given listener, until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            strategy = %self.pool.strategy(),
            sticky = self.config.sticky,
            "HTTP server starting"
        );

        if self.config.health_check.enabled {
            let monitor = HealthMonitor::new(
                self.pool.clone(),
                self.config.health_check_interval(),
                self.config.health_check.probe_timeout(),
            );
            tokio::spawn(monitor.run(shutdown.resubscribe()));
        } else {
            tracing::info!("Active health checks disabled");
        }

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
