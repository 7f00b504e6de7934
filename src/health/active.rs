//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend with a TCP connect
//! - Update backend liveness based on results
//!
//! Probes do not go through the forwarder. This loop is the only way a dead
//! backend comes back.

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::health::state::{self, Transition};
use crate::load_balancer::{backend::Backend, pool::BackendPool};

/// Probe interval used when the configured one is unusable.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Connect timeout for a single probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub struct HealthMonitor {
    pool: Arc<BackendPool>,
    interval: Duration,
    probe_timeout: Duration,
}

impl HealthMonitor {
    pub fn new(pool: Arc<BackendPool>, interval: Duration, probe_timeout: Duration) -> Self {
        Self {
            pool,
            interval,
            probe_timeout,
        }
    }

    /// Run until the shutdown signal fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval = ?self.interval,
            probe_timeout = ?self.probe_timeout,
            "Health monitor starting"
        );

        // The first tick of `interval_at` fires one period from now, so
        // configured liveness holds until the first real check.
        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every backend once, concurrently, and apply the results.
    ///
    /// Returns the number of liveness changes.
    pub async fn check_all(&self) -> usize {
        let backends = self.pool.snapshot();
        let probes = backends.iter().map(|b| self.check(b));
        join_all(probes)
            .await
            .into_iter()
            .filter(Transition::is_change)
            .count()
    }

    async fn check(&self, backend: &Arc<Backend>) -> Transition {
        let alive = probe(backend.authority(), self.probe_timeout).await;
        state::apply(backend, alive, "health check")
    }
}

/// Attempt a TCP connection to `authority` within `timeout`.
pub async fn probe(authority: &str, timeout: Duration) -> bool {
    match time::timeout(timeout, TcpStream::connect(authority)).await {
        Ok(Ok(_stream)) => true,
        Ok(Err(e)) => {
            tracing::debug!(addr = %authority, error = %e, "Health probe failed: connection error");
            false
        }
        Err(_) => {
            tracing::debug!(addr = %authority, "Health probe failed: timeout");
            false
        }
    }
}
