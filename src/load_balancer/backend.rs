//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track in-flight requests (for Least Connections LB)
//! - Hold the liveness flag written by health checks and demotion
//! - Hold the operator-assigned weight

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

use crate::load_balancer::error::{LbError, LbResult};

/// Weight assigned when a descriptor does not specify one.
pub const DEFAULT_WEIGHT: u32 = 1;

/// A single upstream server.
#[derive(Debug)]
pub struct Backend {
    /// Upstream base URL. Immutable after creation.
    url: Url,
    /// `host:port` used for reachability probes.
    authority: String,
    alive: AtomicBool,
    weight: AtomicU32,
    /// Number of requests currently routed to this backend.
    active_connections: AtomicUsize,
}

impl Backend {
    /// Create a backend from an already-validated URL.
    ///
    /// Fails with [`LbError::InvalidAddress`] unless the URL is `http` and
    /// carries a host. Upstream TLS is not supported.
    pub fn new(url: Url, alive: bool, weight: u32) -> LbResult<Self> {
        if url.scheme() != "http" {
            return Err(LbError::InvalidAddress(url.to_string()));
        }
        let host = url
            .host_str()
            .ok_or_else(|| LbError::InvalidAddress(url.to_string()))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| LbError::InvalidAddress(url.to_string()))?;
        let authority = format!("{}:{}", host, port);

        Ok(Self {
            url,
            authority,
            alive: AtomicBool::new(alive),
            weight: AtomicU32::new(weight),
            active_connections: AtomicUsize::new(0),
        })
    }

    /// Parse a backend descriptor such as `http://10.0.0.5:8080`.
    pub fn parse(address: &str, alive: bool, weight: u32) -> LbResult<Self> {
        let url = Url::parse(address.trim())
            .map_err(|_| LbError::InvalidAddress(address.to_string()))?;
        Self::new(url, alive, weight)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// `host:port` of the upstream.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// True if this backend is registered under `url`.
    pub fn matches(&self, url: &Url) -> bool {
        self.url == *url
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Set liveness and return the previous value.
    ///
    /// The swap is a single atomic step, so concurrent writers (health checks
    /// and demotion) resolve last-write-wins and each sees the value it replaced.
    pub fn set_alive(&self, alive: bool) -> bool {
        self.alive.swap(alive, Ordering::AcqRel)
    }

    pub fn weight(&self) -> u32 {
        self.weight.load(Ordering::Relaxed)
    }

    pub fn set_weight(&self, weight: u32) {
        self.weight.store(weight, Ordering::Relaxed);
    }

    /// Get the current number of in-flight requests.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Count a request against this backend until the guard is dropped.
    pub fn track_connection(self: &Arc<Self>) -> BackendConnectionGuard {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
        BackendConnectionGuard {
            backend: self.clone(),
        }
    }

    /// Point-in-time copy of the mutable fields.
    pub fn status(&self) -> BackendStatus {
        BackendStatus {
            url: self.url.to_string(),
            alive: self.is_alive(),
            weight: self.weight(),
            current_connections: self.active_connections(),
        }
    }
}

/// Serializable view of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub url: String,
    pub alive: bool,
    pub weight: u32,
    pub current_connections: usize,
}

/// A RAII guard that manages the in-flight connection count.
///
/// Every increment is paired with exactly one decrement, so the count can
/// never go negative and returns to zero once traffic stops.
#[derive(Debug)]
pub struct BackendConnectionGuard {
    backend: Arc<Backend>,
}

impl Drop for BackendConnectionGuard {
    fn drop(&mut self) {
        self.backend.active_connections.fetch_sub(1, Ordering::Relaxed);
    }
}
