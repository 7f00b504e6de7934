//! Backend pool management.
//!
//! # Responsibilities
//! - Own the ordered sequence of backends
//! - Serialize structural edits (add/remove) behind an exclusive lock
//! - Hand out cheap snapshots for routing and health checking
//! - Apply the configured load balancing strategy to select backends

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use url::Url;

use crate::load_balancer::{
    backend::{Backend, BackendStatus},
    error::{LbError, LbResult},
    LoadBalancer, Strategy, StrategyKind,
};

/// The concurrency-safe registry of backends plus the active strategy.
#[derive(Debug, Default)]
pub struct BackendPool {
    backends: RwLock<Vec<Arc<Backend>>>,
    strategy: Strategy,
}

impl BackendPool {
    /// Create an empty pool using the given strategy.
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            backends: RwLock::new(Vec::new()),
            strategy: Strategy::new(kind),
        }
    }

    pub fn strategy(&self) -> StrategyKind {
        self.strategy.kind()
    }

    // A panic while holding the lock cannot leave the Vec half-edited
    // (push/remove are not interrupted), so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<Backend>>> {
        self.backends.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Arc<Backend>>> {
        self.backends.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a backend. Duplicate URLs are not rejected here.
    pub fn add_backend(&self, backend: Backend) -> Arc<Backend> {
        let backend = Arc::new(backend);
        self.write().push(backend.clone());
        tracing::info!(backend = %backend.url(), "Backend added to pool");
        backend
    }

    /// Remove the first backend registered under `url`, keeping the order of
    /// the rest. Returns whether anything was removed.
    pub fn remove_backend(&self, url: &Url) -> bool {
        let mut backends = self.write();
        match backends.iter().position(|b| b.matches(url)) {
            Some(index) => {
                backends.remove(index);
                tracing::info!(backend = %url, "Backend removed from pool");
                true
            }
            None => false,
        }
    }

    /// Flip the liveness of the backend registered under `url`.
    ///
    /// Only the shared lock is taken: this is a flag write, not a structural
    /// change. Returns the previous liveness, or `None` if `url` is unknown.
    pub fn set_backend_status(&self, url: &Url, alive: bool) -> Option<bool> {
        self.find(url).map(|b| b.set_alive(alive))
    }

    /// Look up the first backend registered under `url`.
    pub fn find(&self, url: &Url) -> Option<Arc<Backend>> {
        self.read().iter().find(|b| b.matches(url)).cloned()
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.find(url).is_some()
    }

    /// Copy of the current backend sequence for a single routing decision.
    pub fn snapshot(&self) -> Vec<Arc<Backend>> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Select a backend using the pool's strategy.
    pub fn select(&self) -> LbResult<Arc<Backend>> {
        let backends = self.snapshot();
        if backends.is_empty() {
            return Err(LbError::NoBackendsAvailable);
        }
        self.strategy.next_server(&backends)
    }

    /// Status of every backend, in pool order.
    pub fn status(&self) -> Vec<BackendStatus> {
        self.read().iter().map(|b| b.status()).collect()
    }
}
