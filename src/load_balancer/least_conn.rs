//! Least Connections load balancing strategy.

use std::sync::Arc;

use crate::load_balancer::{
    backend::Backend,
    error::{LbError, LbResult},
    LoadBalancer,
};

/// Least connections selector.
/// Selects the alive backend with the minimum number of in-flight requests.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self
    }
}

impl LoadBalancer for LeastConnections {
    fn next_server(&self, backends: &[Arc<Backend>]) -> LbResult<Arc<Backend>> {
        // min_by_key keeps the first of equal minimums, so ties go to the
        // earliest alive backend in pool order.
        backends
            .iter()
            .filter(|b| b.is_alive())
            .min_by_key(|b| b.active_connections())
            .cloned()
            .ok_or(LbError::NoHealthyBackend)
    }
}
