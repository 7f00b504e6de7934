//! Weighted round-robin load balancing strategy.
//!
//! The shared counter is reduced into the total weight of the alive backends,
//! then the backends are walked in order subtracting weights until the
//! offset drops below zero. Over `total_weight` consecutive calls each alive
//! backend is chosen exactly `weight` times, without building a weighted list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::load_balancer::{
    backend::Backend,
    error::{LbError, LbResult},
    LoadBalancer,
};

/// Weighted round-robin selector.
#[derive(Debug, Default)]
pub struct WeightedRoundRobin {
    counter: AtomicU64,
}

impl WeightedRoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for WeightedRoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>]) -> LbResult<Arc<Backend>> {
        // Weights are read once so a concurrent weight change cannot make the
        // walk disagree with the total.
        let alive: Vec<(&Arc<Backend>, u64)> = backends
            .iter()
            .filter(|b| b.is_alive())
            .map(|b| (b, u64::from(b.weight())))
            .collect();

        let total_weight: u64 = alive.iter().map(|(_, w)| w).sum();
        if total_weight == 0 {
            return Err(LbError::NoHealthyBackend);
        }

        // Advanced before use, like the round-robin cursor.
        let mut target = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1) % total_weight;
        for (backend, weight) in alive {
            if target < weight {
                return Ok(backend.clone());
            }
            target -= weight;
        }
        Err(LbError::NoHealthyBackend)
    }
}
