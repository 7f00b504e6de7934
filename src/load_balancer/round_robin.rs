//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::load_balancer::{
    backend::Backend,
    error::{LbError, LbResult},
    LoadBalancer,
};

/// Round-robin selector.
/// Stores an internal counter to rotate through backends.
#[derive(Debug, Default)]
pub struct RoundRobin {
    counter: AtomicUsize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LoadBalancer for RoundRobin {
    fn next_server(&self, backends: &[Arc<Backend>]) -> LbResult<Arc<Backend>> {
        if backends.is_empty() {
            return Err(LbError::NoHealthyBackend);
        }

        // Each caller claims its own starting offset before scanning, so
        // concurrent requests fan out without holding a lock across the scan.
        // The cursor is advanced before use: the first pick is index 1.
        let start = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        let len = backends.len();

        for i in 0..len {
            let backend = &backends[start.wrapping_add(i) % len];
            if backend.is_alive() {
                return Ok(backend.clone());
            }
        }
        Err(LbError::NoHealthyBackend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(port: u16, alive: bool) -> Arc<Backend> {
        Arc::new(Backend::parse(&format!("http://127.0.0.1:{port}"), alive, 1).unwrap())
    }

    #[test]
    fn test_round_robin() {
        let lb = RoundRobin::new();
        let b1 = backend(8080, true);
        let b2 = backend(8081, true);
        let backends = vec![b1.clone(), b2.clone()];

        let s1 = lb.next_server(&backends).unwrap();
        assert_eq!(s1.url(), b2.url());

        let s2 = lb.next_server(&backends).unwrap();
        assert_eq!(s2.url(), b1.url());

        let s3 = lb.next_server(&backends).unwrap();
        assert_eq!(s3.url(), b2.url());
    }

    #[test]
    fn test_rotation_starts_after_first_backend() {
        let lb = RoundRobin::new();
        let backends = vec![backend(8000, true), backend(8001, true), backend(8002, true)];

        let order: Vec<String> = (0..4)
            .map(|_| lb.next_server(&backends).unwrap().authority().to_string())
            .collect();
        assert_eq!(
            order,
            ["127.0.0.1:8001", "127.0.0.1:8002", "127.0.0.1:8000", "127.0.0.1:8001"]
        );
    }

    #[test]
    fn test_skips_dead_backends() {
        let lb = RoundRobin::new();
        let backends = vec![backend(8080, false), backend(8081, true), backend(8082, false)];

        for _ in 0..6 {
            assert_eq!(lb.next_server(&backends).unwrap().authority(), "127.0.0.1:8081");
        }
    }

    #[test]
    fn test_no_alive_backend() {
        let lb = RoundRobin::new();
        assert_eq!(lb.next_server(&[]).unwrap_err(), LbError::NoHealthyBackend);

        let backends = vec![backend(8080, false), backend(8081, false)];
        assert_eq!(lb.next_server(&backends).unwrap_err(), LbError::NoHealthyBackend);
    }

    #[test]
    fn test_revived_backend_is_eligible_immediately() {
        let lb = RoundRobin::new();
        let b1 = backend(8080, false);
        let backends = vec![b1.clone()];
        assert!(lb.next_server(&backends).is_err());

        b1.set_alive(true);
        assert_eq!(lb.next_server(&backends).unwrap().url(), b1.url());
    }
}
