//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the backend pool from configuration
//! - Bring the pool in line with a reloaded backend list
//!
//! # Design Decisions
//! - Invalid or duplicate backend descriptors are skipped with a warning
//! - Reconciliation keeps liveness and in-flight counts of retained backends

use std::collections::HashSet;
use url::Url;

use crate::config::{BackendConfig, ProxyConfig};
use crate::load_balancer::{backend::Backend, pool::BackendPool};

/// Outcome of applying a backend list to a pool.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: usize,
    pub removed: usize,
    pub reweighted: usize,
    pub skipped: usize,
}

/// Create the pool described by `config`.
pub fn build_pool(config: &ProxyConfig) -> BackendPool {
    let pool = BackendPool::new(config.strategy_kind());
    let report = reconcile_backends(&pool, &config.backends);

    tracing::info!(
        strategy = %pool.strategy(),
        backends = report.added,
        skipped = report.skipped,
        "Backend pool initialized"
    );
    pool
}

/// Make the pool's backend set match `configs`.
///
/// Backends missing from `configs` are removed, new ones are appended in
/// order, and retained ones take the configured weight.
pub fn reconcile_backends(pool: &BackendPool, configs: &[BackendConfig]) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut desired: Vec<Backend> = Vec::with_capacity(configs.len());
    let mut seen: HashSet<Url> = HashSet::new();

    for config in configs {
        match Backend::parse(&config.url, config.alive, config.weight) {
            Ok(backend) if seen.insert(backend.url().clone()) => desired.push(backend),
            Ok(_) => {
                tracing::warn!(url = %config.url, "Skipping duplicate backend");
                report.skipped += 1;
            }
            Err(e) => {
                tracing::warn!(url = %config.url, error = %e, "Skipping invalid backend");
                report.skipped += 1;
            }
        }
    }

    for existing in pool.snapshot() {
        if !seen.contains(existing.url()) && pool.remove_backend(existing.url()) {
            report.removed += 1;
        }
    }

    for backend in desired {
        match pool.find(backend.url()) {
            Some(existing) => {
                if existing.weight() != backend.weight() {
                    tracing::info!(
                        backend = %existing.url(),
                        from = existing.weight(),
                        to = backend.weight(),
                        "Backend weight changed"
                    );
                    existing.set_weight(backend.weight());
                    report.reweighted += 1;
                }
            }
            None => {
                pool.add_backend(backend);
                report.added += 1;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_balancer::StrategyKind;

    fn backend(url: &str, weight: u32) -> BackendConfig {
        BackendConfig {
            url: url.into(),
            alive: true,
            weight,
        }
    }

    #[test]
    fn test_build_pool_skips_invalid_and_duplicates() {
        let config = ProxyConfig {
            strategy: "least-conn".into(),
            backends: vec![
                backend("http://127.0.0.1:5001", 1),
                backend("not a url", 1),
                backend("https://127.0.0.1:5443", 1),
                backend("http://127.0.0.1:5002", 2),
                backend("http://127.0.0.1:5001/", 1),
            ],
            ..ProxyConfig::default()
        };

        let pool = build_pool(&config);
        assert_eq!(pool.strategy(), StrategyKind::LeastConnections);
        let urls: Vec<String> = pool.status().into_iter().map(|s| s.url).collect();
        assert_eq!(urls, ["http://127.0.0.1:5001/", "http://127.0.0.1:5002/"]);
    }

    #[test]
    fn test_initial_liveness_from_config() {
        let config = ProxyConfig {
            backends: vec![BackendConfig {
                url: "http://127.0.0.1:5001".into(),
                alive: false,
                weight: 1,
            }],
            ..ProxyConfig::default()
        };
        let pool = build_pool(&config);
        assert!(!pool.snapshot()[0].is_alive());
    }

    #[test]
    fn test_reconcile_adds_removes_and_reweights() {
        let pool = BackendPool::new(StrategyKind::RoundRobin);
        reconcile_backends(
            &pool,
            &[backend("http://127.0.0.1:5001", 1), backend("http://127.0.0.1:5002", 1)],
        );
        let kept = pool.snapshot()[1].clone();
        kept.set_alive(false);
        let _guard = kept.track_connection();

        let report = reconcile_backends(
            &pool,
            &[backend("http://127.0.0.1:5002", 4), backend("http://127.0.0.1:5003", 1)],
        );
        assert_eq!(
            report,
            ReconcileReport {
                added: 1,
                removed: 1,
                reweighted: 1,
                skipped: 0
            }
        );

        let status = pool.status();
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].url, "http://127.0.0.1:5002/");
        assert_eq!(status[0].weight, 4);
        assert!(!status[0].alive);
        assert_eq!(status[0].current_connections, 1);
        assert_eq!(status[1].url, "http://127.0.0.1:5003/");
    }
}
