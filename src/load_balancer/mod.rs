//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Request dispatched
//!     → pool.rs (snapshot the registered backends)
//!     → Apply the configured strategy:
//!         - round_robin.rs (rotate through alive backends)
//!         - least_conn.rs (pick alive backend with fewest in-flight requests)
//!         - weighted.rs (rotate in proportion to weight)
//!     → backend.rs (connection guard tracks the in-flight request)
//!     → Return backend or LbError
//! ```
//!
//! # Design Decisions
//! - Strategies hold only their rotation counter; the pool owns the backends
//! - One strategy per pool, chosen at startup
//! - Dead backends are never returned
//! - Empty and all-dead inputs are the same failure for every strategy

pub mod backend;
pub mod error;
pub mod least_conn;
pub mod pool;
pub mod round_robin;
pub mod weighted;

use std::fmt;
use std::sync::Arc;

use self::backend::Backend;
use self::error::LbResult;
use self::least_conn::LeastConnections;
use self::round_robin::RoundRobin;
use self::weighted::WeightedRoundRobin;

/// Select one alive backend from an ordered sequence.
pub trait LoadBalancer: Send + Sync {
    fn next_server(&self, backends: &[Arc<Backend>]) -> LbResult<Arc<Backend>>;
}

/// Strategy names accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    #[default]
    RoundRobin,
    LeastConnections,
    WeightedRoundRobin,
}

impl StrategyKind {
    /// Parse a configured strategy name, `None` if unrecognized.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "round-robin" => Some(Self::RoundRobin),
            "least-conn" => Some(Self::LeastConnections),
            "weighted-round-robin" => Some(Self::WeightedRoundRobin),
            _ => None,
        }
    }

    /// Parse a configured strategy name, falling back to round-robin.
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!(strategy = %name, "Unknown strategy, defaulting to round-robin");
            Self::default()
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::RoundRobin => "round-robin",
            Self::LeastConnections => "least-conn",
            Self::WeightedRoundRobin => "weighted-round-robin",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The active selection strategy of a pool.
#[derive(Debug)]
pub enum Strategy {
    RoundRobin(RoundRobin),
    LeastConnections(LeastConnections),
    WeightedRoundRobin(WeightedRoundRobin),
}

impl Strategy {
    pub fn new(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::RoundRobin => Self::RoundRobin(RoundRobin::new()),
            StrategyKind::LeastConnections => Self::LeastConnections(LeastConnections::new()),
            StrategyKind::WeightedRoundRobin => Self::WeightedRoundRobin(WeightedRoundRobin::new()),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::RoundRobin(_) => StrategyKind::RoundRobin,
            Self::LeastConnections(_) => StrategyKind::LeastConnections,
            Self::WeightedRoundRobin(_) => StrategyKind::WeightedRoundRobin,
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::new(StrategyKind::default())
    }
}

impl LoadBalancer for Strategy {
    fn next_server(&self, backends: &[Arc<Backend>]) -> LbResult<Arc<Backend>> {
        match self {
            Self::RoundRobin(lb) => lb.next_server(backends),
            Self::LeastConnections(lb) => lb.next_server(backends),
            Self::WeightedRoundRobin(lb) => lb.next_server(backends),
        }
    }
}
