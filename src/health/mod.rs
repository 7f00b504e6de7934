//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → TCP connect to each backend
//!     → state.rs (set alive/dead)
//!
//! Passive health checks (passive.rs):
//!     Forward failure observed by the dispatcher
//!     → state.rs (set dead immediately)
//! ```
//!
//! # Design Decisions
//! - Active and passive checks are complementary
//! - Demotion is immediate, revival waits for the next probe
//! - Health state is per-backend, not per-pool

pub mod active;
pub mod passive;
pub mod state;

pub use active::HealthMonitor;
