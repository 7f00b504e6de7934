//! Backend liveness transitions.
//!
//! # States
//! - Alive: backend is eligible for selection
//! - Dead: backend is excluded from selection but stays registered
//!
//! # State Transitions
//! ```text
//! Alive → Dead: failed probe, or failed forward (demotion)
//! Dead → Alive: successful probe only
//! ```
//!
//! Writers are last-write-wins on the flag. Only real changes are logged.

use crate::load_balancer::backend::Backend;
use crate::observability::metrics;

/// What a liveness write did to the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Revived,
    Died,
    Unchanged,
}

impl Transition {
    pub fn between(was_alive: bool, now_alive: bool) -> Self {
        match (was_alive, now_alive) {
            (false, true) => Transition::Revived,
            (true, false) => Transition::Died,
            _ => Transition::Unchanged,
        }
    }

    pub fn is_change(&self) -> bool {
        *self != Transition::Unchanged
    }
}

/// Write `alive` to the backend, logging and recording the change if any.
pub fn apply(backend: &Backend, alive: bool, cause: &str) -> Transition {
    let transition = Transition::between(backend.set_alive(alive), alive);
    match transition {
        Transition::Revived => {
            tracing::info!(backend = %backend.url(), cause, "Backend is now alive");
        }
        Transition::Died => {
            tracing::warn!(backend = %backend.url(), cause, "Backend is now dead");
        }
        Transition::Unchanged => {}
    }
    metrics::record_backend_health(backend.url().as_str(), alive);
    transition
}
