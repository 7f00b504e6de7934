//! Passive health checking (failure demotion).
//!
//! # Responsibilities
//! - Observe forward outcomes reported by the dispatcher
//! - Mark the backend dead on the first transport failure
//!
//! There is no threshold: the very next selection already excludes the
//! backend, and only the active checker can bring it back.

use crate::health::state::{self, Transition};
use crate::load_balancer::{backend::Backend, pool::BackendPool};
use crate::observability::metrics;

/// Demote `backend` after a failed forward.
///
/// Goes through the pool by URL so a backend removed mid-request is left alone.
/// Only an alive-to-dead change counts as a demotion.
pub fn demote(pool: &BackendPool, backend: &Backend, error: &dyn std::error::Error) -> Transition {
    tracing::warn!(backend = %backend.url(), error = %error, "Forward failed");

    let transition = match pool.find(backend.url()) {
        Some(registered) => state::apply(&registered, false, "forward failure"),
        None => Transition::Unchanged,
    };
    if transition == Transition::Died {
        metrics::record_demotion(backend.url().as_str());
    }
    transition
}
