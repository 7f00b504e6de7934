//! Session affinity.
//!
//! # Data Flow
//! ```text
//! Request with proxy_session cookie
//!     → cookie.rs (extract token)
//!     → token.rs (derive token of each alive backend, compare)
//!     → hit: route to that backend, skip the strategy
//!     → miss: strategy selects, a fresh cookie is issued
//! ```
//!
//! # Design Decisions
//! - Nothing is stored server-side; the cookie is the only session state
//! - A missing, corrupt, unknown or dead binding falls through silently
//! - Tokens are a pure function of the backend URL

pub mod cookie;
pub mod token;

use axum::http::HeaderMap;
use std::sync::Arc;

use crate::load_balancer::{backend::Backend, pool::BackendPool};

pub use cookie::{affinity_cookie, read_affinity_cookie, COOKIE_NAME};
pub use token::affinity_token;

/// Resolve the backend a request's affinity cookie is bound to, if that
/// backend is still registered and alive.
pub fn affine_backend(pool: &BackendPool, headers: &HeaderMap) -> Option<Arc<Backend>> {
    let wanted = read_affinity_cookie(headers)?;
    if !token::is_well_formed(wanted) {
        tracing::debug!(cookie = %wanted, "Ignoring malformed affinity cookie");
        return None;
    }

    pool.snapshot()
        .into_iter()
        .filter(|b| b.is_alive())
        .find(|b| affinity_token(b.url()) == wanted)
}
