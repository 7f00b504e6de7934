//! Load balancer error types.

use thiserror::Error;

/// Errors produced while registering or selecting backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LbError {
    /// The pool has no registered backends at all.
    #[error("no backends available")]
    NoBackendsAvailable,

    /// Backends are registered but none can take traffic.
    #[error("no healthy backend available")]
    NoHealthyBackend,

    /// A backend descriptor could not be parsed as an upstream address.
    #[error("invalid backend address '{0}'")]
    InvalidAddress(String),
}

/// Result type for load balancer operations.
pub type LbResult<T> = Result<T, LbError>;
