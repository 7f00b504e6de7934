//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Problems that have a documented fallback (unknown strategy, bad interval,
//!   bad backend URL) are warnings at startup, not validation errors

use std::net::{IpAddr, SocketAddr};
use thiserror::Error;

use crate::config::schema::ProxyConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("bind_host '{0}' is not an IP address")]
    BindHost(String),

    #[error("{field} '{value}' is not a socket address")]
    SocketAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.bind_host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::BindHost(config.bind_host.clone()));
    }

    if config.admin.enabled && config.admin.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::SocketAddress {
            field: "admin.bind_address",
            value: config.admin.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::SocketAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.health_check.probe_timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("health_check.probe_timeout_ms"));
    }

    if config.timeouts.forward_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.forward_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
