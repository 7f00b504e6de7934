//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so minimal files work.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::health::active::{DEFAULT_INTERVAL, DEFAULT_PROBE_TIMEOUT};
use crate::load_balancer::{backend::DEFAULT_WEIGHT, StrategyKind};

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Port the proxy listens on.
    pub port: u16,

    /// Interface the proxy binds to.
    pub bind_host: String,

    /// Selection strategy name.
    pub strategy: String,

    /// Health check interval as a duration string (e.g. "10s").
    pub health_check_frequency: String,

    /// Pin clients to backends with an affinity cookie.
    pub sticky: bool,

    /// Initial backend set.
    pub backends: Vec<BackendConfig>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Session affinity settings.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_host: "0.0.0.0".to_string(),
            strategy: StrategyKind::default().name().to_string(),
            health_check_frequency: "10s".to_string(),
            sticky: false,
            backends: Vec::new(),
            health_check: HealthCheckConfig::default(),
            session: SessionConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl ProxyConfig {
    /// Address the proxy listener binds to.
    pub fn bind_address(&self) -> String {
        if self.bind_host.contains(':') {
            format!("[{}]:{}", self.bind_host, self.port)
        } else {
            format!("{}:{}", self.bind_host, self.port)
        }
    }

    /// Configured strategy, round-robin if the name is not recognized.
    pub fn strategy_kind(&self) -> StrategyKind {
        StrategyKind::from_name_or_default(&self.strategy)
    }

    /// Health check interval, 10s if the string does not parse.
    pub fn health_check_interval(&self) -> Duration {
        match humantime::parse_duration(&self.health_check_frequency) {
            Ok(interval) if !interval.is_zero() => interval,
            Ok(_) => {
                tracing::warn!("Health check frequency must be positive, defaulting to 10s");
                DEFAULT_INTERVAL
            }
            Err(e) => {
                tracing::warn!(
                    value = %self.health_check_frequency,
                    error = %e,
                    "Invalid health check frequency, defaulting to 10s"
                );
                DEFAULT_INTERVAL
            }
        }
    }
}

/// Backend server descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend URL (e.g., "http://127.0.0.1:3000").
    pub url: String,

    /// Initial liveness (default: true).
    #[serde(default = "default_alive")]
    pub alive: bool,

    /// Weight for weighted load balancing (default: 1).
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alive: default_alive(),
            weight: default_weight(),
        }
    }
}

fn default_alive() -> bool {
    true
}

fn default_weight() -> u32 {
    DEFAULT_WEIGHT
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// TCP connect timeout per probe, in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl HealthCheckConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Session affinity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Max-Age of the affinity cookie in seconds.
    pub cookie_max_age_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_max_age_secs: 3600,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upper bound for a full forward round trip, in seconds.
    pub forward_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { forward_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// Admin API bind address.
    pub bind_address: String,

    /// Bearer token required by the admin API, if set.
    pub api_key: Option<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8081".to_string(),
            api_key: None,
        }
    }
}
