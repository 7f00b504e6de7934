//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_requests_total` (counter): requests by method, status, backend
//! - `lb_request_duration_seconds` (histogram): dispatch latency
//! - `lb_backend_alive` (gauge): 1=alive, 0=dead
//! - `lb_backend_demotions_total` (counter): forward-failure demotions
//! - `lb_affinity_hits_total` (counter): requests routed by cookie
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter, serving scrapes on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, backend: &str, start: Instant) {
    metrics::counter!(
        "lb_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
    metrics::histogram!("lb_request_duration_seconds", "backend" => backend.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_backend_health(backend: &str, alive: bool) {
    metrics::gauge!("lb_backend_alive", "backend" => backend.to_string())
        .set(if alive { 1.0 } else { 0.0 });
}

pub fn record_demotion(backend: &str) {
    metrics::counter!("lb_backend_demotions_total", "backend" => backend.to_string()).increment(1);
}

pub fn record_affinity_hit() {
    metrics::counter!("lb_affinity_hits_total").increment(1);
}
