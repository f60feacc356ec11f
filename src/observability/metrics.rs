//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gatekeeper_sanitizer_rejections_total` (counter): rejected locale candidates by source, reason
//! - `gatekeeper_redirects_total` (counter): redirects by reason (locale, auth_error)
//! - `gatekeeper_static_bypass_total` (counter): requests short-circuited as static assets
//! - `gatekeeper_login_attempts_total` (counter): rate limiter decisions by outcome
//! - `gatekeeper_rate_limit_tracked_keys` (gauge): identities currently tracked
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library users and
//!   tests pay nothing
//! - Labels never carry request data, only fixed enums

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_sanitizer_rejection(source: &'static str, reason: &'static str) {
    counter!("gatekeeper_sanitizer_rejections_total", "source" => source, "reason" => reason).increment(1);
}

pub fn record_redirect(reason: &'static str) {
    counter!("gatekeeper_redirects_total", "reason" => reason).increment(1);
}

pub fn record_static_bypass() {
    counter!("gatekeeper_static_bypass_total").increment(1);
}

pub fn record_login_attempt(outcome: &'static str) {
    counter!("gatekeeper_login_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_tracked_keys(count: usize) {
    gauge!("gatekeeper_rate_limit_tracked_keys").set(count as f64);
}
