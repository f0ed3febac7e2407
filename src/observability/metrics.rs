//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by outcome
//! - `proxy_request_duration_seconds` (histogram): latency of proxied requests
//! - `proxy_records_written_total` (counter): lines appended to the request log
//! - `proxy_login_cookies_total` (counter): cookies harvested per stand at startup
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Exporter is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome label for `proxy_requests_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    UnknownStand,
    Stripped,
    Forwarded,
    UpstreamError,
    CookieError,
    Fatal,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::UnknownStand => "unknown_stand",
            Outcome::Stripped => "stripped",
            Outcome::Forwarded => "forwarded",
            Outcome::UpstreamError => "upstream_error",
            Outcome::CookieError => "cookie_error",
            Outcome::Fatal => "fatal",
        }
    }
}

/// Install the Prometheus exporter on the given address.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_outcome(outcome: Outcome) {
    metrics::counter!("proxy_requests_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_latency(stand: &str, status: u16, start: Instant) {
    metrics::histogram!(
        "proxy_request_duration_seconds",
        "stand" => stand.to_string(),
        "status" => status.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_written() {
    metrics::counter!("proxy_records_written_total").increment(1);
}

pub fn record_login_cookies(stand: &str, count: usize) {
    metrics::counter!("proxy_login_cookies_total", "stand" => stand.to_string())
        .increment(count as u64);
}
