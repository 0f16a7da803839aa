//! Metrics collection and exposition.
//!
//! # Metrics
//! - `breakwater_attempts_total` (counter): attempts by pipeline, outcome
//! - `breakwater_call_duration_seconds` (histogram): whole-call latency
//! - `breakwater_circuit_transitions_total` (counter): by pipeline, phase
//! - `breakwater_cache_lookups_total` (counter): by type, hit/miss
//! - `breakwater_publish_drops_total` (counter): swallowed publish failures
//!
//! # Design Decisions
//! - Low-overhead updates (atomic increments behind the metrics macros)
//! - Labels carry the pipeline key, never per-call payloads

use metrics::{counter, histogram};
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    use metrics_exporter_prometheus::PrometheusBuilder;

    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics exporter"),
    }
}

/// Record one attempt outcome: success, failure, timeout or circuit_open.
pub fn record_attempt(pipeline: &str, outcome: &'static str) {
    counter!(
        "breakwater_attempts_total",
        "pipeline" => pipeline.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

/// Record whole-call latency from first attempt to final outcome.
pub fn record_call_duration(pipeline: &str, started: Instant) {
    histogram!(
        "breakwater_call_duration_seconds",
        "pipeline" => pipeline.to_string()
    )
    .record(started.elapsed().as_secs_f64());
}

/// Record a circuit phase transition.
pub fn record_circuit_transition(pipeline: &str, phase: &'static str) {
    counter!(
        "breakwater_circuit_transitions_total",
        "pipeline" => pipeline.to_string(),
        "phase" => phase
    )
    .increment(1);
}

/// Record a cache lookup outcome.
pub fn record_cache_lookup(type_name: &str, hit: bool) {
    counter!(
        "breakwater_cache_lookups_total",
        "type" => type_name.to_string(),
        "outcome" => if hit { "hit" } else { "miss" }
    )
    .increment(1);
}

/// Record a swallowed fire-and-forget publish failure.
pub fn record_publish_drop() {
    counter!("breakwater_publish_drops_total").increment(1);
}
