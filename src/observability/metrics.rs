//! Metrics collection and Prometheus export module.
//!
//! This module provides:
//! - Prometheus recorder setup (with an HTTP scrape endpoint when export is enabled)
//! - Recording functions for gateway calls, storage, voice control and the cooking flow

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::observability_config::ObservabilityConfig;

/// Initialize metrics collection.
///
/// With `ENABLE_METRICS_EXPORT=true` the Prometheus exporter serves
/// `/metrics` on localhost at the configured port; otherwise metrics are
/// recorded in-process only.
pub fn init_metrics_with_config(config: &ObservabilityConfig) -> Result<()> {
    if config.enable_metrics_export {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), config.metrics_port);
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        tracing::info!(%addr, "Prometheus metrics exporter listening");
    } else {
        PrometheusBuilder::new().install_recorder()?;
        tracing::info!("Metrics collection initialized (export disabled)");
    }
    Ok(())
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Record one request to the generative service
pub fn record_gateway_metrics(operation: &str, success: bool, duration: Duration) {
    let operation = operation.to_string();
    metrics::counter!("gateway_requests_total", "operation" => operation.clone(), "result" => outcome(success)).increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "operation" => operation)
        .record(duration.as_secs_f64());
}

/// Record generated recipe counts, including those dropped at the boundary
pub fn record_generation_metrics(accepted: usize, dropped: usize) {
    metrics::histogram!("recipes_generated").record(accepted as f64);
    if dropped > 0 {
        metrics::counter!("recipes_dropped_total").increment(dropped as u64);
    }
}

/// Record local store reads and writes
pub fn record_storage_metrics(operation: &str, key: &str, success: bool) {
    let operation = operation.to_string();
    let key = key.to_string();
    metrics::counter!("storage_operations_total", "operation" => operation, "key" => key, "result" => outcome(success)).increment(1);
}

/// Record a recognized (or unrecognized) voice command
pub fn record_voice_command(command: &str) {
    let command = command.to_string();
    metrics::counter!("voice_commands_total", "command" => command).increment(1);
}

/// Record a submitted rating
pub fn record_rating(stars: u8) {
    metrics::counter!("ratings_submitted_total", "stars" => stars.to_string()).increment(1);
}

/// Record shopping list additions
pub fn record_shopping_items_added(count: usize) {
    metrics::counter!("shopping_items_added_total").increment(count as u64);
}

/// Record favorites toggles
pub fn record_favorite_toggle(saved: bool) {
    metrics::counter!("favorites_toggled_total", "action" => if saved { "saved" } else { "removed" }).increment(1);
}

/// Record a completed cooking session
pub fn record_cooking_session(steps_viewed: usize, total_steps: usize) {
    metrics::counter!("cooking_sessions_total").increment(1);
    if total_steps > 0 {
        metrics::histogram!("cooking_session_completion_ratio")
            .record(steps_viewed as f64 / total_steps as f64);
    }
}

/// Record error rate metrics
pub fn record_error_metrics(error_type: &str, component: &str) {
    let error_type = error_type.to_string();
    let component = component.to_string();
    metrics::counter!("errors_total", "type" => error_type, "component" => component).increment(1);
}

/// Record application startup
pub fn record_startup_metrics(duration: Duration) {
    metrics::histogram!("application_startup_duration_seconds").record(duration.as_secs_f64());
    metrics::counter!("application_starts_total").increment(1);
}
