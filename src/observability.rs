//! Observability module for centralized metrics, tracing, and logging setup.
//!
//! This module provides:
//! - Structured logging with configurable levels and formats
//! - Distributed tracing with OpenTelemetry (when an OTLP endpoint is set)
//! - Metrics collection with optional Prometheus export

pub mod metrics;
pub mod tracing_mod;

use anyhow::Result;

use crate::observability_config::ObservabilityConfig;

pub use metrics::*;
pub use tracing_mod::*;

/// Initialize the complete observability stack with custom configuration
pub async fn init_observability_with_config(config: ObservabilityConfig) -> Result<()> {
    // Validate configuration
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid observability configuration: {}", e))?;

    // Initialize tracing first
    init_tracing_with_config(&config)?;

    // Initialize metrics
    init_metrics_with_config(&config)?;

    // Initialize OpenTelemetry tracing
    init_opentelemetry_tracing_with_config(&config).await?;

    tracing::info!(
        environment = %config.environment,
        otlp_endpoint = ?config.otlp_endpoint,
        metrics_port = %config.metrics_port,
        metrics_export = %config.enable_metrics_export,
        "Observability stack initialized successfully"
    );
    Ok(())
}
