//! Tracing and logging setup module.
//!
//! This module provides:
//! - Structured logging configuration
//! - OpenTelemetry distributed tracing
//! - Tracing span creation utilities

use anyhow::Result;
use opentelemetry::global;
use opentelemetry_otlp::WithExportConfig;
use tracing_subscriber::prelude::*;

use crate::observability_config::ObservabilityConfig;

/// Build the log filter: our crate at the configured level, noisy dependencies at warn
pub fn build_env_filter(config: &ObservabilityConfig) -> Result<tracing_subscriber::EnvFilter> {
    Ok(tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("chef_snap={}", config.log_level).parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("reqwest=warn".parse()?))
}

/// Initialize structured logging with tracing and configuration
pub fn init_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    let filter = build_env_filter(config)?;

    // Pretty for development, JSON for others, unless LOG_FORMAT says otherwise
    if config.use_pretty_logs() {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(
        environment = %config.environment,
        log_level = %config.log_level,
        "Tracing initialized with structured logging"
    );
    Ok(())
}

/// Initialize OpenTelemetry distributed tracing with configuration
pub async fn init_opentelemetry_tracing_with_config(config: &ObservabilityConfig) -> Result<()> {
    // Only initialize if OTLP endpoint is configured
    if let Some(endpoint) = &config.otlp_endpoint {
        let otlp_exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(endpoint.clone())
            .build()?;

        let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
            .with_batch_exporter(otlp_exporter)
            .build();

        global::set_tracer_provider(tracer_provider);

        tracing::info!(
            otlp_endpoint = %endpoint,
            "OpenTelemetry tracing initialized with OTLP export"
        );
    } else {
        tracing::info!("OpenTelemetry tracing disabled (no OTLP endpoint configured)");
    }

    Ok(())
}

/// Create a span for calls to the generative AI service
pub fn gateway_span(operation: &str, model: &str) -> tracing::Span {
    tracing::info_span!(
        "gateway_operation",
        operation = operation,
        model = model,
        component = "gateway"
    )
}

/// Create a span for local key-value store operations
pub fn storage_span(operation: &str, key: &str) -> tracing::Span {
    tracing::info_span!(
        "storage_operation",
        operation = operation,
        key = key,
        component = "storage"
    )
}

/// Create a span for cooking session activity
pub fn session_span(operation: &str, recipe_title: &str) -> tracing::Span {
    tracing::info_span!(
        "session_operation",
        operation = operation,
        recipe = recipe_title,
        component = "cooking"
    )
}

/// Create a span for profile store operations
pub fn profile_span(operation: &str, uid: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "profile_operation",
        operation = operation,
        uid = uid,
        component = "profile"
    )
}
