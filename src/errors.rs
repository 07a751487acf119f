//! # Application Error Types
//!
//! This module defines common error types used throughout the ChefSnap application.
//! It provides structured error handling for the gateway, the local stores,
//! the profile collaborator and the device capabilities.

use std::fmt;

use crate::gateway_errors::GatewayError;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Validation errors (ratings, pantry items, inputs, etc.)
    Validation(String),
    /// Local key-value storage errors
    Storage(String),
    /// External AI gateway errors
    Gateway(String),
    /// Identity or profile collaborator errors
    Profile(String),
    /// Camera, microphone or speech device errors
    Device(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            AppError::Storage(msg) => write!(f, "[STORAGE] {}", msg),
            AppError::Gateway(msg) => write!(f, "[GATEWAY] {}", msg),
            AppError::Profile(msg) => write!(f, "[PROFILE] {}", msg),
            AppError::Device(msg) => write!(f, "[DEVICE] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Profile(err.to_string())
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        AppError::Gateway(err.to_string())
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::error;

    /// Log AI gateway failures with request context
    pub fn log_gateway_error(
        error: &impl std::fmt::Display,
        operation: &str,
        model: Option<&str>,
        status: Option<u16>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            model = ?model,
            status = ?status,
            "Gateway request failed"
        );
    }

    /// Log local storage errors with the key being accessed
    pub fn log_storage_error(error: &impl std::fmt::Display, operation: &str, key: &str) {
        error!(
            error = %error,
            operation = %operation,
            key = %key,
            "Storage operation failed"
        );
    }

    /// Log identity/profile errors; the caller continues without a profile
    pub fn log_profile_error(error: &impl std::fmt::Display, operation: &str, uid: Option<&str>) {
        error!(
            error = %error,
            operation = %operation,
            uid = ?uid,
            "Profile operation failed"
        );
    }

    /// Log camera, microphone and speech failures
    pub fn log_device_error(error: &impl std::fmt::Display, device: &str, operation: &str) {
        error!(
            error = %error,
            device = %device,
            operation = %operation,
            "Device operation failed"
        );
    }

    /// Log validation errors with input context
    pub fn log_validation_error(
        error: &impl std::fmt::Display,
        operation: &str,
        input_type: &str,
        input_value: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            input_type = %input_type,
            input_value = ?input_value.map(|v| if v.len() > 100 { format!("{}...", &v[..100]) } else { v.to_string() }),
            "Validation failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}
