//! # Gateway Error Types Module
//!
//! Error types for requests made to the external generative AI service.

/// Failure modes of the recognition/generation gateway
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// Fridge image analysis failed
    Analysis(String),
    /// Recipe generation failed
    Generation(String),
    /// Recipe image synthesis failed
    ImageSynthesis(String),
    /// The HTTP request could not be sent or its body read
    Transport(String),
    /// The service answered with a non-success status
    Api { status: u16, message: String },
    /// The service answered with something we could not interpret
    MalformedResponse(String),
}

impl GatewayError {
    /// Wrap any lower level failure as an analysis failure
    pub fn analysis(err: impl std::fmt::Display) -> Self {
        GatewayError::Analysis(err.to_string())
    }

    /// Wrap any lower level failure as a generation failure
    pub fn generation(err: impl std::fmt::Display) -> Self {
        GatewayError::Generation(err.to_string())
    }

    pub fn is_analysis(&self) -> bool {
        matches!(self, GatewayError::Analysis(_))
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, GatewayError::Generation(_))
    }

    /// HTTP status reported by the service, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Analysis(msg) => write!(f, "[ANALYSIS] Failed to analyze image: {}", msg),
            GatewayError::Generation(msg) => write!(f, "[GENERATION] Failed to suggest recipes: {}", msg),
            GatewayError::ImageSynthesis(msg) => write!(f, "[IMAGE] Recipe image synthesis failed: {}", msg),
            GatewayError::Transport(msg) => write!(f, "[TRANSPORT] Gateway request failed: {}", msg),
            GatewayError::Api { status, message } => write!(f, "[API] Gateway returned {}: {}", status, message),
            GatewayError::MalformedResponse(msg) => write!(f, "[MALFORMED] Unexpected gateway response: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::MalformedResponse(err.to_string())
    }
}
