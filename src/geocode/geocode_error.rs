use thiserror::Error;

/// Transient, non-critical: callers log it and keep the form usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Geocoding service returned {status}: {message}")]
    Service { status: String, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
    #[error("Geocoding is disabled (no API key configured)")]
    Disabled,
}
