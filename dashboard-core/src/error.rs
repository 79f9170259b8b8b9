use thiserror::Error;

use crate::location::GeolocationError;

/// Failure classes reported by a weather provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Missing, invalid or rejected API key.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A 2xx response whose body could not be used.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// Any other non-success status.
    #[error("Provider returned status {status}: {message}")]
    Status { status: u16, message: String },
}

/// Everything a view can surface to the user.
///
/// None of these are fatal; the orchestrator turns each into a single
/// notification and an `Error` status.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("{0}")]
    Validation(String),

    #[error("Geolocation unavailable: {0}")]
    GeolocationUnavailable(#[from] GeolocationError),

    #[error("Network error: {0}")]
    Network(#[source] ProviderError),

    #[error("Provider error: {0}")]
    Provider(#[source] ProviderError),
}

/// Coarse class of a [`DashboardError`], carried on notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    GeolocationUnavailable,
    Network,
    Provider,
}

impl DashboardError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashboardError::Validation(_) => ErrorCategory::Validation,
            DashboardError::GeolocationUnavailable(_) => ErrorCategory::GeolocationUnavailable,
            DashboardError::Network(_) => ErrorCategory::Network,
            DashboardError::Provider(_) => ErrorCategory::Provider,
        }
    }
}

impl From<ProviderError> for DashboardError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::Network(_) => DashboardError::Network(value),
            other => DashboardError::Provider(other),
        }
    }
}
