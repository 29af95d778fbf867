use reqwest::StatusCode;
use thiserror::Error;

/// Which remote service a failed HTTP call went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Geocoding,
    Weather,
}

/// Errors surfaced by a search or locate operation.
///
/// The `Display` text is what ends up in the error banner, so keep it short.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Empty city")]
    EmptyInput,

    #[error("{} failed: {}", .service.failure_prefix(), .status.as_u16())]
    Http { service: Service, status: StatusCode },

    #[error("No location found for \"{0}\"")]
    NotFound(String),

    #[error("Geolocation not supported on this system.")]
    GeolocationUnsupported,

    #[error("{0}")]
    GeolocationFailure(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl Service {
    fn failure_prefix(self) -> &'static str {
        match self {
            Service::Geocoding => "Geocoding",
            Service::Weather => "Weather fetch",
        }
    }
}

impl LookupError {
    pub fn http(service: Service, status: StatusCode) -> Self {
        LookupError::Http { service, status }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            LookupError::Http { status, .. } => Some(*status),
            LookupError::Network(e) => e.status(),
            _ => None,
        }
    }
}
