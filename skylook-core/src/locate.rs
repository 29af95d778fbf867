//! Where is "here"? Position sources for the locate flow.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{
    fmt::Debug,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::{error::LookupError, model::Coordinates};

pub const DEFAULT_IP_LOOKUP_URL: &str = "https://ipapi.co";

/// How stale a cached fix may be, and how long to wait for a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub maximum_age: Duration,
    pub timeout: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            maximum_age: Duration::from_secs(10 * 60),
            timeout: Duration::from_secs(15),
        }
    }
}

#[async_trait]
pub trait PositionProvider: Send + Sync + Debug {
    /// Whether this source can produce a position at all.
    fn is_available(&self) -> bool {
        true
    }

    async fn current_position(&self) -> Result<Coordinates, LookupError>;
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct IpPositionProvider {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    reason: Option<String>,
}

impl IpPositionProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: Client::new(),
        }
    }
}

impl Default for IpPositionProvider {
    fn default() -> Self {
        Self::new(DEFAULT_IP_LOOKUP_URL)
    }
}

#[async_trait]
impl PositionProvider for IpPositionProvider {
    async fn current_position(&self) -> Result<Coordinates, LookupError> {
        let url = format!("{}/json/", self.base_url);
        tracing::debug!(%url, "looking up position by IP");

        let res = self.http.get(&url).send().await.map_err(|e| {
            LookupError::GeolocationFailure(format!("position lookup failed: {e}"))
        })?;

        let status = res.status();
        if !status.is_success() {
            return Err(LookupError::GeolocationFailure(format!(
                "position lookup failed: {}",
                status.as_u16()
            )));
        }

        let body: IpLookupResponse = res.json().await.map_err(|e| {
            LookupError::GeolocationFailure(format!("unreadable position response: {e}"))
        })?;

        match (body.latitude, body.longitude) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LookupError::GeolocationFailure(
                body.reason.unwrap_or_else(|| "Position unavailable".to_string()),
            )),
        }
    }
}

/// Always answers with the configured coordinates.
#[derive(Debug, Clone, Copy)]
pub struct FixedPositionProvider(pub Coordinates);

#[async_trait]
impl PositionProvider for FixedPositionProvider {
    async fn current_position(&self) -> Result<Coordinates, LookupError> {
        Ok(self.0)
    }
}

/// No position source on this system.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedPosition;

#[async_trait]
impl PositionProvider for UnsupportedPosition {
    fn is_available(&self) -> bool {
        false
    }

    async fn current_position(&self) -> Result<Coordinates, LookupError> {
        Err(LookupError::GeolocationUnsupported)
    }
}

/// Stands in when the location settings cannot be used; every request
/// fails with the configuration problem.
#[derive(Debug, Clone)]
pub struct MisconfiguredPosition {
    reason: String,
}

impl MisconfiguredPosition {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl PositionProvider for MisconfiguredPosition {
    async fn current_position(&self) -> Result<Coordinates, LookupError> {
        Err(LookupError::GeolocationFailure(self.reason.clone()))
    }
}

/// Applies [`PositionOptions`] on top of a raw provider.
#[derive(Debug)]
pub struct Geolocator {
    provider: Arc<dyn PositionProvider>,
    last_fix: Mutex<Option<(Instant, Coordinates)>>,
}

impl Geolocator {
    pub fn new(provider: Arc<dyn PositionProvider>) -> Self {
        Self {
            provider,
            last_fix: Mutex::new(None),
        }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_available()
    }

    pub async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, LookupError> {
        if let Some(cached) = self.cached(options.maximum_age) {
            tracing::debug!("using cached position");
            return Ok(cached);
        }

        let fix = tokio::time::timeout(options.timeout, self.provider.current_position())
            .await
            .map_err(|_| LookupError::GeolocationFailure("Timeout expired".to_string()))??;

        if let Ok(mut last) = self.last_fix.lock() {
            *last = Some((Instant::now(), fix));
        }
        Ok(fix)
    }

    fn cached(&self, maximum_age: Duration) -> Option<Coordinates> {
        let last = self.last_fix.lock().ok()?;
        let (at, fix) = (*last)?;
        (at.elapsed() <= maximum_age).then_some(fix)
    }
}
