use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{LookupError, Service},
    model::GeoResult,
    provider::Geocoder,
};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";

const CANDIDATE_COUNT: &str = "5";
const LANGUAGE: &str = "en";

/// Client for the Open-Meteo geocoding search endpoint.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<GeoResult>>,
}

impl GeocodeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    /// Resolve a place name to the service's first-ranked candidate.
    pub async fn geocode(&self, name: &str) -> Result<GeoResult, LookupError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LookupError::EmptyInput);
        }

        let url = format!("{}/v1/search", self.base_url);
        tracing::debug!(%url, name, "geocoding");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("name", name),
                ("count", CANDIDATE_COUNT),
                ("language", LANGUAGE),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(LookupError::http(Service::Geocoding, status));
        }

        let body = res.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| LookupError::Decode(format!("geocoding response: {e}")))?;

        let place = parsed
            .results
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| LookupError::NotFound(name.to_string()))?;

        tracing::info!(
            name = %place.name,
            latitude = place.latitude,
            longitude = place.longitude,
            "geocoded"
        );
        Ok(place)
    }
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new(DEFAULT_GEOCODING_URL)
    }
}

#[async_trait]
impl Geocoder for GeocodeClient {
    async fn geocode(&self, name: &str) -> Result<GeoResult, LookupError> {
        GeocodeClient::geocode(self, name).await
    }
}
