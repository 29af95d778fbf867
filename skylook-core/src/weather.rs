use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    error::{LookupError, Service},
    model::{Coordinates, WeatherSnapshot},
    provider::WeatherSource,
};

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";

/// Timezone sent when the caller has none; the service then picks one.
pub const AUTO_TIMEZONE: &str = "auto";

/// Client for the Open-Meteo forecast endpoint, current conditions only.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    base_url: String,
    http: Client,
}

impl WeatherClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    /// Fetch current weather. The decoded body is returned as-is.
    pub async fn fetch_current(
        &self,
        at: Coordinates,
        timezone: Option<&str>,
    ) -> Result<WeatherSnapshot, LookupError> {
        let timezone = timezone.filter(|tz| !tz.is_empty()).unwrap_or(AUTO_TIMEZONE);
        let url = format!("{}/v1/forecast", self.base_url);
        tracing::debug!(
            %url,
            latitude = at.latitude,
            longitude = at.longitude,
            timezone,
            "fetching current weather"
        );

        let res = self
            .http
            .get(&url)
            .query(&[
                ("latitude", at.latitude.to_string()),
                ("longitude", at.longitude.to_string()),
                ("current_weather", "true".to_string()),
                ("timezone", timezone.to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(LookupError::http(Service::Weather, status));
        }

        let body = res.text().await?;
        let raw: Value = serde_json::from_str(&body)
            .map_err(|e| LookupError::Decode(format!("forecast response: {e}")))?;

        Ok(WeatherSnapshot::new(raw))
    }
}

impl Default for WeatherClient {
    fn default() -> Self {
        Self::new(DEFAULT_FORECAST_URL)
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn fetch_current(
        &self,
        at: Coordinates,
        timezone: Option<&str>,
    ) -> Result<WeatherSnapshot, LookupError> {
        WeatherClient::fetch_current(self, at, timezone).await
    }
}
