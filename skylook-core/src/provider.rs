use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

use crate::{
    Config, GeocodeClient, WeatherClient,
    error::LookupError,
    locate::{
        FixedPositionProvider, IpPositionProvider, MisconfiguredPosition, PositionProvider,
        UnsupportedPosition,
    },
    model::{Coordinates, GeoResult, WeatherSnapshot},
};

/// Resolves a free-text place name to one location.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn geocode(&self, name: &str) -> Result<GeoResult, LookupError>;
}

/// Current conditions for a coordinate pair.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// `timezone` of `None` lets the service choose.
    async fn fetch_current(
        &self,
        at: Coordinates,
        timezone: Option<&str>,
    ) -> Result<WeatherSnapshot, LookupError>;
}

/// Which position source to use for "use my location".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LocationSource {
    #[default]
    Ip,
    Fixed,
    None,
}

impl LocationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationSource::Ip => "ip",
            LocationSource::Fixed => "fixed",
            LocationSource::None => "none",
        }
    }

    pub const fn all() -> &'static [LocationSource] {
        &[LocationSource::Ip, LocationSource::Fixed, LocationSource::None]
    }
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for LocationSource {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "ip" => Ok(LocationSource::Ip),
            "fixed" => Ok(LocationSource::Fixed),
            "none" => Ok(LocationSource::None),
            _ => Err(anyhow::anyhow!(
                "Unknown location provider '{value}'. Supported providers: ip, fixed, none."
            )),
        }
    }
}

/// Remote services wired from configuration.
#[derive(Debug, Clone)]
pub struct Services {
    pub geocoder: Arc<dyn Geocoder>,
    pub weather: Arc<dyn WeatherSource>,
    pub position: Arc<dyn PositionProvider>,
}

/// Build the geocoder, weather client and position source named by `config`.
///
/// Bad location settings only break the locate flow: the position source
/// then fails every request with the configuration message.
pub fn services_from_config(config: &Config) -> Services {
    let position = position_from_config(config).unwrap_or_else(|e| {
        tracing::warn!("Location settings are invalid: {e:#}");
        Arc::new(MisconfiguredPosition::new(e.to_string()))
    });

    Services {
        geocoder: Arc::new(GeocodeClient::new(config.geocoding_url())),
        weather: Arc::new(WeatherClient::new(config.forecast_url())),
        position,
    }
}

pub fn position_from_config(config: &Config) -> anyhow::Result<Arc<dyn PositionProvider>> {
    let provider: Arc<dyn PositionProvider> = match config.location_source()? {
        LocationSource::Ip => Arc::new(IpPositionProvider::new(config.ip_lookup_url())),
        LocationSource::Fixed => {
            let at = config.location.coordinates().ok_or_else(|| {
                anyhow::anyhow!(
                    "Location provider 'fixed' needs both latitude and longitude.\n\
                     Hint: run `skylook configure` and enter your coordinates."
                )
            })?;
            Arc::new(FixedPositionProvider(at))
        }
        LocationSource::None => Arc::new(UnsupportedPosition),
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, LocationConfig};

    #[test]
    fn location_source_as_str_roundtrip() {
        for source in LocationSource::all() {
            let parsed =
                LocationSource::try_from(source.as_str()).expect("roundtrip should succeed");
            assert_eq!(*source, parsed);
        }
    }

    #[test]
    fn unknown_location_source_error() {
        let err = LocationSource::try_from("gps").unwrap_err();
        assert!(err.to_string().contains("Unknown location provider"));
    }

    #[test]
    fn default_config_uses_ip_lookup() {
        let position = position_from_config(&Config::default()).unwrap();
        assert!(position.is_available());
    }

    #[test]
    fn fixed_without_coordinates_is_an_error() {
        let err = position_from_config(&with_provider("fixed")).unwrap_err();
        assert!(err.to_string().contains("needs both latitude and longitude"));
    }

    #[tokio::test]
    async fn bad_location_settings_only_affect_locate() {
        for provider in ["fixed", "gps"] {
            let services = services_from_config(&with_provider(provider));

            assert!(services.position.is_available());
            let err = services.position.current_position().await.unwrap_err();
            assert!(matches!(err, LookupError::GeolocationFailure(_)), "{err:?}");
        }

        let services = services_from_config(&with_provider("gps"));
        let err = services
            .position
            .current_position()
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("Unknown location provider 'gps'"), "{err}");
    }

    #[tokio::test]
    async fn bad_location_settings_keep_search_services_working() {
        let mock_server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::path("/v1/search"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({
                    "results": [{
                        "name": "Bern",
                        "country": "Switzerland",
                        "latitude": 46.95,
                        "longitude": 7.45
                    }]
                }),
            ))
            .mount(&mock_server)
            .await;

        wiremock::Mock::given(wiremock::matchers::path("/v1/forecast"))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "timezone": "Europe/Zurich" })),
            )
            .mount(&mock_server)
            .await;

        let mut cfg = with_provider("fixed");
        cfg.geocoding_url = Some(mock_server.uri());
        cfg.forecast_url = Some(mock_server.uri());

        let services = services_from_config(&cfg);
        let place = services.geocoder.geocode("Bern").await.unwrap();
        let snapshot = services.weather.fetch_current(place.coordinates(), None).await.unwrap();

        assert_eq!(place.recent_label(), "Bern, Switzerland");
        assert_eq!(snapshot.timezone(), "Europe/Zurich");
    }

    #[test]
    fn none_is_unavailable() {
        let services = services_from_config(&with_provider("none"));
        assert!(!services.position.is_available());
    }

    fn with_provider(provider: &str) -> Config {
        Config {
            location: LocationConfig {
                provider: Some(provider.into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}
