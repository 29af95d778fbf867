//! HTTP client behavior against a mock Open-Meteo server.

use skylook_core::{
    Coordinates, GeocodeClient, LookupError, PositionProvider, Service, WeatherClient,
    locate::IpPositionProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn paris_result() -> serde_json::Value {
    serde_json::json!({
        "name": "Paris",
        "country": "France",
        "admin1": "Île-de-France",
        "latitude": 48.85,
        "longitude": 2.35,
        "timezone": "Europe/Paris"
    })
}

#[tokio::test]
async fn geocode_sends_fixed_query_and_takes_first_candidate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Paris"))
        .and(query_param("count", "5"))
        .and(query_param("language", "en"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                paris_result(),
                {
                    "name": "Paris",
                    "country": "United States",
                    "latitude": 33.66,
                    "longitude": -95.55
                }
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GeocodeClient::new(mock_server.uri());
    let place = client.geocode("  Paris ").await.unwrap();

    assert_eq!(place.name, "Paris");
    assert_eq!(place.country.as_deref(), Some("France"));
    assert_eq!(place.timezone.as_deref(), Some("Europe/Paris"));
    assert_eq!(place.coordinates(), Coordinates::new(48.85, 2.35));
}

#[tokio::test]
async fn geocode_encodes_the_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "São Paulo & co"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{ "name": "São Paulo", "latitude": -23.55, "longitude": -46.63 }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GeocodeClient::new(mock_server.uri());
    let place = client.geocode("São Paulo & co").await.unwrap();

    assert_eq!(place.name, "São Paulo");
    assert_eq!(place.country, None);
}

#[tokio::test]
async fn geocode_empty_name_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = GeocodeClient::new(mock_server.uri());
    let err = client.geocode("").await.unwrap_err();

    assert!(matches!(err, LookupError::EmptyInput));
}

#[tokio::test]
async fn geocode_empty_results_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": [] })),
        )
        .mount(&mock_server)
        .await;

    let client = GeocodeClient::new(mock_server.uri());
    let err = client.geocode("Nowhereville").await.unwrap_err();

    assert!(matches!(err, LookupError::NotFound(ref n) if n == "Nowhereville"), "{err:?}");
}

#[tokio::test]
async fn geocode_missing_results_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "generationtime_ms": 0.5 })),
        )
        .mount(&mock_server)
        .await;

    let client = GeocodeClient::new(mock_server.uri());
    let err = client.geocode("Atlantis").await.unwrap_err();

    assert!(matches!(err, LookupError::NotFound(_)));
}

#[tokio::test]
async fn geocode_http_error_carries_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = GeocodeClient::new(mock_server.uri());
    let err = client.geocode("Paris").await.unwrap_err();

    assert!(matches!(err, LookupError::Http { service: Service::Geocoding, .. }));
    assert_eq!(err.to_string(), "Geocoding failed: 500");
}

#[tokio::test]
async fn weather_defaults_timezone_to_auto() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "48.85"))
        .and(query_param("longitude", "2.35"))
        .and(query_param("current_weather", "true"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "timezone": "Europe/Paris",
            "extra": [1, 2, 3]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = WeatherClient::new(mock_server.uri());
    let snapshot = client.fetch_current(Coordinates::new(48.85, 2.35), None).await.unwrap();

    assert_eq!(snapshot.timezone(), "Europe/Paris");
    assert!(snapshot.current_weather().is_none());
    // returned unmodified
    assert_eq!(snapshot.raw()["extra"], serde_json::json!([1, 2, 3]));
}

#[tokio::test]
async fn weather_passes_explicit_timezone() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("timezone", "America/Argentina/Buenos_Aires"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "timezone": "America/Argentina/Buenos_Aires",
            "current_weather": {
                "temperature": 21.3,
                "windspeed": 7.6,
                "winddirection": 95,
                "time": "2026-10-19T11:00"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = WeatherClient::new(mock_server.uri());
    let snapshot = client
        .fetch_current(Coordinates::new(-34.61, -58.38), Some("America/Argentina/Buenos_Aires"))
        .await
        .unwrap();

    let cw = snapshot.current_weather().unwrap();
    assert_eq!(cw.temperature, 21.3);
    assert_eq!(cw.winddirection, 95.0);
}

#[tokio::test]
async fn weather_http_error_carries_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = WeatherClient::new(mock_server.uri());
    let err = client.fetch_current(Coordinates::new(0.0, 0.0), None).await.unwrap_err();

    assert_eq!(err.to_string(), "Weather fetch failed: 429");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(429));
}

#[tokio::test]
async fn weather_non_json_body_is_a_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let client = WeatherClient::new(mock_server.uri());
    let err = client.fetch_current(Coordinates::new(0.0, 0.0), None).await.unwrap_err();

    assert!(matches!(err, LookupError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn ip_position_reads_coordinates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.7",
            "city": "Oslo",
            "latitude": 59.9127,
            "longitude": 10.7461
        })))
        .mount(&mock_server)
        .await;

    let provider = IpPositionProvider::new(mock_server.uri());
    let at = provider.current_position().await.unwrap();

    assert_eq!(at, Coordinates::new(59.9127, 10.7461));
}

#[tokio::test]
async fn ip_position_failure_uses_reason() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": true,
            "reason": "Reserved IP Address"
        })))
        .mount(&mock_server)
        .await;

    let provider = IpPositionProvider::new(mock_server.uri());
    let err = provider.current_position().await.unwrap_err();

    assert_eq!(err.to_string(), "Reserved IP Address");
}

#[tokio::test]
async fn ip_position_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let provider = IpPositionProvider::new(mock_server.uri());
    let err = provider.current_position().await.unwrap_err();

    assert!(matches!(err, LookupError::GeolocationFailure(_)));
    assert!(err.to_string().contains("403"));
}
