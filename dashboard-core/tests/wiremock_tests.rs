//! Provider client and orchestrator against a mock Tomorrow.io server.

use dashboard_core::{
    Coordinates, ErrorCategory, FetchKind, FetchOrchestrator, FetchStatus, GeolocationPolicy,
    HistoryGranularity, Location, ProviderError, WeatherProvider,
    provider::tomorrow::TomorrowIoProvider, render,
};
use std::sync::Arc;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn realtime_body() -> serde_json::Value {
    serde_json::json!({
        "data": {
            "time": "2024-06-01T12:00:00Z",
            "values": { "temperature": 24.9, "visibility": 10, "humidity": 63 }
        },
        "location": { "lat": 51.5072, "lon": -0.1276, "name": "London", "type": "administrative" }
    })
}

fn timelines_body() -> serde_json::Value {
    serde_json::json!({
        "timelines": {
            "hourly": [
                { "time": "2024-06-01T10:00:00Z", "values": { "temperature": 18.0, "visibility": 16 } },
                { "time": "2024-06-01T11:00:00Z", "values": { "temperature": 19.5, "visibility": 16 } }
            ],
            "daily": [
                { "time": "2024-06-01T00:00:00Z", "values": { "temperatureMax": 30, "visibilityMax": 16 } },
                { "time": "2024-06-02T00:00:00Z", "values": { "temperatureMax": 22, "visibilityMax": 8 } },
                { "time": "2024-06-03T00:00:00Z", "values": { "temperatureMax": 21, "visibilityMax": 12 } }
            ]
        },
        "location": { "lat": 1, "lon": 2, "name": "X" }
    })
}

fn client(server: &MockServer, key: Option<&str>) -> TomorrowIoProvider {
    TomorrowIoProvider::new(key.map(str::to_owned), server.uri())
}

#[tokio::test]
async fn realtime_sends_location_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/realtime"))
        .and(query_param("location", "51.5072,-0.1276"))
        .and(query_param("apikey", "SECRET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(realtime_body()))
        .expect(1)
        .mount(&server)
        .await;

    let loc = Location::Coordinates(Coordinates { latitude: 51.5072, longitude: -0.1276 });
    let payload = client(&server, Some("SECRET")).fetch_realtime(&loc).await.expect("ok");

    assert_eq!(payload.entries.len(), 1);
    let card = &render::cards(&payload)[0];
    assert_eq!(card.location_name, "London");
    assert_eq!(card.icon, render::WeatherIcon::Fog);
}

#[tokio::test]
async fn forecast_returns_daily_timeline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("location", "new york"))
        .respond_with(ResponseTemplate::new(200).set_body_json(timelines_body()))
        .mount(&server)
        .await;

    let payload = client(&server, Some("K"))
        .fetch_forecast(&Location::Name("new york".into()))
        .await
        .expect("ok");

    assert_eq!(payload.kind, FetchKind::Forecast);
    assert_eq!(payload.entries.len(), 3);
    assert_eq!(payload.entries[0].values.temperature_max, Some(30.0));
}

#[tokio::test]
async fn history_uses_recent_endpoint_and_granularity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/history/recent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(timelines_body()))
        .mount(&server)
        .await;

    let loc = Location::Name("X".into());
    let provider = client(&server, Some("K"));

    let hourly = provider.fetch_history(&loc, HistoryGranularity::Hourly).await.expect("hourly");
    assert_eq!(hourly.entries.len(), 2);

    let daily = provider.fetch_history(&loc, HistoryGranularity::Daily).await.expect("daily");
    assert_eq!(daily.entries.len(), 3);
    assert_eq!(daily.kind, FetchKind::History(HistoryGranularity::Daily));
}

#[tokio::test]
async fn unauthorized_is_authentication_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/realtime"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "code": 401001,
            "type": "Invalid Auth",
            "message": "The method requires authentication but it was not presented or is invalid."
        })))
        .mount(&server)
        .await;

    let err = client(&server, Some("BAD"))
        .fetch_realtime(&Location::Name("X".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Authentication(_)));
}

#[tokio::test]
async fn missing_key_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(realtime_body()))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, None)
        .fetch_forecast(&Location::Name("X".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Authentication(_)));
}

#[tokio::test]
async fn not_found_and_server_errors_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such place"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/realtime"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = client(&server, Some("K"));
    let loc = Location::Name("Atlantis".into());

    assert!(matches!(
        provider.fetch_forecast(&loc).await.unwrap_err(),
        ProviderError::NotFound(_)
    ));
    assert!(matches!(
        provider.fetch_realtime(&loc).await.unwrap_err(),
        ProviderError::Status { status: 503, .. }
    ));
}

#[tokio::test]
async fn garbage_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/realtime"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server, Some("K"))
        .fetch_realtime(&Location::Name("X".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn orchestrated_forecast_renders_cards() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(timelines_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider: Arc<dyn WeatherProvider> = Arc::new(client(&server, Some("K")));
    let (view, mut notes) =
        FetchOrchestrator::new(FetchKind::Forecast, GeolocationPolicy::AutoFetch, provider);

    view.submit_manual("X").expect("issued").await.expect("task");

    let state = view.snapshot();
    assert_eq!(state.fetch.status, FetchStatus::Success);
    let payload = state.fetch.data.expect("payload stored");
    let cards = render::cards(&payload);
    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0].icon, render::WeatherIcon::Sunny);
    assert_eq!(cards[1].icon, render::WeatherIcon::Fog);
    assert_eq!(cards[2].icon, render::WeatherIcon::Thermometer);
    assert!(notes.try_recv().is_err());
}

#[tokio::test]
async fn network_failure_surfaces_one_notification_and_unthrottles() {
    // Nothing listens on port 1.
    let provider: Arc<dyn WeatherProvider> =
        Arc::new(TomorrowIoProvider::new(Some("K".into()), "http://127.0.0.1:1"));
    let (view, mut notes) =
        FetchOrchestrator::new(FetchKind::Realtime, GeolocationPolicy::AutoFetch, provider);

    let handle = view.submit_manual("Oslo").expect("issued");
    assert!(view.snapshot().fetch.is_loading());
    handle.await.expect("task");

    let state = view.snapshot();
    assert_eq!(state.fetch.status, FetchStatus::Error);
    assert!(!state.fetch.throttled);
    assert!(!state.fetch.is_loading());

    let note = notes.try_recv().expect("notification");
    assert_eq!(note.category, ErrorCategory::Network);
    assert_eq!(note.message, "Failed to fetch real-time forecast data for manual location.");
    assert!(notes.try_recv().is_err());

    assert!(view.submit_manual("Oslo").is_some());
}
