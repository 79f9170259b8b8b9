use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{
    config::API_KEY_ENV,
    error::ProviderError,
    model::{FetchKind, HistoryGranularity, Location, LocationEcho, WeatherEntry, WeatherPayload},
};

use super::WeatherProvider;

/// Tomorrow.io v4 weather API.
#[derive(Debug, Clone)]
pub struct TomorrowIoProvider {
    api_key: Option<String>,
    base_url: String,
    http: Client,
}

impl TomorrowIoProvider {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api_key, base_url, http: Client::new() }
    }

    async fn get(&self, endpoint: &str, location: &Location) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ProviderError::Authentication(format!(
                "No API key configured.\n\
                 Hint: run `weather-dashboard configure` or set {API_KEY_ENV}."
            ))
        })?;

        let url = format!("{}/{}", self.base_url, endpoint);
        let query = location.query();

        let res = self
            .http
            .get(&url)
            .query(&[("location", query.as_str()), ("apikey", api_key)])
            .send()
            .await
            .map_err(ProviderError::Network)?;

        let status = res.status();
        let body = res.text().await.map_err(ProviderError::Network)?;
        debug!(%status, endpoint, bytes = body.len(), "provider responded");

        if !status.is_success() {
            let err = classify_failure(status, &body);
            warn!(%status, endpoint, error = %err, "provider request failed");
            return Err(err);
        }

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct RealtimeResponse {
    data: Option<WeatherEntry>,
    #[serde(default)]
    location: LocationEcho,
}

#[derive(Debug, Default, Deserialize)]
struct Timelines {
    #[serde(default)]
    hourly: Option<Vec<WeatherEntry>>,
    #[serde(default)]
    daily: Option<Vec<WeatherEntry>>,
}

impl Timelines {
    fn take(self, granularity: HistoryGranularity) -> Option<Vec<WeatherEntry>> {
        match granularity {
            HistoryGranularity::Hourly => self.hourly,
            HistoryGranularity::Daily => self.daily,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TimelinesResponse {
    timelines: Option<Timelines>,
    #[serde(default)]
    location: LocationEcho,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

fn parse_realtime(body: &str) -> Result<WeatherPayload, ProviderError> {
    let parsed: RealtimeResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("realtime JSON: {e}")))?;

    let entry = parsed
        .data
        .ok_or_else(|| ProviderError::Malformed("realtime response has no data block".into()))?;

    Ok(WeatherPayload {
        kind: FetchKind::Realtime,
        location: parsed.location,
        entries: vec![entry],
        fetched_at: Utc::now(),
    })
}

fn parse_timelines(
    body: &str,
    kind: FetchKind,
    granularity: HistoryGranularity,
) -> Result<WeatherPayload, ProviderError> {
    let parsed: TimelinesResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("{} JSON: {e}", kind.label())))?;

    let entries = parsed
        .timelines
        .and_then(|t| t.take(granularity))
        .ok_or_else(|| {
            ProviderError::Malformed(format!("response has no {granularity} timeline"))
        })?;

    Ok(WeatherPayload { kind, location: parsed.location, entries, fetched_at: Utc::now() })
}

fn classify_failure(status: StatusCode, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| truncate_body(body));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Authentication(message),
        StatusCode::NOT_FOUND => ProviderError::NotFound(message),
        other => ProviderError::Status { status: other.as_u16(), message },
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[async_trait]
impl WeatherProvider for TomorrowIoProvider {
    #[instrument(skip(self, location), fields(location = %location))]
    async fn fetch_realtime(&self, location: &Location) -> Result<WeatherPayload, ProviderError> {
        let body = self.get("realtime", location).await?;
        parse_realtime(&body)
    }

    #[instrument(skip(self, location), fields(location = %location))]
    async fn fetch_forecast(&self, location: &Location) -> Result<WeatherPayload, ProviderError> {
        let body = self.get("forecast", location).await?;
        parse_timelines(&body, FetchKind::Forecast, HistoryGranularity::Daily)
    }

    #[instrument(skip(self, location), fields(location = %location))]
    async fn fetch_history(
        &self,
        location: &Location,
        granularity: HistoryGranularity,
    ) -> Result<WeatherPayload, ProviderError> {
        let body = self.get("history/recent", location).await?;
        parse_timelines(&body, FetchKind::History(granularity), granularity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realtime_body_parses_single_entry() {
        let body = r#"{
            "data": {"time": "2024-05-01T10:00:00Z", "values": {"temperature": 21.5, "visibility": 16}},
            "location": {"lat": 43.65, "lon": -79.38, "name": "Toronto", "type": "administrative"}
        }"#;

        let payload = parse_realtime(body).expect("should parse");
        assert_eq!(payload.kind, FetchKind::Realtime);
        assert_eq!(payload.entries.len(), 1);
        assert_eq!(payload.entries[0].time, "2024-05-01T10:00:00Z");
        assert_eq!(payload.entries[0].values.temperature, Some(21.5));
        assert_eq!(payload.location.name.as_deref(), Some("Toronto"));
        assert_eq!(payload.location.kind.as_deref(), Some("administrative"));
    }

    #[test]
    fn realtime_without_data_is_malformed() {
        let err = parse_realtime(r#"{"location": {"lat": 1, "lon": 2}}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn history_picks_requested_granularity() {
        let body = r#"{
            "timelines": {
                "hourly": [{"time": "h1", "values": {}}, {"time": "h2", "values": {}}],
                "daily": [{"time": "d1", "values": {"temperatureMax": 30}}]
            },
            "location": {"lat": 1, "lon": 2}
        }"#;

        let daily = parse_timelines(
            body,
            FetchKind::History(HistoryGranularity::Daily),
            HistoryGranularity::Daily,
        )
        .expect("daily");
        assert_eq!(daily.entries.len(), 1);
        assert_eq!(daily.entries[0].values.temperature_max, Some(30.0));

        let hourly = parse_timelines(
            body,
            FetchKind::History(HistoryGranularity::Hourly),
            HistoryGranularity::Hourly,
        )
        .expect("hourly");
        assert_eq!(hourly.entries.len(), 2);
    }

    #[test]
    fn missing_timeline_is_malformed() {
        let body = r#"{"timelines": {"hourly": []}, "location": {}}"#;
        let err = parse_timelines(body, FetchKind::Forecast, HistoryGranularity::Daily).unwrap_err();
        assert!(err.to_string().contains("no daily timeline"));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = parse_timelines("<html>", FetchKind::Forecast, HistoryGranularity::Daily)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[test]
    fn failures_are_classified_by_status() {
        let auth = classify_failure(
            StatusCode::UNAUTHORIZED,
            r#"{"code": 401001, "type": "Invalid Auth", "message": "The method requires authentication but it was not presented or is invalid."}"#,
        );
        match auth {
            ProviderError::Authentication(msg) => assert!(msg.contains("requires authentication")),
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            classify_failure(StatusCode::NOT_FOUND, "nope"),
            ProviderError::NotFound(msg) if msg == "nope"
        ));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, "{}"),
            ProviderError::Status { status: 429, .. }
        ));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
