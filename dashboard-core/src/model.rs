use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic position as reported by the geolocation subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Where to query weather for.
///
/// Either a coordinate pair or a free-text query. Manual input always ends up
/// as `Name`, even when the user typed `"lat,lon"`: the provider accepts both
/// forms and the text is forwarded untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Coordinates(Coordinates),
    Name(String),
}

impl Location {
    /// The `location` query parameter sent to the provider.
    pub fn query(&self) -> String {
        match self {
            Location::Coordinates(c) => format!("{},{}", c.latitude, c.longitude),
            Location::Name(name) => name.clone(),
        }
    }
}

impl From<Coordinates> for Location {
    fn from(value: Coordinates) -> Self {
        Location::Coordinates(value)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryGranularity {
    #[default]
    Hourly,
    Daily,
}

impl HistoryGranularity {
    /// Key of the matching block under `timelines` in history responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryGranularity::Hourly => "hourly",
            HistoryGranularity::Daily => "daily",
        }
    }
}

impl fmt::Display for HistoryGranularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which provider endpoint a view talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Realtime,
    Forecast,
    History(HistoryGranularity),
}

impl FetchKind {
    pub fn label(&self) -> &'static str {
        match self {
            FetchKind::Realtime => "real-time forecast",
            FetchKind::Forecast => "weather forecast",
            FetchKind::History(_) => "weather history",
        }
    }
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchKind::History(g) => write!(f, "history ({g})"),
            other => f.write_str(other.label()),
        }
    }
}

/// One fetch, fixed for its whole lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub location: Location,
    pub kind: FetchKind,
}

/// The `location` block echoed back by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationEcho {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Measured or predicted values for one point in time.
///
/// Daily entries carry `*Max` aggregates, realtime and hourly entries the
/// plain fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherValues {
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub temperature_max: Option<f64>,
    #[serde(default)]
    pub visibility: Option<f64>,
    #[serde(default)]
    pub visibility_max: Option<f64>,
}

impl WeatherValues {
    pub fn effective_temperature(&self) -> Option<f64> {
        self.temperature_max.or(self.temperature)
    }

    pub fn effective_visibility(&self) -> Option<f64> {
        self.visibility_max.or(self.visibility)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherEntry {
    pub time: String,
    #[serde(default)]
    pub values: WeatherValues,
}

/// Parsed provider response for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPayload {
    pub kind: FetchKind,
    pub location: LocationEcho,
    pub entries: Vec<WeatherEntry>,
    pub fetched_at: DateTime<Utc>,
}
