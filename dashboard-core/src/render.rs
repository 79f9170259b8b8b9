//! Turning fetched payloads into cards. Pure functions of state.

use std::fmt;

use crate::model::{FetchKind, LocationEcho, WeatherEntry, WeatherPayload};

pub const APP_TITLE: &str = "Weather Forecasting";
pub const HOME_BLURB: &str = "See Realtime and weather forecasting by clicking the respective buttons";

const UNKNOWN_LOCATION: &str = "Unknown";
const MISSING: &str = "n/a";

const SUNNY_FROM_C: f64 = 25.0;
const FOG_UP_TO_KM: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherIcon {
    Sunny,
    Fog,
    Thermometer,
}

impl WeatherIcon {
    /// Warm wins; otherwise low visibility means fog.
    pub fn select(temperature: Option<f64>, visibility: Option<f64>) -> Self {
        match (temperature, visibility) {
            (Some(t), _) if t >= SUNNY_FROM_C => WeatherIcon::Sunny,
            (Some(_), Some(v)) if v <= FOG_UP_TO_KM => WeatherIcon::Fog,
            _ => WeatherIcon::Thermometer,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeatherIcon::Sunny => "sunny",
            WeatherIcon::Fog => "fog",
            WeatherIcon::Thermometer => "thermometer",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            WeatherIcon::Sunny => "☀",
            WeatherIcon::Fog => "🌫",
            WeatherIcon::Thermometer => "🌡",
        }
    }
}

impl fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.glyph(), self.name())
    }
}

pub fn view_title(kind: FetchKind) -> &'static str {
    match kind {
        FetchKind::Realtime => "Real-Time Forecast",
        FetchKind::Forecast => "Weather Forecast",
        FetchKind::History(_) => "Weather Recent History",
    }
}

/// One entry of a payload, ready to print.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherCard {
    pub time: String,
    pub location_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub temperature: Option<f64>,
    pub visibility: Option<f64>,
    pub icon: WeatherIcon,
}

impl WeatherCard {
    pub fn new(entry: &WeatherEntry, location: &LocationEcho) -> Self {
        let temperature = entry.values.effective_temperature();
        let visibility = entry.values.effective_visibility();

        Self {
            time: entry.time.clone(),
            location_name: location
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            latitude: location.lat,
            longitude: location.lon,
            temperature,
            visibility,
            icon: WeatherIcon::select(temperature, visibility),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Time: {}", self.time),
            format!("Location: {}", self.location_name),
            format!("Latitude: {}", show(self.latitude)),
            format!("Longitude: {}", show(self.longitude)),
            format!("Temperature: {}°C", show(self.temperature)),
            format!("Visibility: {} km", show(self.visibility)),
            format!("Weather Icon: {}", self.icon),
        ]
    }
}

pub fn cards(payload: &WeatherPayload) -> Vec<WeatherCard> {
    payload.entries.iter().map(|e| WeatherCard::new(e, &payload.location)).collect()
}

fn show(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| MISSING.to_string())
}
