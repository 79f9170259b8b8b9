//! Core library for the `weather-dashboard` terminal app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The Tomorrow.io provider client
//! - Location resolution (geolocation vs. manual entry)
//! - The per-view fetch state machine
//! - The session theme store and card rendering
//!
//! It is used by `dashboard-cli`, but holds no terminal I/O itself.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod render;
pub mod theme;

pub use config::Config;
pub use error::{DashboardError, ErrorCategory, ProviderError};
pub use location::{Geolocation, GeolocationError, GeolocationPolicy, LocationResolver};
pub use model::{
    Coordinates, FetchKind, FetchRequest, HistoryGranularity, Location, WeatherPayload,
};
pub use orchestrator::{FetchOrchestrator, FetchState, FetchStatus, Notification, ViewEvent, ViewState};
pub use provider::{WeatherProvider, provider_from_config};
pub use theme::{Palette, ThemeStore};
