//! Picking the location a view queries.
//!
//! Two sources compete: the geolocation subsystem, which answers once per
//! attempt and may fail, and the user's manual input. [`LocationResolver`]
//! holds no I/O; it turns each event from either source into a
//! [`Resolution`] the orchestrator acts on.

use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;
use tracing::debug;

use crate::{
    Config,
    model::{Coordinates, Location},
};

pub const EMPTY_LOCATION_MESSAGE: &str = "Please enter a location.";
pub const GEOLOCATION_DENIED_MESSAGE: &str = "Geolocation is disabled or denied.";
pub const GEOLOCATION_UNSUPPORTED_MESSAGE: &str = "Geolocation is not available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timed out")]
    Timeout,
    #[error("geolocation is not supported")]
    Unsupported,
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::Unsupported => GEOLOCATION_UNSUPPORTED_MESSAGE,
            _ => GEOLOCATION_DENIED_MESSAGE,
        }
    }
}

/// "Get current position": one answer per call.
#[async_trait]
pub trait Geolocation: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// A device position taken from configuration.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl Geolocation for FixedPosition {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.0)
    }
}

/// The user refused to share a position.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeniedGeolocation;

#[async_trait]
impl Geolocation for DeniedGeolocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::PermissionDenied)
    }
}

/// No geolocation subsystem at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl Geolocation for NoGeolocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Build the geolocation source for this session.
pub fn geolocation_from_config(config: &Config, denied: bool) -> Arc<dyn Geolocation> {
    if denied {
        return Arc::new(DeniedGeolocation);
    }

    match config.geolocation {
        Some(position) => Arc::new(FixedPosition(position)),
        None => Arc::new(NoGeolocation),
    }
}

/// How a view treats a geolocation fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationPolicy {
    /// Fetch as soon as a position arrives, unless the user already typed one.
    AutoFetch,
    /// Remember the position; only manual submissions fetch.
    Advisory,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeolocationStatus {
    Pending,
    Available(Coordinates),
    Unavailable(GeolocationError),
}

/// What the caller should do after a location event.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Query this location.
    Fetch(Location),
    /// Nothing to fetch; position noted.
    Recorded,
    /// Geolocation failed. `notify` is set only for the first failure of an attempt.
    Unavailable { notify: Option<&'static str> },
    /// Manual input was rejected before any request.
    Rejected(&'static str),
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    policy: GeolocationPolicy,
    status: GeolocationStatus,
    failure_notified: bool,
    manual_submitted: bool,
}

impl LocationResolver {
    pub fn new(policy: GeolocationPolicy) -> Self {
        Self {
            policy,
            status: GeolocationStatus::Pending,
            failure_notified: false,
            manual_submitted: false,
        }
    }

    /// Manual entry is only offered once geolocation has given up.
    pub fn is_geolocation_available(&self) -> bool {
        matches!(self.status, GeolocationStatus::Available(_))
    }

    pub fn position(&self) -> Option<Coordinates> {
        match self.status {
            GeolocationStatus::Available(c) => Some(c),
            _ => None,
        }
    }

    /// Start a new geolocation attempt; re-arms the failure notification.
    ///
    /// An explicit attempt also lifts the manual override, so its fix fetches again.
    pub fn begin_attempt(&mut self) {
        self.status = GeolocationStatus::Pending;
        self.failure_notified = false;
        self.manual_submitted = false;
    }

    pub fn on_position(&mut self, position: Coordinates) -> Resolution {
        self.status = GeolocationStatus::Available(position);

        if self.policy == GeolocationPolicy::AutoFetch && !self.manual_submitted {
            debug!(?position, "geolocation fix, fetching automatically");
            Resolution::Fetch(position.into())
        } else {
            debug!(?position, "geolocation fix recorded");
            Resolution::Recorded
        }
    }

    pub fn on_geolocation_error(&mut self, error: GeolocationError) -> Resolution {
        self.status = GeolocationStatus::Unavailable(error);

        if self.failure_notified {
            return Resolution::Unavailable { notify: None };
        }
        self.failure_notified = true;

        Resolution::Unavailable { notify: Some(error.user_message()) }
    }

    /// Manual text is forwarded as-is; only blank input is refused.
    pub fn on_manual(&mut self, text: &str) -> Resolution {
        if text.trim().is_empty() {
            return Resolution::Rejected(EMPTY_LOCATION_MESSAGE);
        }

        self.manual_submitted = true;
        Resolution::Fetch(Location::Name(text.to_string()))
    }
}
