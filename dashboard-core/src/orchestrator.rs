//! Per-view fetch state machine.
//!
//! Every view owns one [`FetchOrchestrator`]. Geolocation outcomes, manual
//! submissions and request completions all go through [`ViewState::reduce`],
//! which mutates the state in one step and returns the [`Effect`]s to run.
//! The `throttled` flag is checked and set inside that step, so at most one
//! request is ever in flight per view.

use std::sync::{Arc, Weak};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    error::{DashboardError, ErrorCategory, ProviderError},
    location::{Geolocation, GeolocationError, GeolocationPolicy, LocationResolver, Resolution},
    model::{Coordinates, FetchKind, FetchRequest, HistoryGranularity, WeatherPayload},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct FetchState {
    pub status: FetchStatus,
    pub throttled: bool,
    pub data: Option<WeatherPayload>,
    pub error_message: Option<String>,
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }
}

/// A dismissible, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub category: ErrorCategory,
    pub message: String,
    /// Underlying cause, for display below the message.
    pub detail: Option<String>,
}

impl Notification {
    fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self { category, message: message.into(), detail: None }
    }
}

#[derive(Debug)]
pub enum ViewEvent {
    /// A new geolocation attempt starts.
    GeolocationRequested,
    GeolocationResolved(Coordinates),
    GeolocationFailed(GeolocationError),
    ManualSubmitted(String),
    Completed(Result<WeatherPayload, ProviderError>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Issue(FetchRequest),
    Notify(Notification),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TriggerOrigin {
    Geolocation,
    Manual,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    kind: FetchKind,
    origin: TriggerOrigin,
}

/// Everything one view knows: where to query and how the last fetch went.
#[derive(Debug, Clone)]
pub struct ViewState {
    kind: FetchKind,
    resolver: LocationResolver,
    in_flight: Option<InFlight>,
    pub fetch: FetchState,
}

impl ViewState {
    pub fn new(kind: FetchKind, policy: GeolocationPolicy) -> Self {
        Self {
            kind,
            resolver: LocationResolver::new(policy),
            in_flight: None,
            fetch: FetchState::default(),
        }
    }

    pub fn kind(&self) -> FetchKind {
        self.kind
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    pub fn is_geolocation_available(&self) -> bool {
        self.resolver.is_geolocation_available()
    }

    /// The realtime view hides manual entry while geolocation works.
    pub fn manual_entry_visible(&self) -> bool {
        match self.kind {
            FetchKind::Realtime => !self.is_geolocation_available(),
            _ => true,
        }
    }

    /// Only history views have a granularity; later requests use the new one.
    pub fn set_granularity(&mut self, granularity: HistoryGranularity) {
        if let FetchKind::History(_) = self.kind {
            self.kind = FetchKind::History(granularity);
        }
    }

    pub fn reduce(&mut self, event: ViewEvent) -> Vec<Effect> {
        match event {
            ViewEvent::GeolocationRequested => {
                self.resolver.begin_attempt();
                Vec::new()
            }
            ViewEvent::GeolocationResolved(position) => {
                let resolution = self.resolver.on_position(position);
                self.apply(resolution, TriggerOrigin::Geolocation)
            }
            ViewEvent::GeolocationFailed(error) => {
                warn!(%error, "geolocation failed");
                let resolution = self.resolver.on_geolocation_error(error);
                self.apply(resolution, TriggerOrigin::Geolocation)
            }
            ViewEvent::ManualSubmitted(text) => {
                if self.fetch.throttled {
                    debug!("manual submission dropped, request in flight");
                    return Vec::new();
                }
                let resolution = self.resolver.on_manual(&text);
                self.apply(resolution, TriggerOrigin::Manual)
            }
            ViewEvent::Completed(result) => self.complete(result),
        }
    }

    fn apply(&mut self, resolution: Resolution, origin: TriggerOrigin) -> Vec<Effect> {
        match resolution {
            Resolution::Fetch(location) => {
                let request = FetchRequest { location, kind: self.kind };
                self.trigger(request, origin).into_iter().collect()
            }
            Resolution::Recorded | Resolution::Unavailable { notify: None } => Vec::new(),
            Resolution::Unavailable { notify: Some(message) } => vec![Effect::Notify(
                Notification::new(ErrorCategory::GeolocationUnavailable, message),
            )],
            Resolution::Rejected(message) => {
                let err = DashboardError::Validation(message.to_string());
                vec![Effect::Notify(Notification::new(err.category(), message))]
            }
        }
    }

    fn trigger(&mut self, request: FetchRequest, origin: TriggerOrigin) -> Option<Effect> {
        if self.fetch.throttled {
            debug!(location = %request.location, "trigger dropped, request in flight");
            return None;
        }

        self.fetch.throttled = true;
        self.fetch.status = FetchStatus::Loading;
        self.in_flight = Some(InFlight { kind: request.kind, origin });

        Some(Effect::Issue(request))
    }

    fn complete(&mut self, result: Result<WeatherPayload, ProviderError>) -> Vec<Effect> {
        let Some(in_flight) = self.in_flight.take() else {
            warn!("completion arrived with no request in flight");
            return Vec::new();
        };
        self.fetch.throttled = false;

        match result {
            Ok(payload) => {
                info!(kind = %in_flight.kind, entries = payload.entries.len(), "fetch succeeded");
                self.fetch.status = FetchStatus::Success;
                self.fetch.data = Some(payload);
                self.fetch.error_message = None;
                Vec::new()
            }
            Err(err) => {
                let err = DashboardError::from(err);
                warn!(kind = %in_flight.kind, error = %err, "fetch failed");

                let message = failure_message(in_flight);
                self.fetch.status = FetchStatus::Error;
                self.fetch.error_message = Some(message.clone());

                vec![Effect::Notify(Notification {
                    category: err.category(),
                    message,
                    detail: Some(err.to_string()),
                })]
            }
        }
    }
}

fn failure_message(in_flight: InFlight) -> String {
    let label = in_flight.kind.label();
    match (in_flight.origin, in_flight.kind) {
        (TriggerOrigin::Geolocation, _) => format!("Failed to fetch {label} data."),
        (TriggerOrigin::Manual, FetchKind::Realtime) => {
            format!("Failed to fetch {label} data for manual location.")
        }
        (TriggerOrigin::Manual, _) => format!("Failed to fetch {label} data for this location."),
    }
}

#[derive(Debug)]
struct Shared {
    state: watch::Sender<ViewState>,
    provider: Arc<dyn WeatherProvider>,
    notifications: mpsc::UnboundedSender<Notification>,
}

/// Runs a view's effects against a provider.
///
/// Requests run on spawned tasks that only hold a weak handle to the view;
/// once the orchestrator is dropped, late completions are discarded.
#[derive(Debug)]
pub struct FetchOrchestrator {
    shared: Arc<Shared>,
}

impl FetchOrchestrator {
    pub fn new(
        kind: FetchKind,
        policy: GeolocationPolicy,
        provider: Arc<dyn WeatherProvider>,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (state, _) = watch::channel(ViewState::new(kind, policy));
        let (notifications, rx) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared { state, provider, notifications });
        (Self { shared }, rx)
    }

    /// Whole-state snapshots, one per transition.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> ViewState {
        self.shared.state.borrow().clone()
    }

    pub fn set_granularity(&self, granularity: HistoryGranularity) {
        self.shared.state.send_modify(|state| state.set_granularity(granularity));
    }

    /// Feed one event; returns the spawned request if one was issued.
    pub fn dispatch(&self, event: ViewEvent) -> Option<JoinHandle<()>> {
        dispatch(&self.shared, event)
    }

    pub fn submit_manual(&self, text: impl Into<String>) -> Option<JoinHandle<()>> {
        self.dispatch(ViewEvent::ManualSubmitted(text.into()))
    }

    /// Run one geolocation attempt and feed its outcome.
    pub async fn locate(&self, geolocation: &dyn Geolocation) -> Option<JoinHandle<()>> {
        self.dispatch(ViewEvent::GeolocationRequested);

        let event = match geolocation.current_position().await {
            Ok(position) => ViewEvent::GeolocationResolved(position),
            Err(error) => ViewEvent::GeolocationFailed(error),
        };
        self.dispatch(event)
    }
}

fn dispatch(shared: &Arc<Shared>, event: ViewEvent) -> Option<JoinHandle<()>> {
    let mut effects = Vec::new();
    shared.state.send_modify(|state| effects = state.reduce(event));

    let mut issued = None;
    for effect in effects {
        match effect {
            Effect::Notify(notification) => {
                if shared.notifications.send(notification).is_err() {
                    debug!("notification dropped, nobody listening");
                }
            }
            Effect::Issue(request) => issued = Some(issue(shared, request)),
        }
    }
    issued
}

fn issue(shared: &Arc<Shared>, request: FetchRequest) -> JoinHandle<()> {
    let provider = Arc::clone(&shared.provider);
    let view: Weak<Shared> = Arc::downgrade(shared);

    debug!(location = %request.location, kind = %request.kind, "issuing request");
    tokio::spawn(async move {
        let result = provider.fetch(&request).await;

        let Some(shared) = view.upgrade() else {
            debug!(kind = %request.kind, "view dropped before response, discarding");
            return;
        };
        dispatch(&shared, ViewEvent::Completed(result));
    })
}
