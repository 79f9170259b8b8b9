use std::{fmt, sync::Arc};

use anyhow::Context;
use dashboard_core::{
    Config, FetchKind, FetchOrchestrator, Geolocation, GeolocationPolicy, HistoryGranularity,
    Notification, ThemeStore, WeatherProvider,
    location::geolocation_from_config,
    provider_from_config,
    render::{self, APP_TITLE, HOME_BLURB},
};
use inquire::{InquireError, Select, Text};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

use crate::output;

fn policy_for(kind: FetchKind) -> GeolocationPolicy {
    match kind {
        FetchKind::Realtime | FetchKind::Forecast => GeolocationPolicy::AutoFetch,
        FetchKind::History(_) => GeolocationPolicy::Advisory,
    }
}

fn fetch_label(kind: FetchKind) -> &'static str {
    match kind {
        FetchKind::History(_) => "Get History",
        _ => "Get Forecast",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HomeChoice {
    Realtime,
    History,
    Forecast,
    ToggleTheme,
    Quit,
}

impl fmt::Display for HomeChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HomeChoice::Realtime => "Real-Time Forecasting",
            HomeChoice::History => "Weather Recent History",
            HomeChoice::Forecast => "Weather Forecasting",
            HomeChoice::ToggleTheme => "Toggle dark mode",
            HomeChoice::Quit => "Quit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewChoice {
    Fetch(&'static str),
    DataType,
    Relocate,
    ToggleTheme,
    BackHome,
}

impl fmt::Display for ViewChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewChoice::Fetch(label) => f.write_str(label),
            ViewChoice::DataType => f.write_str("Change data type"),
            ViewChoice::Relocate => f.write_str("Use current position"),
            ViewChoice::ToggleTheme => f.write_str("Toggle dark mode"),
            ViewChoice::BackHome => f.write_str("Back Home"),
        }
    }
}

/// Everything views share for the lifetime of the app.
#[derive(Debug)]
pub struct Session {
    provider: Arc<dyn WeatherProvider>,
    geolocation: Arc<dyn Geolocation>,
    theme: ThemeStore,
}

struct OpenView {
    orchestrator: FetchOrchestrator,
    notifications: mpsc::UnboundedReceiver<Notification>,
}

impl Session {
    pub fn new(config: &Config, deny_geolocation: bool, theme: ThemeStore) -> Self {
        Self {
            provider: provider_from_config(config),
            geolocation: geolocation_from_config(config, deny_geolocation),
            theme,
        }
    }

    fn open(&self, kind: FetchKind) -> OpenView {
        let (orchestrator, notifications) =
            FetchOrchestrator::new(kind, policy_for(kind), Arc::clone(&self.provider));
        OpenView { orchestrator, notifications }
    }

    /// Wait for the in-flight request, then show the view and any notifications.
    async fn settle(&self, view: &mut OpenView, handle: Option<JoinHandle<()>>) -> anyhow::Result<()> {
        if let Some(handle) = handle {
            output::view(&view.orchestrator.snapshot(), self.theme.palette());
            handle.await.context("Fetch task failed")?;
        }

        while let Ok(note) = view.notifications.try_recv() {
            output::notification(&note, self.theme.palette());
        }
        output::view(&view.orchestrator.snapshot(), self.theme.palette());
        Ok(())
    }

    /// One-shot: fetch once and print.
    pub async fn show(&self, kind: FetchKind, location: Option<String>) -> anyhow::Result<()> {
        let mut view = self.open(kind);
        output::banner(render::view_title(kind), self.theme.palette());

        let handle = match location {
            Some(text) => view.orchestrator.submit_manual(text),
            None => view.orchestrator.locate(self.geolocation.as_ref()).await,
        };
        let issued = handle.is_some();
        self.settle(&mut view, handle).await?;

        if !issued && view.orchestrator.snapshot().manual_entry_visible() {
            println!("Pass a LOCATION (\"lat,lon\" or a place name) to query manually.");
        }
        Ok(())
    }

    /// Home menu loop.
    pub async fn run_home(&self) -> anyhow::Result<()> {
        let choices = vec![
            HomeChoice::Realtime,
            HomeChoice::History,
            HomeChoice::Forecast,
            HomeChoice::ToggleTheme,
            HomeChoice::Quit,
        ];

        loop {
            let palette = self.theme.palette();
            output::banner(APP_TITLE, palette);
            println!("{HOME_BLURB}");

            let choice = match Select::new("Where to?", choices.clone()).prompt() {
                Ok(choice) => choice,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            match choice {
                HomeChoice::Realtime => self.run_view(FetchKind::Realtime).await?,
                HomeChoice::Forecast => self.run_view(FetchKind::Forecast).await?,
                HomeChoice::History => {
                    self.run_view(FetchKind::History(HistoryGranularity::default())).await?
                }
                HomeChoice::ToggleTheme => {
                    self.theme.toggle();
                }
                HomeChoice::Quit => return Ok(()),
            }
        }
    }

    async fn run_view(&self, kind: FetchKind) -> anyhow::Result<()> {
        let mut view = self.open(kind);
        output::banner(render::view_title(kind), self.theme.palette());

        let handle = view.orchestrator.locate(self.geolocation.as_ref()).await;
        self.settle(&mut view, handle).await?;

        loop {
            let state = view.orchestrator.snapshot();

            let mut choices = Vec::new();
            if state.manual_entry_visible() {
                choices.push(ViewChoice::Fetch(fetch_label(state.kind())));
            }
            if let FetchKind::History(_) = state.kind() {
                choices.push(ViewChoice::DataType);
            }
            if state.is_geolocation_available() && policy_for(kind) == GeolocationPolicy::AutoFetch {
                choices.push(ViewChoice::Relocate);
            }
            choices.push(ViewChoice::ToggleTheme);
            choices.push(ViewChoice::BackHome);

            let choice = match Select::new("Action:", choices).prompt() {
                Ok(choice) => choice,
                Err(InquireError::OperationCanceled) => ViewChoice::BackHome,
                Err(e) => return Err(e.into()),
            };

            match choice {
                ViewChoice::Fetch(_) => {
                    let suggestion =
                        state.resolver().position().map(|p| format!("{},{}", p.latitude, p.longitude));
                    let mut prompt =
                        Text::new("Enter Location (latitude, longitude or location name):");
                    if let Some(s) = suggestion.as_deref() {
                        prompt = prompt.with_placeholder(s);
                    }

                    let text = match prompt.prompt() {
                        Ok(text) => text,
                        Err(InquireError::OperationCanceled) => continue,
                        Err(e) => return Err(e.into()),
                    };
                    let handle = view.orchestrator.submit_manual(text);
                    self.settle(&mut view, handle).await?;
                }
                ViewChoice::DataType => {
                    let granularity = Select::new(
                        "Data Type",
                        vec![HistoryGranularity::Hourly, HistoryGranularity::Daily],
                    )
                    .prompt()?;
                    debug!(%granularity, "history granularity changed");
                    view.orchestrator.set_granularity(granularity);
                }
                ViewChoice::Relocate => {
                    let handle = view.orchestrator.locate(self.geolocation.as_ref()).await;
                    self.settle(&mut view, handle).await?;
                }
                ViewChoice::ToggleTheme => {
                    self.theme.toggle();
                    output::view(&view.orchestrator.snapshot(), self.theme.palette());
                }
                ViewChoice::BackHome => return Ok(()),
            }
        }
    }
}
