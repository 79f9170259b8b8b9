use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use dashboard_core::{Config, Coordinates, FetchKind, HistoryGranularity, ThemeStore};

use crate::{configure, dashboard::Session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Real-time weather, forecasts and recent history")]
pub struct Cli {
    /// Verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Start the session in dark mode.
    #[arg(long, global = true)]
    pub dark: bool,

    /// Act as if the user refused to share their position.
    #[arg(long, global = true)]
    pub no_geolocation: bool,

    /// Current latitude, overriding the configured position.
    #[arg(long, global = true, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Current longitude, overriding the configured position.
    #[arg(long, global = true, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Granularity {
    Hourly,
    Daily,
}

impl From<Granularity> for HistoryGranularity {
    fn from(value: Granularity) -> Self {
        match value {
            Granularity::Hourly => HistoryGranularity::Hourly,
            Granularity::Daily => HistoryGranularity::Daily,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the interactive dashboard (default).
    Dashboard,

    /// Show real-time weather.
    Realtime {
        /// "lat,lon" or a place name; defaults to the current position.
        location: Option<String>,
    },

    /// Show the daily forecast.
    Forecast {
        /// "lat,lon" or a place name; defaults to the current position.
        location: Option<String>,
    },

    /// Show recent weather history.
    History {
        /// "lat,lon" or a place name.
        location: String,

        #[arg(long, value_enum, default_value_t = Granularity::Hourly)]
        granularity: Granularity,
    },

    /// Store the API key and current position.
    Configure,

    /// Print where the configuration file lives.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let theme = ThemeStore::new(self.dark);

        match self.command.unwrap_or(Command::Dashboard) {
            Command::Configure => configure::run(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
            command => {
                let mut config = Config::load()?;
                if let (Some(latitude), Some(longitude)) = (self.lat, self.lon) {
                    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                        bail!("--lat must be within -90..90 and --lon within -180..180");
                    }
                    config.geolocation = Some(Coordinates { latitude, longitude });
                }

                let session = Session::new(&config, self.no_geolocation, theme);
                match command {
                    Command::Realtime { location } => session.show(FetchKind::Realtime, location).await,
                    Command::Forecast { location } => session.show(FetchKind::Forecast, location).await,
                    Command::History { location, granularity } => {
                        session.show(FetchKind::History(granularity.into()), Some(location)).await
                    }
                    _ => session.run_home().await,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_dashboard() {
        let cli = Cli::try_parse_from(["weather-dashboard"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(!cli.dark);
    }

    #[test]
    fn history_parses_granularity() {
        let cli = Cli::try_parse_from([
            "weather-dashboard",
            "history",
            "Berlin",
            "--granularity",
            "daily",
        ])
        .expect("parse");

        match cli.command {
            Some(Command::History { location, granularity }) => {
                assert_eq!(location, "Berlin");
                assert_eq!(HistoryGranularity::from(granularity), HistoryGranularity::Daily);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn coordinates_accept_negative_values() {
        let cli = Cli::try_parse_from([
            "weather-dashboard",
            "--lat",
            "-33.86",
            "--lon",
            "151.2",
            "realtime",
        ])
        .expect("parse");
        assert_eq!(cli.lat, Some(-33.86));
        assert_eq!(cli.lon, Some(151.2));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["weather-dashboard", "forecast", "Oslo", "--dark", "-vv"])
            .expect("parse");
        assert!(cli.dark);
        assert_eq!(cli.verbose, 2);
    }
}
