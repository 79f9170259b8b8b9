use anyhow::Context;
use dashboard_core::{Config, Coordinates};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode};

/// Interactive setup of the API key and the fixed position.
pub fn run() -> anyhow::Result<()> {
    let path = Config::config_file_path()?;
    // Read the file directly so an env override is never written back.
    let mut config = Config::load_from(&path)?;

    let prompt = if config.has_api_key() {
        "Tomorrow.io API key (leave empty to keep the current one):"
    } else {
        "Tomorrow.io API key:"
    };
    let key = Password::new(prompt)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    config.override_api_key(Some(key));

    let share = Confirm::new("Share a fixed position with the dashboard?")
        .with_default(config.geolocation.is_some())
        .with_help_message("Without one, views ask for a location instead.")
        .prompt()?;

    config.geolocation = if share {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number")
            .with_validator(|v: &f64| {
                Ok(if (-90.0..=90.0).contains(v) {
                    inquire::validator::Validation::Valid
                } else {
                    inquire::validator::Validation::Invalid("Latitude must be within -90..90".into())
                })
            })
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number")
            .with_validator(|v: &f64| {
                Ok(if (-180.0..=180.0).contains(v) {
                    inquire::validator::Validation::Valid
                } else {
                    inquire::validator::Validation::Invalid(
                        "Longitude must be within -180..180".into(),
                    )
                })
            })
            .prompt()?;
        Some(Coordinates { latitude, longitude })
    } else {
        None
    };

    config.save_to(&path)?;
    println!("Saved configuration to {}", path.display());

    if !config.has_api_key() {
        println!("No API key stored yet; every fetch will fail until one is set.");
    }

    Ok(())
}
