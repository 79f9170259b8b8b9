use crossterm::style::{Color, Stylize};
use dashboard_core::{
    FetchStatus, Notification, Palette, ViewState,
    render::{self, WeatherCard},
    theme::Rgb,
};

fn color(rgb: Rgb) -> Color {
    Color::Rgb { r: rgb.0, g: rgb.1, b: rgb.2 }
}

pub fn banner(title: &str, palette: Palette) {
    let line = format!("  {title}  ");
    println!();
    println!(
        "{}",
        line.with(color(palette.text)).on(color(palette.background.0)).bold()
    );
}

pub fn card(card: &WeatherCard, palette: Palette) {
    let heading = format!(" {:<38}", "Weather Information");
    println!("{}", heading.with(color(palette.text)).on(color(palette.card.0)).bold());

    for line in card.lines() {
        let line = format!(" {line:<38}");
        println!("{}", line.with(color(palette.text)).on(color(palette.card.1)));
    }
    println!();
}

pub fn notification(note: &Notification, palette: Palette) {
    let text = format!(" ✖ {} ", note.message);
    eprintln!("{}", text.red().on(color(palette.toast_background)));
    if let Some(detail) = &note.detail {
        eprintln!("   {}", detail.as_str().dim());
    }
}

pub fn loading() {
    println!("{}", "⏳ Loading...".dim());
}

/// Loading spinner, then cards or the error line.
pub fn view(state: &ViewState, palette: Palette) {
    if state.fetch.is_loading() {
        loading();
        return;
    }

    if let Some(payload) = &state.fetch.data {
        for c in render::cards(payload) {
            card(&c, palette);
        }
        println!(
            "{}",
            format!(
                "Fetched at {}",
                payload.fetched_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
            )
            .dim()
        );
    }

    if let (FetchStatus::Error, Some(message)) = (state.fetch.status, &state.fetch.error_message) {
        println!("{}", message.as_str().red());
    }
}
