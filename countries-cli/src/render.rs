//! Plain-text rendering of a [`ViewSnapshot`].
//!
//! Everything here is a pure function of the snapshot.

use std::fmt::Write;

use chrono::Local;
use countries_core::{Country, LoadStatus, ViewMode, ViewSnapshot, WeatherView};

pub const TOO_MANY_NOTICE: &str = "Too many matches, specify another filter";

pub fn render(snapshot: &ViewSnapshot) -> String {
    let mut out = String::new();

    match &snapshot.load {
        LoadStatus::Loading => out.push_str("Loading countries...\n"),
        LoadStatus::Failed { reason } => {
            let _ = writeln!(out, "Could not load countries: {reason}");
        }
        LoadStatus::Loaded { .. } => {}
    }

    match snapshot.mode {
        ViewMode::TooMany => {
            let _ = writeln!(out, "{TOO_MANY_NOTICE}");
        }
        ViewMode::Single => {
            if let Some(country) = snapshot.single() {
                out.push_str(&render_country(country));
                out.push('\n');
                out.push_str(&render_weather(country, &snapshot.weather));
            }
        }
        // An empty subset renders as an empty list.
        ViewMode::List | ViewMode::Empty => {
            for country in snapshot.subset.iter() {
                let _ = writeln!(out, "  {}", country.common_name);
            }
        }
    }

    out
}

pub fn render_country(country: &Country) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", country.common_name);
    let _ = writeln!(out, "Capital: {}", country.capital_display());
    let _ = writeln!(out, "Area: {} km²", format_area(country.area_km2));

    match &country.flag_alt {
        Some(alt) => {
            let _ = writeln!(out, "Flag: {} ({alt})", country.flag_image_ref);
        }
        None => {
            let _ = writeln!(out, "Flag: {}", country.flag_image_ref);
        }
    }

    out.push_str("\nLanguages\n");
    for name in country.languages.values() {
        let _ = writeln!(out, "  - {name}");
    }
    out
}

pub fn render_weather(country: &Country, weather: &WeatherView) -> String {
    let place = if country.capital.is_empty() {
        country.common_name.clone()
    } else {
        country.capital_display()
    };

    let mut out = String::new();
    let _ = writeln!(out, "Weather in {place}");

    match weather {
        WeatherView::Ready(snapshot) => {
            let _ = writeln!(out, "Temperature: {}°C", snapshot.temperature_c);
            let _ = writeln!(out, "Conditions: {} ({})", snapshot.description, snapshot.condition_icon_ref);
            let _ = writeln!(out, "Wind: {} m/s", snapshot.wind_speed_mps);
            let _ = writeln!(
                out,
                "Observed: {} via {}",
                snapshot.observed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                snapshot.provider
            );
        }
        WeatherView::Pending => out.push_str("Loading weather data...\n"),
        WeatherView::Unavailable { reason } => {
            let _ = writeln!(out, "Weather unavailable ({reason})");
        }
        WeatherView::NotApplicable => {}
    }
    out
}

/// Area with thousands separators and at most three decimals.
pub fn format_area(area: f64) -> String {
    let rounded = (area * 1000.0).round() / 1000.0;
    let formatted = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), ""));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if rounded < 0.0 { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}
