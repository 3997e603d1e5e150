use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    model::{Coordinates, WeatherSnapshot},
    provider::truncate_body,
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self { api_key, base_url: base_url.into(), http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

fn parse_current(body: &str) -> Result<WeatherSnapshot> {
    let parsed: OwCurrentResponse =
        serde_json::from_str(body).context("Failed to parse OpenWeather current JSON")?;

    let observed_at = parsed.dt.and_then(|ts| DateTime::from_timestamp(ts, 0)).unwrap_or_else(Utc::now);

    let (description, icon) = parsed
        .weather
        .first()
        .map(|w| (w.description.clone(), w.icon.as_str()))
        .unwrap_or_else(|| ("Unknown".to_string(), "01d"));

    Ok(WeatherSnapshot {
        provider: "openweather".to_string(),
        temperature_c: parsed.main.temp,
        wind_speed_mps: parsed.wind.speed,
        description,
        condition_icon_ref: format!("{ICON_BASE_URL}/{icon}@2x.png"),
        observed_at,
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, coordinates: Coordinates) -> Result<WeatherSnapshot> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let lat = coordinates.latitude.to_string();
        let lon = coordinates.longitude.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        parse_current(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISBON: &str = r#"{
        "coord": {"lon": -9.13, "lat": 38.72},
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 17.4, "feels_like": 17.1, "humidity": 82},
        "wind": {"speed": 5.66, "deg": 200},
        "dt": 1700000000,
        "name": "Lisbon"
    }"#;

    #[test]
    fn parses_current_weather() {
        let snapshot = parse_current(LISBON).expect("valid payload");

        assert_eq!(snapshot.provider, "openweather");
        assert_eq!(snapshot.temperature_c, 17.4);
        assert_eq!(snapshot.wind_speed_mps, 5.66);
        assert_eq!(snapshot.description, "light rain");
        assert_eq!(snapshot.condition_icon_ref, "https://openweathermap.org/img/wn/10d@2x.png");
        assert_eq!(snapshot.observed_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn missing_condition_falls_back() {
        let body = r#"{"main": {"temp": 1.0}, "wind": {"speed": 0.5}, "weather": []}"#;
        let snapshot = parse_current(body).expect("valid payload");

        assert_eq!(snapshot.description, "Unknown");
        assert!(snapshot.condition_icon_ref.ends_with("01d@2x.png"));
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let err = parse_current(r#"{"cod": 401, "message": "Invalid API key"}"#).unwrap_err();
        assert!(err.to_string().contains("Failed to parse OpenWeather"));
    }
}
