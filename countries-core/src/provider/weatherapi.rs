use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    model::{Coordinates, WeatherSnapshot},
    provider::truncate_body,
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self { api_key, base_url: base_url.into(), http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    wind_kph: f64,
    condition: WaCondition,
    last_updated_epoch: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
}

fn parse_current(body: &str) -> Result<WeatherSnapshot> {
    let parsed: WaResponse =
        serde_json::from_str(body).context("Failed to parse WeatherAPI current JSON")?;

    let current = parsed.current;
    let observed_at = current
        .last_updated_epoch
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);

    // Icons come back protocol-relative ("//cdn.weatherapi.com/...").
    let icon = match current.condition.icon.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => current.condition.icon,
    };

    Ok(WeatherSnapshot {
        provider: "weatherapi".to_string(),
        temperature_c: current.temp_c,
        wind_speed_mps: current.wind_kph / 3.6,
        description: current.condition.text,
        condition_icon_ref: icon,
        observed_at,
    })
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn fetch_current(&self, coordinates: Coordinates) -> Result<WeatherSnapshot> {
        let url = format!("{}/v1/current.json", self.base_url);
        let q = format!("{},{}", coordinates.latitude, coordinates.longitude);

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", q.as_str())])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (current)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI current response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        parse_current(&body)
    }
}
