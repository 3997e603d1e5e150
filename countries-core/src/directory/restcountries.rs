use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    model::{Coordinates, Country},
    provider::truncate_body,
};

use super::CountryDirectory;

pub const DEFAULT_DIRECTORY_URL: &str = "https://studies.cs.helsinki.fi/restcountries/api/all";

#[derive(Debug, Clone)]
pub struct RestCountriesDirectory {
    url: String,
    http: Client,
}

impl RestCountriesDirectory {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), http: Client::new() }
    }
}

impl Default for RestCountriesDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_DIRECTORY_URL)
    }
}

#[derive(Debug, Deserialize)]
struct RcName {
    common: String,
}

#[derive(Debug, Default, Deserialize)]
struct RcFlags {
    svg: Option<String>,
    png: Option<String>,
    alt: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RcCountry {
    name: RcName,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    area: f64,
    #[serde(default)]
    languages: BTreeMap<String, String>,
    #[serde(default)]
    flags: RcFlags,
    #[serde(default)]
    latlng: Vec<f64>,
}

impl RcCountry {
    fn into_country(self) -> Option<Country> {
        let coordinates = match self.latlng.as_slice() {
            [lat, lng] => Coordinates::new(*lat, *lng),
            _ => {
                tracing::warn!(country = %self.name.common, "skipping country without coordinates");
                return None;
            }
        };

        Some(Country {
            common_name: self.name.common,
            capital: self.capital,
            area_km2: self.area,
            languages: self.languages,
            flag_image_ref: self.flags.svg.or(self.flags.png).unwrap_or_default(),
            flag_alt: self.flags.alt,
            coordinates,
        })
    }
}

fn parse_all(body: &str) -> Result<Vec<Country>> {
    let parsed: Vec<RcCountry> =
        serde_json::from_str(body).context("Failed to parse country directory JSON")?;

    Ok(parsed.into_iter().filter_map(RcCountry::into_country).collect())
}

#[async_trait]
impl CountryDirectory for RestCountriesDirectory {
    async fn fetch_all(&self) -> Result<Vec<Country>> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to country directory ({})", self.url))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read country directory response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Country directory request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        parse_all(&body)
    }
}
