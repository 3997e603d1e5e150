use crate::{
    Config, Coordinates, WeatherSnapshot,
    provider::{openweather::OpenWeatherProvider, weatherapi::WeatherApiProvider},
};
use async_trait::async_trait;
use std::{fmt, str::FromStr};

pub mod openweather;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::WeatherApi]
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ProviderId::all()
            .iter()
            .copied()
            .find(|id| id.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let supported: Vec<&str> = ProviderId::all().iter().map(ProviderId::as_str).collect();
                anyhow::anyhow!(
                    "Unknown provider '{value}'. Supported providers: {}.",
                    supported.join(", ")
                )
            })
    }
}

/// Current weather by coordinates.
#[async_trait]
pub trait WeatherProvider: Send + Sync + fmt::Debug {
    async fn fetch_current(&self, coordinates: Coordinates) -> anyhow::Result<WeatherSnapshot>;
}

/// Build the provider `id` with the key (and endpoint, if any) stored in `config`.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let settings = config.provider(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `countries configure {id}` and enter your API key."
        )
    })?;
    let api_key = settings.api_key.clone();
    let base_url = settings.base_url.as_deref();

    let boxed: Box<dyn WeatherProvider> = match (id, base_url) {
        (ProviderId::OpenWeather, Some(url)) => {
            Box::new(OpenWeatherProvider::with_base_url(api_key, url))
        }
        (ProviderId::OpenWeather, None) => Box::new(OpenWeatherProvider::new(api_key)),
        (ProviderId::WeatherApi, Some(url)) => {
            Box::new(WeatherApiProvider::with_base_url(api_key, url))
        }
        (ProviderId::WeatherApi, None) => Box::new(WeatherApiProvider::new(api_key)),
    };
    tracing::debug!(provider = %id, custom_endpoint = base_url.is_some(), "weather provider ready");

    Ok(boxed)
}

/// Build whichever provider `default_provider` names.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    provider_from_config(config.default_provider_id()?, config)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
