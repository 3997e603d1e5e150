use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use countries_core::{
    Config, ProviderId, RestCountriesDirectory, Session, SessionHandle, ViewMode, ViewSnapshot,
    WeatherProvider, provider::default_provider_from_config,
};
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};

use crate::render;

const KEEP_SEARCHING: &str = "(keep searching)";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "countries", version, about = "Find a country and the weather in its capital")]
pub struct Cli {
    /// Weather provider to use instead of the configured default.
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// API key for the weather provider; overrides the stored key.
    #[arg(long, global = true, env = "COUNTRIES_WEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific weather provider.
    Configure {
        /// Provider short name, e.g. "openweather" or "weatherapi".
        provider: String,
    },

    /// Search countries by (partial) name.
    Search {
        /// Case-insensitive part of the country's common name.
        query: String,

        /// Show this country from the matches, even if there are several.
        #[arg(long)]
        pick: Option<String>,
    },

    /// Search repeatedly, narrowing the matches as you type. Esc quits.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match &self.command {
            Command::Configure { provider } => configure(provider),
            Command::Search { query, pick } => {
                let handle = self.start_session()?;
                search(&handle, query, pick.as_deref()).await
            }
            Command::Interactive => {
                let handle = self.start_session()?;
                interactive(&handle).await
            }
        }
    }

    fn start_session(&self) -> anyhow::Result<SessionHandle> {
        let mut config = Config::load()?;

        if let Some(name) = &self.provider {
            config.set_default_provider(name.parse()?);
        }
        if let Some(key) = &self.api_key {
            let id = config.default_provider_id().unwrap_or(ProviderId::OpenWeather);
            config.store_api_key(id, key.clone());
            config.set_default_provider(id);
        }

        let weather: Arc<dyn WeatherProvider> = Arc::from(default_provider_from_config(&config)?);
        let directory = Arc::new(RestCountriesDirectory::new(config.directory_url()));
        tracing::debug!(directory = config.directory_url(), "starting session");

        Ok(Session::start(directory, weather))
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id: ProviderId = provider.parse()?;
    let mut config = Config::load()?;

    if config.has_api_key(id) {
        let replace = Confirm::new(&format!("A key for {id} is already stored. Replace it?"))
            .with_default(false)
            .prompt()
            .context("Failed to read answer")?;
        if !replace {
            return Ok(());
        }
    }

    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.store_api_key(id, api_key.trim().to_string());

    if config.default_provider_id().ok() != Some(id) {
        let make_default = Confirm::new(&format!("Make {id} the default provider?"))
            .with_default(true)
            .prompt()
            .context("Failed to read answer")?;
        if make_default {
            config.set_default_provider(id);
        }
    }

    let path = config.save()?;
    println!("Saved credentials for {id} to {}", path.display());
    Ok(())
}

async fn search(handle: &SessionHandle, query: &str, pick: Option<&str>) -> anyhow::Result<()> {
    handle.wait_until_settled().await?;
    let mut snapshot = handle.set_query(query).await?;

    if let Some(name) = pick {
        snapshot = match handle.select_by_name(name).await? {
            Some(snapshot) => snapshot,
            None => bail!("'{name}' is not among the countries matching '{query}'"),
        };
    }

    if snapshot.weather.is_pending() {
        snapshot = handle.wait_until_settled().await?;
    }
    print!("{}", render::render(&snapshot));
    Ok(())
}

async fn interactive(handle: &SessionHandle) -> anyhow::Result<()> {
    print!("{}", render::render(&handle.snapshot()));
    let loaded = handle.wait_until_settled().await?;
    if !matches!(loaded.load, countries_core::LoadStatus::Loaded { .. }) {
        print!("{}", render::render(&loaded));
    }

    let mut query = String::new();
    loop {
        let Some(input) = Text::new("Search:")
            .with_initial_value(&query)
            .prompt_skippable()
            .context("Failed to read search text")?
        else {
            break;
        };
        query = input;

        let snapshot = handle.set_query(query.as_str()).await?;
        show(handle, snapshot.clone()).await?;

        if snapshot.mode == ViewMode::List && snapshot.subset.len() > 1 {
            let mut options = vec![KEEP_SEARCHING.to_string()];
            options.extend(snapshot.subset.iter().map(|c| c.common_name.clone()));

            let choice = Select::new("Show one of these?", options)
                .prompt_skippable()
                .context("Failed to read selection")?;
            if let Some(name) = choice.filter(|name| name != KEEP_SEARCHING) {
                if let Some(picked) = handle.select_by_name(name).await? {
                    show(handle, picked).await?;
                }
            }
        }
    }
    Ok(())
}

/// Print a snapshot; if weather is still on its way, print it again once it lands.
async fn show(handle: &SessionHandle, snapshot: ViewSnapshot) -> anyhow::Result<()> {
    print!("{}", render::render(&snapshot));

    if let Some(country) = snapshot.single().filter(|_| snapshot.weather.is_pending()) {
        let settled = handle.wait_until_settled().await?;
        if settled.single().map(|c| c.key()) == Some(country.key()) {
            print!("{}", render::render_weather(country, &settled.weather));
        }
    }
    Ok(())
}
