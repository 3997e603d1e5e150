use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::Country;

pub mod restcountries;

pub use restcountries::RestCountriesDirectory;

/// Source of the full country dataset. Fetched once per session.
#[async_trait]
pub trait CountryDirectory: Send + Sync + Debug {
    async fn fetch_all(&self) -> anyhow::Result<Vec<Country>>;
}
