//! Core library for the `countries` finder.
//!
//! This crate defines:
//! - The country data model and the filter / view-mode policy
//! - The selection state machine and the weather orchestration that hangs
//!   off a single selected country
//! - An async session driver wiring both to the external services
//! - Abstractions over the country directory and weather providers
//! - Configuration & credentials handling
//!
//! It is used by `countries-cli`, but any front end that renders a
//! [`ViewSnapshot`] can drive it through a [`SessionHandle`].

pub mod config;
pub mod controller;
pub mod directory;
pub mod effect;
pub mod error;
pub mod filter;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod session;
pub mod store;
pub mod view;

pub use config::{Config, ProviderConfig};
pub use controller::FinderState;
pub use directory::{CountryDirectory, RestCountriesDirectory};
pub use error::FinderError;
pub use model::{
    Coordinates, Country, CountryKey, CountryRef, LoadStatus, ViewMode, ViewSnapshot, WeatherSnapshot,
    WeatherView,
};
pub use provider::{ProviderId, WeatherProvider};
pub use session::{Session, SessionHandle};
