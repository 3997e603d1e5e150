use std::{collections::BTreeMap, fmt, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Identity of a country within one load of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CountryKey(String);

impl CountryKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CountryKey {
    fn from(name: &str) -> Self {
        CountryKey(name.to_string())
    }
}

impl fmt::Display for CountryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub common_name: String,
    /// Some countries have several capitals, some have none.
    pub capital: Vec<String>,
    pub area_km2: f64,
    /// Language code -> display name.
    pub languages: BTreeMap<String, String>,
    pub flag_image_ref: String,
    pub flag_alt: Option<String>,
    pub coordinates: Coordinates,
}

impl Country {
    pub fn key(&self) -> CountryKey {
        CountryKey::from(self.common_name.as_str())
    }

    pub fn capital_display(&self) -> String {
        self.capital.join(", ")
    }
}

/// Countries are shared between the dataset and every subset derived from it.
pub type CountryRef = Arc<Country>;

/// Current conditions as reported by a weather provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub provider: String,
    pub temperature_c: f64,
    pub wind_speed_mps: f64,
    pub description: String,
    /// Fully resolved icon URI.
    pub condition_icon_ref: String,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    TooMany,
    Single,
    List,
    /// Reserved for a dedicated "no matches" view. [`crate::view::select_view`]
    /// never yields it: an empty subset is an empty `List`, and renderers
    /// matching on this variant treat it exactly like an empty `List`.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoadStatus {
    Loading,
    Loaded { count: usize },
    Failed { reason: String },
}

/// Weather as the view should render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WeatherView {
    NotApplicable,
    Pending,
    Ready(WeatherSnapshot),
    Unavailable { reason: String },
}

impl WeatherView {
    pub fn is_pending(&self) -> bool {
        matches!(self, WeatherView::Pending)
    }
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub revision: u64,
    pub query: String,
    pub load: LoadStatus,
    pub mode: ViewMode,
    pub subset: Arc<[CountryRef]>,
    pub weather: WeatherView,
}

impl ViewSnapshot {
    /// The selected country, if the view is in `Single` mode.
    pub fn single(&self) -> Option<&CountryRef> {
        match (self.mode, self.subset.first()) {
            (ViewMode::Single, Some(country)) => Some(country),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self.load, LoadStatus::Loading) && !self.weather.is_pending()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capital_display_joins_multiple_capitals() {
        let mut country = (*fixtures::country("South Africa", -29.0, 24.0)).clone();
        country.capital = vec!["Pretoria".into(), "Bloemfontein".into(), "Cape Town".into()];

        assert_eq!(country.capital_display(), "Pretoria, Bloemfontein, Cape Town");
    }

    #[test]
    fn key_is_common_name() {
        let country = fixtures::country("Finland", 64.0, 26.0);
        assert_eq!(country.key().as_str(), "Finland");
    }
}
