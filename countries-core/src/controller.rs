use std::sync::Arc;

use crate::{
    effect::Effect,
    error::FinderError,
    filter::filter,
    model::{Country, CountryKey, CountryRef, ViewSnapshot, WeatherSnapshot},
    orchestrator::{Resolution, WeatherOrchestrator},
    store::DataStore,
    view::select_view,
};

/// Synchronous state of one finder session.
///
/// Every mutation replaces the filtered subset wholesale and tells the
/// weather orchestrator about it. Mutations return the effects the caller
/// has to run; nothing here performs I/O.
#[derive(Debug, Clone)]
pub struct FinderState {
    store: DataStore,
    query: String,
    subset: Arc<[CountryRef]>,
    weather: WeatherOrchestrator,
    revision: u64,
}

impl Default for FinderState {
    fn default() -> Self {
        Self {
            store: DataStore::new(),
            query: String::new(),
            subset: Arc::from(Vec::new()),
            weather: WeatherOrchestrator::new(),
            revision: 0,
        }
    }
}

impl FinderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subset(&self) -> &[CountryRef] {
        &self.subset
    }

    /// Store `text` verbatim and recompute the subset from the dataset.
    pub fn set_query(&mut self, text: impl Into<String>) -> Vec<Effect> {
        self.query = text.into();
        let subset = filter(self.store.countries(), &self.query);
        self.replace_subset(subset)
    }

    /// Show exactly `country`, leaving the query text alone.
    pub fn select_single(&mut self, country: CountryRef) -> Vec<Effect> {
        self.replace_subset(vec![country])
    }

    /// Install the directory result. The current query is re-applied so
    /// anything typed while loading takes effect.
    pub fn dataset_loaded(&mut self, result: anyhow::Result<Vec<Country>>) -> Vec<Effect> {
        match result {
            Ok(countries) => {
                tracing::info!(count = countries.len(), "country dataset loaded");
                self.store.replace(countries);
                let subset = filter(self.store.countries(), &self.query);
                self.replace_subset(subset)
            }
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "country dataset failed to load");
                self.store.fail(FinderError::load(&err));
                self.bump();
                Vec::new()
            }
        }
    }

    pub fn weather_resolved(
        &mut self,
        key: &CountryKey,
        result: anyhow::Result<WeatherSnapshot>,
    ) -> Resolution {
        let resolution = self.weather.resolve(key, result);
        if resolution == Resolution::Applied {
            self.bump();
        }
        resolution
    }

    /// Immutable view of the current state.
    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            revision: self.revision,
            query: self.query.clone(),
            load: self.store.status(),
            mode: select_view(&self.subset),
            subset: Arc::clone(&self.subset),
            weather: self.weather.view(),
        }
    }

    fn replace_subset(&mut self, subset: Vec<CountryRef>) -> Vec<Effect> {
        self.subset = subset.into();
        self.bump();
        self.weather.subset_replaced(&self.subset).into_iter().collect()
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LoadStatus, ViewMode, WeatherView, fixtures};

    fn loaded(names: &[&str]) -> FinderState {
        let mut state = FinderState::new();
        let countries = fixtures::dataset(names).iter().map(|c| (**c).clone()).collect();
        state.dataset_loaded(Ok(countries));
        state
    }

    fn names(state: &FinderState) -> Vec<String> {
        state.subset().iter().map(|c| c.common_name.clone()).collect()
    }

    #[test]
    fn query_before_load_yields_empty_subset() {
        let mut state = FinderState::new();
        let effects = state.set_query("spa");

        assert!(effects.is_empty());
        assert!(state.subset().is_empty());
        assert_eq!(state.snapshot().load, LoadStatus::Loading);
        assert_eq!(state.snapshot().mode, ViewMode::List);
    }

    #[test]
    fn query_typed_while_loading_applies_on_load() {
        let mut state = FinderState::new();
        state.set_query("portu");

        let countries = fixtures::dataset(&["Spain", "Portugal"]).iter().map(|c| (**c).clone()).collect();
        let effects = state.dataset_loaded(Ok(countries));

        assert_eq!(names(&state), ["Portugal"]);
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn narrowing_to_one_match_requests_weather() {
        let mut state = loaded(&["Spain", "Portugal", "Finland"]);

        state.set_query("a");
        assert_eq!(state.snapshot().mode, ViewMode::List);

        let effects = state.set_query("al");
        assert_eq!(names(&state), ["Portugal"]);
        assert_eq!(state.snapshot().mode, ViewMode::Single);

        let portugal = &state.subset()[0];
        assert_eq!(
            effects,
            vec![Effect::FetchWeather { key: portugal.key(), coordinates: portugal.coordinates }]
        );
    }

    #[test]
    fn too_many_matches_never_fetch() {
        let names: Vec<String> = (0..12).map(|i| format!("Country {i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut state = FinderState::new();
        let countries = fixtures::dataset(&refs).iter().map(|c| (**c).clone()).collect();

        let effects = state.dataset_loaded(Ok(countries));

        assert!(effects.is_empty());
        assert_eq!(state.snapshot().mode, ViewMode::TooMany);
        assert!(state.set_query("").is_empty());
    }

    #[test]
    fn select_single_keeps_query_text() {
        let mut state = loaded(&["Spain", "Portugal", "Finland"]);
        state.set_query("n");
        let finland = Arc::clone(&state.subset()[1]);

        let effects = state.select_single(Arc::clone(&finland));

        assert_eq!(names(&state), ["Finland"]);
        assert_eq!(state.snapshot().query, "n");
        assert_eq!(state.snapshot().mode, ViewMode::Single);
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn leaving_single_clears_weather() {
        let mut state = loaded(&["Spain", "Portugal", "Finland"]);
        state.set_query("fin");
        let key = state.subset()[0].key();
        state.weather_resolved(&key, Ok(fixtures::weather("openweather", -3.0)));
        assert!(matches!(state.snapshot().weather, WeatherView::Ready(_)));

        state.set_query("");

        assert_eq!(state.snapshot().weather, WeatherView::NotApplicable);
    }

    #[test]
    fn out_of_order_responses_keep_latest_selection() {
        let mut state = loaded(&["Spain", "Portugal", "Finland"]);
        state.set_query("spain");
        let spain = state.subset()[0].key();
        state.set_query("portugal");
        let portugal = state.subset()[0].key();

        state.weather_resolved(&portugal, Ok(fixtures::weather("portugal", 19.0)));
        let late = state.weather_resolved(&spain, Ok(fixtures::weather("spain", 30.0)));

        assert_eq!(late, Resolution::Stale);
        assert_eq!(
            state.snapshot().weather,
            WeatherView::Ready(fixtures::weather("portugal", 19.0))
        );
    }

    #[test]
    fn load_failure_keeps_session_usable() {
        let mut state = FinderState::new();
        state.dataset_loaded(Err(anyhow::anyhow!("HTTP 500")));

        assert!(matches!(state.snapshot().load, LoadStatus::Failed { .. }));
        assert!(state.set_query("x").is_empty());
        assert!(state.subset().is_empty());
    }

    #[test]
    fn revision_increases_on_each_change() {
        let mut state = loaded(&["Spain"]);
        let before = state.snapshot().revision;
        state.set_query("s");
        let after = state.snapshot().revision;
        assert!(after > before);

        let stale = CountryKey::from("Nowhere");
        state.weather_resolved(&stale, Ok(fixtures::weather("x", 0.0)));
        assert_eq!(state.snapshot().revision, after);
    }
}
