use std::sync::Arc;

use crate::{
    error::FinderError,
    model::{Country, CountryRef, LoadStatus},
};

/// Holds the full country dataset for one session.
///
/// The dataset is only ever replaced wholesale.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    state: DatasetState,
}

#[derive(Debug, Clone, Default)]
enum DatasetState {
    #[default]
    Loading,
    Loaded(Arc<[CountryRef]>),
    Failed(FinderError),
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, countries: Vec<Country>) {
        let dataset: Arc<[CountryRef]> = countries.into_iter().map(Arc::new).collect();
        self.state = DatasetState::Loaded(dataset);
    }

    pub fn fail(&mut self, err: FinderError) {
        self.state = DatasetState::Failed(err);
    }

    /// The loaded dataset, or an empty slice while loading or after a failure.
    pub fn countries(&self) -> &[CountryRef] {
        match &self.state {
            DatasetState::Loaded(dataset) => &dataset[..],
            DatasetState::Loading | DatasetState::Failed(_) => &[],
        }
    }

    pub fn status(&self) -> LoadStatus {
        match &self.state {
            DatasetState::Loading => LoadStatus::Loading,
            DatasetState::Loaded(dataset) => LoadStatus::Loaded { count: dataset.len() },
            DatasetState::Failed(err) => LoadStatus::Failed { reason: err.to_string() },
        }
    }
}
