use crate::{
    effect::Effect,
    error::FinderError,
    model::{CountryKey, CountryRef, WeatherSnapshot, WeatherView},
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum WeatherState {
    /// The subset does not hold exactly one country.
    #[default]
    Idle,
    Pending { country: CountryKey },
    Ready { country: CountryKey, snapshot: WeatherSnapshot },
    /// The fetch for the current selection failed.
    Unavailable { country: CountryKey, error: FinderError },
}

/// Outcome of feeding a fetch result back into the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// The result belongs to a country that is no longer selected, or to a
    /// superseded request for a selection that has already settled.
    Stale,
}

/// Tracks weather for the single selected country.
///
/// Results are matched to the selection by country identity, never by the
/// order requests were issued in. The first result for a pending selection
/// settles it; later results for the same country are stale.
#[derive(Debug, Clone, Default)]
pub struct WeatherOrchestrator {
    state: WeatherState,
}

impl WeatherOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &WeatherState {
        &self.state
    }

    /// Observe a replacement of the filtered subset.
    ///
    /// Any previous snapshot is dropped. A one-element subset requests a
    /// fresh fetch for that country.
    pub fn subset_replaced(&mut self, subset: &[CountryRef]) -> Option<Effect> {
        match subset {
            [only] => {
                let key = only.key();
                tracing::debug!(country = %key, coordinates = %only.coordinates, "requesting weather");
                self.state = WeatherState::Pending { country: key.clone() };
                Some(Effect::FetchWeather { key, coordinates: only.coordinates })
            }
            _ => {
                self.state = WeatherState::Idle;
                None
            }
        }
    }

    pub fn resolve(
        &mut self,
        key: &CountryKey,
        result: anyhow::Result<WeatherSnapshot>,
    ) -> Resolution {
        // Only a pending selection accepts a result. Once settled, anything
        // still arriving for the same country came from a superseded request.
        let awaiting = matches!(&self.state, WeatherState::Pending { country } if country == key);
        if !awaiting {
            tracing::debug!(country = %key, "discarding stale weather result");
            return Resolution::Stale;
        }

        self.state = match result {
            Ok(snapshot) => WeatherState::Ready { country: key.clone(), snapshot },
            Err(err) => {
                tracing::warn!(country = %key, error = %format!("{err:#}"), "weather fetch failed");
                WeatherState::Unavailable {
                    country: key.clone(),
                    error: FinderError::weather(key.clone(), &err),
                }
            }
        };
        Resolution::Applied
    }

    pub fn view(&self) -> WeatherView {
        match &self.state {
            WeatherState::Idle => WeatherView::NotApplicable,
            WeatherState::Pending { .. } => WeatherView::Pending,
            WeatherState::Ready { snapshot, .. } => WeatherView::Ready(snapshot.clone()),
            WeatherState::Unavailable { error, .. } => {
                WeatherView::Unavailable { reason: error.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{country, dataset, weather};

    #[test]
    fn single_subset_issues_fetch_keyed_by_country() {
        let mut orch = WeatherOrchestrator::new();
        let portugal = country("Portugal", 39.5, -8.0);

        let effect = orch.subset_replaced(std::slice::from_ref(&portugal));

        assert_eq!(
            effect,
            Some(Effect::FetchWeather { key: portugal.key(), coordinates: portugal.coordinates })
        );
        assert_eq!(orch.view(), WeatherView::Pending);
    }

    #[test]
    fn other_sizes_go_idle_without_fetch() {
        let mut orch = WeatherOrchestrator::new();
        assert_eq!(orch.subset_replaced(&dataset(&["Spain", "Portugal"])), None);
        assert_eq!(orch.subset_replaced(&[]), None);
        assert_eq!(orch.state(), &WeatherState::Idle);
        assert_eq!(orch.view(), WeatherView::NotApplicable);
    }

    #[test]
    fn matching_result_becomes_ready() {
        let mut orch = WeatherOrchestrator::new();
        let finland = country("Finland", 64.0, 26.0);
        orch.subset_replaced(std::slice::from_ref(&finland));

        let res = orch.resolve(&finland.key(), Ok(weather("openweather", -4.0)));

        assert_eq!(res, Resolution::Applied);
        assert_eq!(orch.view(), WeatherView::Ready(weather("openweather", -4.0)));
    }

    #[test]
    fn late_response_for_previous_selection_is_discarded() {
        let mut orch = WeatherOrchestrator::new();
        let c1 = country("Spain", 40.0, -4.0);
        let c2 = country("Portugal", 39.5, -8.0);

        orch.subset_replaced(std::slice::from_ref(&c1));
        orch.subset_replaced(std::slice::from_ref(&c2));

        assert_eq!(orch.resolve(&c2.key(), Ok(weather("c2", 18.0))), Resolution::Applied);
        assert_eq!(orch.resolve(&c1.key(), Ok(weather("c1", 25.0))), Resolution::Stale);
        assert_eq!(orch.view(), WeatherView::Ready(weather("c2", 18.0)));
    }

    #[test]
    fn stale_response_does_not_leave_pending() {
        let mut orch = WeatherOrchestrator::new();
        let c1 = country("Spain", 40.0, -4.0);
        let c2 = country("Portugal", 39.5, -8.0);

        orch.subset_replaced(std::slice::from_ref(&c1));
        orch.subset_replaced(std::slice::from_ref(&c2));

        assert_eq!(orch.resolve(&c1.key(), Ok(weather("c1", 25.0))), Resolution::Stale);
        assert_eq!(orch.state(), &WeatherState::Pending { country: c2.key() });
    }

    #[test]
    fn result_after_leaving_single_is_discarded() {
        let mut orch = WeatherOrchestrator::new();
        let c1 = country("Spain", 40.0, -4.0);
        orch.subset_replaced(std::slice::from_ref(&c1));
        orch.subset_replaced(&dataset(&["Spain", "Portugal"]));

        assert_eq!(orch.resolve(&c1.key(), Ok(weather("c1", 25.0))), Resolution::Stale);
        assert_eq!(orch.view(), WeatherView::NotApplicable);
    }

    #[test]
    fn failure_is_reported_as_unavailable() {
        let mut orch = WeatherOrchestrator::new();
        let c1 = country("Spain", 40.0, -4.0);
        orch.subset_replaced(std::slice::from_ref(&c1));

        let res = orch.resolve(&c1.key(), Err(anyhow::anyhow!("HTTP 401")));

        assert_eq!(res, Resolution::Applied);
        match orch.view() {
            WeatherView::Unavailable { reason } => {
                assert!(reason.contains("Spain"));
                assert!(reason.contains("HTTP 401"));
            }
            other => panic!("unexpected view {other:?}"),
        }
    }

    #[test]
    fn superseded_failure_does_not_replace_ready_snapshot() {
        let mut orch = WeatherOrchestrator::new();
        let spain = country("Spain", 40.0, -4.0);

        orch.subset_replaced(std::slice::from_ref(&spain));
        orch.subset_replaced(&dataset(&["Spain", "Portugal"]));
        orch.subset_replaced(std::slice::from_ref(&spain));

        assert_eq!(orch.resolve(&spain.key(), Ok(weather("second", 21.0))), Resolution::Applied);
        let late = orch.resolve(&spain.key(), Err(anyhow::anyhow!("timeout from first request")));

        assert_eq!(late, Resolution::Stale);
        assert_eq!(orch.view(), WeatherView::Ready(weather("second", 21.0)));
    }

    #[test]
    fn superseded_success_does_not_replace_ready_snapshot() {
        let mut orch = WeatherOrchestrator::new();
        let spain = country("Spain", 40.0, -4.0);
        orch.subset_replaced(std::slice::from_ref(&spain));
        orch.subset_replaced(std::slice::from_ref(&spain));

        orch.resolve(&spain.key(), Ok(weather("newer", 22.0)));
        let late = orch.resolve(&spain.key(), Ok(weather("older", 15.0)));

        assert_eq!(late, Resolution::Stale);
        assert_eq!(orch.view(), WeatherView::Ready(weather("newer", 22.0)));
    }

    #[test]
    fn result_after_failure_is_stale() {
        let mut orch = WeatherOrchestrator::new();
        let spain = country("Spain", 40.0, -4.0);
        orch.subset_replaced(std::slice::from_ref(&spain));
        orch.resolve(&spain.key(), Err(anyhow::anyhow!("HTTP 500")));

        let late = orch.resolve(&spain.key(), Ok(weather("late", 20.0)));

        assert_eq!(late, Resolution::Stale);
        assert!(matches!(orch.view(), WeatherView::Unavailable { .. }));
    }

    #[test]
    fn reselecting_clears_ready_snapshot() {
        let mut orch = WeatherOrchestrator::new();
        let c1 = country("Spain", 40.0, -4.0);
        orch.subset_replaced(std::slice::from_ref(&c1));
        orch.resolve(&c1.key(), Ok(weather("c1", 25.0)));

        let effect = orch.subset_replaced(std::slice::from_ref(&c1));

        assert!(effect.is_some());
        assert_eq!(orch.view(), WeatherView::Pending);
    }
}
