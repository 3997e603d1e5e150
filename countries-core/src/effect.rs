//! Side effects declared by state transitions.
//!
//! State changes never perform I/O themselves. They return effects and the
//! session driver executes them.

use crate::model::{Coordinates, CountryKey};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch current weather for `coordinates` on behalf of `key`.
    FetchWeather { key: CountryKey, coordinates: Coordinates },
}
