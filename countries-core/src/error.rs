use thiserror::Error;

use crate::model::CountryKey;

/// Failures the finder reports to the view. Neither one ends the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinderError {
    /// The country directory could not be fetched; the dataset stays empty.
    #[error("country directory unavailable: {reason}")]
    LoadFailure { reason: String },

    /// Weather for the selected country could not be fetched.
    #[error("weather unavailable for {country}: {reason}")]
    WeatherFailure { country: CountryKey, reason: String },
}

impl FinderError {
    pub(crate) fn load(err: &anyhow::Error) -> Self {
        FinderError::LoadFailure { reason: format!("{err:#}") }
    }

    pub(crate) fn weather(country: CountryKey, err: &anyhow::Error) -> Self {
        FinderError::WeatherFailure { country, reason: format!("{err:#}") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn load_failure_keeps_context_chain() {
        let err = Err::<(), _>(anyhow::anyhow!("connection refused"))
            .context("Failed to send request to country directory")
            .unwrap_err();

        let msg = FinderError::load(&err).to_string();
        assert!(msg.starts_with("country directory unavailable"));
        assert!(msg.contains("connection refused"));
    }
}
