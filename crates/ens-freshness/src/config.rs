use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the staleness policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreshnessConfig {
    /// Minimum seconds between two "no state source" warnings.
    pub warn_interval_secs: u64,
    /// Window applied to types whose descriptor has none. `None` never expires.
    pub default_max_age_secs: Option<u64>,
}

impl Default for FreshnessConfig {
    fn default() -> Self {
        Self {
            warn_interval_secs: 15,
            default_max_age_secs: None,
        }
    }
}

impl FreshnessConfig {
    pub fn warn_interval(&self) -> Duration {
        Duration::from_secs(self.warn_interval_secs)
    }

    pub fn default_max_age(&self) -> Option<Duration> {
        self.default_max_age_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = FreshnessConfig::default();
        assert_eq!(c.warn_interval(), Duration::from_secs(15));
        assert_eq!(c.default_max_age(), None);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: FreshnessConfig = serde_json::from_str(r#"{"default_max_age_secs": 60}"#).unwrap();
        assert_eq!(c.warn_interval_secs, 15);
        assert_eq!(c.default_max_age(), Some(Duration::from_secs(60)));
    }
}
