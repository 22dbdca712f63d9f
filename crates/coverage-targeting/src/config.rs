//! Node-local targeting settings.
//!
//! Nothing here is consensus state. The only knob is an execution guard for
//! the retry loops; it can turn a non-terminating selection into an error but
//! never changes the result of one that terminates.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Stage, TargetError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Maximum retries per loop per call. `None` retries forever.
    pub max_attempts: Option<u64>,
}

/// Retry counter for one loop within one call.
#[derive(Debug)]
pub(crate) struct Attempts {
    stage: Stage,
    retries: u64,
    limit: Option<u64>,
}

impl Attempts {
    pub(crate) fn new(stage: Stage, limit: Option<u64>) -> Self {
        Self {
            stage,
            retries: 0,
            limit,
        }
    }

    /// Count one retry, failing once the limit is exceeded.
    pub(crate) fn record(&mut self) -> Result<(), TargetError> {
        self.retries += 1;
        match self.limit {
            Some(limit) if self.retries > limit => {
                warn!(stage = %self.stage, limit, "Retry limit reached");
                Err(TargetError::AttemptLimit {
                    stage: self.stage,
                    attempts: limit,
                })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_trips() {
        let mut attempts = Attempts::new(Stage::ZoneChoice, None);
        for _ in 0..10_000 {
            assert!(attempts.record().is_ok());
        }
    }

    #[test]
    fn bounded_trips_after_limit() {
        let mut attempts = Attempts::new(Stage::HexSampling, Some(2));
        assert!(attempts.record().is_ok());
        assert!(attempts.record().is_ok());
        assert!(matches!(
            attempts.record(),
            Err(TargetError::AttemptLimit { stage: Stage::HexSampling, attempts: 2 })
        ));
    }

    #[test]
    fn config_defaults_when_fields_missing() {
        let config: TargetingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TargetingConfig::default());
        let config: TargetingConfig = serde_json::from_str(r#"{"max_attempts": 50}"#).unwrap();
        assert_eq!(config.max_attempts, Some(50));
    }
}
