//! Provider configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing knobs shared by both active providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveProviderConfig {
    /// Minimum time between health checks of the selected sequencer.
    #[serde(rename = "check_interval_ms", with = "duration_ms")]
    pub check_interval: Duration,
    /// Budget for each individual dial and health check.
    #[serde(rename = "network_timeout_ms", with = "duration_ms")]
    pub network_timeout: Duration,
}

impl Default for ActiveProviderConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(120),
            network_timeout: Duration::from_secs(10),
        }
    }
}

impl ActiveProviderConfig {
    pub fn new(check_interval: Duration, network_timeout: Duration) -> Self {
        Self {
            check_interval,
            network_timeout,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
