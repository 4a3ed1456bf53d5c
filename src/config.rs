//! Run configuration: defaults, JSON file loading, sender reconciliation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_MEAN_DELAY: f64 = 0.5;
pub const DEFAULT_FAIL_RATE: f64 = 0.5;

/// Settings for a single sender.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderSettings {
    /// Mean simulated send delay in seconds. Must be >= 0.
    pub mean_delay: f64,
    /// Probability that a send fails. Must be in [0,1].
    pub fail_rate: f64,
}

impl Default for SenderSettings {
    fn default() -> Self {
        Self {
            mean_delay: DEFAULT_MEAN_DELAY,
            fail_rate: DEFAULT_FAIL_RATE,
        }
    }
}

impl SenderSettings {
    /// Range-check both settings. NaN fails both checks.
    pub fn validate(&self) -> Result<()> {
        if !(self.mean_delay >= 0.0 && self.mean_delay.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "mean_delay must be >= 0, got {}",
                self.mean_delay
            )));
        }

        if !(0.0..=1.0).contains(&self.fail_rate) {
            return Err(Error::InvalidConfig(format!(
                "fail_rate must be in [0,1], got {}",
                self.fail_rate
            )));
        }

        Ok(())
    }
}

/// Immutable configuration for one simulation run.
///
/// Built from defaults, a JSON file, command-line flags, or any mix of the
/// three; frozen once handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_messages: u64,
    pub num_senders: usize,
    pub sender_settings: Vec<SenderSettings>,
    /// External monitor to report every outcome to, if any.
    pub monitor_url: Option<String>,
    /// Poll interval advertised on `GET /interval`, in seconds.
    pub monitor_update_interval: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_messages: 1000,
            num_senders: 10,
            sender_settings: Vec::new(),
            monitor_url: None,
            monitor_update_interval: 1.0,
        }
    }
}

impl SimulationConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Parse a config from JSON. Missing keys take their defaults; unknown
    /// keys are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reconcile `num_senders` with `sender_settings` by accommodating the
    /// larger of the two: pad the settings with defaults, or raise the count
    /// to match an over-long list.
    pub fn reconcile_senders(&mut self) {
        if self.num_senders < self.sender_settings.len() {
            self.num_senders = self.sender_settings.len();
        } else {
            self.sender_settings
                .resize(self.num_senders, SenderSettings::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_validation_bounds() {
        assert!(SenderSettings::default().validate().is_ok());
        assert!(SenderSettings {
            mean_delay: 0.0,
            fail_rate: 1.0
        }
        .validate()
        .is_ok());

        for (mean_delay, fail_rate) in
            [(-0.1, 0.5), (f64::NAN, 0.5), (0.5, -0.1), (0.5, 1.1), (0.5, f64::NAN)]
        {
            let settings = SenderSettings {
                mean_delay,
                fail_rate,
            };
            assert!(
                matches!(settings.validate(), Err(Error::InvalidConfig(_))),
                "({mean_delay}, {fail_rate}) should be rejected"
            );
        }
    }

    #[test]
    fn from_json_fills_defaults_and_ignores_unknown_keys() {
        let config = SimulationConfig::from_json(
            r#"{
                "num_messages": 42,
                "sender_settings": [{"mean_delay": 0.1}],
                "frontend_theme": "dark"
            }"#,
        )
        .unwrap();

        assert_eq!(config.num_messages, 42);
        assert_eq!(config.num_senders, 10);
        assert_eq!(
            config.sender_settings,
            vec![SenderSettings {
                mean_delay: 0.1,
                fail_rate: DEFAULT_FAIL_RATE
            }]
        );
        assert_eq!(config.monitor_url, None);
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(
            SimulationConfig::from_json("{not json"),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn reconcile_pads_settings_up_to_the_count() {
        let mut config = SimulationConfig {
            num_senders: 4,
            sender_settings: vec![SenderSettings {
                mean_delay: 0.1,
                fail_rate: 0.2,
            }],
            ..Default::default()
        };

        config.reconcile_senders();

        assert_eq!(config.num_senders, 4);
        assert_eq!(config.sender_settings.len(), 4);
        assert_eq!(config.sender_settings[0].mean_delay, 0.1);
        assert_eq!(config.sender_settings[1], SenderSettings::default());
    }

    #[test]
    fn reconcile_raises_the_count_to_match_settings() {
        let mut config = SimulationConfig {
            num_senders: 1,
            sender_settings: vec![SenderSettings::default(); 3],
            ..Default::default()
        };

        config.reconcile_senders();

        assert_eq!(config.num_senders, 3);
        assert_eq!(config.sender_settings.len(), 3);
    }
}
