use crate::constants::{
    DEFAULT_MAX_CONSECUTIVE_ERRORS, DEFAULT_POLL_INTERVAL_MILLIS, DEFAULT_TRACK_TIMEOUT_SECS,
    MAX_BACKOFF_MULTIPLIER,
};
use crate::errors::ConfigError;
use crate::types::TrackingMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Tracking settings shared by the node and every waiter of a run.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerModeConfig {
    #[serde(default)]
    pub mode: TrackingMode,

    #[serde(default = "default_track_timeout")]
    pub timeout_secs: u64,
}

fn default_track_timeout() -> u64 {
    DEFAULT_TRACK_TIMEOUT_SECS
}

impl TrackerModeConfig {
    pub fn new(mode: TrackingMode, timeout_secs: u64) -> Result<Self, ConfigError> {
        let config = Self { mode, timeout_secs };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for TrackerModeConfig {
    fn default() -> Self {
        TrackerModeConfig {
            mode: TrackingMode::Global,
            timeout_secs: DEFAULT_TRACK_TIMEOUT_SECS,
        }
    }
}

/// Content of an optional JSON config file. Command line flags take precedence.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TrackerConfigFile {
    #[serde(default)]
    pub tracker: Option<TrackerModeConfig>,
    pub poll_interval_secs: Option<f64>,
    pub backoff: Option<PollBackoff>,
    pub max_consecutive_errors: Option<u32>,
}

impl TrackerConfigFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ConfigFileError(format!("{}: {}", path.display(), e)))?;

        serde_json::from_str(&content)
            .map_err(|e| ConfigError::ConfigFileError(format!("{}: {}", path.display(), e)))
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PollBackoff {
    #[default]
    Fixed,
    /// Doubles the delay after every poll, up to four times the poll interval.
    Exponential,
}

impl PollBackoff {
    pub fn next_delay(&self, current: Duration, poll_interval: Duration) -> Duration {
        match self {
            PollBackoff::Fixed => poll_interval,
            PollBackoff::Exponential => {
                let cap = poll_interval.saturating_mul(MAX_BACKOFF_MULTIPLIER);
                current.saturating_mul(2).min(cap)
            }
        }
    }
}

impl FromStr for PollBackoff {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(PollBackoff::Fixed),
            "exponential" => Ok(PollBackoff::Exponential),
            _ => Err(format!("backoff must be fixed or exponential, got: {s}")),
        }
    }
}

/// Immutable settings of every wait in a run. Built once at startup and passed by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    mode: TrackingMode,
    timeout: Duration,
    poll_interval: Duration,
    backoff: PollBackoff,
    max_consecutive_errors: u32,
}

impl WaitConfig {
    pub fn new(
        mode: TrackingMode,
        timeout_secs: u64,
        poll_interval: Duration,
    ) -> Result<Self, ConfigError> {
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let timeout = Duration::from_secs(timeout_secs);
        if poll_interval.is_zero() || poll_interval >= timeout {
            return Err(ConfigError::InvalidPollInterval);
        }

        Ok(Self {
            mode,
            timeout,
            poll_interval,
            backoff: PollBackoff::Fixed,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
        })
    }

    pub fn from_tracker_config(
        tracker: &TrackerModeConfig,
        poll_interval: Duration,
    ) -> Result<Self, ConfigError> {
        Self::new(tracker.mode, tracker.timeout_secs, poll_interval)
    }

    pub fn with_backoff(mut self, backoff: PollBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Shortens the timeout to `limit`. Limits not above the poll interval are ignored.
    pub fn with_timeout_cap(mut self, limit: Duration) -> Self {
        if limit > self.poll_interval {
            self.timeout = self.timeout.min(limit);
        }
        self
    }

    pub fn with_max_consecutive_errors(mut self, max_consecutive_errors: u32) -> Self {
        self.max_consecutive_errors = max_consecutive_errors;
        self
    }

    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn backoff(&self) -> PollBackoff {
        self.backoff
    }

    pub fn max_consecutive_errors(&self) -> u32 {
        self.max_consecutive_errors
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        WaitConfig {
            mode: TrackingMode::Global,
            timeout: Duration::from_secs(DEFAULT_TRACK_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MILLIS),
            backoff: PollBackoff::Fixed,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
        }
    }
}
