use std::collections::BTreeMap;
use std::time::Duration;
use transaction_tracker::cluster::{parse_tracking_args, tracking_args};
use transaction_tracker::config::{PollBackoff, TrackerConfigFile, TrackerModeConfig, WaitConfig};
use transaction_tracker::constants::{
    DEFAULT_MAX_CONSECUTIVE_ERRORS, DEFAULT_TRACK_TIMEOUT_SECS, TRACKER_MODE_FLAG,
    TRACK_TIMEOUT_FLAG,
};
use transaction_tracker::errors::ConfigError;
use transaction_tracker::types::TrackingMode;
use uuid::Uuid;

#[test]
fn tracker_config_defaults() {
    let config = TrackerModeConfig::default();

    assert_eq!(config.mode, TrackingMode::Global);
    assert_eq!(config.timeout_secs, DEFAULT_TRACK_TIMEOUT_SECS);
}

#[test]
fn tracker_config_rejects_zero_timeout() {
    assert_eq!(
        TrackerModeConfig::new(TrackingMode::Local, 0),
        Err(ConfigError::InvalidTimeout)
    );
}

#[test]
fn wait_config_validation() {
    assert_eq!(
        WaitConfig::new(TrackingMode::Global, 0, Duration::from_millis(500)),
        Err(ConfigError::InvalidTimeout)
    );
    assert_eq!(
        WaitConfig::new(TrackingMode::Global, 10, Duration::ZERO),
        Err(ConfigError::InvalidPollInterval)
    );
    assert_eq!(
        WaitConfig::new(TrackingMode::Global, 10, Duration::from_secs(10)),
        Err(ConfigError::InvalidPollInterval)
    );

    let config = WaitConfig::new(TrackingMode::Local, 10, Duration::from_millis(500)).unwrap();
    assert_eq!(config.mode(), TrackingMode::Local);
    assert_eq!(config.timeout(), Duration::from_secs(10));
    assert_eq!(config.backoff(), PollBackoff::Fixed);
    assert_eq!(config.max_consecutive_errors(), DEFAULT_MAX_CONSECUTIVE_ERRORS);
}

#[test]
fn wait_config_follows_tracker_config() -> Result<(), anyhow::Error> {
    let tracker = TrackerModeConfig::new(TrackingMode::Local, 120)?;
    let config = WaitConfig::from_tracker_config(&tracker, Duration::from_secs(1))?
        .with_backoff(PollBackoff::Exponential)
        .with_max_consecutive_errors(5);

    assert_eq!(config.mode(), TrackingMode::Local);
    assert_eq!(config.timeout(), Duration::from_secs(120));
    assert_eq!(config.backoff(), PollBackoff::Exponential);
    assert_eq!(config.max_consecutive_errors(), 5);

    Ok(())
}

#[test]
fn exponential_backoff_is_capped() {
    let interval = Duration::from_secs(1);
    let mut delay = interval;
    let mut delays = vec![];

    for _ in 0..5 {
        delay = PollBackoff::Exponential.next_delay(delay, interval);
        delays.push(delay.as_secs());
    }

    assert_eq!(delays, vec![2, 4, 4, 4, 4]);
    assert_eq!(PollBackoff::Fixed.next_delay(Duration::from_secs(3), interval), interval);
}

#[test]
fn parse_tracking_mode_and_backoff() {
    assert_eq!("global".parse::<TrackingMode>(), Ok(TrackingMode::Global));
    assert_eq!("LOCAL".parse::<TrackingMode>(), Ok(TrackingMode::Local));
    assert!(matches!(
        "node".parse::<TrackingMode>(),
        Err(ConfigError::UnknownTrackingMode(_))
    ));
    assert_eq!("exponential".parse::<PollBackoff>(), Ok(PollBackoff::Exponential));
    assert!("linear".parse::<PollBackoff>().is_err());
}

#[test]
fn tracking_args_round_trip_through_node_flags() -> Result<(), anyhow::Error> {
    let config = TrackerModeConfig::new(TrackingMode::Local, 30)?;
    let args = tracking_args(&config);

    assert_eq!(args.get(TRACKER_MODE_FLAG).map(String::as_str), Some("local"));
    assert_eq!(args.get(TRACK_TIMEOUT_FLAG).map(String::as_str), Some("30"));
    assert_eq!(parse_tracking_args(&args)?, config);

    assert_eq!(
        parse_tracking_args(&BTreeMap::new())?,
        TrackerModeConfig::default()
    );

    let invalid = BTreeMap::from([(TRACK_TIMEOUT_FLAG.to_string(), "soon".to_string())]);
    assert_eq!(
        parse_tracking_args(&invalid),
        Err(ConfigError::InvalidTimeout)
    );

    Ok(())
}

#[test]
fn load_config_file() -> Result<(), anyhow::Error> {
    let path = std::env::temp_dir().join(format!("tracker-{}.json", Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"{
            "tracker": { "mode": "local" },
            "poll_interval_secs": 0.25,
            "backoff": "exponential"
        }"#,
    )?;

    let file = TrackerConfigFile::load(&path)?;
    std::fs::remove_file(&path)?;

    let tracker = file.tracker.unwrap_or_default();
    assert_eq!(tracker.mode, TrackingMode::Local);
    assert_eq!(tracker.timeout_secs, DEFAULT_TRACK_TIMEOUT_SECS);
    assert_eq!(file.poll_interval_secs, Some(0.25));
    assert_eq!(file.backoff, Some(PollBackoff::Exponential));
    assert_eq!(file.max_consecutive_errors, None);

    Ok(())
}

#[test]
fn missing_config_file_is_an_error() {
    let path = std::env::temp_dir().join(format!("missing-{}.json", Uuid::new_v4()));

    assert!(matches!(
        TrackerConfigFile::load(&path),
        Err(ConfigError::ConfigFileError(_))
    ));
}

#[test]
fn exponential_backoff_cap_saturates_on_huge_intervals() {
    let interval = Duration::from_secs(u64::MAX / 2);

    let delay = PollBackoff::Exponential.next_delay(interval, interval);

    assert_eq!(delay, Duration::MAX);
}

#[test]
fn timeout_cap_keeps_poll_interval_below_timeout() -> Result<(), anyhow::Error> {
    let config = WaitConfig::new(TrackingMode::Global, 600, Duration::from_secs(1))?;

    assert_eq!(
        config.with_timeout_cap(Duration::from_secs(72)).timeout(),
        Duration::from_secs(72)
    );
    assert_eq!(
        config.with_timeout_cap(Duration::from_secs(900)).timeout(),
        Duration::from_secs(600)
    );
    assert_eq!(
        config.with_timeout_cap(Duration::from_millis(500)).timeout(),
        Duration::from_secs(600)
    );

    Ok(())
}
