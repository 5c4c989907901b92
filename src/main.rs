use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn, Level};
use transaction_tracker::args::Args;
use transaction_tracker::asset::Asset;
use transaction_tracker::cluster::{Cluster, RemoteCluster, SimulatedCluster};
use transaction_tracker::config::TrackerConfigFile;
use transaction_tracker::constants::DEFAULT_POLL_INTERVAL_MILLIS;
use transaction_tracker::scenario::{
    finality_timeout, ScenarioConfig, ScenarioReport, ScenarioRunner,
};
use transaction_tracker::types::{Authorization, Transfer};
use transaction_tracker::waiter::CancelToken;

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("{:#?}", args);

    let config = build_config(&args)?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Error setting Ctrl-C handler")?;

    let report = if args.simulate {
        let cluster = SimulatedCluster::new(
            Duration::from_millis(args.block_interval_ms),
            args.finality_lag_blocks,
        );
        run(cluster, &config, cancel)?
    } else {
        run(RemoteCluster::new(&args.host, args.port), &config, cancel)?
    };

    info!("Transaction {} accepted: {}", report.transaction.id, report.accepted);
    if let Some(finalized) = &report.finalized {
        info!("Transaction {} finalized: {}", report.transaction.id, finalized);
    }

    if report.is_success() {
        info!("Test succeeded");
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("Test failed");
        Ok(ExitCode::FAILURE)
    }
}

fn build_config(args: &Args) -> Result<ScenarioConfig> {
    let file = match &args.config {
        Some(path) => TrackerConfigFile::load(path)?,
        None => TrackerConfigFile::default(),
    };

    let mut tracker = file.tracker.unwrap_or_default();
    if let Some(mode) = args.transaction_tracker_mode {
        tracker.mode = mode;
    }
    if let Some(timeout) = args.transaction_track_timeout {
        tracker.timeout_secs = timeout;
    }
    tracker.validate()?;

    let poll_secs = args
        .poll_interval
        .or(file.poll_interval_secs)
        .unwrap_or(DEFAULT_POLL_INTERVAL_MILLIS as f64 / 1000.0);
    let poll_interval =
        Duration::try_from_secs_f64(poll_secs).context("Poll interval must be positive")?;

    let quantity: Asset = args.amount.parse()?;
    let transfer = Transfer {
        from: args.from.clone(),
        to: args.to.clone(),
        quantity,
        memo: args.memo.clone(),
        authorization: Authorization::active(&args.from),
    };

    let mut config = ScenarioConfig::new(tracker, poll_interval, transfer)?;
    config.wait = config
        .wait
        .with_backoff(args.backoff.or(file.backoff).unwrap_or_default());
    if let Some(max_errors) = file.max_consecutive_errors {
        config.wait = config.wait.with_max_consecutive_errors(max_errors);
    }

    if args.simulate {
        config = config.with_finality_timeout(finality_timeout(
            args.finality_lag_blocks,
            Duration::from_millis(args.block_interval_ms),
        ));
    }

    Ok(config)
}

fn run<C: Cluster>(
    cluster: C,
    config: &ScenarioConfig,
    cancel: CancelToken,
) -> Result<ScenarioReport> {
    let report = ScenarioRunner::new(cluster)
        .with_cancel_token(cancel)
        .run(config)
        .context("Failed to run transfer scenario")?;

    Ok(report)
}
