use crate::cluster::{tracking_args, Cluster};
use crate::config::{TrackerModeConfig, WaitConfig};
use crate::constants::{
    BLOCK_INTERVAL_MILLIS, DEFAULT_FINALITY_LAG_BLOCKS, IRREVERSIBLE_PADDING_SECS,
};
use crate::errors::{ConfigError, ScenarioError};
use crate::submitter::TransferSubmitter;
use crate::types::{Condition, Outcome, Transaction, Transfer};
use crate::waiter::{CancelToken, FinalityWaiter};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub tracker: TrackerModeConfig,
    pub wait: WaitConfig,
    /// Time allowed for an accepted transfer to become irreversible. The track timeout of
    /// `wait` still applies when it is shorter.
    pub finality_timeout: Duration,
    pub node_count: usize,
    pub transfer: Transfer,
}

impl ScenarioConfig {
    /// A single node scenario whose waits follow the node tracking settings.
    pub fn new(
        tracker: TrackerModeConfig,
        poll_interval: Duration,
        transfer: Transfer,
    ) -> Result<Self, ConfigError> {
        let wait = WaitConfig::from_tracker_config(&tracker, poll_interval)?;

        Ok(Self {
            tracker,
            wait,
            finality_timeout: finality_timeout(
                DEFAULT_FINALITY_LAG_BLOCKS,
                Duration::from_millis(BLOCK_INTERVAL_MILLIS),
            ),
            node_count: 1,
            transfer,
        })
    }

    pub fn with_finality_timeout(mut self, finality_timeout: Duration) -> Self {
        self.finality_timeout = finality_timeout;
        self
    }

    /// Settings of the wait for finalization: those of `wait`, cut down to the finality timeout.
    pub fn finalized_wait(&self) -> WaitConfig {
        self.wait.with_timeout_cap(self.finality_timeout)
    }
}

/// Time for the LIB to catch up with a block, `finality_lag_blocks` behind head, plus padding.
pub fn finality_timeout(finality_lag_blocks: u32, block_interval: Duration) -> Duration {
    block_interval
        .saturating_mul(finality_lag_blocks)
        .saturating_add(Duration::from_secs(IRREVERSIBLE_PADDING_SECS))
}

#[derive(Debug, Clone)]
pub struct ScenarioReport {
    pub transaction: Transaction,
    pub accepted: Outcome,
    // Only waited for once the transaction was accepted.
    pub finalized: Option<Outcome>,
}

impl ScenarioReport {
    pub fn is_success(&self) -> bool {
        self.accepted.is_reached()
            && matches!(
                self.finalized,
                Some(Outcome::Reached {
                    state: Condition::Finalized,
                    ..
                })
            )
    }
}

/// Transfers funds on a cluster and waits for the transfer to be accepted, then finalized.
pub struct ScenarioRunner<C: Cluster> {
    cluster: C,
    cancel: CancelToken,
}

impl<C: Cluster> ScenarioRunner<C> {
    pub fn new(cluster: C) -> Self {
        Self {
            cluster,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    /// Runs the scenario. The cluster is shut down whatever the result.
    pub fn run(&mut self, config: &ScenarioConfig) -> Result<ScenarioReport, ScenarioError> {
        let result = self.run_steps(config);
        self.cluster.shutdown();
        result
    }

    fn run_steps(&mut self, config: &ScenarioConfig) -> Result<ScenarioReport, ScenarioError> {
        info!("Stand up cluster");
        if !self
            .cluster
            .launch(config.node_count, &tracking_args(&config.tracker))
        {
            return Err(ScenarioError::LaunchFailed);
        }

        let node = self
            .cluster
            .connect(0)
            .ok_or(ScenarioError::NodeUnavailable(0))?;

        let transaction = TransferSubmitter::new(&node).submit(&config.transfer)?;

        let waiter = FinalityWaiter::new(&node).with_cancel_token(self.cancel.clone());
        let accepted = waiter.wait_for(&transaction.id, Condition::Accepted, config.wait);

        let finalized = if accepted.is_reached() {
            Some(waiter.wait_for(
                &transaction.id,
                Condition::Finalized,
                config.finalized_wait(),
            ))
        } else {
            None
        };

        Ok(ScenarioReport {
            transaction,
            accepted,
            finalized,
        })
    }
}
