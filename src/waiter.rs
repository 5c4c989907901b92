use crate::config::WaitConfig;
use crate::nodes::NodeApi;
use crate::status::query_status;
use crate::types::{Condition, LifecycleState, Outcome, TransactionId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration)
    }
}

/// A clock that only moves when slept on or advanced.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, duration: Duration) {
        *self.offset.lock() += duration;
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration)
    }
}

/// Shared flag to stop waits. Observed between two polls, never in the middle of a request.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Polls a node until a transaction reaches a condition.
///
/// Every wait ends with exactly one [`Outcome`]. The deadline is checked before each poll and
/// sleeps never cross it, so a wait returns at most one poll interval (plus one request) after
/// the timeout.
pub struct FinalityWaiter<'a, N: NodeApi + ?Sized, C: Clock = SystemClock> {
    node: &'a N,
    clock: C,
    cancel: CancelToken,
}

impl<'a, N: NodeApi + ?Sized> FinalityWaiter<'a, N, SystemClock> {
    pub fn new(node: &'a N) -> Self {
        Self::with_clock(node, SystemClock)
    }
}

impl<'a, N: NodeApi + ?Sized, C: Clock> FinalityWaiter<'a, N, C> {
    pub fn with_clock(node: &'a N, clock: C) -> Self {
        Self {
            node,
            clock,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn wait_for(
        &self,
        tx_id: &TransactionId,
        target: Condition,
        config: WaitConfig,
    ) -> Outcome {
        info!(
            "Waiting for transaction {} to be {} ({} mode, timeout {}s)",
            tx_id,
            target,
            config.mode(),
            config.timeout().as_secs()
        );

        let outcome = self.poll_until(tx_id, target, config);

        match &outcome {
            Outcome::Reached { .. } => info!("Transaction {}: {}", tx_id, outcome),
            _ => warn!("Transaction {} did not reach {}: {}", tx_id, target, outcome),
        }

        outcome
    }

    /// Waits for every transaction at once, one thread per transaction.
    /// Outcomes are returned in the order of `tx_ids`.
    pub fn wait_many(
        &self,
        tx_ids: &[TransactionId],
        target: Condition,
        config: WaitConfig,
    ) -> Vec<Outcome>
    where
        N: Sync,
        C: Sync,
    {
        thread::scope(|scope| {
            let handles: Vec<_> = tx_ids
                .iter()
                .map(|tx_id| scope.spawn(move || self.wait_for(tx_id, target, config)))
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| Outcome::QueryError {
                        detail: "waiter thread panicked".to_string(),
                    })
                })
                .collect()
        })
    }

    fn poll_until(
        &self,
        tx_id: &TransactionId,
        target: Condition,
        config: WaitConfig,
    ) -> Outcome {
        let start = self.clock.now();
        let timeout = config.timeout();
        let mut last_state: Option<LifecycleState> = None;
        let mut consecutive_errors = 0;
        let mut delay = config.poll_interval();

        loop {
            let elapsed = self.clock.now().saturating_duration_since(start);
            if elapsed >= timeout {
                return Outcome::TimedOut { last_state };
            }

            if self.cancel.is_cancelled() {
                return Outcome::Cancelled { last_state };
            }

            match query_status(self.node, tx_id, config.mode()) {
                Ok(state) => {
                    consecutive_errors = 0;

                    // Retrying cannot fix a record missing from the local index.
                    if state == LifecycleState::ExpiredOrTrackingMismatch {
                        return Outcome::NotTracked;
                    }

                    if let Some(previous) = last_state {
                        if state.rank() < previous.rank() {
                            return Outcome::QueryError {
                                detail: format!(
                                    "transaction state regressed from {previous:?} to {state:?}"
                                ),
                            };
                        }
                    }
                    last_state = Some(state);

                    if let Some(reached) = state.satisfies(target) {
                        return Outcome::Reached {
                            state: reached,
                            elapsed: self.clock.now().saturating_duration_since(start),
                        };
                    }

                    debug!(
                        "Transaction {} is {:?} after {:.1}s",
                        tx_id,
                        state,
                        elapsed.as_secs_f64()
                    );
                }
                Err(e) => {
                    consecutive_errors += 1;
                    warn!(
                        "Status query {} for transaction {} failed: {}",
                        consecutive_errors, tx_id, e
                    );

                    if consecutive_errors > config.max_consecutive_errors() {
                        return Outcome::QueryError {
                            detail: e.to_string(),
                        };
                    }
                }
            }

            let elapsed = self.clock.now().saturating_duration_since(start);
            let remaining = timeout.saturating_sub(elapsed);
            self.clock.sleep(delay.min(remaining));
            delay = config.backoff().next_delay(delay, config.poll_interval());
        }
    }
}
