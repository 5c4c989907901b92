use crate::errors::NodeError;
use crate::nodes::NodeApi;
use crate::types::{LifecycleState, NodeTxStatus, TrackingMode, TransactionId};
use tracing::debug;

/// Asks `node` for the lifecycle state of `tx_id`, once.
///
/// A node answering "untracked" or "expired" means different things per mode:
/// - `Global`: the node-wide index has no record. The transaction may not be in a block yet,
///   may have been evicted, or never existed. Reported as [`LifecycleState::NotFound`].
/// - `Local`: the record is absent for this connection. Whether the transaction never existed,
///   expired, or was sent through another connection cannot be told apart from here, so all
///   three are reported as [`LifecycleState::ExpiredOrTrackingMismatch`].
///
/// Transport failures are returned as errors; retrying them is the caller's policy.
pub fn query_status<N: NodeApi + ?Sized>(
    node: &N,
    tx_id: &TransactionId,
    mode: TrackingMode,
) -> Result<LifecycleState, NodeError> {
    let status = node.get_transaction_status(tx_id)?;
    debug!("Transaction {} status: {:?} ({} mode)", tx_id, status, mode);

    let state = match (status, mode) {
        (NodeTxStatus::Pending, _) => LifecycleState::Pending,
        (NodeTxStatus::Accepted { .. }, _) => LifecycleState::Accepted,
        (NodeTxStatus::Finalized { .. }, _) => LifecycleState::Finalized,
        (NodeTxStatus::Untracked | NodeTxStatus::Expired, TrackingMode::Global) => {
            LifecycleState::NotFound
        }
        (NodeTxStatus::Untracked | NodeTxStatus::Expired, TrackingMode::Local) => {
            LifecycleState::ExpiredOrTrackingMismatch
        }
    };

    Ok(state)
}
