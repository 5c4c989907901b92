use crate::constants::MAX_MEMO_BYTES;
use crate::errors::SubmissionFailed;
use crate::nodes::NodeApi;
use crate::types::{Transaction, Transfer};
use tracing::{info, warn};

pub struct TransferSubmitter<'a, N: NodeApi + ?Sized> {
    node: &'a N,
}

impl<'a, N: NodeApi + ?Sized> TransferSubmitter<'a, N> {
    pub fn new(node: &'a N) -> Self {
        Self { node }
    }

    /// Sends `transfer` to the node exactly once.
    ///
    /// Nothing is retried here: a failure may happen after the node accepted the request,
    /// and sending it again could spend twice.
    pub fn submit(&self, transfer: &Transfer) -> Result<Transaction, SubmissionFailed> {
        validate(transfer)?;

        let tx_id = self.node.submit_transfer(transfer).map_err(|e| {
            warn!(
                "Failed to transfer {} from {} to {}: {}",
                transfer.quantity, transfer.from, transfer.to, e
            );
            SubmissionFailed::new(e.to_string())
        })?;

        if tx_id.is_empty() {
            return Err(SubmissionFailed::new("node returned an empty transaction id"));
        }

        info!(
            "Transfer {} from {} to {} submitted as {}",
            transfer.quantity, transfer.from, transfer.to, tx_id
        );

        Ok(Transaction {
            id: tx_id,
            from: transfer.from.clone(),
            to: transfer.to.clone(),
            quantity: transfer.quantity.clone(),
            memo: transfer.memo.clone(),
        })
    }
}

fn validate(transfer: &Transfer) -> Result<(), SubmissionFailed> {
    if transfer.from.is_empty() || transfer.to.is_empty() {
        return Err(SubmissionFailed::new("source and destination accounts are required"));
    }

    if transfer.from == transfer.to {
        return Err(SubmissionFailed::new("cannot transfer to self"));
    }

    if transfer.memo.len() > MAX_MEMO_BYTES {
        return Err(SubmissionFailed::new(format!(
            "memo has more than {MAX_MEMO_BYTES} bytes"
        )));
    }

    if transfer.authorization.actor.is_empty() {
        return Err(SubmissionFailed::new("missing authorizing actor"));
    }

    Ok(())
}
