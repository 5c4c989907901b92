pub mod http_node;
pub mod memory_node;

use crate::errors::NodeError;
use crate::types::{NodeTxStatus, Transfer, TransactionId};
use mockall::automock;

/// A client connection to one node endpoint.
#[automock]
pub trait NodeApi {
    /// Proposes one transfer and returns the id the node assigned to it.
    fn submit_transfer(&self, transfer: &Transfer) -> Result<TransactionId, NodeError>;

    /// Point-in-time lookup of a transaction in the index the node tracks. Never polls: returns
    /// after a bounded number of requests.
    fn get_transaction_status(&self, tx_id: &TransactionId) -> Result<NodeTxStatus, NodeError>;
}
