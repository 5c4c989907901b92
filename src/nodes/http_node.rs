use crate::constants::{
    CONNECTION_ID_HEADER, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_WAIT_PROBE_MILLIS,
};
use crate::errors::NodeError;
use crate::nodes::NodeApi;
use crate::types::{BlockNum, Condition, ConnectionId, NodeTxStatus, Transfer, TransactionId};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const SEND_TRANSACTION_PATH: &str = "v2/chain/send_transaction";
const WAIT_TRANSACTION_PATH: &str = "v2/chain/wait_transaction";

/// Connection to a node chain API over HTTP. Every instance is a distinct connection:
/// nodes running the local tracker only answer for transactions sent through it.
///
/// The node has no status lookup, only `wait_transaction`, which holds the request until the
/// condition is met. Status queries send short wait requests, cut after the wait probe timeout.
pub struct HttpNode {
    client: Client,
    endpoint: String,
    connection_id: ConnectionId,
    wait_probe: Duration,
}

#[derive(Deserialize)]
struct SendTransactionResponse {
    transaction_id: Option<TransactionId>,
}

#[derive(Serialize)]
struct WaitTransactionRequest<'a> {
    transaction_id: &'a TransactionId,
    condition: Condition,
}

#[derive(Deserialize)]
struct WaitTransactionResponse {
    block_num: Option<BlockNum>,
}

/// Answer of the node to one wait request.
#[derive(Debug, PartialEq, Eq)]
enum WaitAnswer {
    Reached(BlockNum),
    // The wait was held past the probe timeout, or another wait is already pending.
    NotYet,
    Untracked,
    Expired,
}

impl HttpNode {
    pub fn new(endpoint: &str) -> Result<Self, NodeError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(endpoint: &str, request_timeout: Duration) -> Result<Self, NodeError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            connection_id: Uuid::new_v4(),
            wait_probe: Duration::from_millis(DEFAULT_WAIT_PROBE_MILLIS),
        })
    }

    pub fn with_wait_probe(mut self, wait_probe: Duration) -> Self {
        self.wait_probe = wait_probe;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.endpoint, path);
        debug!("POST {} (connection {})", url, self.connection_id);

        self.client
            .post(url)
            .header(CONNECTION_ID_HEADER, self.connection_id.to_string())
    }

    fn wait_transaction(
        &self,
        tx_id: &TransactionId,
        condition: Condition,
    ) -> Result<WaitAnswer, NodeError> {
        let request = WaitTransactionRequest {
            transaction_id: tx_id,
            condition,
        };

        let response = match self
            .post(WAIT_TRANSACTION_PATH)
            .timeout(self.wait_probe)
            .json(&request)
            .send()
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() && !e.is_connect() => return Ok(WaitAnswer::NotYet),
            Err(e) => return Err(e.into()),
        };

        let reached_status = match condition {
            Condition::Accepted => 202,
            Condition::Finalized => 201,
        };

        match response.status().as_u16() {
            status if status == reached_status => {}
            403 => return Ok(WaitAnswer::NotYet),
            404 => return Ok(WaitAnswer::Untracked),
            504 => return Ok(WaitAnswer::Expired),
            status => return Err(rejected(status, response)),
        }

        let body: WaitTransactionResponse = response.json()?;
        body.block_num.map(WaitAnswer::Reached).ok_or_else(|| {
            NodeError::MalformedResponse(format!("{condition} answer without block_num"))
        })
    }
}

fn rejected(status: u16, response: Response) -> NodeError {
    NodeError::Rejected(format!(
        "{} {}",
        status,
        response.text().unwrap_or_default()
    ))
}

impl NodeApi for HttpNode {
    fn submit_transfer(&self, transfer: &Transfer) -> Result<TransactionId, NodeError> {
        let response = self.post(SEND_TRANSACTION_PATH).json(transfer).send()?;
        let status = response.status().as_u16();

        match status {
            200..=299 => {}
            401 | 403 => {
                return Err(NodeError::Unauthorized(
                    response.text().unwrap_or_default(),
                ))
            }
            _ => return Err(rejected(status, response)),
        }

        let body: SendTransactionResponse = response.json()?;

        match body.transaction_id {
            Some(tx_id) if !tx_id.is_empty() => Ok(tx_id),
            _ => Err(NodeError::MalformedResponse(
                "response has no transaction_id".to_string(),
            )),
        }
    }

    /// Asks for finalization first, then for acceptance. A node answering neither in time
    /// reports the transaction as pending.
    fn get_transaction_status(&self, tx_id: &TransactionId) -> Result<NodeTxStatus, NodeError> {
        let status = match self.wait_transaction(tx_id, Condition::Finalized)? {
            WaitAnswer::Reached(block_num) => NodeTxStatus::Finalized { block_num },
            WaitAnswer::Untracked => NodeTxStatus::Untracked,
            WaitAnswer::Expired => NodeTxStatus::Expired,
            WaitAnswer::NotYet => match self.wait_transaction(tx_id, Condition::Accepted)? {
                WaitAnswer::Reached(block_num) => NodeTxStatus::Accepted { block_num },
                WaitAnswer::NotYet => NodeTxStatus::Pending,
                WaitAnswer::Untracked => NodeTxStatus::Untracked,
                WaitAnswer::Expired => NodeTxStatus::Expired,
            },
        };

        Ok(status)
    }
}
