use crate::config::TrackerModeConfig;
use crate::errors::NodeError;
use crate::nodes::NodeApi;
use crate::tracker::{Block, TransactionTracker};
use crate::types::{
    AccountName, BlockNum, ConnectionId, NodeTxStatus, Slot, Transfer, TransactionId,
};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

const GENESIS_BLOCK_NUM: BlockNum = 1;
const GENESIS_SLOT: Slot = 1;

struct ChainState {
    tracker: TransactionTracker,
    accounts: HashSet<AccountName>,
    // Actors whose signing key is available to the node wallet.
    keys: HashSet<AccountName>,
    pending: Vec<TransactionId>,
    reversible: VecDeque<Block>,
    head_block_num: BlockNum,
    head_slot: Slot,
    lib_block_num: BlockNum,
}

/// In-process node: a ledger with a pending pool, block production and a transaction tracker.
/// Cloning shares the same chain.
#[derive(Clone)]
pub struct MemoryNode {
    state: Arc<Mutex<ChainState>>,
}

impl MemoryNode {
    pub fn new(config: &TrackerModeConfig) -> Self {
        let mut tracker = TransactionTracker::new(config);
        tracker.on_irreversible_block(&Block {
            block_num: GENESIS_BLOCK_NUM,
            slot: GENESIS_SLOT,
            transactions: vec![],
        });

        let state = ChainState {
            tracker,
            accounts: HashSet::new(),
            keys: HashSet::new(),
            pending: vec![],
            reversible: VecDeque::new(),
            head_block_num: GENESIS_BLOCK_NUM,
            head_slot: GENESIS_SLOT,
            lib_block_num: GENESIS_BLOCK_NUM,
        };

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn create_account(&self, name: &str) {
        self.state.lock().accounts.insert(name.to_string());
    }

    pub fn import_key(&self, actor: &str) {
        self.state.lock().keys.insert(actor.to_string());
    }

    /// Opens a new client connection to this node.
    pub fn connect(&self) -> MemoryConnection {
        MemoryConnection {
            node: self.clone(),
            connection_id: Uuid::new_v4(),
        }
    }

    pub fn head_block_num(&self) -> BlockNum {
        self.state.lock().head_block_num
    }

    pub fn lib_block_num(&self) -> BlockNum {
        self.state.lock().lib_block_num
    }

    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Includes every pending transaction in a new head block.
    pub fn produce_block(&self) -> BlockNum {
        let mut state = self.state.lock();

        state.head_block_num += 1;
        state.head_slot += 1;

        let block = Block {
            block_num: state.head_block_num,
            slot: state.head_slot,
            transactions: std::mem::take(&mut state.pending),
        };

        if !block.transactions.is_empty() {
            debug!(
                "Block {} accepted with {} transactions",
                block.block_num,
                block.transactions.len()
            );
        }

        state.tracker.on_accepted_block(&block);
        state.reversible.push_back(block);
        state.head_block_num
    }

    /// Marks every block up to `block_num` as irreversible.
    pub fn advance_lib(&self, block_num: BlockNum) {
        let mut state = self.state.lock();

        while let Some(block) = state.reversible.front() {
            if block.block_num > block_num {
                break;
            }

            if let Some(block) = state.reversible.pop_front() {
                state.lib_block_num = block.block_num;
                state.tracker.on_irreversible_block(&block);
            }
        }
    }

    /// Produces a block every `block_interval`, keeping the LIB `finality_lag_blocks` behind head.
    pub fn spawn_producer(
        &self,
        block_interval: Duration,
        finality_lag_blocks: u32,
    ) -> BlockProducer {
        let stop = Arc::new(AtomicBool::new(false));
        let node = self.clone();
        let stop_flag = stop.clone();

        info!(
            "Starting block producer: interval {:?}, finality lag {} blocks",
            block_interval, finality_lag_blocks
        );

        let handle = thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                thread::sleep(block_interval);

                let head = node.produce_block();
                if head > finality_lag_blocks {
                    node.advance_lib(head - finality_lag_blocks);
                }
            }
        });

        BlockProducer {
            stop,
            handle: Some(handle),
        }
    }
}

/// Background block production of a [`MemoryNode`]. Stopped on drop.
pub struct BlockProducer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl BlockProducer {
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Block producer thread panicked");
            }
        }
    }
}

impl Drop for BlockProducer {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct MemoryConnection {
    node: MemoryNode,
    connection_id: ConnectionId,
}

impl MemoryConnection {
    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }
}

impl NodeApi for MemoryConnection {
    fn submit_transfer(&self, transfer: &Transfer) -> Result<TransactionId, NodeError> {
        let mut state = self.node.state.lock();

        for account in [&transfer.from, &transfer.to] {
            if !state.accounts.contains(account) {
                return Err(NodeError::Rejected(format!("account {account} does not exist")));
            }
        }

        if transfer.authorization.actor != transfer.from {
            return Err(NodeError::Unauthorized(format!(
                "transfer from {} requires {}@active",
                transfer.from, transfer.from
            )));
        }

        if !state.keys.contains(&transfer.authorization.actor) {
            return Err(NodeError::Unauthorized(format!(
                "no signing key available for {}",
                transfer.authorization
            )));
        }

        let tx_id = TransactionId::new(Uuid::new_v4().simple().to_string());
        state.pending.push(tx_id.clone());
        state.tracker.add(&tx_id, self.connection_id);

        Ok(tx_id)
    }

    fn get_transaction_status(&self, tx_id: &TransactionId) -> Result<NodeTxStatus, NodeError> {
        Ok(self.node.state.lock().tracker.status(tx_id, self.connection_id))
    }
}
