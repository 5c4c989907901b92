use crate::config::TrackerModeConfig;
use crate::constants::SLOTS_PER_SECOND;
use crate::types::{BlockNum, ConnectionId, NodeTxStatus, Slot, TrackingMode, TransactionId};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedState {
    Pending,
    Accepted,
    Finalized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedTransaction {
    pub id: TransactionId,

    // Connection the transaction was submitted through. Only known to the local tracker.
    pub origin: Option<ConnectionId>,

    // The LIB slot at which this record is evicted.
    pub expiration_slot: Slot,

    pub state: TrackedState,

    pub block_num: Option<BlockNum>,
}

/// A block as seen by the tracker: its number, its timestamp slot and the ids it includes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub block_num: BlockNum,
    pub slot: Slot,
    pub transactions: Vec<TransactionId>,
}

/// Node side index answering transaction status lookups.
///
/// In global mode every transaction included in an accepted or irreversible block is recorded,
/// so a transaction is unknown until it lands in a block. In local mode only transactions added
/// at submission are recorded, and only the submitting connection can look them up.
///
/// Records are kept `timeout_secs` after the last irreversible block that updated them.
pub struct TransactionTracker {
    mode: TrackingMode,
    records: HashMap<TransactionId, TrackedTransaction>,
    lib_slot: Slot,
    num_slots_pass_lib: Slot,
}

impl TransactionTracker {
    pub fn new(config: &TrackerModeConfig) -> Self {
        let timeout_secs =
            Slot::try_from(config.timeout_secs).unwrap_or(Slot::MAX / SLOTS_PER_SECOND);

        Self {
            mode: config.mode,
            records: HashMap::new(),
            lib_slot: 0,
            num_slots_pass_lib: timeout_secs.saturating_mul(SLOTS_PER_SECOND),
        }
    }

    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    pub fn lib_slot(&self) -> Slot {
        self.lib_slot
    }

    pub fn contains(&self, tx_id: &TransactionId) -> bool {
        self.records.contains_key(tx_id)
    }

    pub fn expiration_slot(&self, tx_id: &TransactionId) -> Option<Slot> {
        self.records.get(tx_id).map(|record| record.expiration_slot)
    }

    /// Records a transaction sent through `origin`. Ignored by the global tracker, which
    /// only learns about transactions from blocks.
    pub fn add(&mut self, tx_id: &TransactionId, origin: ConnectionId) {
        if self.mode == TrackingMode::Global {
            return;
        }

        let expiration_slot = self.lib_slot.saturating_add(self.num_slots_pass_lib);
        self.records.insert(
            tx_id.clone(),
            TrackedTransaction {
                id: tx_id.clone(),
                origin: Some(origin),
                expiration_slot,
                state: TrackedState::Pending,
                block_num: None,
            },
        );
    }

    pub fn on_accepted_block(&mut self, block: &Block) {
        // Expiration is computed from the LIB, nothing can be recorded before the first one.
        if self.lib_slot == 0 {
            return;
        }

        for tx_id in &block.transactions {
            self.set_tracked_transaction(tx_id, TrackedState::Accepted, block.block_num);
        }
    }

    pub fn on_irreversible_block(&mut self, block: &Block) {
        if self.lib_slot == 0 {
            for record in self.records.values_mut() {
                record.expiration_slot = record.expiration_slot.saturating_add(block.slot);
            }
        }

        self.lib_slot = block.slot;

        for tx_id in &block.transactions {
            self.set_tracked_transaction(tx_id, TrackedState::Finalized, block.block_num);
        }

        self.clear_expired();
    }

    fn set_tracked_transaction(
        &mut self,
        tx_id: &TransactionId,
        state: TrackedState,
        block_num: BlockNum,
    ) {
        let expiration_slot = self.lib_slot.saturating_add(self.num_slots_pass_lib);

        let record = match self.mode {
            TrackingMode::Global => self
                .records
                .entry(tx_id.clone())
                .or_insert_with(|| TrackedTransaction {
                    id: tx_id.clone(),
                    origin: None,
                    expiration_slot,
                    state: TrackedState::Pending,
                    block_num: None,
                }),
            TrackingMode::Local => match self.records.get_mut(tx_id) {
                Some(record) => record,
                None => return,
            },
        };

        if record.state == TrackedState::Finalized {
            return;
        }

        if self.mode == TrackingMode::Global {
            record.expiration_slot = expiration_slot;
        }

        record.state = state;
        record.block_num = Some(block_num);
    }

    fn clear_expired(&mut self) {
        let lib_slot = self.lib_slot;
        let before = self.records.len();

        self.records.retain(|_, record| record.expiration_slot > lib_slot);

        let evicted = before - self.records.len();
        if evicted > 0 {
            debug!(
                "Evicted {} tracked transactions at lib slot {}",
                evicted, lib_slot
            );
        }
    }

    /// Current status of `tx_id` as seen by `connection`.
    pub fn status(&self, tx_id: &TransactionId, connection: ConnectionId) -> NodeTxStatus {
        let record = match self.records.get(tx_id) {
            Some(record) => record,
            None => return NodeTxStatus::Untracked,
        };

        if self.mode == TrackingMode::Local && record.origin != Some(connection) {
            return NodeTxStatus::Untracked;
        }

        match (record.state, record.block_num) {
            (TrackedState::Accepted, Some(block_num)) => NodeTxStatus::Accepted { block_num },
            (TrackedState::Finalized, Some(block_num)) => NodeTxStatus::Finalized { block_num },
            _ => NodeTxStatus::Pending,
        }
    }
}
