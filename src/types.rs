use crate::asset::Asset;
use crate::errors::ConfigError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

pub type AccountName = String;
pub type BlockNum = u32;
pub type Slot = u32;
pub type ConnectionId = Uuid;

/// Opaque transaction identifier, unique per node epoch.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The actor and permission authorizing a transfer, written `actor@permission`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Authorization {
    pub actor: AccountName,
    pub permission: String,
}

impl Authorization {
    pub fn active(actor: &str) -> Self {
        Self {
            actor: actor.to_string(),
            permission: "active".to_string(),
        }
    }
}

impl FromStr for Authorization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((actor, permission)) if !actor.is_empty() && !permission.is_empty() => Ok(Self {
                actor: actor.to_string(),
                permission: permission.to_string(),
            }),
            _ => Err(format!("authorization must be actor@permission, got: {s}")),
        }
    }
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.actor, self.permission)
    }
}

impl Serialize for Authorization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Authorization {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Authorization::from_str(&value).map_err(serde::de::Error::custom)
    }
}

/// A transfer request as sent to a node.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Transfer {
    pub from: AccountName,
    pub to: AccountName,
    pub quantity: Asset,
    pub memo: String,
    pub authorization: Authorization,
}

/// A transfer accepted by a node for inclusion. Immutable reference to on-ledger state.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub from: AccountName,
    pub to: AccountName,
    pub quantity: Asset,
    pub memo: String,
}

/// Scope of the transaction index a node answers status lookups from.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrackingMode {
    /// Node-wide index of every transaction seen in a block.
    #[default]
    Global,
    /// Only transactions submitted through the querying connection.
    Local,
}

impl FromStr for TrackingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "global" => Ok(TrackingMode::Global),
            "local" => Ok(TrackingMode::Local),
            _ => Err(ConfigError::UnknownTrackingMode(s.to_string())),
        }
    }
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingMode::Global => f.write_str("global"),
            TrackingMode::Local => f.write_str("local"),
        }
    }
}

/// Target milestone of a wait. Finalized is always reached after Accepted.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Accepted,
    Finalized,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Accepted => f.write_str("accepted"),
            Condition::Finalized => f.write_str("finalized"),
        }
    }
}

/// Raw answer of a node to a status lookup, before the tracking mode is applied.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTxStatus {
    Pending,
    Accepted { block_num: BlockNum },
    Finalized { block_num: BlockNum },
    /// The node holds no record for the id in the index it answers from.
    Untracked,
    /// The record existed and was evicted.
    Expired,
}

/// Lifecycle state of a transaction as observed through one status query.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Pending,
    Accepted,
    Finalized,
    /// Global mode: the node index has no record (yet).
    NotFound,
    /// Local mode: either the transaction never existed, it expired, or it was
    /// submitted through another connection. These cases are indistinguishable.
    ExpiredOrTrackingMismatch,
}

impl LifecycleState {
    /// Position in the Pending < Accepted < Finalized order.
    pub fn rank(&self) -> u8 {
        match self {
            LifecycleState::Pending
            | LifecycleState::NotFound
            | LifecycleState::ExpiredOrTrackingMismatch => 0,
            LifecycleState::Accepted => 1,
            LifecycleState::Finalized => 2,
        }
    }

    /// The milestone this state satisfies for `target`, if any.
    pub fn satisfies(&self, target: Condition) -> Option<Condition> {
        match (self, target) {
            (LifecycleState::Finalized, _) => Some(Condition::Finalized),
            (LifecycleState::Accepted, Condition::Accepted) => Some(Condition::Accepted),
            _ => None,
        }
    }
}

/// Terminal result of one wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reached {
        state: Condition,
        elapsed: Duration,
    },
    TimedOut {
        last_state: Option<LifecycleState>,
    },
    NotTracked,
    QueryError {
        detail: String,
    },
    /// The caller cancelled the wait at a poll boundary.
    Cancelled {
        last_state: Option<LifecycleState>,
    },
}

impl Outcome {
    pub fn is_reached(&self) -> bool {
        matches!(self, Outcome::Reached { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Reached { state, elapsed } => {
                write!(f, "reached {} after {:.1}s", state, elapsed.as_secs_f64())
            }
            Outcome::TimedOut { last_state } => write!(f, "timed out (last state {last_state:?})"),
            Outcome::NotTracked => f.write_str("not tracked"),
            Outcome::QueryError { detail } => write!(f, "query error: {detail}"),
            Outcome::Cancelled { last_state } => write!(f, "cancelled (last state {last_state:?})"),
        }
    }
}
