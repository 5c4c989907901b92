use crate::config::TrackerModeConfig;
use crate::constants::{TRACKER_MODE_FLAG, TRACK_TIMEOUT_FLAG};
use crate::errors::ConfigError;
use crate::nodes::http_node::HttpNode;
use crate::nodes::memory_node::{BlockProducer, MemoryConnection, MemoryNode};
use crate::nodes::NodeApi;
use crate::types::TrackingMode;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{error, info, warn};

/// Accounts bootstrapped on a simulated chain, each with its signing key imported.
pub const BOOTSTRAP_ACCOUNTS: [&str; 3] = ["eosio", "defproducera", "defproducerb"];

/// The set of nodes a scenario runs against.
pub trait Cluster {
    type Node: NodeApi;

    /// Starts `node_count` nodes with `extra_args` passed to every node.
    fn launch(&mut self, node_count: usize, extra_args: &BTreeMap<String, String>) -> bool;

    /// Opens a new connection to node `index`.
    fn connect(&self, index: usize) -> Option<Self::Node>;

    fn shutdown(&mut self);
}

/// Node flags enforcing the same tracking settings the waiters assume.
pub fn tracking_args(config: &TrackerModeConfig) -> BTreeMap<String, String> {
    BTreeMap::from([
        (TRACKER_MODE_FLAG.to_string(), config.mode.to_string()),
        (TRACK_TIMEOUT_FLAG.to_string(), config.timeout_secs.to_string()),
    ])
}

/// Reads the tracking flags back from node arguments, defaulting the missing ones.
pub fn parse_tracking_args(
    extra_args: &BTreeMap<String, String>,
) -> Result<TrackerModeConfig, ConfigError> {
    let mut config = TrackerModeConfig::default();

    if let Some(mode) = extra_args.get(TRACKER_MODE_FLAG) {
        config.mode = mode.parse::<TrackingMode>()?;
    }

    if let Some(timeout) = extra_args.get(TRACK_TIMEOUT_FLAG) {
        config.timeout_secs = timeout.parse().map_err(|_| ConfigError::InvalidTimeout)?;
    }

    config.validate()?;
    Ok(config)
}

/// A node already running at `http://host:port`.
pub struct RemoteCluster {
    endpoint: String,
}

impl RemoteCluster {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            endpoint: format!("http://{host}:{port}"),
        }
    }
}

impl Cluster for RemoteCluster {
    type Node = HttpNode;

    fn launch(&mut self, node_count: usize, extra_args: &BTreeMap<String, String>) -> bool {
        if node_count != 1 {
            error!("A remote cluster exposes a single endpoint, {node_count} nodes requested");
            return false;
        }

        let flags: Vec<String> = extra_args.iter().map(|(k, v)| format!("{k} {v}")).collect();
        info!(
            "Using node at {}, expected to run with: {}",
            self.endpoint,
            flags.join(" ")
        );

        true
    }

    fn connect(&self, index: usize) -> Option<HttpNode> {
        if index != 0 {
            return None;
        }

        HttpNode::new(&self.endpoint)
            .map_err(|e| error!("Failed to connect to {}: {}", self.endpoint, e))
            .ok()
    }

    fn shutdown(&mut self) {}
}

/// A single in-process producer node.
pub struct SimulatedCluster {
    block_interval: Duration,
    finality_lag_blocks: u32,
    node: Option<MemoryNode>,
    producer: Option<BlockProducer>,
}

impl SimulatedCluster {
    pub fn new(block_interval: Duration, finality_lag_blocks: u32) -> Self {
        Self {
            block_interval,
            finality_lag_blocks,
            node: None,
            producer: None,
        }
    }

    pub fn node(&self) -> Option<&MemoryNode> {
        self.node.as_ref()
    }
}

impl Cluster for SimulatedCluster {
    type Node = MemoryConnection;

    fn launch(&mut self, node_count: usize, extra_args: &BTreeMap<String, String>) -> bool {
        if node_count != 1 {
            error!("The simulated cluster runs a single producer, {node_count} nodes requested");
            return false;
        }

        let config = match parse_tracking_args(extra_args) {
            Ok(config) => config,
            Err(e) => {
                error!("Invalid node arguments: {}", e);
                return false;
            }
        };

        let node = MemoryNode::new(&config);
        for account in BOOTSTRAP_ACCOUNTS {
            node.create_account(account);
            node.import_key(account);
        }

        info!(
            "Simulated node started ({} mode, track timeout {}s)",
            config.mode, config.timeout_secs
        );

        self.producer = Some(node.spawn_producer(self.block_interval, self.finality_lag_blocks));
        self.node = Some(node);
        true
    }

    fn connect(&self, index: usize) -> Option<Self::Node> {
        if index != 0 {
            warn!("Simulated node {} does not exist", index);
            return None;
        }

        self.node.as_ref().map(|node| node.connect())
    }

    fn shutdown(&mut self) {
        if let Some(mut producer) = self.producer.take() {
            producer.stop();
        }
        self.node = None;
    }
}
