use crate::config::PollBackoff;
use crate::constants::{
    BLOCK_INTERVAL_MILLIS, DEFAULT_FINALITY_LAG_BLOCKS, DEFAULT_NODE_HOST, DEFAULT_NODE_PORT,
    DEFAULT_TRANSFER_AMOUNT,
};
use crate::types::TrackingMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]

pub struct Args {
    /// Transaction tracker mode of the node: global or local
    #[arg(long, env = "TRANSACTION_TRACKER_MODE")]
    pub transaction_tracker_mode: Option<TrackingMode>,

    /// Transaction track timeout in seconds
    #[arg(long, env = "TRANSACTION_TRACK_TIMEOUT")]
    pub transaction_track_timeout: Option<u64>,

    /// Seconds between two status queries
    #[arg(long)]
    pub poll_interval: Option<f64>,

    /// Delay policy between status queries: fixed or exponential
    #[arg(long)]
    pub backoff: Option<PollBackoff>,

    /// JSON file with tracker settings, overridden by flags
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Node host
    #[arg(long, default_value = DEFAULT_NODE_HOST, env = "NODE_HOST")]
    pub host: String,

    /// Node http port
    #[arg(long, short = 'p', default_value_t = DEFAULT_NODE_PORT, env = "NODE_PORT")]
    pub port: u16,

    /// Run against an in-process simulated node instead of host:port
    #[arg(long)]
    pub simulate: bool,

    /// Block interval of the simulated node
    #[arg(long, default_value_t = BLOCK_INTERVAL_MILLIS)]
    pub block_interval_ms: u64,

    /// Blocks the simulated LIB lags behind head
    #[arg(long, default_value_t = DEFAULT_FINALITY_LAG_BLOCKS)]
    pub finality_lag_blocks: u32,

    #[arg(long, default_value = "defproducera")]
    pub from: String,

    #[arg(long, default_value = "defproducerb")]
    pub to: String,

    #[arg(long, default_value = DEFAULT_TRANSFER_AMOUNT)]
    pub amount: String,

    #[arg(long, default_value = "test")]
    pub memo: String,

    /// Debug logging
    #[arg(short = 'v')]
    pub verbose: bool,
}
