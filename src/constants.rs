/// The default time limit, in seconds, for a transaction to reach a tracked condition.
/// The node keeps a tracked transaction in memory for the same amount of time after it became
/// irreversible.
pub const DEFAULT_TRACK_TIMEOUT_SECS: u64 = 600;

/// The default delay between two status queries of the same transaction.
pub const DEFAULT_POLL_INTERVAL_MILLIS: u64 = 500;

/// The number of consecutive failed status queries tolerated before a wait gives up.
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Upper bound for the exponential backoff, as a multiple of the poll interval.
pub const MAX_BACKOFF_MULTIPLIER: u32 = 4;

/// Block production interval of the chain. One block is one slot.
pub const BLOCK_INTERVAL_MILLIS: u64 = 500;

/// Slots per second, used to convert the track timeout into slots.
pub const SLOTS_PER_SECOND: u32 = 2;

/// Number of blocks the last irreversible block lags behind head with a single producer
/// (12 blocks per round, two rounds).
pub const DEFAULT_FINALITY_LAG_BLOCKS: u32 = 24;

/// Extra time granted on top of the finality window when waiting for finalization.
pub const IRREVERSIBLE_PADDING_SECS: u64 = 60;

/// Maximum size of a transfer memo, in bytes.
pub const MAX_MEMO_BYTES: usize = 256;

/// Maximum number of fraction digits an asset symbol can carry.
pub const MAX_ASSET_PRECISION: u32 = 18;

/// Maximum length of an asset symbol code.
pub const MAX_SYMBOL_CODE_LEN: usize = 7;

pub const DEFAULT_TRANSFER_AMOUNT: &str = "1.0000 SYS";

pub const DEFAULT_NODE_HOST: &str = "localhost";

pub const DEFAULT_NODE_PORT: u16 = 8888;

/// Timeout applied to every single request sent to a node.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// How long a node may hold a wait request before the condition is taken as not reached yet.
pub const DEFAULT_WAIT_PROBE_MILLIS: u64 = 1000;

pub const CONNECTION_ID_HEADER: &str = "x-connection-id";

pub const TRACKER_MODE_FLAG: &str = "--transaction-tracker-mode";

pub const TRACK_TIMEOUT_FLAG: &str = "--transaction-track-timeout";
