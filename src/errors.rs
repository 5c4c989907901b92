use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed node response: {0}")]
    MalformedResponse(String),

    #[error("Missing authority: {0}")]
    Unauthorized(String),

    /// Refusal with the node's reason. Over HTTP the reason starts with the status code.
    #[error("Node rejected the request: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for NodeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            NodeError::MalformedResponse(error.to_string())
        } else {
            NodeError::Transport(error.to_string())
        }
    }
}

/// Any failure while proposing a transfer. Never retried, a blind resubmission may spend twice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Submission failed: {detail}")]
pub struct SubmissionFailed {
    pub detail: String,
}

impl SubmissionFailed {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Tracking mode must be global or local, got: {0}")]
    UnknownTrackingMode(String),

    #[error("Track timeout must be greater than zero")]
    InvalidTimeout,

    #[error("Poll interval must be greater than zero and lower than the timeout")]
    InvalidPollInterval,

    #[error("Error reading config file: {0}")]
    ConfigFileError(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    #[error("Asset must look like '<amount> <SYMBOL>', got: {0}")]
    InvalidFormat(String),

    #[error("Invalid asset amount: {0}")]
    InvalidAmount(String),

    #[error("Asset amount must be positive: {0}")]
    NonPositiveAmount(String),

    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
}

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to stand up cluster")]
    LaunchFailed,

    #[error("Node {0} is not available")]
    NodeUnavailable(usize),

    #[error(transparent)]
    Submission(#[from] SubmissionFailed),
}
