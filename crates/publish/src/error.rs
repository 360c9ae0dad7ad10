//! Publish error types.

use outbound_config::ConfigError;
use outbound_transfer::TransferError;

/// Errors produced while publishing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("no host configuration named '{0}'")]
    UnknownHost(String),

    #[error("publisher selection parameter '{0}' is not set for this build")]
    NoParameter(String),

    #[error("publisher selection parameter '{parameter}' is not a valid regex '{pattern}': {source}")]
    BadPattern {
        parameter: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
