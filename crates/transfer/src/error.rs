//! Transfer error types.

use std::path::PathBuf;

use crate::checkpoint::TransferCheckpoint;

/// Errors produced while selecting or sending files.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("remote session error: {0}")]
    Session(String),

    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid pattern separator: {0}")]
    Separator(#[from] regex::Error),

    #[error("file scan failed: {0}")]
    Scan(String),

    #[error("base directory does not exist: {}", .0.display())]
    BaseDirectoryMissing(PathBuf),

    #[error("bad date format '{pattern}': {reason}")]
    BadDateFormat { pattern: String, reason: String },

    #[error("path '{path}' does not start with the prefix to remove '{prefix}'")]
    PrefixMismatch { path: String, prefix: String },

    #[error("flatten mode: more than one file named '{0}'")]
    DuplicateFlattenedName(String),

    #[error("failed to create remote directory '{0}'")]
    DirectoryCreateFailed(String),
}

impl TransferError {
    /// Returns `true` for errors that come from the transfer's own settings
    /// and will recur on every attempt.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::Pattern { .. }
                | Self::Separator(_)
                | Self::BaseDirectoryMissing(_)
                | Self::BadDateFormat { .. }
                | Self::PrefixMismatch { .. }
                | Self::DuplicateFlattenedName(_)
        )
    }
}

/// A [`TransferError`] raised inside a transfer unit, together with the
/// progress made so far.
///
/// `checkpoint` is `None` when the failure happened before any file was
/// selected; the unit must then start over.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct TransferInterrupted {
    #[source]
    pub source: TransferError,
    pub checkpoint: Option<TransferCheckpoint>,
}

impl TransferInterrupted {
    pub fn new(source: TransferError, checkpoint: Option<TransferCheckpoint>) -> Self {
        Self { source, checkpoint }
    }
}

impl From<TransferError> for TransferInterrupted {
    fn from(source: TransferError) -> Self {
        Self::new(source, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupted_displays_cause() {
        let err = TransferInterrupted::from(TransferError::DuplicateFlattenedName("a.txt".into()));
        assert_eq!(err.to_string(), "flatten mode: more than one file named 'a.txt'");
        assert!(err.checkpoint.is_none());
    }

    #[test]
    fn configuration_errors_are_classified() {
        assert!(
            TransferError::PrefixMismatch {
                path: "a/b".into(),
                prefix: "c/".into()
            }
            .is_configuration_error()
        );
        assert!(!TransferError::Session("connection reset".into()).is_configuration_error());
        assert!(!TransferError::DirectoryCreateFailed("x".into()).is_configuration_error());
    }

    #[test]
    fn prefix_mismatch_names_both_strings() {
        let err = TransferError::PrefixMismatch {
            path: "target/lib/a.jar".into(),
            prefix: "build/".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("target/lib/a.jar"));
        assert!(msg.contains("build/"));
    }
}
