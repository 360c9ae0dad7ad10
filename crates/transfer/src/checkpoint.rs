use std::path::PathBuf;

use crate::finder::Selection;

/// Progress of one transfer unit, enough to pick up where it stopped.
///
/// The selection is frozen when the unit starts; the cursors only move
/// forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferCheckpoint {
    pub selection: Selection,
    /// Number of `selection.files` already sent.
    pub files_sent: usize,
    /// Number of `selection.empty_dirs` already created.
    pub dirs_materialized: usize,
    /// The remote directory was already cleaned.
    pub cleanup_done: bool,
}

impl TransferCheckpoint {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    /// Files not sent yet.
    pub fn remaining_files(&self) -> &[PathBuf] {
        &self.selection.files[self.files_sent.min(self.selection.files.len())..]
    }

    /// Files already sent.
    pub fn sent_files(&self) -> &[PathBuf] {
        &self.selection.files[..self.files_sent.min(self.selection.files.len())]
    }

    /// Returns `true` once every file was sent.
    pub fn files_complete(&self) -> bool {
        self.files_sent >= self.selection.files.len()
    }
}
