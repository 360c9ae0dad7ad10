//! One configured transfer: select files, then send them over a session.

use std::collections::HashSet;
use std::path::Path;

use outbound_config::TransferSpec;
use tracing::{debug, info, trace};

use crate::checkpoint::TransferCheckpoint;
use crate::env::BuildContext;
use crate::error::{TransferError, TransferInterrupted};
use crate::finder::{FileFinder, Selection};
use crate::materializer::DirectoryMaterializer;
use crate::path_rules::{
    relative_directory_of, relative_path_of, remote_directory_for, strip_remove_prefix,
};
use crate::progress::ProgressReader;
use crate::session::RemoteSession;

/// A [`TransferSpec`] bound to the build it publishes.
pub struct TransferUnit<'a> {
    spec: &'a TransferSpec,
    ctx: &'a BuildContext,
}

impl<'a> TransferUnit<'a> {
    pub fn new(spec: &'a TransferSpec, ctx: &'a BuildContext) -> Self {
        Self { spec, ctx }
    }

    /// Returns `false` when the include list is blank; such a unit sends
    /// nothing.
    pub fn has_configured_source_files(&self) -> bool {
        self.spec.has_configured_source_files()
    }

    fn wants_empty_dirs(&self) -> bool {
        self.spec.materialize_empty_dirs && !self.spec.flatten
    }

    /// Scans the base directory for the files this unit sends.
    pub async fn select(&self) -> Result<Selection, TransferError> {
        let base = self.ctx.base_dir().to_path_buf();
        if !tokio::fs::metadata(&base)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(TransferError::BaseDirectoryMissing(base));
        }

        let includes = self.ctx.expand(&self.spec.source_glob);
        let excludes = self
            .spec
            .exclude_glob
            .as_deref()
            .map(|e| self.ctx.expand(e).trim().to_string())
            .filter(|e| !e.is_empty());
        debug!(
            source = %self.spec.source_glob,
            includes = %includes,
            excludes = ?excludes,
            "selecting files"
        );

        let finder = FileFinder::new(
            &includes,
            excludes.as_deref(),
            !self.spec.skip_default_excludes,
            self.wants_empty_dirs(),
            self.spec.pattern_separator.as_deref(),
        )?;

        tokio::task::spawn_blocking(move || finder.find(&base))
            .await
            .map_err(|e| TransferError::Scan(format!("task join error: {e}")))?
    }

    /// Selects and sends every file. Returns the number of files sent.
    ///
    /// On failure the error carries a checkpoint for [`resume`](Self::resume),
    /// unless selection itself failed.
    pub async fn execute(
        &self,
        session: &mut dyn RemoteSession,
    ) -> Result<usize, TransferInterrupted> {
        let selection = self.select().await?;
        if selection.is_empty() {
            self.ctx.print_if_verbose(&format!(
                "No files selected by [{}]",
                self.spec.source_glob
            ));
        }
        self.resume(session, TransferCheckpoint::new(selection)).await
    }

    /// Continues from `checkpoint`. Returns the number of files sent by
    /// this call only.
    pub async fn resume(
        &self,
        session: &mut dyn RemoteSession,
        mut checkpoint: TransferCheckpoint,
    ) -> Result<usize, TransferInterrupted> {
        let already_sent = checkpoint.files_sent;
        if already_sent > 0 || checkpoint.cleanup_done {
            debug!(
                source = %self.spec.source_glob,
                sent = already_sent,
                remaining = checkpoint.remaining_files().len(),
                "resuming transfer"
            );
        }
        match self.run(session, &mut checkpoint).await {
            Ok(()) => {
                let sent = checkpoint.files_sent - already_sent;
                debug!(
                    files = sent,
                    resumed_at = already_sent,
                    empty_dirs = checkpoint.dirs_materialized,
                    "transfer complete"
                );
                Ok(sent)
            }
            Err(source) => {
                debug!(
                    error = %source,
                    files_sent = checkpoint.files_sent,
                    dirs_materialized = checkpoint.dirs_materialized,
                    "transfer interrupted"
                );
                Err(TransferInterrupted::new(source, Some(checkpoint)))
            }
        }
    }

    async fn run(
        &self,
        session: &mut dyn RemoteSession,
        checkpoint: &mut TransferCheckpoint,
    ) -> Result<(), TransferError> {
        let ctx = self.ctx;
        let spec = self.spec;
        let remote_dir = remote_directory_for(spec, &ctx.build_time, &ctx.env)?;
        let mut dirs = DirectoryMaterializer::new(remote_dir, spec.flatten);

        if spec.clean_remote_dir_first && !checkpoint.cleanup_done {
            dirs.reset(session).await?;
            session.delete_tree().await?;
            checkpoint.cleanup_done = true;
            info!(remote_dir = %dirs.remote_dir(), "remote directory cleaned");
            ctx.print_if_verbose(&format!("Cleaned remote directory [{}]", dirs.remote_dir()));
        }

        // Names sent before a resume still count towards duplicates.
        let mut flattened: HashSet<String> = if spec.flatten {
            checkpoint
                .sent_files()
                .iter()
                .filter_map(|f| file_name(f).ok())
                .collect()
        } else {
            HashSet::new()
        };

        while !checkpoint.files_complete() {
            let file = checkpoint.selection.files[checkpoint.files_sent].clone();
            let name = file_name(&file)?;
            if spec.flatten && !flattened.insert(name.clone()) {
                return Err(TransferError::DuplicateFlattenedName(name));
            }

            let rel_dir =
                relative_directory_of(&ctx.base_dir, &file, spec.remove_prefix.as_deref(), &ctx.env)?;
            debug!(file = %name, rel_dir = %rel_dir, "path to file");
            dirs.ensure(session, &rel_dir).await?;
            self.upload(session, &file, &name).await?;
            checkpoint.files_sent += 1;
        }

        if self.wants_empty_dirs() {
            while checkpoint.dirs_materialized < checkpoint.selection.empty_dirs.len() {
                let dir = &checkpoint.selection.empty_dirs[checkpoint.dirs_materialized];
                let rel = relative_path_of(&ctx.base_dir, dir)?;
                let target =
                    strip_remove_prefix(&format!("{rel}/"), spec.remove_prefix.as_deref(), &ctx.env)?;
                let target = target.trim_end_matches('/');
                dirs.ensure(session, target).await?;
                ctx.print_if_verbose(&format!("Created directory [{target}]"));
                checkpoint.dirs_materialized += 1;
            }
        }

        Ok(())
    }

    async fn upload(
        &self,
        session: &mut dyn RemoteSession,
        file: &Path,
        name: &str,
    ) -> Result<(), TransferError> {
        let handle = tokio::fs::File::open(file).await?;
        let traced = name.to_string();
        let mut reader = ProgressReader::new(handle).with_callback(Box::new(move |bytes| {
            trace!(file = %traced, bytes, "upload progress");
        }));
        session.upload_file(self.spec, name, &mut reader).await?;
        debug!(file = %file.display(), bytes = reader.bytes_read(), "file sent");
        self.ctx
            .print_if_verbose(&format!("Transferred [{}] ({} bytes)", name, reader.bytes_read()));
        Ok(())
    }
}

fn file_name(path: &Path) -> Result<String, TransferError> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| TransferError::Scan(format!("no file name in {}", path.display())))
}
