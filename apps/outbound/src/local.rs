//! A [`RemoteSession`] whose "remote" side is a directory on this machine.

use std::path::PathBuf;

use outbound_config::{HostConfig, TransferSpec};
use outbound_publish::{ConnectFuture, SessionFactory};
use outbound_transfer::{
    BuildContext, RemoteSession, SessionFuture, TransferError, is_directory_absolute,
};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, info};

/// Session confined to `root`. Paths never leave it.
#[derive(Debug)]
pub struct LocalSession {
    root: PathBuf,
    /// Current directory, relative to `root`.
    cwd: PathBuf,
}

impl LocalSession {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cwd: PathBuf::new(),
        }
    }

    /// Current directory as an absolute path.
    pub fn current_dir(&self) -> PathBuf {
        self.root.join(&self.cwd)
    }

    /// Resolves `path` against the current directory, or against the root
    /// when it starts with a separator. `None` if it would climb out of the
    /// root.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut rel = if is_directory_absolute(path) {
            PathBuf::new()
        } else {
            self.cwd.clone()
        };
        for segment in path.split(['/', '\\']) {
            match segment {
                "" | "." => {}
                ".." => {
                    if !rel.pop() {
                        return None;
                    }
                }
                name => rel.push(name),
            }
        }
        Some(rel)
    }
}

impl RemoteSession for LocalSession {
    fn change_to_initial_directory(&mut self) -> SessionFuture<'_, bool> {
        Box::pin(async move {
            self.cwd = PathBuf::new();
            Ok(true)
        })
    }

    fn change_directory<'a>(&'a mut self, path: &'a str) -> SessionFuture<'a, bool> {
        Box::pin(async move {
            let Some(rel) = self.resolve(path) else {
                return Ok(false);
            };
            match tokio::fs::metadata(self.root.join(&rel)).await {
                Ok(meta) if meta.is_dir() => {
                    self.cwd = rel;
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }

    fn make_directory<'a>(&'a mut self, path: &'a str) -> SessionFuture<'a, bool> {
        Box::pin(async move {
            let Some(rel) = self.resolve(path) else {
                return Ok(false);
            };
            match tokio::fs::create_dir(self.root.join(&rel)).await {
                Ok(()) => Ok(true),
                Err(e) => {
                    debug!(path = %rel.display(), error = %e, "mkdir failed");
                    Ok(false)
                }
            }
        })
    }

    fn begin_group<'a>(&'a mut self, spec: &'a TransferSpec) -> SessionFuture<'a, ()> {
        Box::pin(async move {
            debug!(source = %spec.source_glob, "begin transfer");
            Ok(())
        })
    }

    fn end_group<'a>(&'a mut self, spec: &'a TransferSpec) -> SessionFuture<'a, ()> {
        Box::pin(async move {
            debug!(source = %spec.source_glob, "end transfer");
            Ok(())
        })
    }

    fn upload_file<'a>(
        &'a mut self,
        _spec: &'a TransferSpec,
        file_name: &'a str,
        reader: &'a mut (dyn AsyncRead + Send + Unpin),
    ) -> SessionFuture<'a, ()> {
        Box::pin(async move {
            let target = self.current_dir().join(file_name);
            let mut file = tokio::fs::File::create(&target).await?;
            let bytes = tokio::io::copy(reader, &mut file).await?;
            file.flush().await?;
            debug!(path = %target.display(), bytes, "file written");
            Ok(())
        })
    }

    fn delete_tree(&mut self) -> SessionFuture<'_, ()> {
        Box::pin(async move {
            let dir = self.current_dir();
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                if entry.file_type().await?.is_dir() {
                    tokio::fs::remove_dir_all(entry.path()).await?;
                } else {
                    tokio::fs::remove_file(entry.path()).await?;
                }
            }
            debug!(path = %dir.display(), "directory emptied");
            Ok(())
        })
    }

    fn disconnect(&mut self) -> SessionFuture<'_, ()> {
        Box::pin(async move { Ok(()) })
    }
}

/// Opens [`LocalSession`]s rooted at a fixed directory.
#[derive(Debug, Clone)]
pub struct LocalFactory {
    host: HostConfig,
    root: PathBuf,
}

impl LocalFactory {
    pub fn new(host: HostConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            host,
            root: root.into(),
        }
    }
}

impl SessionFactory for LocalFactory {
    fn host(&self) -> &HostConfig {
        &self.host
    }

    fn connect<'a>(&'a self, _ctx: &'a BuildContext) -> ConnectFuture<'a> {
        Box::pin(async move {
            let is_dir = tokio::fs::metadata(&self.root)
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            if !is_dir {
                return Err(TransferError::Session(format!(
                    "destination of host [{}] is not a directory: {}",
                    self.host.name,
                    self.root.display()
                )));
            }
            info!(host = %self.host.name, root = %self.root.display(), "session opened");
            let session: Box<dyn RemoteSession> = Box::new(LocalSession::new(&self.root));
            Ok(session)
        })
    }
}
