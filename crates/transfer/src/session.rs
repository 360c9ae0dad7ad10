//! Remote session trait.
//!
//! Transports (SFTP, FTP, SMB, a local directory...) implement
//! [`RemoteSession`]; the transfer engine only talks to this trait.

use std::future::Future;
use std::pin::Pin;

use outbound_config::TransferSpec;
use tokio::io::AsyncRead;
use tracing::debug;

use crate::TransferError;

/// Boxed future returned by [`RemoteSession`] methods.
pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransferError>> + Send + 'a>>;

/// An open connection to a remote destination.
///
/// The session has a current directory. Relative paths passed to
/// [`change_directory`](Self::change_directory) and
/// [`make_directory`](Self::make_directory) are resolved against it.
pub trait RemoteSession: Send {
    /// Returns to the directory the session started in.
    ///
    /// `Ok(false)` means the session could not change directory.
    fn change_to_initial_directory(&mut self) -> SessionFuture<'_, bool>;

    /// Changes into `path`; `Ok(false)` if it does not exist or can't be entered.
    fn change_directory<'a>(&'a mut self, path: &'a str) -> SessionFuture<'a, bool>;

    /// Creates `path`; `Ok(false)` if it could not be created.
    fn make_directory<'a>(&'a mut self, path: &'a str) -> SessionFuture<'a, bool>;

    /// Called before the files of `spec` are sent.
    fn begin_group<'a>(&'a mut self, spec: &'a TransferSpec) -> SessionFuture<'a, ()>;

    /// Called after the files of `spec` were sent.
    fn end_group<'a>(&'a mut self, spec: &'a TransferSpec) -> SessionFuture<'a, ()>;

    /// Writes `reader` to `file_name` in the current directory.
    fn upload_file<'a>(
        &'a mut self,
        spec: &'a TransferSpec,
        file_name: &'a str,
        reader: &'a mut (dyn AsyncRead + Send + Unpin),
    ) -> SessionFuture<'a, ()>;

    /// Deletes everything below the current directory.
    fn delete_tree(&mut self) -> SessionFuture<'_, ()>;

    fn disconnect(&mut self) -> SessionFuture<'_, ()>;

    /// Disconnects, logging instead of returning any error.
    fn disconnect_quietly(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if let Err(e) = self.disconnect().await {
                debug!(error = %e, "error while disconnecting, ignored");
            }
        })
    }
}
