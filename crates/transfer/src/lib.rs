//! Transfer engine for outbound publishing.
//!
//! Selects local files with Ant-style patterns, works out where each one
//! lands on the remote side, creates remote directories on demand and
//! sends the files over a [`RemoteSession`]. A unit that fails part way
//! returns a [`TransferCheckpoint`] so a retry can continue where it
//! stopped instead of starting over.

pub mod checkpoint;
pub mod date_format;
pub mod env;
pub mod error;
pub mod finder;
pub mod materializer;
pub mod path_rules;
pub mod progress;
pub mod session;
pub mod unit;

#[cfg(test)]
mod mock;

pub use checkpoint::TransferCheckpoint;
pub use env::{BuildContext, ConsoleSink, EnvVars, MemoryConsole, StdoutConsole, expand};
pub use error::{TransferError, TransferInterrupted};
pub use finder::{FileFinder, Selection};
pub use materializer::DirectoryMaterializer;
pub use path_rules::{is_directory_absolute, relative_directory_of, remote_directory_for};
pub use progress::ProgressReader;
pub use session::{RemoteSession, SessionFuture};
pub use unit::TransferUnit;
