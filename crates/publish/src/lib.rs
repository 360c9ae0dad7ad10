//! Publishing for outbound.
//!
//! A [`RetryingPublisher`] sends all transfers of one publisher over a
//! single session and resumes interrupted transfers after reconnecting.
//! [`run`] drives every selected publisher of a [`PublishConfig`](outbound_config::PublishConfig)
//! against the hosts in a [`HostRegistry`].

pub mod error;
pub mod host;
pub mod instance;
pub mod publisher;
pub mod selector;

#[cfg(test)]
mod mock;

pub use error::PublishError;
pub use host::{
    ConnectFuture, HostRegistry, HostTable, SessionFactory, change_to_root_directory,
    open_session,
};
pub use instance::{PublishOutcome, run};
pub use publisher::{PublishReport, RetryingPublisher};
pub use selector::PublisherSelector;
