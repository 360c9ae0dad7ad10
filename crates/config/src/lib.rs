//! Configuration types for outbound publishing.
//!
//! Everything a publish run needs to know up front lives here as plain
//! serde value types: which files a transfer selects and where they land,
//! how often a publisher retries, which hosts exist and which publishers
//! are enabled for a given build.

pub mod constants;
pub mod error;
pub mod loader;
pub mod types;
pub mod validation;

// Re-export primary types for convenience.
pub use error::ConfigError;
pub use loader::{load, load_str};
pub use types::{
    ConfigFormat, HostConfig, ParamPublish, PublishConfig, PublisherConfig, RetryPolicy,
    TransferSpec,
};
pub use validation::{is_valid_name, validate_name, validate_optional_ip};
