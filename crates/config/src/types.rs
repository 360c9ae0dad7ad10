//! Configuration value types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS};

/// One transfer: which files to select and where they go on the remote side.
///
/// String fields are macro-expanded against the build environment before use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferSpec {
    /// Include patterns, relative to the build's base directory.
    pub source_glob: String,
    /// Exclude patterns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_glob: Option<String>,
    /// Remote directory below the session's initial directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_dir_template: Option<String>,
    /// Leading path removed from every selected file before it is placed remotely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_prefix: Option<String>,
    /// Treat `remote_dir_template` as a date pattern rendered at build time.
    pub use_date_format: bool,
    /// Put every file directly into the remote directory.
    pub flatten: bool,
    /// Delete the remote directory's contents before the first file is sent.
    pub clean_remote_dir_first: bool,
    /// Do not apply [`DEFAULT_EXCLUDES`](crate::constants::DEFAULT_EXCLUDES).
    pub skip_default_excludes: bool,
    /// Create selected directories that contain no selected files.
    pub materialize_empty_dirs: bool,
    /// Regex separating patterns in the include/exclude lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_separator: Option<String>,
}

impl TransferSpec {
    /// Creates a transfer selecting `source_glob` with every option off.
    pub fn new(source_glob: impl Into<String>) -> Self {
        Self {
            source_glob: source_glob.into(),
            ..Self::default()
        }
    }

    /// Returns `true` unless the include list is blank.
    pub fn has_configured_source_files(&self) -> bool {
        !self.source_glob.trim().is_empty()
    }
}

/// How often a publisher reconnects after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub retries: u32,
    /// Pause before each additional attempt, in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, delay_ms: u64) -> Self {
        Self { retries, delay_ms }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// A named remote destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Stable identifier; generated when missing.
    #[serde(default = "generate_id")]
    pub id: String,
    /// Name publishers refer to.
    pub name: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub port: u16,
    /// Directory the session changes into right after connecting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_root_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
}

fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl HostConfig {
    /// Creates a host, generating an id when `id` is blank.
    pub fn new(id: Option<&str>, name: impl Into<String>, hostname: impl Into<String>) -> Self {
        let id = match id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => generate_id(),
        };
        Self {
            id,
            name: name.into(),
            hostname: hostname.into(),
            port: 0,
            remote_root_dir: None,
            credential_id: None,
        }
    }

    /// The hostname with surrounding whitespace removed, or `None` if blank.
    ///
    /// Lets an IPv6 literal be stored with a trailing space.
    pub fn hostname_trimmed(&self) -> Option<&str> {
        let trimmed = self.hostname.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// A publisher: an ordered list of transfers sent to one host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Name of the [`HostConfig`] to publish to.
    pub config_name: String,
    pub verbose: bool,
    pub transfers: Vec<TransferSpec>,
    pub retry: RetryPolicy,
    /// Label matched by [`ParamPublish`] selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Chooses publishers by matching their label against a regex taken from
/// a build variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamPublish {
    /// Build variable holding the regex. Blank selects every publisher.
    pub parameter_name: String,
}

/// Everything published by one build step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub publishers: Vec<PublisherConfig>,
    /// Keep going with the next publisher after one fails.
    pub continue_on_error: bool,
    /// Report failures as a failed build instead of an unstable one.
    pub fail_on_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_publish: Option<ParamPublish>,
}

/// On-disk configuration format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}
