//! Command-line configuration file.
//!
//! The file holds a publish configuration plus the hosts it publishes to:
//!
//! ```toml
//! continue_on_error = true
//!
//! [[hosts]]
//! name = "staging"
//! root = "/srv/staging"
//!
//! [[publishers]]
//! config_name = "staging"
//!
//! [[publishers.transfers]]
//! source_glob = "target/*.jar"
//! ```

use std::path::{Path, PathBuf};

use outbound_config::{ConfigError, HostConfig, PublishConfig, validate_optional_ip};
use serde::{Deserialize, Serialize};

/// Everything `outbound` reads from its configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(flatten)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub hosts: Vec<LocalHost>,
}

/// A host whose destination is a directory on this machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalHost {
    #[serde(flatten)]
    pub host: HostConfig,

    /// Directory sessions to this host start in.
    pub root: PathBuf,
}

impl AppConfig {
    /// Loads the file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = outbound_config::load(path)?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            hosts = config.hosts.len(),
            publishers = config.publish.publishers.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for local in &self.hosts {
            outbound_config::validate_name(&local.host.name)?;
            // Names like "build.example.com" are not addresses.
            if let Some(hostname) = local.host.hostname_trimmed()
                && hostname.chars().all(|c| c.is_ascii_digit() || c == '.')
            {
                validate_optional_ip(hostname)?;
            }
        }
        self.publish.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
fail_on_error = true

[[hosts]]
name = "staging"
root = "/srv/staging"
remote_root_dir = "www"

[[publishers]]
config_name = "staging"
verbose = true

[[publishers.transfers]]
source_glob = "target/*.jar"
flatten = true
"#;

    #[test]
    fn parses_hosts_next_to_publishers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("outbound.toml");
        fs::write(&path, SAMPLE).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert!(config.publish.fail_on_error);
        assert!(!config.publish.continue_on_error);
        assert_eq!(config.hosts.len(), 1);
        let host = &config.hosts[0];
        assert_eq!(host.host.name, "staging");
        assert_eq!(host.host.remote_root_dir.as_deref(), Some("www"));
        assert_eq!(host.root, PathBuf::from("/srv/staging"));
        assert!(!host.host.id.is_empty());
        assert_eq!(config.publish.publishers[0].transfers[0].source_glob, "target/*.jar");
    }

    #[test]
    fn rejects_invalid_host_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("outbound.toml");
        fs::write(&path, "[[hosts]]\nname = \"a&b\"\nroot = \"/tmp\"\n").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidName { .. }));
    }

    #[test]
    fn rejects_malformed_ip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("outbound.json");
        fs::write(
            &path,
            r#"{"hosts": [{"name": "a", "hostname": "300.1.1.1", "root": "/tmp"}]}"#,
        )
        .unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidIp(_)));
    }
}
