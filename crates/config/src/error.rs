//! Configuration error types.

/// Errors produced while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid name '{name}': must not be blank or contain any of {illegal}")]
    InvalidName { name: String, illegal: &'static str },

    #[error("invalid IP address: {0}")]
    InvalidIp(String),
}
