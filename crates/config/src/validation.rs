use crate::ConfigError;
use crate::constants::ILLEGAL_NAME_CHARS;
use crate::types::PublishConfig;

/// Returns `true` if `proposed` is non-blank and contains none of `< & ' " \`.
pub fn is_valid_name(proposed: &str) -> bool {
    !proposed.trim().is_empty()
        && !proposed
            .chars()
            .any(|c| matches!(c, '<' | '&' | '\'' | '"' | '\\'))
}

/// Validates a host or publisher name.
pub fn validate_name(name: &str) -> Result<(), ConfigError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidName {
            name: name.to_string(),
            illegal: ILLEGAL_NAME_CHARS,
        })
    }
}

/// Validates an optional dotted-quad IPv4 address.
///
/// Blank input is accepted.
pub fn validate_optional_ip(ip: &str) -> Result<(), ConfigError> {
    let ip = ip.trim();
    if ip.is_empty() {
        return Ok(());
    }

    let octets: Vec<&str> = ip.split('.').collect();
    let valid = octets.len() == 4
        && octets.iter().all(|octet| {
            (1..=3).contains(&octet.len())
                && octet.bytes().all(|b| b.is_ascii_digit())
                && octet.parse::<u16>().is_ok_and(|n| n < 256)
        });

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIp(ip.to_string()))
    }
}

impl PublishConfig {
    /// Checks every publisher refers to a validly named host.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for publisher in &self.publishers {
            validate_name(&publisher.config_name)?;
        }
        Ok(())
    }
}
