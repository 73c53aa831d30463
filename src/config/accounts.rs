use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Accounts service configuration.
///
/// The accounts service owns user and channel lifecycle. scour only calls
/// its delete/list endpoints; it never reimplements them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountsConfig {
    /// Base URL of the accounts service, e.g. `https://chat.example.com`.
    pub base_url: String,

    /// Admin bearer token. Account deletion requires system-admin scope.
    pub token: String,

    /// Request timeout in seconds for individual API calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Page size used when listing users.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl AccountsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "accounts.base_url cannot be empty".into(),
            ));
        }
        if self.token.is_empty() {
            return Err(ConfigError::Validation(
                "accounts.token cannot be empty".into(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Validation(
                "accounts.page_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: AccountsConfig = toml::from_str(
            r#"
            base_url = "https://chat.example.test"
            token = "t"
        "#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.page_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_token_rejected() {
        let config: AccountsConfig = toml::from_str(
            r#"
            base_url = "https://chat.example.test"
            token = ""
        "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
