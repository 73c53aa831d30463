//! Purge job configuration.
//!
//! Controls batch sizing and which accounts are eligible for deletion.
//! Target filters are deliberately config-only: the CLI chooses *which
//! population* to scan (inactive or all), the config decides *which
//! addresses* within it may ever be deleted.
//!
//! # Example
//!
//! ```toml
//! [purge]
//! batch_size = 1000
//! target_email_suffixes = ["@old.test", "@contractor.example"]
//! target_email_addresses = ["one.more@example.test"]
//! status_channel_id = "ops-channel-id"
//! ```

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Purge job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PurgeConfig {
    /// Batch size for the cursor deleter. Each batch runs in its own
    /// transaction, bounding lock duration.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Email suffixes marking an account as deletable, e.g. `@old.test`.
    #[serde(default)]
    pub target_email_suffixes: Vec<String>,

    /// Exact email addresses marking an account as deletable.
    #[serde(default)]
    pub target_email_addresses: Vec<String>,

    /// Channel in which the job posts and edits its status message.
    /// When unset, status goes to the log only.
    #[serde(default)]
    pub status_channel_id: Option<String>,
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            target_email_suffixes: Vec::new(),
            target_email_addresses: Vec::new(),
            status_channel_id: None,
        }
    }
}

impl PurgeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Validation(
                "purge.batch_size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Whether any target filter is configured at all.
    pub fn has_target_filters(&self) -> bool {
        !self.target_email_suffixes.is_empty() || !self.target_email_addresses.is_empty()
    }
}

fn default_batch_size() -> u32 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PurgeConfig::default();
        assert_eq!(config.batch_size, 1000);
        assert!(!config.has_target_filters());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config: PurgeConfig = toml::from_str("batch_size = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_target_filters() {
        let config: PurgeConfig = toml::from_str(
            r#"
            target_email_suffixes = ["@old.test"]
        "#,
        )
        .unwrap();
        assert!(config.has_target_filters());
    }
}
