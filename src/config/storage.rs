use serde::{Deserialize, Serialize};

use super::ConfigError;

/// File storage configuration for board attachments.
///
/// Board blocks can reference uploaded files; when a board is purged its
/// orphaned files are removed from disk. Only the `local` driver is
/// supported; any other driver is a fatal configuration error for a
/// purge run, checked before any destructive action.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Storage driver name. Must be `local`.
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Root directory of the local file store.
    #[serde(default)]
    pub directory: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            directory: String::new(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.is_empty() {
            return Err(ConfigError::Validation(
                "storage.driver cannot be empty".into(),
            ));
        }
        Ok(())
    }

    /// Whether this configuration names the supported local driver.
    pub fn is_local(&self) -> bool {
        self.driver == "local"
    }
}

fn default_driver() -> String {
    "local".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_local() {
        let config = StorageConfig::default();
        assert!(config.is_local());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_local_driver_parses_but_flags() {
        let config: StorageConfig = toml::from_str(
            r#"
            driver = "amazons3"
            directory = ""
        "#,
        )
        .unwrap();
        // Parsing succeeds; the orchestrator rejects non-local drivers at
        // job start, before anything is deleted.
        assert!(!config.is_local());
    }
}
