use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_API_VERSION: &str = "kro.run/v1alpha1";
pub const DEFAULT_KIND: &str = "ResourceGraphDefinition";
pub const DEFAULT_SOURCE: &str = "kro-schema-validation";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Settings shared by the validator, the quick fixes and the host scheduler.
///
/// Every key is optional when loading from YAML:
///
/// ```yaml
/// apiVersion: kro.run/v1alpha1
/// kind: ResourceGraphDefinition
/// source: kro-schema-validation
/// debounceMs: 500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Literal the header's `apiVersion` must carry.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Literal the header's `kind` must carry.
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Tag stamped on every diagnostic; quick fixes ignore any other tag.
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_kind() -> String {
    DEFAULT_KIND.to_string()
}

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            source: default_source(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl ValidatorConfig {
    /// Parses a configuration from YAML. An empty document yields the defaults.
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if the YAML is malformed or has unknown keys.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|err| ConfigError::Invalid {
            message: err.to_string(),
        })
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    /// Returns `ConfigError::Io` if the file cannot be read, or
    /// `ConfigError::Invalid` if its content is not a valid configuration.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded validator configuration from {}", path.display());
        Self::from_yaml_str(&content)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The two header lines a valid document starts with.
    pub fn header_template(&self) -> String {
        format!("apiVersion: {}\nkind: {}\n", self.api_version, self.kind)
    }
}
