//! Registry configuration via TOML
//!
//! All fields are optional; anything absent takes its default.
//!
//! ```toml
//! [limits]
//! max_key_bytes = 220
//! max_value_bytes = 10485760
//! ```

use crate::error::{Error, Result};
use crate::limits::Limits;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a collection registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Key and value size limits applied to every collection
    pub limits: Limits,
}

impl RegistryConfig {
    /// Parse config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse config from a file path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Returns the default config file content with comments
    pub fn default_toml() -> &'static str {
        r#"# Ordered collection registry configuration

[limits]
# Maximum encoded entry key length in bytes
max_key_bytes = 220
# Maximum serialized value length in bytes
max_value_bytes = 10485760
"#
    }
}
