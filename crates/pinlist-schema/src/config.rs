use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Section label given to pin records that precede any comment in the root manifest.
pub const DEFAULT_SECTION: &str = "install requirements";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("default_section must not be empty")]
    EmptyDefaultSection,
}

/// Loader settings, readable from a `pinlist.toml` file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoadOptions {
    #[serde(default = "default_section")]
    pub default_section: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            default_section: default_section(),
        }
    }
}

impl LoadOptions {
    #[must_use]
    pub fn with_default_section(mut self, label: &str) -> Self {
        self.default_section = label.trim().to_owned();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_section.trim().is_empty() {
            return Err(ConfigError::EmptyDefaultSection);
        }
        Ok(())
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let options: LoadOptions = toml::from_str(input)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

fn default_section() -> String {
    DEFAULT_SECTION.to_owned()
}
