//! Configuration properties consumed by the validation engine

use crate::version::NamespaceSlot;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::trace;

/// Controls positional suffixes on repeated output keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OutputIndexLevel {
    /// Never add an index suffix (level 0)
    #[default]
    Never,
    /// Add `[n]` only when there is more than one sibling of a kind (level 1)
    WhenRepeated,
    /// Always add `[n]`, even for a single item (level 2)
    Always,
}

impl OutputIndexLevel {
    /// Positional suffix for the item at `index` (0-based) out of `total`
    #[must_use]
    pub fn suffix(self, index: usize, total: usize) -> String {
        match self {
            OutputIndexLevel::Always => format!("[{}]", index + 1),
            OutputIndexLevel::WhenRepeated if total > 1 => format!("[{}]", index + 1),
            _ => String::new(),
        }
    }
}

impl TryFrom<u8> for OutputIndexLevel {
    type Error = String;

    fn try_from(level: u8) -> std::result::Result<Self, Self::Error> {
        match level {
            0 => Ok(OutputIndexLevel::Never),
            1 => Ok(OutputIndexLevel::WhenRepeated),
            2 => Ok(OutputIndexLevel::Always),
            other => Err(format!("output index level must be 0, 1, or 2, got {other}")),
        }
    }
}

impl From<OutputIndexLevel> for u8 {
    fn from(level: OutputIndexLevel) -> Self {
        match level {
            OutputIndexLevel::Never => 0,
            OutputIndexLevel::WhenRepeated => 1,
            OutputIndexLevel::Always => 2,
        }
    }
}

/// Preferred namespace prefixes per sub-vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefixes {
    pub core: String,
    pub security: String,
    pub geospatial: String,
    pub access_control: String,
    pub link: String,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            core: "ddms".to_string(),
            security: "ISM".to_string(),
            geospatial: "gml".to_string(),
            access_control: "ntk".to_string(),
            link: "xlink".to_string(),
        }
    }
}

impl Prefixes {
    /// Prefix for a sub-vocabulary
    #[must_use]
    pub fn get(&self, slot: NamespaceSlot) -> &str {
        match slot {
            NamespaceSlot::Core => &self.core,
            NamespaceSlot::Security => &self.security,
            NamespaceSlot::Geospatial => &self.geospatial,
            NamespaceSlot::AccessControl => &self.access_control,
            NamespaceSlot::Link => &self.link,
        }
    }
}

/// Properties supplied to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Canonical version strings to register, in any order
    pub supported_versions: Vec<String>,
    /// Preferred prefixes for serialization and locators
    pub prefixes: Prefixes,
    /// Positional suffix policy for text and HTML output
    pub output_index_level: OutputIndexLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supported_versions: ["2.0", "3.0", "3.1", "4.1", "5.0"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            prefixes: Prefixes::default(),
            output_index_level: OutputIndexLevel::Never,
        }
    }
}

impl Config {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the supported version list
    #[must_use]
    pub fn supported_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_versions = versions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the prefix for one sub-vocabulary
    #[must_use]
    pub fn prefix(mut self, slot: NamespaceSlot, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        match slot {
            NamespaceSlot::Core => self.prefixes.core = prefix,
            NamespaceSlot::Security => self.prefixes.security = prefix,
            NamespaceSlot::Geospatial => self.prefixes.geospatial = prefix,
            NamespaceSlot::AccessControl => self.prefixes.access_control = prefix,
            NamespaceSlot::Link => self.prefixes.link = prefix,
        }
        self
    }

    /// Set the output index level
    #[must_use]
    pub fn output_index_level(mut self, level: OutputIndexLevel) -> Self {
        self.output_index_level = level;
        self
    }

    /// Load configuration from a YAML or JSON file, chosen by extension
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        trace!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;

        if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Load configuration from a YAML string
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] when the YAML does not describe a configuration.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::InvalidFormat(format!("YAML parse error: {e}")))
    }

    /// Load configuration from a JSON string
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] when the JSON does not describe a configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidFormat(format!("JSON parse error: {e}")))
    }
}
