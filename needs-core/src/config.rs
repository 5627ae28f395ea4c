use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::NeedsError;

/// Default file name of the needs registry
pub const DEFAULT_NEEDS_FILE: &str = "needs.json";

/// Project configuration as exposed by the documentation build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeedsConfig {
    /// Project name
    #[serde(default)]
    pub project: String,

    /// Version currently being built
    #[serde(default)]
    pub version: String,

    /// Registry file to import from a previous build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_file: Option<PathBuf>,

    /// Variables available to templated sources
    #[serde(default)]
    pub html_context: BTreeMap<String, Value>,
}

impl NeedsConfig {
    pub fn new(project: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    /// Loads the configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, NeedsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| NeedsError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&content).map_err(|source| NeedsError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The registry file to load when none is given explicitly
    pub fn needs_file(&self) -> PathBuf {
        self.needs_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_NEEDS_FILE))
    }
}
