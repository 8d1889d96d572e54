use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Feature properties tried, in order, for a region's name.
pub const DEFAULT_NAME_PROPERTIES: &[&str] = &["st_nm", "ST_NM", "name", "NAME_1", "state"];

/// Settings for reading a boundary source.
///
/// Read from a JSON file with `LoaderConfig::from_file`; missing keys
/// keep their defaults.
///
/// ```
/// use region_access::config::LoaderConfig;
///
/// let config: LoaderConfig = serde_json::from_str(r#"{"timeout_secs": 3}"#).unwrap();
/// assert_eq!(config.timeout_secs, 3);
/// assert_eq!(config.name_properties[0], "st_nm");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoaderConfig {
    pub timeout_secs: u64,
    pub name_properties: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            name_properties: DEFAULT_NAME_PROPERTIES
                .iter()
                .map(|key| key.to_string())
                .collect(),
        }
    }
}

impl LoaderConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.into(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.into(),
            source,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
