//! netform configuration schema
//!
//! ```toml
//! [api]
//! base_url = "https://fabric.example.net/api/v1"
//! token_env = "NETFORM_TOKEN"
//!
//! # Optional static segment table (name = id). When present it is used
//! # instead of the API for segment lookups.
//! [segments]
//! Blue = "seg-1"
//!
//! [[connector]]
//! name = "dc-east"
//!
//! [[connector.segment_options]]
//! segment = "Blue"
//! zone = "zoneA"
//! groups = ["g1", "g2"]
//!
//! [[connector.instances]]
//! name = "inst-a"
//! host_name = "a.dc-east.example"
//! ```

use anyhow::{Context, Result};
use reconcile::{FlatOption, NaturalKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::adapter::Instance;

/// Problems found while validating a loaded config
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("connector name must not be empty")]
    EmptyConnectorName,

    #[error("connector '{0}' is defined more than once")]
    DuplicateConnector(String),

    #[error("connector '{connector}': segment option #{index} has an empty {field}")]
    EmptySegmentField {
        connector: String,
        index: usize,
        field: &'static str,
    },

    #[error("connector '{connector}': invalid instance name: {message}")]
    InvalidInstance { connector: String, message: String },

    #[error("connector '{connector}': instance '{name}' is listed more than once")]
    DuplicateInstance { connector: String, name: String },

    #[error("api.base_url must not be empty")]
    EmptyBaseUrl,
}

// ============================================================================
// Main Config Schema
// ============================================================================

/// The netform configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct NetformConfig {
    /// Remote fabric API
    #[serde(default)]
    pub api: Option<ApiConfig>,

    /// Static segment table, name -> id
    #[serde(default)]
    pub segments: BTreeMap<String, String>,

    /// Connector resources
    #[serde(default, rename = "connector")]
    pub connectors: Vec<ConnectorConfig>,
}

/// Fabric API settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://fabric.example.net/api/v1`
    pub base_url: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_token_env() -> String {
    "NETFORM_TOKEN".to_string()
}

/// A declared connector
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConnectorConfig {
    pub name: String,

    /// Segment -> zone -> groups, written as flat rows
    #[serde(default)]
    pub segment_options: Vec<SegmentOptionRow>,

    /// Instances, order-significant
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// One flat segment option row as written in config
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SegmentOptionRow {
    /// Segment name
    pub segment: String,
    /// Zone name within the segment
    pub zone: String,
    /// Groups attached to the zone
    #[serde(default)]
    pub groups: Vec<String>,
}

impl From<&SegmentOptionRow> for FlatOption {
    fn from(row: &SegmentOptionRow) -> Self {
        FlatOption::new(&row.segment, &row.zone, &row.groups)
    }
}

impl From<FlatOption> for SegmentOptionRow {
    fn from(option: FlatOption) -> Self {
        Self {
            segment: option.parent_key,
            zone: option.child_key,
            groups: option.values,
        }
    }
}

impl NetformConfig {
    /// Load and validate config from a path
    ///
    /// A missing file yields an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Config file {} does not exist, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        log::debug!(
            "Loaded {} connectors from {}",
            config.connectors.len(),
            path.display()
        );
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if let Some(api) = &self.api
            && api.base_url.trim().is_empty()
        {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let mut seen = HashSet::new();
        for connector in &self.connectors {
            connector.validate()?;
            if !seen.insert(connector.name.as_str()) {
                return Err(ConfigError::DuplicateConnector(connector.name.clone()));
            }
        }
        Ok(())
    }

    /// Find a connector by name
    pub fn find_connector(&self, name: &str) -> Option<&ConnectorConfig> {
        self.connectors.iter().find(|c| c.name == name)
    }

    /// Connectors selected by an optional name filter
    pub fn select(&self, name: Option<&str>) -> Result<Vec<&ConnectorConfig>> {
        match name {
            None => Ok(self.connectors.iter().collect()),
            Some(n) => {
                let connector = self
                    .find_connector(n)
                    .with_context(|| format!("Connector '{n}' is not defined in config"))?;
                Ok(vec![connector])
            }
        }
    }
}

impl ConnectorConfig {
    /// Validate names and keys
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyConnectorName);
        }

        for (index, row) in self.segment_options.iter().enumerate() {
            for (field, value) in [("segment", &row.segment), ("zone", &row.zone)] {
                if value.trim().is_empty() {
                    return Err(ConfigError::EmptySegmentField {
                        connector: self.name.clone(),
                        index,
                        field,
                    });
                }
            }
        }

        let mut seen = HashSet::new();
        for instance in &self.instances {
            let key =
                NaturalKey::new(&instance.name).map_err(|e| ConfigError::InvalidInstance {
                    connector: self.name.clone(),
                    message: e.to_string(),
                })?;
            if !seen.insert(key) {
                return Err(ConfigError::DuplicateInstance {
                    connector: self.name.clone(),
                    name: instance.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Segment options as flat rows
    pub fn flat_options(&self) -> Vec<FlatOption> {
        self.segment_options.iter().map(FlatOption::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[api]
base_url = "https://fabric.example.net/api/v1"

[segments]
Blue = "seg-1"
Green = "seg-2"

[[connector]]
name = "dc-east"

[[connector.segment_options]]
segment = "Blue"
zone = "zoneA"
groups = ["g1", "g2"]

[[connector.segment_options]]
segment = "Green"
zone = "zoneA"
groups = ["g4"]

[[connector.instances]]
name = "inst-a"
host_name = "a.dc-east.example"

[[connector.instances]]
name = "inst-b"
"#;

    #[test]
    fn test_parse_sample() {
        let config: NetformConfig = toml::from_str(SAMPLE).unwrap();
        config.validate().unwrap();

        let api = config.api.as_ref().unwrap();
        assert_eq!(api.token_env, "NETFORM_TOKEN");
        assert_eq!(config.segments["Blue"], "seg-1");

        let connector = config.find_connector("dc-east").unwrap();
        assert_eq!(connector.instances.len(), 2);
        assert_eq!(
            connector.flat_options()[0],
            FlatOption::new("Blue", "zoneA", ["g1", "g2"])
        );
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = NetformConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert!(config.connectors.is_empty());
        assert!(config.api.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = NetformConfig::load(file.path()).unwrap();
        assert_eq!(config.connectors.len(), 1);
    }

    #[test]
    fn test_load_rejects_invalid_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[[connector]]\nname = \"\"\n").unwrap();

        assert!(NetformConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_validate_duplicate_connector() {
        let toml_str = "[[connector]]\nname = \"a\"\n[[connector]]\nname = \"a\"\n";
        let config: NetformConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicateConnector("a".to_string()))
        );
    }

    #[test]
    fn test_validate_empty_zone() {
        let toml_str = r#"
[[connector]]
name = "a"
[[connector.segment_options]]
segment = "Blue"
zone = " "
"#;
        let config: NetformConfig = toml::from_str(toml_str).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptySegmentField { field: "zone", index: 0, .. })
        ));
    }

    #[test]
    fn test_validate_instance_names() {
        let empty = "[[connector]]\nname = \"a\"\n[[connector.instances]]\nname = \"\"\n";
        let config: NetformConfig = toml::from_str(empty).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidInstance { .. })
        ));

        let dup = "[[connector]]\nname = \"a\"\n[[connector.instances]]\nname = \"x\"\n[[connector.instances]]\nname = \"x\"\n";
        let config: NetformConfig = toml::from_str(dup).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateInstance { .. })
        ));
    }

    #[test]
    fn test_select() {
        let config: NetformConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.select(None).unwrap().len(), 1);
        assert_eq!(config.select(Some("dc-east")).unwrap().len(), 1);
        assert!(config.select(Some("dc-west")).is_err());
    }

    #[test]
    fn test_row_conversions() {
        let row = SegmentOptionRow {
            segment: "Blue".into(),
            zone: "zoneA".into(),
            groups: vec!["g1".into()],
        };
        let flat = FlatOption::from(&row);
        assert_eq!(SegmentOptionRow::from(flat), row);
    }
}
