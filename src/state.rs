use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::adapter::Instance;
use crate::config::SegmentOptionRow;

// ============================================================================
// State Structures
// ============================================================================

/// Recorded state of every connector netform has refreshed
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetformState {
    /// State per connector name
    #[serde(default)]
    pub connectors: BTreeMap<String, ConnectorState>,

    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,
}

/// What was recorded for one connector on its last refresh
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ConnectorState {
    /// Last time this connector was refreshed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refreshed: Option<DateTime<Utc>>,

    /// Segment options as flat rows
    #[serde(default)]
    pub segment_options: Vec<SegmentOptionRow>,

    /// Instances, in recorded order
    #[serde(default)]
    pub instances: Vec<Instance>,
}

/// Timestamp-free view used for diffs
#[derive(Serialize)]
struct ConnectorView<'a> {
    segment_options: &'a [SegmentOptionRow],
    instances: &'a [Instance],
}

impl ConnectorState {
    /// Render the attribute part of the state as TOML for diffing
    pub fn render(&self) -> Result<String> {
        let view = ConnectorView {
            segment_options: &self.segment_options,
            instances: &self.instances,
        };
        toml::to_string_pretty(&view).context("Failed to render connector state")
    }
}

// ============================================================================
// NetformState Implementation
// ============================================================================

impl NetformState {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: NetformState = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    /// Save state to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Update the last_updated timestamp and save
    pub fn touch(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();
        self.save(path)
    }

    /// Recorded state for a connector (empty if never refreshed)
    pub fn connector(&self, name: &str) -> ConnectorState {
        self.connectors.get(name).cloned().unwrap_or_default()
    }

    /// Record the result of a refresh
    pub fn record(&mut self, name: &str, mut connector: ConnectorState) {
        connector.last_refreshed = Some(Utc::now());
        self.connectors.insert(name.to_string(), connector);
    }
}

impl Default for NetformState {
    fn default() -> Self {
        Self {
            connectors: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConnectorState {
        ConnectorState {
            last_refreshed: None,
            segment_options: vec![SegmentOptionRow {
                segment: "Blue".into(),
                zone: "zoneA".into(),
                groups: vec!["g1".into(), "g2".into()],
            }],
            instances: vec![
                Instance {
                    id: Some("i-1".into()),
                    ..Instance::named("inst-a")
                },
                Instance::named("inst-b"),
            ],
        }
    }

    #[test]
    fn test_default_state() {
        let state = NetformState::default();
        assert!(state.connectors.is_empty());
        assert_eq!(state.connector("dc-east"), ConnectorState::default());
    }

    #[test]
    fn test_record_sets_timestamp() {
        let mut state = NetformState::default();
        state.record("dc-east", sample());

        let recorded = state.connector("dc-east");
        assert!(recorded.last_refreshed.is_some());
        assert_eq!(recorded.instances.len(), 2);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.toml");

        let mut state = NetformState::default();
        state.record("dc-east", sample());
        state.touch(&path).unwrap();

        let loaded = NetformState::load(&path).unwrap();
        let connector = loaded.connector("dc-east");
        assert_eq!(connector.segment_options, sample().segment_options);
        assert_eq!(connector.instances, sample().instances);
    }

    #[test]
    fn test_load_missing_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = NetformState::load(&dir.path().join("state.toml")).unwrap();
        assert!(state.connectors.is_empty());
    }

    #[test]
    fn test_render_excludes_timestamp() {
        let mut connector = sample();
        let before = connector.render().unwrap();
        connector.last_refreshed = Some(Utc::now());

        assert_eq!(connector.render().unwrap(), before);
        assert!(before.contains("inst-a"));
        assert!(!before.contains("last_refreshed"));
    }
}
