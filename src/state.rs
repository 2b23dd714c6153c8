//! Observed-state file
//!
//! One entry per `type.label`, holding the bound identity and the attributes
//! last read from the appliance.

use anyhow::{Context, Result, bail};
use bigip::ResourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::provider::Instance;

/// Current state file format.
const STATE_VERSION: u32 = 1;

/// A tracked resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    /// Full path of the appliance object, e.g. `/Common/web`.
    pub id: String,
    /// Observed attributes.
    #[serde(default)]
    pub attributes: Value,
}

impl StateEntry {
    pub fn from_instance(instance: &Instance) -> Option<Self> {
        instance.id.as_ref().map(|id| Self {
            id: id.full_path(),
            attributes: instance.attributes.clone(),
        })
    }

    pub fn to_instance(&self) -> Result<Instance> {
        let id: ResourceId = self
            .id
            .parse()
            .with_context(|| format!("Invalid id in state: {}", self.id))?;
        Ok(Instance {
            id: Some(id),
            attributes: self.attributes.clone(),
        })
    }
}

/// Everything the provider has created or imported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderState {
    pub version: u32,

    /// Entries keyed by `type.label`.
    #[serde(default)]
    pub resources: BTreeMap<String, StateEntry>,

    /// Last time the state was written
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            resources: BTreeMap::new(),
            last_updated: None,
        }
    }
}

/// Build the state key for a resource.
pub fn key(type_name: &str, label: &str) -> String {
    format!("{type_name}.{label}")
}

/// Split a state key into (type, label).
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.split_once('.')
}

impl ProviderState {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file {} does not exist, starting empty", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: ProviderState = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        if state.version > STATE_VERSION {
            bail!(
                "State file {} has version {}, this build understands up to {}",
                path.display(),
                state.version,
                STATE_VERSION
            );
        }

        log::debug!("Loaded {} resources from {}", state.resources.len(), path.display());
        Ok(state)
    }

    /// Save state to disk, stamping the update time
    pub fn save(&mut self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;

        self.last_updated = Some(Utc::now());
        let content = serde_json::to_string_pretty(self).context("Failed to serialize state")?;

        // Same directory as the target so the final rename stays on one filesystem
        let mut file = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        file.write_all(content.as_bytes())
            .and_then(|()| file.as_file().sync_all())
            .with_context(|| format!("Failed to write state file: {}", file.path().display()))?;
        file.persist(path)
            .map_err(|err| err.error)
            .with_context(|| format!("Failed to replace state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&StateEntry> {
        self.resources.get(key)
    }

    /// Record the outcome of a lifecycle call. An unbound instance drops the entry.
    pub fn record(&mut self, key: &str, instance: &Instance) {
        match StateEntry::from_instance(instance) {
            Some(entry) => {
                self.resources.insert(key.to_string(), entry);
            }
            None => {
                self.resources.remove(key);
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<StateEntry> {
        self.resources.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn instance(name: &str) -> Instance {
        Instance {
            id: Some(ResourceId::new("Common", name)),
            attributes: json!({"name": name, "partition": "Common"}),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let state = ProviderState::load(&dir.path().join("state.json")).unwrap();
        assert!(state.is_empty());
        assert_eq!(state.version, STATE_VERSION);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut state = ProviderState::default();
        state.record("bigip_ltm_node.n1", &instance("n1"));
        state.save(&path).unwrap();

        let loaded = ProviderState::load(&path).unwrap();
        assert!(loaded.last_updated.is_some());
        let entry = loaded.get("bigip_ltm_node.n1").unwrap();
        assert_eq!(entry.id, "/Common/n1");
        assert_eq!(entry.to_instance().unwrap(), instance("n1"));
    }

    #[test]
    fn test_save_replaces_without_leftovers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut state = ProviderState::default();
        state.record("bigip_ltm_node.n1", &instance("n1"));
        state.save(&path).unwrap();
        state.remove("bigip_ltm_node.n1");
        state.record("bigip_ltm_node.n2", &instance("n2"));
        state.save(&path).unwrap();

        let files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(files, vec![std::ffi::OsString::from("state.json")]);

        let loaded = ProviderState::load(&path).unwrap();
        assert!(loaded.get("bigip_ltm_node.n1").is_none());
        assert!(loaded.get("bigip_ltm_node.n2").is_some());
    }

    #[test]
    fn test_save_under_file_parent_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let mut state = ProviderState::default();
        let err = state.save(&blocker.join("state.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to create state directory"));
    }

    #[test]
    fn test_record_unbound_removes() {
        let mut state = ProviderState::default();
        state.record("bigip_ltm_node.n1", &instance("n1"));

        let mut gone = instance("n1");
        gone.id = None;
        state.record("bigip_ltm_node.n1", &gone);
        assert!(state.is_empty());
    }

    #[test]
    fn test_rejects_newer_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"version": 99, "resources": {}, "last_updated": null}"#).unwrap();
        assert!(ProviderState::load(&path).is_err());
    }

    #[test]
    fn test_keys() {
        assert_eq!(key("bigip_ltm_pool", "web"), "bigip_ltm_pool.web");
        assert_eq!(split_key("bigip_ltm_pool.web"), Some(("bigip_ltm_pool", "web")));
        assert_eq!(split_key("nolabel"), None);
    }
}
