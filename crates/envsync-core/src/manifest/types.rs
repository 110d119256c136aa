//! Manifest file types.
//!
//! Tracks, per asset key and environment, the remote version last observed
//! by a successful sync.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// On-disk manifest format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFile {
    /// Manifest format version
    pub version: u32,

    /// Timestamp of the last write
    pub generated_at: chrono::DateTime<chrono::Utc>,

    /// key -> environment -> remote version
    #[serde(default)]
    pub files: BTreeMap<String, BTreeMap<String, String>>,
}

impl ManifestFile {
    /// Create a new empty manifest
    pub fn new() -> Self {
        Self {
            version: 1,
            generated_at: chrono::Utc::now(),
            files: BTreeMap::new(),
        }
    }

    /// Version recorded for `key` in `environment`
    pub fn get(&self, key: &str, environment: &str) -> Option<&str> {
        self.files
            .get(key)
            .and_then(|envs| envs.get(environment))
            .map(String::as_str)
    }

    /// Record the version observed for `key` in `environment`
    pub fn set(&mut self, key: &str, environment: &str, version: String) {
        self.files
            .entry(key.to_string())
            .or_default()
            .insert(environment.to_string(), version);
    }

    /// Drop the record for `key` in `environment`
    pub fn remove(&mut self, key: &str, environment: &str) {
        if let Some(envs) = self.files.get_mut(key) {
            envs.remove(environment);
            if envs.is_empty() {
                self.files.remove(key);
            }
        }
    }

    /// Validate the manifest
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.version != 1 {
            anyhow::bail!("Unsupported manifest version: {}", self.version);
        }
        Ok(())
    }
}

impl Default for ManifestFile {
    fn default() -> Self {
        Self::new()
    }
}
