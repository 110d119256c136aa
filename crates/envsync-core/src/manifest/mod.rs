//! Local record of previously observed remote state.
//!
//! The manifest pairs what was recorded at the last successful sync with a
//! fresh snapshot of each active environment's remote listing, so a
//! change-set can be checked for remote drift before anything is mutated.

pub mod diff;
pub mod store;
pub mod types;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::client::RemoteClient;
use crate::types::{Asset, ChangeSet};

pub use diff::ManifestDiff;
pub use types::ManifestFile;

/// Manifest file name, stored next to the config file.
pub const MANIFEST_FILE_NAME: &str = "envsync.lock";

#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    recorded: ManifestFile,
    /// environment -> key -> remote version at build time
    remote: BTreeMap<String, BTreeMap<String, String>>,
}

impl Manifest {
    /// Load the manifest under `base_dir` and snapshot every client's remote
    /// listing concurrently.
    pub async fn new<C: RemoteClient>(base_dir: &Path, clients: &[Arc<C>]) -> anyhow::Result<Self> {
        let mut manifest = Self::load(base_dir)?;

        let mut handles = Vec::with_capacity(clients.len());
        for client in clients {
            let client = Arc::clone(client);
            handles.push(tokio::spawn(async move {
                let environment = client.config().environment.clone();
                let listing = client.asset_list().await;
                (environment, listing)
            }));
        }

        // Join every listing before reporting, so no task outlives this call.
        let mut first_error = None;
        for handle in handles {
            let outcome = handle
                .await
                .context("Remote listing task failed")
                .and_then(|(environment, listing)| {
                    listing
                        .with_context(|| format!("[{}] Failed to list remote assets", environment))
                        .map(|assets| (environment, assets))
                });
            match outcome {
                Ok((environment, assets)) => manifest.set_remote(&environment, &assets),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(manifest),
        }
    }

    /// Load recorded state only, with an empty remote snapshot.
    pub fn load(base_dir: &Path) -> anyhow::Result<Self> {
        let path = base_dir.join(MANIFEST_FILE_NAME);
        let recorded = store::load(&path)?;
        Ok(Self {
            path,
            recorded,
            remote: BTreeMap::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the remote snapshot for `environment`.
    pub fn set_remote(&mut self, environment: &str, assets: &[Asset]) {
        let versions = assets
            .iter()
            .map(|asset| (asset.key.clone(), asset.version()))
            .collect();
        self.remote.insert(environment.to_string(), versions);
    }

    /// Version recorded at the last sync.
    pub fn recorded_version(&self, key: &str, environment: &str) -> Option<&str> {
        self.recorded.get(key, environment)
    }

    /// Version currently on the remote, per the snapshot.
    pub fn remote_version(&self, key: &str, environment: &str) -> Option<&str> {
        self.remote
            .get(environment)
            .and_then(|keys| keys.get(key))
            .map(String::as_str)
    }

    /// Compare `actions` against tracked state for `environment`.
    pub fn diff(&self, actions: &ChangeSet, environment: &str) -> ManifestDiff {
        let mut diff = ManifestDiff::new(environment);
        for key in actions.keys() {
            let recorded = self.recorded_version(key, environment);
            let remote = self.remote_version(key, environment);
            match (recorded, remote) {
                (None, Some(_)) => diff.created.push(key.clone()),
                (Some(seen), Some(current)) if seen != current => diff.updated.push(key.clone()),
                (Some(_), None) => diff.removed.push(key.clone()),
                _ => {}
            }
        }
        diff
    }

    /// Record that `key` in `environment` is now at `version`.
    pub fn record(&mut self, key: &str, environment: &str, version: String) {
        self.remote
            .entry(environment.to_string())
            .or_default()
            .insert(key.to_string(), version.clone());
        self.recorded.set(key, environment, version);
    }

    /// Record that `key` no longer exists in `environment`.
    pub fn forget(&mut self, key: &str, environment: &str) {
        if let Some(keys) = self.remote.get_mut(environment) {
            keys.remove(key);
        }
        self.recorded.remove(key, environment);
    }

    pub fn save(&mut self) -> anyhow::Result<()> {
        self.recorded.generated_at = chrono::Utc::now();
        store::save(&self.path, &self.recorded)
    }
}
