//! Shared fixtures: a temp workspace with an envsync.toml and an in-memory
//! remote shared by every mock client.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use envsync_core::prelude::*;
use tempfile::TempDir;

/// A directory holding envsync.toml plus one asset directory per environment.
pub struct Workspace {
    temp: TempDir,
}

impl Workspace {
    /// Declare `environments`, each with its own directory named after it.
    pub fn new(environments: &[&str]) -> Self {
        let mut toml = String::new();
        for name in environments {
            toml.push_str(&format!(
                "[environments.\"{name}\"]\n\
                 endpoint = \"https://{name}.example.test/api\"\n\
                 token = \"token-{name}\"\n\
                 directory = \"{name}\"\n\n"
            ));
        }
        Self::with_config(&toml)
    }

    pub fn with_config(contents: &str) -> Self {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("envsync.toml"), contents).unwrap();
        Self { temp }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("envsync.toml")
    }

    pub fn options(&self) -> ArbiterOptions {
        ArbiterOptions::new(self.config_path())
    }

    pub fn write_file(&self, environment: &str, key: &str, contents: &str) {
        let path = self.root().join(environment).join(key);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    pub fn read_file(&self, environment: &str, key: &str) -> Option<String> {
        fs::read_to_string(self.root().join(environment).join(key)).ok()
    }
}

#[derive(Debug, Default)]
struct RemoteState {
    assets: BTreeMap<String, BTreeMap<String, Asset>>,
    failing_lists: BTreeSet<String>,
    failing_pushes: BTreeSet<String>,
    refused_clients: BTreeSet<String>,
    list_calls: BTreeMap<String, usize>,
}

/// In-memory remotes keyed by environment name.
#[derive(Debug, Clone, Default)]
pub struct MockRemotes {
    state: Arc<Mutex<RemoteState>>,
}

impl MockRemotes {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RemoteState> {
        self.state.lock().unwrap()
    }

    /// Put an asset on `environment`'s remote.
    pub fn seed(&self, environment: &str, key: &str, contents: &str) {
        let asset = Asset::from_bytes(key, contents.as_bytes().to_vec());
        self.lock()
            .assets
            .entry(environment.to_string())
            .or_default()
            .insert(key.to_string(), asset);
    }

    pub fn fail_listing(&self, environment: &str) {
        self.lock().failing_lists.insert(environment.to_string());
    }

    pub fn fail_pushes(&self, environment: &str) {
        self.lock().failing_pushes.insert(environment.to_string());
    }

    pub fn refuse_client(&self, environment: &str) {
        self.lock().refused_clients.insert(environment.to_string());
    }

    /// Keys currently on `environment`'s remote.
    pub fn keys(&self, environment: &str) -> Vec<String> {
        self.lock()
            .assets
            .get(environment)
            .map(|assets| assets.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contents(&self, environment: &str, key: &str) -> Option<String> {
        self.lock()
            .assets
            .get(environment)
            .and_then(|assets| assets.get(key))
            .and_then(|asset| asset.value.clone())
    }

    pub fn list_calls(&self, environment: &str) -> usize {
        self.lock().list_calls.get(environment).copied().unwrap_or(0)
    }

    /// Factory suitable for [`Arbiter::resolve`].
    pub fn factory(&self) -> impl Fn(Configuration) -> anyhow::Result<MockClient> {
        let remotes = self.clone();
        move |config: Configuration| {
            if remotes.lock().refused_clients.contains(&config.environment) {
                anyhow::bail!("refused by test");
            }
            Ok(MockClient {
                config,
                remotes: remotes.clone(),
            })
        }
    }

    /// Resolve an arbiter over these remotes.
    pub async fn resolve(&self, options: ArbiterOptions) -> Result<Arbiter<MockClient>, ArbiterError> {
        Arbiter::resolve(options, &self.factory()).await
    }
}

/// Client bound to one environment of a [`MockRemotes`].
#[derive(Debug)]
pub struct MockClient {
    config: Configuration,
    remotes: MockRemotes,
}

impl RemoteClient for MockClient {
    fn config(&self) -> &Configuration {
        &self.config
    }

    async fn asset_list(&self) -> anyhow::Result<Vec<Asset>> {
        let mut state = self.remotes.lock();
        let environment = &self.config.environment;
        *state.list_calls.entry(environment.clone()).or_default() += 1;
        if state.failing_lists.contains(environment) {
            anyhow::bail!("listing unavailable");
        }
        let assets = state
            .assets
            .get(environment)
            .map(|assets| {
                assets
                    .values()
                    .map(|asset| Asset {
                        key: asset.key.clone(),
                        checksum: asset.checksum.clone(),
                        ..Asset::default()
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(assets)
    }

    async fn fetch_asset(&self, key: &str) -> anyhow::Result<Asset> {
        self.remotes
            .lock()
            .assets
            .get(&self.config.environment)
            .and_then(|assets| assets.get(key))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("asset not found: {}", key))
    }

    async fn push_asset(&self, asset: &Asset) -> anyhow::Result<Asset> {
        let mut state = self.remotes.lock();
        let environment = &self.config.environment;
        if state.failing_pushes.contains(environment) {
            anyhow::bail!("push rejected");
        }
        let stored = Asset::from_bytes(&asset.key, asset.contents().unwrap_or_default().to_vec());
        state
            .assets
            .entry(environment.clone())
            .or_default()
            .insert(asset.key.clone(), stored.clone());
        Ok(stored)
    }

    async fn remove_asset(&self, key: &str) -> anyhow::Result<()> {
        if let Some(assets) = self.remotes.lock().assets.get_mut(&self.config.environment) {
            assets.remove(key);
        }
        Ok(())
    }
}
