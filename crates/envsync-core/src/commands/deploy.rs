//! Deploy local assets to every selected environment.
//!
//! Runs in three phases so no remote is touched before every change-set
//! has passed the preflight gate:
//! 1. compute each environment's change-set (concurrent, read-only)
//! 2. preflight every change-set against every active environment
//! 3. apply each change-set to its own environment (concurrent)

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;

use super::first_failure;
use crate::arbiter::{Arbiter, build_change_set};
use crate::client::RemoteClient;
use crate::error::ArbiterError;
use crate::fs::touch_notify_file;
use crate::types::{AssetEvent, ChangeSet};

/// Options for deploy
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Files to deploy; empty means the whole directory
    pub files: Vec<String>,
    /// Keep remote assets that have no local counterpart
    pub no_delete: bool,
}

impl DeployOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    pub fn with_no_delete(mut self, no_delete: bool) -> Self {
        self.no_delete = no_delete;
        self
    }

    /// Whether the deploy may remove remote assets.
    ///
    /// Only a whole-directory deploy without `no_delete` is destructive.
    pub fn destructive(&self) -> bool {
        self.files.is_empty() && !self.no_delete
    }
}

/// What one environment received
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentDeploy {
    pub environment: String,
    /// (key, remote version after the push)
    pub updated: Vec<(String, String)>,
    pub removed: Vec<String>,
}

impl EnvironmentDeploy {
    pub fn change_count(&self) -> usize {
        self.updated.len() + self.removed.len()
    }
}

/// Result of deploy
#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    pub environments: Vec<EnvironmentDeploy>,
}

impl DeployReport {
    pub fn change_count(&self) -> usize {
        self.environments.iter().map(|e| e.change_count()).sum()
    }
}

pub struct DeployCommand;

impl DeployCommand {
    pub async fn execute<C: RemoteClient>(
        arbiter: &mut Arbiter<C>,
        options: &DeployOptions,
    ) -> anyhow::Result<DeployReport> {
        let destructive = options.destructive();
        let verbose = arbiter.options().verbose;

        let planned = arbiter
            .for_each_client(&options.files, move |client, files| async move {
                build_change_set(client.as_ref(), &files, destructive)
                    .await
                    .map_err(anyhow::Error::from)
            })
            .await;
        let plans: BTreeMap<String, ChangeSet> = first_failure(planned)?.into_iter().collect();

        for actions in plans.values() {
            arbiter.preflight(actions, destructive)?;
        }

        let applied = arbiter
            .for_each_client(&options.files, move |client, _files| {
                let actions = plans.get(client.environment()).cloned().unwrap_or_default();
                async move { apply_change_set(client, actions, verbose).await }
            })
            .await;

        let manifest = arbiter.manifest_mut()?;
        for (environment, deployed) in &applied.completed {
            for (key, version) in &deployed.updated {
                manifest.record(key, environment, version.clone());
            }
            for key in &deployed.removed {
                manifest.forget(key, environment);
            }
        }
        manifest.save().map_err(ArbiterError::Manifest)?;

        let report = DeployReport {
            environments: applied.completed.iter().map(|(_, d)| d.clone()).collect(),
        };
        if report.change_count() > 0
            && let Some(path) = &arbiter.options().notify_file
        {
            touch_notify_file(path)?;
        }

        applied.into_result()?;
        Ok(report)
    }
}

/// Apply one environment's change-set, one asset at a time.
async fn apply_change_set<C: RemoteClient>(
    client: Arc<C>,
    actions: ChangeSet,
    verbose: bool,
) -> anyhow::Result<EnvironmentDeploy> {
    let environment = client.environment().to_string();
    let mut deployed = EnvironmentDeploy {
        environment: environment.clone(),
        ..EnvironmentDeploy::default()
    };

    for (key, action) in actions {
        match action.event {
            AssetEvent::Update => {
                let pushed = client
                    .push_asset(&action.asset)
                    .await
                    .with_context(|| format!("Failed to push {}", key))?;
                if verbose {
                    tracing::info!("[{}] Updated {}", environment, key);
                }
                deployed.updated.push((key, pushed.version()));
            }
            AssetEvent::Remove => {
                client
                    .remove_asset(&key)
                    .await
                    .with_context(|| format!("Failed to remove {}", key))?;
                if verbose {
                    tracing::info!("[{}] Removed {}", environment, key);
                }
                deployed.removed.push(key);
            }
        }
    }

    Ok(deployed)
}
