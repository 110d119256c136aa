//! Remove named assets from every selected environment.

use anyhow::Context;

use crate::arbiter::Arbiter;
use crate::client::RemoteClient;
use crate::error::ArbiterError;
use crate::fs::touch_notify_file;
use crate::types::{Asset, AssetAction, ChangeSet};

/// Options for remove
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Keys to delete; at least one is required
    pub files: Vec<String>,
}

impl RemoveOptions {
    pub fn new<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            files: files.into_iter().map(Into::into).collect(),
        }
    }

    /// Removal change-set shared by every environment.
    pub fn change_set(&self) -> ChangeSet {
        self.files
            .iter()
            .map(|key| {
                let asset = Asset {
                    key: key.clone(),
                    ..Asset::default()
                };
                (key.clone(), AssetAction::remove(asset))
            })
            .collect()
    }
}

/// Result of remove: (environment, removed keys)
#[derive(Debug, Clone, Default)]
pub struct RemoveReport {
    pub environments: Vec<(String, Vec<String>)>,
}

pub struct RemoveCommand;

impl RemoveCommand {
    pub async fn execute<C: RemoteClient>(
        arbiter: &mut Arbiter<C>,
        options: &RemoveOptions,
    ) -> anyhow::Result<RemoveReport> {
        if options.files.is_empty() {
            anyhow::bail!("No files specified to remove");
        }

        arbiter.preflight(&options.change_set(), true)?;

        let verbose = arbiter.options().verbose;
        let removed = arbiter
            .for_each_client(&options.files, move |client, files| async move {
                let environment = client.environment().to_string();
                for key in &files {
                    client
                        .remove_asset(key)
                        .await
                        .with_context(|| format!("Failed to remove {}", key))?;
                    if verbose {
                        tracing::info!("[{}] Removed {}", environment, key);
                    }
                }
                Ok::<_, anyhow::Error>(files)
            })
            .await;

        let manifest = arbiter.manifest_mut()?;
        for (environment, keys) in &removed.completed {
            for key in keys {
                manifest.forget(key, environment);
            }
        }
        manifest.save().map_err(ArbiterError::Manifest)?;

        if !removed.completed.is_empty()
            && let Some(path) = &arbiter.options().notify_file
        {
            touch_notify_file(path)?;
        }

        let environments = removed.into_result()?;
        Ok(RemoveReport { environments })
    }
}
