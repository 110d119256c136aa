//! Download remote assets into each environment's local directory.

use anyhow::Context;

use crate::arbiter::Arbiter;
use crate::client::RemoteClient;
use crate::error::ArbiterError;
use crate::fs::{IgnoreRules, write_local_asset};

/// Options for download
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Keys to fetch; empty means every remote asset
    pub files: Vec<String>,
}

impl DownloadOptions {
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
}

/// Result of download: (environment, fetched keys)
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub environments: Vec<(String, Vec<String>)>,
}

pub struct DownloadCommand;

impl DownloadCommand {
    pub async fn execute<C: RemoteClient>(
        arbiter: &mut Arbiter<C>,
        options: &DownloadOptions,
    ) -> anyhow::Result<DownloadReport> {
        let verbose = arbiter.options().verbose;

        let fetched = arbiter
            .for_each_client(&options.files, move |client, files| async move {
                let environment = client.environment().to_string();
                let keys: Vec<String> = if files.is_empty() {
                    let rules = IgnoreRules::for_config(client.config())?;
                    client
                        .asset_list()
                        .await?
                        .into_iter()
                        .map(|asset| asset.key)
                        .filter(|key| !rules.is_ignored(key))
                        .collect()
                } else {
                    files
                };

                let mut versions = Vec::with_capacity(keys.len());
                for key in keys {
                    let asset = client
                        .fetch_asset(&key)
                        .await
                        .with_context(|| format!("Failed to fetch {}", key))?;
                    write_local_asset(&client.config().directory, &asset)?;
                    if verbose {
                        tracing::info!("[{}] Downloaded {}", environment, key);
                    }
                    versions.push((key, asset.version()));
                }
                Ok::<_, anyhow::Error>(versions)
            })
            .await;

        let manifest = arbiter.manifest_mut()?;
        for (environment, versions) in &fetched.completed {
            for (key, version) in versions {
                manifest.record(key, environment, version.clone());
            }
        }
        manifest.save().map_err(ArbiterError::Manifest)?;

        let environments = fetched
            .into_result()?
            .into_iter()
            .map(|(environment, versions)| {
                (environment, versions.into_iter().map(|(key, _)| key).collect())
            })
            .collect();
        Ok(DownloadReport { environments })
    }
}
