//! Configuration schema for envsync.toml
//!
//! One `[environments.<name>]` table per remote target. Raw entries are
//! resolved into a validated [`Configuration`] on demand, so a broken
//! environment only fails the invocations that select it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use url::Url;

/// Default request timeout for remote calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Root structure of envsync.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnvsyncConfig {
    /// Declared environments keyed by name
    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentEntry>,
}

/// A single environment table, as written by the operator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EnvironmentEntry {
    /// Base URL of the remote asset API
    #[serde(default)]
    pub endpoint: String,

    /// Access token sent as a bearer credential
    #[serde(default)]
    pub token: String,

    /// Local asset directory, relative to the config file
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// HTTP(S) proxy; certificate validation is disabled when set
    #[serde(default)]
    pub proxy: Option<String>,

    /// Glob patterns excluded from every command
    #[serde(default)]
    pub ignored_files: Vec<String>,

    /// Files holding additional glob patterns, one per line
    #[serde(default)]
    pub ignores: Vec<PathBuf>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Ignore settings supplied on the command line.
///
/// Built once at startup and merged into every resolved environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    pub ignored_files: Vec<String>,
    pub ignores: Vec<PathBuf>,
}

/// Fully resolved settings for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub environment: String,
    pub endpoint: Url,
    pub token: String,
    pub directory: PathBuf,
    pub proxy: Option<Url>,
    pub ignored_files: Vec<String>,
    pub ignores: Vec<PathBuf>,
    pub timeout: Duration,
}

impl Configuration {
    /// Whether requests for this environment go through a proxy.
    pub fn has_proxy(&self) -> bool {
        self.proxy.is_some()
    }

    /// Drop every ignore pattern so all assets are considered.
    pub fn clear_ignores(&mut self) {
        self.ignored_files.clear();
        self.ignores.clear();
    }
}

impl EnvironmentEntry {
    /// Resolve into a validated [`Configuration`].
    ///
    /// Relative paths are resolved against `base_dir` (the config file's
    /// directory) and command-line ignores are appended.
    pub fn resolve(
        &self,
        name: &str,
        base_dir: &Path,
        overrides: &FlagOverrides,
    ) -> anyhow::Result<Configuration> {
        if self.endpoint.trim().is_empty() {
            anyhow::bail!("Missing endpoint");
        }
        let endpoint = Url::parse(self.endpoint.trim())
            .with_context(|| format!("Invalid endpoint URL: {}", self.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!("Endpoint must use http or https: {}", endpoint);
        }
        if self.token.trim().is_empty() {
            anyhow::bail!("Missing token");
        }

        let proxy = match self.proxy.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => {
                Some(Url::parse(raw).with_context(|| format!("Invalid proxy URL: {}", raw))?)
            }
        };

        let directory = match &self.directory {
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        };

        let mut ignored_files = self.ignored_files.clone();
        ignored_files.extend(overrides.ignored_files.iter().cloned());

        let mut ignores: Vec<PathBuf> = self.ignores.iter().map(|p| base_dir.join(p)).collect();
        ignores.extend(overrides.ignores.iter().map(|p| base_dir.join(p)));

        Ok(Configuration {
            environment: name.to_string(),
            endpoint,
            token: self.token.trim().to_string(),
            directory,
            proxy,
            ignored_files,
            ignores,
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        })
    }
}
