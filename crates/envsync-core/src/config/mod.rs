//! Environment configuration loading
//!
//! Turns envsync.toml into per-environment [`Configuration`] values.

pub mod parser;
pub mod schema;

use std::path::{Path, PathBuf};

use anyhow::Context;

pub use parser::{parse_envsync_toml, parse_envsync_toml_str};
pub use schema::{Configuration, EnvironmentEntry, EnvsyncConfig, FlagOverrides};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "envsync.toml";

/// Environments declared in a config file, plus what is needed to resolve them.
#[derive(Debug, Clone)]
pub struct EnvironmentMap {
    base_dir: PathBuf,
    overrides: FlagOverrides,
    config: EnvsyncConfig,
}

/// Load every declared environment from `path`.
///
/// A missing file keeps its `io::ErrorKind::NotFound` in the error chain.
pub fn load_environments(path: &Path, overrides: FlagOverrides) -> anyhow::Result<EnvironmentMap> {
    let config = parse_envsync_toml(path)?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(EnvironmentMap {
        base_dir,
        overrides,
        config,
    })
}

impl EnvironmentMap {
    pub fn new(base_dir: PathBuf, overrides: FlagOverrides, config: EnvsyncConfig) -> Self {
        Self {
            base_dir,
            overrides,
            config,
        }
    }

    /// Directory containing the config file.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Declared environment names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.config.environments.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.config.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.environments.is_empty()
    }

    /// Resolve the named environment into a validated [`Configuration`].
    pub fn get_configuration(&self, name: &str) -> anyhow::Result<Configuration> {
        let entry = self
            .config
            .environments
            .get(name)
            .with_context(|| format!("Environment '{}' is not declared", name))?;
        entry.resolve(name, &self.base_dir, &self.overrides)
    }
}

/// Whether an error chain bottoms out in a missing file.
pub fn is_not_found(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
    })
}
