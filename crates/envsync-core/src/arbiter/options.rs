//! Operator flags for one invocation.

use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILE_NAME, FlagOverrides};

/// Flag values, built once at startup and passed to every component.
#[derive(Debug, Clone, Default)]
pub struct ArbiterOptions {
    /// Path to envsync.toml
    pub config_path: PathBuf,
    /// Per-asset progress output
    pub verbose: bool,
    /// Bypass the preflight conflict gate
    pub force: bool,
    /// Select every declared environment
    pub all_environments: bool,
    /// Environment filters (exact names or glob patterns)
    pub environments: Vec<String>,
    /// File touched after a successful sync
    pub notify_file: Option<PathBuf>,
    /// Consider every asset, ignoring all ignore patterns
    pub disable_ignore: bool,
    /// Extra ignore globs from the command line
    pub ignored_files: Vec<String>,
    /// Extra ignore files from the command line
    pub ignores: Vec<PathBuf>,
}

impl ArbiterOptions {
    /// Options pointing at `envsync.toml` in `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CONFIG_FILE_NAME))
    }

    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            ..Self::default()
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_all_environments(mut self, all: bool) -> Self {
        self.all_environments = all;
        self
    }

    pub fn with_environment(mut self, filter: impl Into<String>) -> Self {
        self.environments.push(filter.into());
        self
    }

    pub fn with_environments<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environments.extend(filters.into_iter().map(Into::into));
        self
    }

    pub fn with_notify_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.notify_file = Some(path.into());
        self
    }

    pub fn with_disable_ignore(mut self, disable: bool) -> Self {
        self.disable_ignore = disable;
        self
    }

    pub fn with_ignored_file(mut self, pattern: impl Into<String>) -> Self {
        self.ignored_files.push(pattern.into());
        self
    }

    pub fn with_ignores(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignores.push(path.into());
        self
    }

    /// Directory holding the config file (and the manifest).
    pub fn base_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Command-line ignores to merge into each environment.
    ///
    /// Empty when ignores are disabled.
    pub fn flag_overrides(&self) -> FlagOverrides {
        if self.disable_ignore {
            return FlagOverrides::default();
        }
        FlagOverrides {
            ignored_files: self.ignored_files.clone(),
            ignores: self.ignores.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_overrides_empty_when_ignore_disabled() {
        let options = ArbiterOptions::new("/work/envsync.toml")
            .with_ignored_file("*.png")
            .with_disable_ignore(true);
        assert_eq!(options.flag_overrides(), FlagOverrides::default());
    }

    #[test]
    fn flag_overrides_carry_patterns() {
        let options = ArbiterOptions::new("/work/envsync.toml")
            .with_ignored_file("*.png")
            .with_ignores(".envsyncignore");
        let overrides = options.flag_overrides();
        assert_eq!(overrides.ignored_files, vec!["*.png"]);
        assert_eq!(overrides.ignores, vec![PathBuf::from(".envsyncignore")]);
    }

    #[test]
    fn base_dir_of_bare_file_name_is_current_dir() {
        assert_eq!(ArbiterOptions::new("envsync.toml").base_dir(), PathBuf::from("."));
        assert_eq!(
            ArbiterOptions::new("/work/envsync.toml").base_dir(),
            PathBuf::from("/work")
        );
    }
}
