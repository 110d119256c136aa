//! Glob-based ignore rules for local asset resolution.

use std::path::Path;

use anyhow::Context;
use glob::{MatchOptions, Pattern};

use crate::config::Configuration;

/// File names never treated as assets.
const RESERVED_FILES: [&str; 2] = [
    crate::config::CONFIG_FILE_NAME,
    crate::manifest::MANIFEST_FILE_NAME,
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compiled ignore patterns for one environment.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    /// Compile patterns from literal globs.
    pub fn new<I, S>(patterns: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).with_context(|| format!("Invalid ignore pattern: {}", p))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Build the rules for a resolved environment.
    ///
    /// Combines `ignored_files` with the patterns read from each `ignores` file.
    pub fn for_config(config: &Configuration) -> anyhow::Result<Self> {
        let mut raw: Vec<String> = config.ignored_files.clone();
        for path in &config.ignores {
            raw.extend(read_ignore_file(path)?);
        }
        Self::new(raw)
    }

    /// Whether an asset key should be skipped.
    pub fn is_ignored(&self, key: &str) -> bool {
        let file_name = key.rsplit('/').next().unwrap_or(key);
        if file_name.starts_with('.') || RESERVED_FILES.contains(&key) {
            return true;
        }
        self.patterns.iter().any(|pattern| {
            pattern.matches_with(key, MATCH_OPTIONS)
                || (!pattern.as_str().contains('/')
                    && pattern.matches_with(file_name, MATCH_OPTIONS))
        })
    }
}

/// Read glob patterns from an ignore file, skipping blanks and `#` comments.
fn read_ignore_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ignore file: {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
