//! Filesystem helpers: local asset resolution, ignore rules, notify file.

pub mod ignore;
pub mod local;

use std::path::Path;

use anyhow::Context;

pub use ignore::IgnoreRules;
pub use local::{resolve_local_assets, write_local_asset};

/// Write the current UTC timestamp to `path`, creating parent directories.
///
/// External watchers (live reload, build tools) poll this file to learn
/// that a sync finished.
pub fn touch_notify_file(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, chrono::Utc::now().to_rfc3339())
        .with_context(|| format!("Failed to write notify file: {}", path.display()))
}
