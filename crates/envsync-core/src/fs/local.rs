//! Resolve local files into assets
//!
//! Keys are paths relative to the environment directory, always `/`-separated.
//! Directory walks are sorted so results are deterministic.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;

use super::ignore::IgnoreRules;
use crate::types::Asset;

/// Resolve `filenames` (or every file when empty) under `root`.
///
/// Named entries may be files or directories, given relative to `root` or
/// as paths that already include it. A named file that does not exist is
/// an error; ignored files are silently skipped.
pub fn resolve_local_assets(
    root: &Path,
    filenames: &[String],
    rules: &IgnoreRules,
) -> anyhow::Result<Vec<Asset>> {
    let mut assets = Vec::new();

    if filenames.is_empty() {
        if root.exists() {
            collect_dir(root, root, rules, &mut assets)?;
        }
        return Ok(assets);
    }

    let root = &absolute(root)?;
    for name in filenames {
        let path = resolve_named_path(root, name)?;
        if path.is_dir() {
            collect_dir(root, &path, rules, &mut assets)?;
            continue;
        }
        if !path.is_file() {
            anyhow::bail!("File not found: {}", path.display());
        }
        let key = asset_key(root, &path)?;
        if rules.is_ignored(&key) {
            continue;
        }
        assets.push(read_asset(&path, key)?);
    }

    Ok(assets)
}

/// Write an asset's content to `root/key`, creating parent directories.
pub fn write_local_asset(root: &Path, asset: &Asset) -> anyhow::Result<PathBuf> {
    let path = root.join(key_to_relative_path(&asset.key)?);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let contents = asset.contents().unwrap_or_default();
    fs::write(&path, contents)
        .with_context(|| format!("Failed to write asset: {}", path.display()))?;
    Ok(path)
}

/// `root` must already be absolute.
fn resolve_named_path(root: &Path, name: &str) -> anyhow::Result<PathBuf> {
    let candidate = absolute(Path::new(name))?;
    if Path::new(name).is_absolute() || candidate.starts_with(root) {
        return Ok(candidate);
    }
    Ok(root.join(key_to_relative_path(name)?))
}

/// Absolute form of `path` against the working directory, without `.` components.
fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    let path = std::path::absolute(path)
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;
    Ok(path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}

fn collect_dir(
    root: &Path,
    dir: &Path,
    rules: &IgnoreRules,
    assets: &mut Vec<Asset>,
) -> anyhow::Result<()> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Failed to read directory entries: {}", dir.display()))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let key = asset_key(root, &path)?;
        if rules.is_ignored(&key) {
            continue;
        }
        let ty = entry
            .file_type()
            .with_context(|| format!("Failed to read file type: {}", path.display()))?;
        if ty.is_dir() {
            collect_dir(root, &path, rules, assets)?;
        } else if ty.is_file() {
            assets.push(read_asset(&path, key)?);
        }
    }
    Ok(())
}

fn read_asset(path: &Path, key: String) -> anyhow::Result<Asset> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read asset: {}", path.display()))?;
    Ok(Asset::from_bytes(key, bytes))
}

fn asset_key(root: &Path, path: &Path) -> anyhow::Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Ok(parts.join("/"))
}

/// Convert an asset key into a relative path, rejecting traversal.
fn key_to_relative_path(key: &str) -> anyhow::Result<PathBuf> {
    let path = PathBuf::from(key);
    if path.is_absolute() {
        anyhow::bail!("Absolute asset keys are not allowed: {}", key);
    }
    for component in path.components() {
        if let Component::ParentDir = component {
            anyhow::bail!("Path traversal not allowed in asset key: {}", key);
        }
    }
    Ok(path)
}
