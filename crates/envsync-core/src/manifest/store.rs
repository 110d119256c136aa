//! Manifest persistence next to the config file.

use anyhow::Context;
use std::fs;
use std::path::Path;

use super::types::ManifestFile;

/// Load the manifest at `path`.
///
/// Returns a new empty manifest if the file doesn't exist.
pub fn load(path: &Path) -> anyhow::Result<ManifestFile> {
    if !path.exists() {
        return Ok(ManifestFile::new());
    }

    let bytes =
        fs::read(path).with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    let manifest: ManifestFile = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse manifest: {}", path.display()))?;
    manifest.validate()?;
    Ok(manifest)
}

/// Save the manifest atomically (tmp + rename)
pub fn save(path: &Path, manifest: &ManifestFile) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create manifest directory: {}", dir.display()))?;

    let tmp_path = dir.join(format!(".envsync.lock.{}.tmp", std::process::id()));
    let bytes = serde_json::to_vec_pretty(manifest).context("Failed to serialize manifest")?;

    fs::write(&tmp_path, bytes)
        .with_context(|| format!("Failed to write tmp manifest: {}", tmp_path.display()))?;

    // Remove first for replace semantics on Windows
    if path.exists() {
        fs::remove_file(path).with_context(|| {
            format!("Failed to remove existing manifest: {}", path.display())
        })?;
    }
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to rename tmp manifest: {}", tmp_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_missing_returns_empty() {
        let temp = TempDir::new().unwrap();
        let manifest = load(&temp.path().join("envsync.lock")).unwrap();
        assert!(manifest.files.is_empty());
    }

    #[test]
    fn save_then_load_preserves_records() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("envsync.lock");
        let mut manifest = ManifestFile::new();
        manifest.set("assets/app.js", "production", "v1".into());

        save(&path, &manifest).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.get("assets/app.js", "production"), Some("v1"));
    }

    #[test]
    fn load_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("envsync.lock");
        fs::write(&path, "not json").unwrap();
        assert!(load(&path).is_err());
    }
}
