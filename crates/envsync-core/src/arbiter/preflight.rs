//! Conflict-detecting gate run before any remote mutation.

use crate::manifest::{Manifest, ManifestDiff};
use crate::types::ChangeSet;

/// Check `actions` against every environment's tracked state.
///
/// `force` skips the manifest entirely. Otherwise environments are checked
/// in the given order and the first conflicting diff is returned.
pub fn preflight_check<'a, I>(
    actions: &ChangeSet,
    destructive: bool,
    environments: I,
    manifest: &Manifest,
    force: bool,
) -> Result<(), ManifestDiff>
where
    I: IntoIterator<Item = &'a str>,
{
    if force {
        return Ok(());
    }

    for environment in environments {
        let diff = manifest.diff(actions, environment);
        if diff.any(destructive) {
            tracing::debug!(environment, "preflight found remote drift");
            return Err(diff);
        }
    }

    Ok(())
}
