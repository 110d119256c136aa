//! Pending change-set computation.

use crate::client::RemoteClient;
use crate::error::ArbiterError;
use crate::types::{AssetAction, ChangeSet};

/// Compute the actions a command would apply to `client`'s environment.
///
/// With no `filenames` and a destructive command, every remote asset is
/// first seeded as a removal. Local assets are applied afterwards as
/// updates, so an asset present on both sides ends up as an update.
/// Named files never trigger a remote listing.
pub async fn build_change_set<C: RemoteClient>(
    client: &C,
    filenames: &[String],
    destructive: bool,
) -> Result<ChangeSet, ArbiterError> {
    let failed = |cause: anyhow::Error| ArbiterError::ChangeSet {
        environment: client.environment().to_string(),
        cause,
    };

    let mut actions = ChangeSet::new();

    if filenames.is_empty() && destructive {
        let remote = client.asset_list().await.map_err(failed)?;
        for asset in remote {
            actions.insert(asset.key.clone(), AssetAction::remove(asset));
        }
    }

    let local = client.local_assets(filenames).map_err(failed)?;
    for asset in local {
        actions.insert(asset.key.clone(), AssetAction::update(asset));
    }

    Ok(actions)
}
