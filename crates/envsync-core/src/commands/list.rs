//! List remote assets per environment.

use crate::arbiter::Arbiter;
use crate::client::RemoteClient;
use crate::types::Asset;

/// Result of list: (environment, remote assets sorted by key)
#[derive(Debug, Clone, Default)]
pub struct ListReport {
    pub environments: Vec<(String, Vec<Asset>)>,
}

pub struct ListCommand;

impl ListCommand {
    pub async fn execute<C: RemoteClient>(arbiter: &Arbiter<C>) -> anyhow::Result<ListReport> {
        let listed = arbiter
            .for_each_client(&[], |client, _args| async move {
                let mut assets = client.asset_list().await?;
                assets.sort_by(|a, b| a.key.cmp(&b.key));
                Ok::<_, anyhow::Error>(assets)
            })
            .await;

        Ok(ListReport {
            environments: listed.into_result()?,
        })
    }
}
