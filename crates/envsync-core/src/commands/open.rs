//! Show the endpoint of the single selected environment.

use url::Url;

use crate::arbiter::Arbiter;
use crate::client::RemoteClient;

pub struct OpenCommand;

impl OpenCommand {
    /// Returns (environment, endpoint). Only one environment may be selected.
    pub async fn execute<C: RemoteClient>(arbiter: &Arbiter<C>) -> anyhow::Result<(String, Url)> {
        arbiter
            .for_single_client(&[], |client, _args| async move {
                Ok::<_, anyhow::Error>((
                    client.environment().to_string(),
                    client.config().endpoint.clone(),
                ))
            })
            .await
    }
}
