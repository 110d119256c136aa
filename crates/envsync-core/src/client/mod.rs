//! Remote client layer
//!
//! One client per selected environment. A client is bound to exactly one
//! [`Configuration`], owns its network state, and is never mutated after
//! construction, so it can be shared read-only across concurrent handlers.

pub mod http;

use std::future::Future;

use crate::config::Configuration;
use crate::fs::{IgnoreRules, resolve_local_assets};
use crate::types::Asset;

pub use http::HttpClient;

/// Operations the arbiter and commands need from a remote environment.
pub trait RemoteClient: Send + Sync + 'static {
    /// Settings this client was built from.
    fn config(&self) -> &Configuration;

    /// Environment name this client is bound to.
    fn environment(&self) -> &str {
        &self.config().environment
    }

    /// List every asset currently on the remote (metadata only).
    fn asset_list(&self) -> impl Future<Output = anyhow::Result<Vec<Asset>>> + Send;

    /// Resolve `filenames` (or every local file when empty) from the
    /// environment's directory, honouring its ignore rules.
    fn local_assets(&self, filenames: &[String]) -> anyhow::Result<Vec<Asset>> {
        let rules = IgnoreRules::for_config(self.config())?;
        resolve_local_assets(&self.config().directory, filenames, &rules)
    }

    /// Fetch one asset including its content.
    fn fetch_asset(&self, key: &str) -> impl Future<Output = anyhow::Result<Asset>> + Send;

    /// Create or overwrite an asset; returns the remote's view of it.
    fn push_asset(&self, asset: &Asset) -> impl Future<Output = anyhow::Result<Asset>> + Send;

    /// Delete an asset from the remote.
    fn remove_asset(&self, key: &str) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Builds a client from a resolved configuration.
pub trait ClientFactory<C> {
    fn build(&self, config: Configuration) -> anyhow::Result<C>;
}

impl<C, F> ClientFactory<C> for F
where
    F: Fn(Configuration) -> anyhow::Result<C>,
{
    fn build(&self, config: Configuration) -> anyhow::Result<C> {
        self(config)
    }
}
