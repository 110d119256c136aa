//! Environment arbitration
//!
//! Resolves which environments an invocation targets, builds one client per
//! environment plus the manifest, and runs commands across those clients:
//!
//! 1. [`EnvironmentSelector`] narrows the declared environments.
//! 2. [`Arbiter::resolve`] builds the clients (fail-fast) and the manifest.
//! 3. [`build_change_set`] computes pending actions per client.
//! 4. [`Arbiter::preflight`] rejects change-sets that would clobber unseen
//!    remote changes, unless forced.
//! 5. [`Arbiter::for_each_client`] / [`Arbiter::for_single_client`] run
//!    the command handler.

pub mod changeset;
pub mod dispatch;
pub mod options;
pub mod preflight;
pub mod selector;

use std::future::Future;
use std::sync::Arc;

use crate::client::{ClientFactory, RemoteClient};
use crate::config::{self, load_environments};
use crate::error::ArbiterError;
use crate::manifest::Manifest;
use crate::types::ChangeSet;

pub use changeset::build_change_set;
pub use dispatch::DispatchReport;
pub use options::ArbiterOptions;
pub use preflight::preflight_check;
pub use selector::EnvironmentSelector;

/// Shared context for one invocation.
///
/// The client list and manifest are written during resolution and only
/// read afterwards, so handlers can share them without locking.
#[derive(Debug)]
pub struct Arbiter<C: RemoteClient> {
    options: ArbiterOptions,
    clients: Vec<Arc<C>>,
    manifest: Option<Manifest>,
}

impl<C: RemoteClient> Arbiter<C> {
    /// Create an unresolved arbiter.
    pub fn new(options: ArbiterOptions) -> Self {
        Self {
            options,
            clients: Vec::new(),
            manifest: None,
        }
    }

    /// Assemble a resolved arbiter from existing clients and manifest.
    pub fn from_parts(
        options: ArbiterOptions,
        clients: Vec<C>,
        manifest: Manifest,
    ) -> Result<Self, ArbiterError> {
        if clients.is_empty() {
            return Err(ArbiterError::NoValidEnvironments);
        }
        Ok(Self {
            options,
            clients: clients.into_iter().map(Arc::new).collect(),
            manifest: Some(manifest),
        })
    }

    /// Load the config, build a client per selected environment, then
    /// build the manifest.
    pub async fn resolve<F>(options: ArbiterOptions, factory: &F) -> Result<Self, ArbiterError>
    where
        F: ClientFactory<C>,
    {
        let mut arbiter = Self::new(options);
        arbiter.generate_clients(factory)?;
        arbiter.generate_manifest().await?;
        Ok(arbiter)
    }

    /// Build the active client list.
    ///
    /// Stops at the first environment whose configuration or client fails.
    /// Selecting nothing is an error.
    pub fn generate_clients<F>(&mut self, factory: &F) -> Result<(), ArbiterError>
    where
        F: ClientFactory<C>,
    {
        self.clients.clear();
        self.manifest = None;

        let config_path = &self.options.config_path;
        let environments = load_environments(config_path, self.options.flag_overrides())
            .map_err(|err| {
                if config::is_not_found(&err) {
                    ArbiterError::ConfigNotFound(config_path.clone())
                } else {
                    ArbiterError::ConfigLoad(err)
                }
            })?;

        let selector = self.selector();
        let mut clients = Vec::new();

        for name in environments.names() {
            if !selector.should_use(name) {
                tracing::debug!(environment = name, "environment not selected");
                continue;
            }

            let mut config = environments.get_configuration(name).map_err(|cause| {
                ArbiterError::EnvironmentConfig {
                    environment: name.to_string(),
                    cause,
                }
            })?;

            if self.options.disable_ignore {
                config.clear_ignores();
            }

            if let Some(proxy) = &config.proxy {
                tracing::warn!(
                    "[{}] Proxy URL detected from configuration: {} SSL certificate validation will be disabled!",
                    name,
                    proxy
                );
            }

            let client = factory
                .build(config)
                .map_err(|cause| ArbiterError::ClientConstruction {
                    environment: name.to_string(),
                    cause,
                })?;

            tracing::debug!(environment = name, "client ready");
            clients.push(Arc::new(client));
        }

        if clients.is_empty() {
            return Err(ArbiterError::NoValidEnvironments);
        }

        self.clients = clients;
        Ok(())
    }

    /// Build the manifest from the active clients.
    pub async fn generate_manifest(&mut self) -> Result<(), ArbiterError> {
        let manifest = Manifest::new(&self.options.base_dir(), &self.clients)
            .await
            .map_err(ArbiterError::Manifest)?;
        self.manifest = Some(manifest);
        Ok(())
    }

    pub fn options(&self) -> &ArbiterOptions {
        &self.options
    }

    pub fn selector(&self) -> EnvironmentSelector {
        EnvironmentSelector::new(
            self.options.environments.clone(),
            self.options.all_environments,
        )
    }

    /// Active clients, in resolution order.
    pub fn clients(&self) -> &[Arc<C>] {
        &self.clients
    }

    /// Active environment names, in resolution order.
    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.clients.iter().map(|c| c.environment())
    }

    pub fn manifest(&self) -> Result<&Manifest, ArbiterError> {
        self.manifest.as_ref().ok_or(ArbiterError::ManifestUnavailable)
    }

    pub fn manifest_mut(&mut self) -> Result<&mut Manifest, ArbiterError> {
        self.manifest.as_mut().ok_or(ArbiterError::ManifestUnavailable)
    }

    /// Compute the pending actions for one client.
    pub async fn change_set(
        &self,
        client: &C,
        filenames: &[String],
        destructive: bool,
    ) -> Result<ChangeSet, ArbiterError> {
        build_change_set(client, filenames, destructive).await
    }

    /// Check `actions` against every active environment's tracked state.
    pub fn preflight(&self, actions: &ChangeSet, destructive: bool) -> Result<(), ArbiterError> {
        if self.options.force {
            return Ok(());
        }
        preflight_check(
            actions,
            destructive,
            self.environments(),
            self.manifest()?,
            false,
        )
        .map_err(|diff| ArbiterError::PreflightConflict(Box::new(diff)))
    }

    /// Run `handler` against every active client concurrently.
    pub async fn for_each_client<T, F, Fut>(&self, args: &[String], handler: F) -> DispatchReport<T>
    where
        T: Send + 'static,
        F: Fn(Arc<C>, Vec<String>) -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        dispatch::fan_out(&self.clients, args, handler).await
    }

    /// Run `handler` against the single active client.
    pub async fn for_single_client<T, F, Fut>(&self, args: &[String], handler: F) -> anyhow::Result<T>
    where
        F: FnOnce(Arc<C>, Vec<String>) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        dispatch::single(&self.clients, args, handler).await
    }
}
