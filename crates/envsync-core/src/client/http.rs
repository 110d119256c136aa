//! HTTP client for the remote asset API
//!
//! Endpoints, relative to the environment's `endpoint`:
//! - `GET assets` lists asset metadata
//! - `GET asset?key=K` fetches one asset with content
//! - `PUT asset` creates or overwrites an asset
//! - `DELETE asset?key=K` removes an asset

use anyhow::Context;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::RemoteClient;
use crate::config::Configuration;
use crate::fs::{IgnoreRules, resolve_local_assets};
use crate::types::Asset;

const USER_AGENT: &str = concat!("envsync/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct AssetListResponse {
    #[serde(default)]
    assets: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    asset: Asset,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    asset: &'a Asset,
}

/// Remote client speaking JSON over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpClient {
    config: Configuration,
    http: reqwest::Client,
    ignore: IgnoreRules,
}

impl HttpClient {
    /// Build a client for one environment.
    ///
    /// When a proxy is configured, certificate validation is disabled so
    /// intercepting proxies work.
    pub fn new(config: Configuration) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy.as_str())
                .with_context(|| format!("Invalid proxy: {}", proxy))?;
            builder = builder.proxy(proxy).danger_accept_invalid_certs(true);
        }

        let http = builder.build().context("Failed to build HTTP client")?;
        let ignore = IgnoreRules::for_config(&config)?;

        Ok(Self {
            config,
            http,
            ignore,
        })
    }

    /// URL for `segment` under the environment endpoint.
    pub fn endpoint_url(&self, segment: &str) -> anyhow::Result<Url> {
        let mut url = self.config.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("Endpoint cannot be a base URL: {}", self.config.endpoint))?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }

    fn asset_url(&self, key: &str) -> anyhow::Result<Url> {
        let mut url = self.endpoint_url("asset")?;
        url.query_pairs_mut().append_pair("key", key);
        Ok(url)
    }

    fn request(&self, method: Method, url: &Url) -> RequestBuilder {
        self.http
            .request(method, url.clone())
            .bearer_auth(&self.config.token)
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> anyhow::Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {} from {}", response.status(), url);
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> anyhow::Result<T> {
        self.send(request, url)
            .await?
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

impl RemoteClient for HttpClient {
    fn config(&self) -> &Configuration {
        &self.config
    }

    async fn asset_list(&self) -> anyhow::Result<Vec<Asset>> {
        let url = self.endpoint_url("assets")?;
        let body: AssetListResponse = self
            .send_json(self.request(Method::GET, &url), &url)
            .await?;
        Ok(body.assets)
    }

    fn local_assets(&self, filenames: &[String]) -> anyhow::Result<Vec<Asset>> {
        resolve_local_assets(&self.config.directory, filenames, &self.ignore)
    }

    async fn fetch_asset(&self, key: &str) -> anyhow::Result<Asset> {
        let url = self.asset_url(key)?;
        let body: AssetResponse = self
            .send_json(self.request(Method::GET, &url), &url)
            .await?;
        Ok(body.asset)
    }

    async fn push_asset(&self, asset: &Asset) -> anyhow::Result<Asset> {
        let url = self.endpoint_url("asset")?;
        let request = self
            .request(Method::PUT, &url)
            .json(&PushRequest { asset });
        let body: AssetResponse = self.send_json(request, &url).await?;
        Ok(body.asset)
    }

    async fn remove_asset(&self, key: &str) -> anyhow::Result<()> {
        let url = self.asset_url(key)?;
        self.send(self.request(Method::DELETE, &url), &url).await?;
        Ok(())
    }
}
