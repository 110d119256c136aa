//! Shared core types used across the client, manifest and arbiter layers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Environment selected when the operator passes no `--env` filter.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// A named remote or local resource, identified by its key (path).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique key, always `/`-separated
    pub key: String,

    /// Text content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Binary content, used when the bytes are not valid UTF-8
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Vec<u8>>,

    /// Content checksum reported by the remote, or computed locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,

    /// Last modification time reported by the remote
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Asset {
    /// Build an asset from raw bytes, computing its checksum.
    pub fn from_bytes(key: impl Into<String>, bytes: Vec<u8>) -> Self {
        let checksum = blake3::hash(&bytes).to_hex().to_string();
        let (value, attachment) = match String::from_utf8(bytes) {
            Ok(text) => (Some(text), None),
            Err(err) => (None, Some(err.into_bytes())),
        };
        Self {
            key: key.into(),
            value,
            attachment,
            checksum: Some(checksum),
            updated_at: None,
        }
    }

    /// Raw content bytes, if the asset carries content.
    pub fn contents(&self) -> Option<&[u8]> {
        self.value
            .as_deref()
            .map(str::as_bytes)
            .or(self.attachment.as_deref())
    }

    /// Opaque version string used for change tracking.
    ///
    /// Prefers the checksum, then the modification time, else empty.
    pub fn version(&self) -> String {
        if let Some(checksum) = &self.checksum {
            return checksum.clone();
        }
        self.updated_at
            .map(|ts| ts.to_rfc3339())
            .unwrap_or_default()
    }
}

/// Intent attached to an asset in a change-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetEvent {
    /// Push or overwrite on the remote
    Update,
    /// Delete from the remote
    Remove,
}

/// An asset paired with the action a command would apply to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAction {
    pub asset: Asset,
    pub event: AssetEvent,
}

impl AssetAction {
    pub fn update(asset: Asset) -> Self {
        Self {
            asset,
            event: AssetEvent::Update,
        }
    }

    pub fn remove(asset: Asset) -> Self {
        Self {
            asset,
            event: AssetEvent::Remove,
        }
    }
}

/// Pending actions keyed by asset key.
pub type ChangeSet = BTreeMap<String, AssetAction>;
