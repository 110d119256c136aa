//! Envsync Core Library
//!
//! Coordinates a single logical command across any number of independently
//! configured remote environments: environment selection, concurrent
//! fan-out with error collection, pending change-set computation, and a
//! manifest-backed preflight gate that refuses to clobber remote changes
//! the operator has not seen.

pub mod arbiter;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Arbiter
    pub use crate::arbiter::{
        Arbiter, ArbiterOptions, DispatchReport, EnvironmentSelector, build_change_set,
        preflight_check,
    };

    // Errors
    pub use crate::error::{ArbiterError, HandlerFailure};

    // Configuration
    pub use crate::config::{Configuration, EnvironmentMap, FlagOverrides, load_environments};

    // Client
    pub use crate::client::{ClientFactory, HttpClient, RemoteClient};

    // Manifest
    pub use crate::manifest::{Manifest, ManifestDiff};

    // Types
    pub use crate::types::{Asset, AssetAction, AssetEvent, ChangeSet, DEFAULT_ENVIRONMENT};
}
