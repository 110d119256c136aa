//! Errors surfaced by environment arbitration.

use std::fmt;
use std::path::PathBuf;

use crate::manifest::ManifestDiff;

/// A per-environment handler failure collected during fan-out.
#[derive(Debug)]
pub struct HandlerFailure {
    pub environment: String,
    pub error: anyhow::Error,
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:#}", self.environment, self.error)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArbiterError {
    #[error("Could not find config file at {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("{0:#}")]
    ConfigLoad(anyhow::Error),

    #[error("[{environment}] {cause:#}")]
    EnvironmentConfig {
        environment: String,
        cause: anyhow::Error,
    },

    #[error("[{environment}] Could not create a client: {cause:#}")]
    ClientConstruction {
        environment: String,
        cause: anyhow::Error,
    },

    #[error("Could not load any valid environments")]
    NoValidEnvironments,

    #[error("more than one environment specified for a single environment command")]
    SingleEnvironmentViolation,

    #[error("[{environment}] Could not compute pending changes: {cause:#}")]
    ChangeSet {
        environment: String,
        cause: anyhow::Error,
    },

    #[error("{0}")]
    PreflightConflict(Box<ManifestDiff>),

    #[error("{}", render_failures(.0))]
    Handler(Vec<HandlerFailure>),

    #[error("Manifest is not available before environments are resolved")]
    ManifestUnavailable,

    #[error("Manifest error: {0:#}")]
    Manifest(anyhow::Error),
}

fn render_failures(failures: &[HandlerFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
