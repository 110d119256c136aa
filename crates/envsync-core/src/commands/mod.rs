//! High-level commands built on the arbiter.
//!
//! Each command resolves nothing itself: it takes an already resolved
//! [`Arbiter`](crate::arbiter::Arbiter), runs its handler through the
//! dispatcher, then folds per-environment outcomes into the manifest.

pub mod deploy;
pub mod download;
pub mod list;
pub mod open;
pub mod remove;

pub use deploy::{DeployCommand, DeployOptions, DeployReport, EnvironmentDeploy};
pub use download::{DownloadCommand, DownloadOptions, DownloadReport};
pub use list::{ListCommand, ListReport};
pub use open::OpenCommand;
pub use remove::{RemoveCommand, RemoveOptions, RemoveReport};

use crate::arbiter::DispatchReport;

/// Successful results, or the first failure's error as-is.
///
/// Used for read-only phases whose errors already name their environment.
fn first_failure<T>(report: DispatchReport<T>) -> anyhow::Result<Vec<(String, T)>> {
    match report.failures.into_iter().next() {
        Some(failure) => Err(failure.error),
        None => Ok(report.completed),
    }
}
