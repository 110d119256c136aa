//! Conflict report produced by comparing a change-set with tracked state.

use std::fmt;

/// Remote changes the operator has not observed, for one environment.
///
/// Both a value (inspect the lists for messaging) and an error (its
/// presence in a preflight result means the command must not run).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDiff {
    pub environment: String,
    /// Present on the remote but never recorded locally
    pub created: Vec<String>,
    /// Changed on the remote since it was recorded
    pub updated: Vec<String>,
    /// Recorded locally but gone from the remote
    pub removed: Vec<String>,
}

impl ManifestDiff {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            ..Self::default()
        }
    }

    /// Whether the diff blocks a command of the given destructiveness.
    ///
    /// Remote updates always conflict; remote creations and removals only
    /// matter when the command may remove or overwrite wholesale.
    pub fn any(&self, destructive: bool) -> bool {
        !self.updated.is_empty()
            || (destructive && (!self.created.is_empty() || !self.removed.is_empty()))
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }
}

impl fmt::Display for ManifestDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] Unexpected changes made on remote.", self.environment)?;
        for (label, keys) in [
            ("created", &self.created),
            ("updated", &self.updated),
            ("removed", &self.removed),
        ] {
            for key in keys {
                writeln!(f, "  {:<8} {}", label, key)?;
            }
        }
        write!(
            f,
            "Run `envsync download` to pull these changes first, or rerun with --force to override them."
        )
    }
}

impl std::error::Error for ManifestDiff {}
