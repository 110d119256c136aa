//! Environment selection policy.

use glob::Pattern;

use crate::types::DEFAULT_ENVIRONMENT;

/// Decides which declared environments an invocation targets.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSelector {
    /// Exact names or shell-style globs (`*`, `?`, `[...]`)
    filters: Vec<String>,
    /// Select everything regardless of filters
    all: bool,
}

impl EnvironmentSelector {
    pub fn new(filters: Vec<String>, all: bool) -> Self {
        Self { filters, all }
    }

    /// Check whether `name` is in scope.
    ///
    /// - `all` selects every environment.
    /// - With no filters, only the default environment is selected.
    /// - Otherwise a filter must equal `name` or glob-match it.
    pub fn should_use(&self, name: &str) -> bool {
        if self.all || (self.filters.is_empty() && name == DEFAULT_ENVIRONMENT) {
            return true;
        }
        self.filters
            .iter()
            .any(|filter| filter == name || glob_matches(filter, name))
    }
}

/// An invalid pattern never matches; exact comparison already covers it.
fn glob_matches(pattern: &str, name: &str) -> bool {
    Pattern::new(pattern)
        .map(|p| p.matches(name))
        .unwrap_or(false)
}
