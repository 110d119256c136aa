//! Run a handler across active clients.

use std::future::Future;
use std::sync::Arc;

use crate::client::RemoteClient;
use crate::error::{ArbiterError, HandlerFailure};

/// Outcome of a fan-out: every handler has finished by the time this exists.
#[derive(Debug)]
pub struct DispatchReport<T> {
    /// Successful handlers, with the environment they ran against
    pub completed: Vec<(String, T)>,
    /// Failed handlers
    pub failures: Vec<HandlerFailure>,
}

impl<T> DispatchReport<T> {
    pub fn new() -> Self {
        Self {
            completed: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Successful results, or every failure as one error.
    pub fn into_result(self) -> Result<Vec<(String, T)>, ArbiterError> {
        if self.failures.is_empty() {
            Ok(self.completed)
        } else {
            Err(ArbiterError::Handler(self.failures))
        }
    }
}

impl<T> Default for DispatchReport<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn `handler` once per client and wait for all of them.
///
/// Each task owns its client handle and argument vector. A failing handler
/// does not cancel its siblings.
pub async fn fan_out<C, T, F, Fut>(clients: &[Arc<C>], args: &[String], handler: F) -> DispatchReport<T>
where
    C: RemoteClient,
    T: Send + 'static,
    F: Fn(Arc<C>, Vec<String>) -> Fut,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    let tasks: Vec<_> = clients
        .iter()
        .map(|client| {
            let environment = client.environment().to_string();
            let task = tokio::spawn(handler(Arc::clone(client), args.to_vec()));
            (environment, task)
        })
        .collect();

    let mut report = DispatchReport::new();
    for (environment, task) in tasks {
        match task.await {
            Ok(Ok(value)) => report.completed.push((environment, value)),
            Ok(Err(error)) => report.failures.push(HandlerFailure { environment, error }),
            Err(join_error) => report.failures.push(HandlerFailure {
                environment,
                error: anyhow::anyhow!("handler task failed: {}", join_error),
            }),
        }
    }

    if !report.is_success() {
        tracing::debug!(failed = report.failures.len(), "fan-out finished with failures");
    }
    report
}

/// Run `handler` against the only active client.
///
/// More than one client is rejected before the handler is invoked; the
/// handler's own result is returned untouched.
pub async fn single<C, T, F, Fut>(clients: &[Arc<C>], args: &[String], handler: F) -> anyhow::Result<T>
where
    C: RemoteClient,
    F: FnOnce(Arc<C>, Vec<String>) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    match clients {
        [client] => handler(Arc::clone(client), args.to_vec()).await,
        [] => Err(ArbiterError::NoValidEnvironments.into()),
        _ => Err(ArbiterError::SingleEnvironmentViolation.into()),
    }
}
