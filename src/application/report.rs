//! Outcome reporting for isolated invocations.
//!
//! Handlers, startup hooks and fixture teardowns all run under [`guarded`]:
//! an `Err` return or a panic becomes a [`Failure`] entry instead of
//! propagating, so one bad callable never takes its siblings down.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use futures_util::future::{BoxFuture, FutureExt};

/// One callable that failed, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub name: String,
    pub reason: String,
}

/// Summary of one fan-out, startup or shutdown pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Callables selected for this pass, including ones that failed.
    pub attempted: usize,
    pub failures: Vec<Failure>,
}

impl RunReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.attempted.saturating_sub(self.failures.len())
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn failed_names(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.name.as_str()).collect()
    }

    pub(crate) fn record(&mut self, name: &str, outcome: Result<(), String>) {
        self.attempted += 1;
        if let Err(reason) = outcome {
            self.failures.push(Failure {
                name: name.to_string(),
                reason,
            });
        }
    }
}

/// Start and await a callable, turning errors and panics into a reason string.
pub(crate) async fn guarded<F>(start: F) -> Result<(), String>
where
    F: FnOnce() -> BoxFuture<'static, anyhow::Result<()>>,
{
    let future = panic::catch_unwind(AssertUnwindSafe(start)).map_err(panic_reason)?;

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(payload) => Err(panic_reason(payload)),
    }
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    format!("panicked: {message}")
}
