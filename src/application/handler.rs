//! Event handlers and startup hooks.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use super::capability::{Args, Capabilities};

type Callable = Arc<dyn Fn(Args) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

fn erase<F, Fut>(run: F) -> Callable
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    Arc::new(move |args| run(args).boxed())
}

/// An async callable invoked for every event its descriptor accepts.
///
/// A handler is eligible for an event when at least one of its event slots
/// accepts the event's class; its remaining slots are filled from the fixture
/// pool.
///
/// # Example
///
/// ```
/// use swarmwatch::application::{Capabilities, Handler};
///
/// let capabilities = Capabilities::new().event("event");
/// let handler = Handler::new("print-actions", capabilities, |args| async move {
///     let event = args.event("event")?;
///     println!("{}", event.action()?);
///     Ok(())
/// });
/// assert_eq!(handler.name(), "print-actions");
/// ```
#[derive(Clone)]
pub struct Handler {
    name: String,
    capabilities: Capabilities,
    run: Callable,
}

impl Handler {
    pub fn new<F, Fut>(name: impl Into<String>, capabilities: Capabilities, run: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            capabilities,
            run: erase(run),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub(crate) fn invoke(&self, args: Args) -> BoxFuture<'static, anyhow::Result<()>> {
        (self.run)(args)
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

/// An async callable run once, after fixtures resolve, with pool values only.
#[derive(Clone)]
pub struct StartupHook {
    name: String,
    capabilities: Capabilities,
    run: Callable,
}

impl StartupHook {
    pub fn new<F, Fut>(name: impl Into<String>, capabilities: Capabilities, run: F) -> Self
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name: name.into(),
            capabilities,
            run: erase(run),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub(crate) fn invoke(&self, args: Args) -> BoxFuture<'static, anyhow::Result<()>> {
        (self.run)(args)
    }
}

impl std::fmt::Debug for StartupHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartupHook")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
