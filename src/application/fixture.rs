//! Fixtures: typed, process-wide resources with explicit teardown.
//!
//! A [`Fixture`] pairs a [`Capabilities`] descriptor (its own dependencies)
//! with an async factory. The factory runs at most once, when every dependency
//! is present in the [`FixturePool`], and returns a [`Resource`]: the produced
//! value plus an optional teardown that the shutdown pass runs later.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use super::capability::{Args, Candidate, Capabilities, FixtureType, FixtureValue};

/// Deferred cleanup for one started fixture.
pub(crate) type Teardown = Box<dyn FnOnce() -> BoxFuture<'static, anyhow::Result<()>> + Send>;

type Factory = Box<dyn FnOnce(Args) -> BoxFuture<'static, anyhow::Result<Provided>> + Send>;

/// A produced fixture value and its cleanup.
///
/// # Example
///
/// ```
/// use swarmwatch::application::Resource;
///
/// struct Connection;
///
/// let resource = Resource::new(Connection).with_teardown(|_conn| async move {
///     // close the connection
///     Ok(())
/// });
/// # let _ = resource;
/// ```
pub struct Resource<T> {
    value: Arc<T>,
    teardown: Option<Box<dyn FnOnce(Arc<T>) -> BoxFuture<'static, anyhow::Result<()>> + Send>>,
}

impl<T: Any + Send + Sync> Resource<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(value),
            teardown: None,
        }
    }

    /// Run `teardown` with the produced value when fixtures are drained.
    #[must_use]
    pub fn with_teardown<F, Fut>(mut self, teardown: F) -> Self
    where
        F: FnOnce(Arc<T>) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.teardown = Some(Box::new(move |value| teardown(value).boxed()));
        self
    }

    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    fn into_provided(self) -> Provided {
        let value = FixtureValue::from_arc(Arc::clone(&self.value));
        let teardown = self.teardown.map(|teardown| {
            let produced = self.value;
            Box::new(move || teardown(produced)) as Teardown
        });
        Provided { value, teardown }
    }
}

/// Type-erased output of a fixture factory.
pub(crate) struct Provided {
    pub value: FixtureValue,
    pub teardown: Option<Teardown>,
}

/// A registered fixture factory.
pub struct Fixture {
    name: String,
    capabilities: Capabilities,
    produces: FixtureType,
    factory: Factory,
}

impl Fixture {
    /// Register `factory` as the producer of `T`.
    ///
    /// `capabilities` lists the fixtures it depends on; they are matched by
    /// type against values already in the pool.
    pub fn new<T, F, Fut>(name: impl Into<String>, capabilities: Capabilities, factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: FnOnce(Args) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Resource<T>>> + Send + 'static,
    {
        Self {
            name: name.into(),
            capabilities,
            produces: FixtureType::of::<T>(),
            factory: Box::new(move |args| {
                factory(args)
                    .map(|result| result.map(Resource::into_provided))
                    .boxed()
            }),
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

    #[must_use]
    pub fn produces(&self) -> FixtureType {
        self.produces
    }

    pub(crate) fn start(self, args: Args) -> BoxFuture<'static, anyhow::Result<Provided>> {
        (self.factory)(args)
    }
}

impl std::fmt::Debug for Fixture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fixture")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("produces", &self.produces)
            .finish_non_exhaustive()
    }
}

/// Ordered, append-only collection of available fixture values.
///
/// Insertion order is dependency order: a fixture's value only enters the pool
/// after every value it depends on.
#[derive(Debug, Clone, Default)]
pub struct FixturePool {
    entries: Vec<FixtureValue>,
}

impl FixturePool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a bootstrap value.
    #[must_use]
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.push(FixtureValue::new(value));
    }

    pub(crate) fn push(&mut self, value: FixtureValue) {
        self.entries.push(value);
    }

    /// The first value of type `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.entries.iter().find_map(FixtureValue::downcast::<T>)
    }

    /// Entry type names in pool order.
    #[must_use]
    pub fn type_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.ty().name()).collect()
    }

    #[must_use]
    pub fn candidates(&self) -> impl Iterator<Item = Candidate<'_>> + Clone {
        self.entries.iter().map(Candidate::Fixture)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
