//! Fixed-point fixture resolution.
//!
//! Fixtures do not declare a graph up front. The resolver keeps a worklist in
//! registration order and repeatedly tries the head against the pool:
//!
//! ```text
//! loop:
//!   rejected == pending.len()  ──► UnresolvableDependency(all pending)
//!   pop head
//!   ├─ resolved    ──► start, append value to pool, rejected = 0
//!   └─ unsatisfied ──► push to tail, rejected += 1
//! ```
//!
//! A full pass that rejects every remaining fixture is a fixed point with
//! unmet demand. Missing types and cycles are not told apart; the error names
//! the whole pending set.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::{debug, error, info};

use super::capability::{describe_slots, resolve_args, Resolution};
use super::fixture::{Fixture, FixturePool, Teardown};
use crate::error::{Error, Result};

/// A fixture that has produced its value and awaits teardown.
pub(crate) struct StartedFixture {
    pub name: String,
    pub teardown: Option<Teardown>,
}

/// Start every fixture in dependency order.
///
/// Each started fixture is appended to `started` as soon as its value is in
/// the pool, so a later failure still leaves it registered for draining.
pub(crate) async fn resolve(
    fixtures: Vec<Fixture>,
    mut pool: FixturePool,
    started: &Mutex<Vec<StartedFixture>>,
) -> Result<FixturePool> {
    let mut pending: VecDeque<Fixture> = fixtures.into();
    let mut rejected = 0usize;

    while !pending.is_empty() {
        if rejected == pending.len() {
            return Err(unresolvable(&pending, &pool));
        }

        let Some(fixture) = pending.pop_front() else {
            break;
        };

        match resolve_args(fixture.capabilities(), pool.candidates()) {
            Resolution::Resolved(args) => {
                rejected = 0;
                let name = fixture.name().to_string();
                let produces = fixture.produces();

                let provided = fixture
                    .start(args)
                    .await
                    .map_err(|source| Error::FixtureStartup {
                        name: name.clone(),
                        source,
                    })?;

                pool.push(provided.value);
                info!(fixture = %name, produces = produces.name(), "Fixture started");
                started.lock().push(StartedFixture {
                    name,
                    teardown: provided.teardown,
                });
            }
            Resolution::Unsatisfied(missing) => {
                debug!(
                    fixture = %fixture.name(),
                    missing = %describe_slots(&missing),
                    "Fixture dependencies not yet available, requeueing"
                );
                pending.push_back(fixture);
                rejected += 1;
            }
        }
    }

    Ok(pool)
}

fn unresolvable(pending: &VecDeque<Fixture>, pool: &FixturePool) -> Error {
    for fixture in pending {
        if let Resolution::Unsatisfied(missing) =
            resolve_args(fixture.capabilities(), pool.candidates())
        {
            error!(
                fixture = %fixture.name(),
                missing = %describe_slots(&missing),
                available = ?pool.type_names(),
                "Fixture cannot be resolved"
            );
        }
    }

    Error::UnresolvableDependency {
        pending: pending.iter().map(|f| f.name().to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::capability::Capabilities;
    use crate::application::fixture::Resource;

    #[derive(Debug, PartialEq)]
    struct Root(u32);

    #[derive(Debug, PartialEq)]
    struct Leaf(u32);

    fn leaf() -> Fixture {
        Fixture::new("leaf", Capabilities::new().fixture::<Root>("root"), |args| async move {
            let root = args.fixture::<Root>("root")?;
            Ok(Resource::new(Leaf(root.0 * 10)))
        })
    }

    fn root() -> Fixture {
        Fixture::new("root", Capabilities::new(), |_| async { Ok(Resource::new(Root(4))) })
    }

    #[tokio::test]
    async fn dependents_registered_first_are_requeued() {
        let started = Mutex::new(Vec::new());
        let pool = resolve(vec![leaf(), root()], FixturePool::new(), &started)
            .await
            .unwrap();

        assert_eq!(*pool.get::<Leaf>().unwrap(), Leaf(40));
        let names: Vec<_> = started.lock().iter().map(|f| f.name.clone()).collect();
        assert_eq!(names, vec!["root", "leaf"]);
    }

    #[tokio::test]
    async fn bootstrap_values_satisfy_dependencies() {
        let started = Mutex::new(Vec::new());
        let pool = resolve(vec![leaf()], FixturePool::new().with(Root(2)), &started)
            .await
            .unwrap();

        assert_eq!(pool.len(), 2);
        assert_eq!(*pool.get::<Leaf>().unwrap(), Leaf(20));
    }

    #[tokio::test]
    async fn factory_error_is_fatal_and_keeps_earlier_fixtures() {
        let broken = Fixture::new(
            "broken",
            Capabilities::new().fixture::<Root>("root"),
            |_| async { Err::<Resource<Leaf>, _>(anyhow::anyhow!("no socket")) },
        );
        let started = Mutex::new(Vec::new());

        let err = resolve(vec![root(), broken], FixturePool::new(), &started)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::FixtureStartup { ref name, .. } if name == "broken"));
        assert_eq!(started.lock().len(), 1);
    }

    #[tokio::test]
    async fn empty_worklist_returns_bootstrap_pool() {
        let started = Mutex::new(Vec::new());
        let pool = resolve(Vec::new(), FixturePool::new().with(Root(1)), &started)
            .await
            .unwrap();
        assert_eq!(pool.type_names().len(), 1);
    }
}
