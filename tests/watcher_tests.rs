use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use swarmwatch::application::{Capabilities, Fixture, FixturePool, Handler, Registry, Resource};
use swarmwatch::domain::RawRecord;
use swarmwatch::error::Error;
use swarmwatch::infrastructure::orchestration::Watcher;
use swarmwatch::testkit::config::quiet_config;
use swarmwatch::testkit::record::{container_record, record};
use swarmwatch::testkit::source::{ChannelSource, ScriptedSource};
use tokio::sync::{watch, Notify};

struct Db;
struct Missing;

fn counter_handler(hits: &Arc<AtomicUsize>) -> Handler {
    let hits = Arc::clone(hits);
    Handler::new("count", Capabilities::new().event("e"), move |_| {
        let hits = Arc::clone(&hits);
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

fn untyped() -> RawRecord {
    RawRecord::try_from(json!({ "Action": "start" })).unwrap()
}

#[tokio::test]
async fn dispatches_every_record_until_stream_ends() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    registry.add_handler(counter_handler(&hits));

    let source = ScriptedSource::new().with_records(vec![
        Some(container_record("a", "create")),
        Some(untyped()),
        Some(record("network", "connect", "n1")),
        Some(container_record("a", "start")),
    ]);

    let watcher = Watcher::new(quiet_config().watcher, registry);
    let summary = watcher.run(source, FixturePool::new()).await.unwrap();

    assert_eq!(summary.records, 4);
    assert_eq!(summary.dispatched, 3);
    assert_eq!(summary.malformed, 1);
    assert_eq!(summary.handler_failures, 0);
    assert_eq!(summary.abandoned, 0);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn event_logger_is_registered_when_enabled() {
    let mut config = quiet_config().watcher;
    config.log_events = true;

    let watcher = Watcher::new(config, Registry::new());
    let names: Vec<&str> = watcher.registry().handlers().iter().map(Handler::name).collect();
    assert_eq!(names, vec!["event-logger"]);

    let watcher = Watcher::new(quiet_config().watcher, Registry::new());
    assert!(watcher.registry().handlers().is_empty());
}

#[tokio::test]
async fn shutdown_signal_stops_watching_and_drains_fixtures() {
    let drained = Arc::new(AtomicUsize::new(0));
    let hits = Arc::new(AtomicUsize::new(0));

    let mut registry = Registry::new();
    let teardown_count = Arc::clone(&drained);
    registry
        .add_fixture(Fixture::new("db", Capabilities::new(), move |_| async move {
            Ok(Resource::new(Db).with_teardown(move |_| async move {
                teardown_count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
        }))
        .add_handler(counter_handler(&hits));

    let (tx, source) = ChannelSource::new(8);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let watcher = Arc::new(Watcher::new(quiet_config().watcher, registry));

    let running = {
        let watcher = Arc::clone(&watcher);
        tokio::spawn(async move {
            watcher
                .run_with_shutdown(source, FixturePool::new(), shutdown_rx)
                .await
        })
    };

    tx.send(container_record("a", "start")).await.unwrap();
    tx.send(container_record("b", "start")).await.unwrap();
    for _ in 0..100 {
        if hits.load(Ordering::SeqCst) == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    shutdown_tx.send(true).unwrap();

    let summary = running.await.unwrap().unwrap();
    assert_eq!(summary.records, 2);
    assert_eq!(summary.dispatched, 2);
    assert_eq!(summary.shutdown.attempted, 1);
    assert_eq!(drained.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn in_flight_dispatches_finish_before_fixtures_drain() {
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::default();
    let release = Arc::new(Notify::new());

    let mut registry = Registry::new();
    let teardown_order = Arc::clone(&order);
    registry.add_fixture(Fixture::new("db", Capabilities::new(), move |_| async move {
        Ok(Resource::new(Db).with_teardown(move |_| async move {
            teardown_order.lock().push("teardown");
            Ok(())
        }))
    }));
    let handler_order = Arc::clone(&order);
    let gate = Arc::clone(&release);
    registry.add_handler(Handler::new(
        "slow",
        Capabilities::new().event("e").fixture::<Db>("db"),
        move |_| {
            let handler_order = Arc::clone(&handler_order);
            let gate = Arc::clone(&gate);
            async move {
                gate.notified().await;
                handler_order.lock().push("handler");
                Ok(())
            }
        },
    ));

    let source = ScriptedSource::new().with_records(vec![Some(container_record("a", "stop"))]);
    let watcher = Watcher::new(quiet_config().watcher, registry);

    let opener = Arc::clone(&release);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        opener.notify_one();
    });

    let summary = watcher.run(source, FixturePool::new()).await.unwrap();

    assert_eq!(summary.dispatched, 1);
    assert_eq!(summary.abandoned, 0);
    assert_eq!(*order.lock(), vec!["handler", "teardown"]);
}

#[tokio::test]
async fn drain_timeout_abandons_stuck_dispatches() {
    let mut registry = Registry::new();
    registry.add_handler(Handler::new("stuck", Capabilities::new().event("e"), |_| async {
        std::future::pending::<()>().await;
        Ok(())
    }));

    let source = ScriptedSource::new().with_records(vec![Some(record("volume", "mount", "v"))]);
    let watcher = Watcher::new(quiet_config().watcher, registry);

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        watcher.run(source, FixturePool::new()),
    )
    .await
    .expect("watcher should give up on stuck handlers")
    .unwrap();

    assert_eq!(summary.records, 1);
    assert_eq!(summary.dispatched, 0);
    assert_eq!(summary.abandoned, 1);
}

#[tokio::test]
async fn unresolvable_fixtures_abort_before_connecting() {
    let mut registry = Registry::new();
    registry.add_fixture(Fixture::new(
        "needs-missing",
        Capabilities::new().fixture::<Missing>("m"),
        |_| async { Ok(Resource::new(Db)) },
    ));

    let source = ScriptedSource::new();
    let connects = source.connect_counter();
    let watcher = Watcher::new(quiet_config().watcher, registry);

    let result = watcher.run(source, FixturePool::new()).await;

    assert!(matches!(result, Err(Error::UnresolvableDependency { .. })));
    assert_eq!(connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn connect_failure_drains_started_fixtures() {
    let drained = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    let teardown_count = Arc::clone(&drained);
    registry.add_fixture(Fixture::new("db", Capabilities::new(), move |_| async move {
        Ok(Resource::new(Db).with_teardown(move |_| async move {
            teardown_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
    }));

    let source = ScriptedSource::new()
        .with_connect_results(vec![Err(Error::Connection("engine unreachable".into()))]);
    let watcher = Watcher::new(quiet_config().watcher, registry);

    let result = watcher.run(source, FixturePool::new()).await;

    assert!(matches!(result, Err(Error::Connection(_))));
    assert_eq!(drained.load(Ordering::SeqCst), 1);
}
