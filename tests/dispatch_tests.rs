use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use swarmwatch::application::{Capabilities, FixturePool, Handler, Registry};
use swarmwatch::domain::{Event, EventClass, RawRecord};
use swarmwatch::error::Error;
use swarmwatch::port::ContainerInspector;
use swarmwatch::testkit::inspector::CountingInspector;
use swarmwatch::testkit::record::{container_record, record};

struct Store(&'static str);

fn counting(name: &str, capabilities: Capabilities, hits: &Arc<AtomicUsize>) -> Handler {
    let hits = Arc::clone(hits);
    Handler::new(name, capabilities, move |_| {
        let hits = Arc::clone(&hits);
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

#[test]
fn classify_picks_variant_by_discriminant() {
    let container = Event::classify(container_record("c1", "start"), None).unwrap();
    assert_eq!(container.class(), EventClass::Container);
    assert!(container.as_container().is_some());

    let volume = Event::classify(record("volume", "mount", "v1"), None).unwrap();
    assert_eq!(volume.class(), EventClass::Any);
    assert!(volume.as_container().is_none());
    assert_eq!(volume.kind().unwrap(), "volume");
}

#[tokio::test]
async fn base_handler_sees_every_event_variant_handler_only_its_own() {
    let any_hits = Arc::new(AtomicUsize::new(0));
    let container_hits = Arc::new(AtomicUsize::new(0));

    let mut registry = Registry::new();
    registry
        .add_handler(counting("any", Capabilities::new().event("e"), &any_hits))
        .add_handler(counting(
            "containers",
            Capabilities::new().event_of("e", EventClass::Container),
            &container_hits,
        ));
    let pool = FixturePool::new();

    registry.dispatch(container_record("c1", "start"), &pool).await.unwrap();
    registry.dispatch(record("network", "connect", "n1"), &pool).await.unwrap();
    registry.dispatch(record("volume", "create", "v1"), &pool).await.unwrap();

    assert_eq!(any_hits.load(Ordering::SeqCst), 3);
    assert_eq!(container_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failing_handlers_do_not_affect_siblings() {
    let hits = Arc::new(AtomicUsize::new(0));

    let mut registry = Registry::new();
    registry
        .add_handler(counting("first", Capabilities::new().event("e"), &hits))
        .add_handler(Handler::new("errors", Capabilities::new().event("e"), |_| async {
            Err(anyhow::anyhow!("database unavailable"))
        }))
        .add_handler(Handler::new("panics", Capabilities::new().event("e"), |_| async {
            if true {
                panic!("handler bug");
            }
            Ok(())
        }))
        .add_handler(counting("last", Capabilities::new().event("e"), &hits));

    let report = registry
        .dispatch(container_record("c1", "die"), &FixturePool::new())
        .await
        .unwrap();

    assert_eq!(report.attempted, 4);
    assert_eq!(report.succeeded(), 2);
    let mut failed = report.failed_names();
    failed.sort_unstable();
    assert_eq!(failed, vec!["errors", "panics"]);
    assert_eq!(hits.load(Ordering::SeqCst), 2);

    let panic_reason = report
        .failures
        .iter()
        .find(|f| f.name == "panics")
        .map(|f| f.reason.as_str());
    assert!(panic_reason.is_some_and(|r| r.contains("handler bug")));
}

#[tokio::test]
async fn unsatisfied_handler_is_reported_not_invoked() {
    let hits = Arc::new(AtomicUsize::new(0));

    let mut registry = Registry::new();
    registry.add_handler(counting(
        "needs-store",
        Capabilities::new().event("e").fixture::<Store>("store"),
        &hits,
    ));

    let report = registry
        .dispatch(record("network", "create", "n1"), &FixturePool::new())
        .await
        .unwrap();

    assert_eq!(report.attempted, 1);
    assert_eq!(report.failed_names(), vec!["needs-store"]);
    assert!(report.failures[0].reason.contains("unsatisfied dependencies"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn ineligible_handlers_are_not_attempted() {
    let hits = Arc::new(AtomicUsize::new(0));

    let mut registry = Registry::new();
    registry
        .add_handler(counting(
            "containers",
            Capabilities::new().event_of("e", EventClass::Container),
            &hits,
        ))
        .add_handler(counting(
            "startup-only",
            Capabilities::new().fixture::<Store>("s"),
            &hits,
        ));

    let pool = FixturePool::new().with(Store("pg"));
    let report = registry
        .dispatch(record("image", "pull", "alpine"), &pool)
        .await
        .unwrap();

    assert_eq!(report.attempted, 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn handlers_receive_pool_fixtures() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();

    let mut registry = Registry::new();
    let sink = Arc::clone(&seen);
    registry.add_handler(Handler::new(
        "record",
        Capabilities::new()
            .fixture::<Store>("store")
            .event_of("e", EventClass::Container),
        move |args| {
            let sink = Arc::clone(&sink);
            async move {
                let store = args.fixture::<Store>("store")?;
                let event = args.event("e")?;
                let container = event.as_container().map(|c| c.name().map(str::to_owned));
                sink.lock().push(format!(
                    "{}:{}",
                    store.0,
                    container.transpose()?.unwrap_or_default()
                ));
                Ok(())
            }
        },
    ));

    let pool = FixturePool::new().with(Store("pg"));
    registry.dispatch(container_record("c7", "start"), &pool).await.unwrap();

    assert_eq!(*seen.lock(), vec!["pg:c7-name"]);
}

#[tokio::test]
async fn malformed_record_is_an_error() {
    let hits = Arc::new(AtomicUsize::new(0));
    let mut registry = Registry::new();
    registry.add_handler(counting("any", Capabilities::new().event("e"), &hits));

    let mut fields = serde_json::Map::new();
    fields.insert("Action".into(), "start".into());
    let result = registry
        .dispatch(RawRecord::new(fields), &FixturePool::new())
        .await;

    assert!(matches!(result, Err(Error::MalformedEvent { field: "Type" })));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn container_details_fetched_once_across_handlers() {
    let counting_inspector = Arc::new(CountingInspector::new());
    let inspector: Arc<dyn ContainerInspector> = counting_inspector.clone();
    let pool = FixturePool::new().with(inspector);

    let names: Arc<Mutex<Vec<String>>> = Arc::default();
    let mut registry = Registry::new();
    for handler in ["one", "two", "three"] {
        let sink = Arc::clone(&names);
        registry.add_handler(Handler::new(
            handler,
            Capabilities::new().event_of("e", EventClass::Container),
            move |args| {
                let sink = Arc::clone(&sink);
                async move {
                    let event = args.event("e")?;
                    let container = event
                        .as_container()
                        .ok_or_else(|| anyhow::anyhow!("not a container event"))?;
                    let details = container.container().await?;
                    sink.lock().push(details.name().unwrap_or_default().to_string());
                    Ok(())
                }
            },
        ));
    }

    let report = registry
        .dispatch(container_record("web-1", "start"), &pool)
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(counting_inspector.calls(), 1);
    assert_eq!(*names.lock(), vec!["web-1", "web-1", "web-1"]);
}
