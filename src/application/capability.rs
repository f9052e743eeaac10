//! Capability descriptors and type-based argument matching.
//!
//! Every registered fixture, startup hook and event handler carries a
//! [`Capabilities`] descriptor built once at registration: an ordered list of
//! named [`Slot`]s, each naming the type it needs. [`resolve_args`] binds each
//! slot to the first candidate that satisfies it.
//!
//! ```text
//! slots:       [ e: Event ] [ store: Store ] [ cfg: Settings ]
//!                   │              │                │
//! candidates:  event, Client, Store, Settings, ...  (first match wins)
//! ```
//!
//! Matching never invokes anything. A slot with no match turns the whole
//! request into [`Resolution::Unsatisfied`], which callers treat according to
//! their own policy (requeue, report, skip).

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::domain::event::{Event, EventClass};
use crate::error::{Error, Result};

/// Runtime identity of a fixture value type.
#[derive(Clone, Copy)]
pub struct FixtureType {
    id: TypeId,
    name: &'static str,
}

impl FixtureType {
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for FixtureType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FixtureType {}

impl fmt::Debug for FixtureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// What a slot will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// An event whose class is this class or descends from it.
    Event(EventClass),
    /// A fixture value of exactly this type.
    Fixture(FixtureType),
}

impl Requirement {
    #[must_use]
    pub fn accepts(&self, candidate: Candidate<'_>) -> bool {
        match (self, candidate) {
            (Self::Event(class), Candidate::Event(event)) => event.class().is_a(*class),
            (Self::Fixture(ty), Candidate::Fixture(value)) => value.ty() == *ty,
            _ => false,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Event(class) => class.name(),
            Self::Fixture(ty) => ty.name(),
        }
    }
}

/// One named, typed parameter of a registered callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub name: &'static str,
    pub requirement: Requirement,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.requirement.type_name())
    }
}

/// Parameter descriptor of a registered callable.
///
/// # Example
///
/// ```
/// use swarmwatch::application::Capabilities;
/// use swarmwatch::domain::EventClass;
///
/// struct Store;
///
/// let caps = Capabilities::new()
///     .event_of("event", EventClass::Container)
///     .fixture::<Store>("store");
///
/// assert!(caps.accepts_event(EventClass::Container));
/// assert!(!caps.accepts_event(EventClass::Any));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    slots: Vec<Slot>,
}

impl Capabilities {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request every event (the base [`EventClass::Any`]).
    #[must_use]
    pub fn event(self, name: &'static str) -> Self {
        self.event_of(name, EventClass::Any)
    }

    /// Request events of `class` and its descendants.
    #[must_use]
    pub fn event_of(mut self, name: &'static str, class: EventClass) -> Self {
        self.slots.push(Slot {
            name,
            requirement: Requirement::Event(class),
        });
        self
    }

    /// Request the fixture value of type `T`.
    #[must_use]
    pub fn fixture<T: Any + Send + Sync>(mut self, name: &'static str) -> Self {
        self.slots.push(Slot {
            name,
            requirement: Requirement::Fixture(FixtureType::of::<T>()),
        });
        self
    }

    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// True when at least one slot would take an event of `class`.
    #[must_use]
    pub fn accepts_event(&self, class: EventClass) -> bool {
        self.slots.iter().any(|slot| match slot.requirement {
            Requirement::Event(wanted) => class.is_a(wanted),
            Requirement::Fixture(_) => false,
        })
    }
}

/// A type-erased fixture value.
#[derive(Clone)]
pub struct FixtureValue {
    ty: FixtureType,
    value: Arc<dyn Any + Send + Sync>,
}

impl FixtureValue {
    #[must_use]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    #[must_use]
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            ty: FixtureType::of::<T>(),
            value,
        }
    }

    #[must_use]
    pub fn ty(&self) -> FixtureType {
        self.ty
    }

    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }
}

impl fmt::Debug for FixtureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FixtureValue").field(&self.ty).finish()
    }
}

/// A value offered to [`resolve_args`].
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    Event(&'a Arc<Event>),
    Fixture(&'a FixtureValue),
}

#[derive(Debug, Clone)]
enum Bound {
    Event(Arc<Event>),
    Fixture(FixtureValue),
}

impl From<Candidate<'_>> for Bound {
    fn from(candidate: Candidate<'_>) -> Self {
        match candidate {
            Candidate::Event(event) => Self::Event(Arc::clone(event)),
            Candidate::Fixture(value) => Self::Fixture(value.clone()),
        }
    }
}

/// Arguments bound for one invocation, looked up by slot name.
#[derive(Debug, Clone, Default)]
pub struct Args {
    bound: Vec<(&'static str, Bound)>,
}

impl Args {
    /// The event bound to slot `name`.
    pub fn event(&self, name: &str) -> Result<Arc<Event>> {
        match self.get(name)? {
            Bound::Event(event) => Ok(Arc::clone(event)),
            Bound::Fixture(value) => Err(Error::Argument {
                name: name.to_string(),
                reason: format!("bound to fixture {:?}, not an event", value.ty()),
            }),
        }
    }

    /// The fixture value bound to slot `name`.
    pub fn fixture<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        let wrong_type = || Error::Argument {
            name: name.to_string(),
            reason: format!("not bound to a {}", type_name::<T>()),
        };
        match self.get(name)? {
            Bound::Fixture(value) => value.downcast::<T>().ok_or_else(wrong_type),
            Bound::Event(_) => Err(wrong_type()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    fn get(&self, name: &str) -> Result<&Bound> {
        self.bound
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, bound)| bound)
            .ok_or_else(|| Error::Argument {
                name: name.to_string(),
                reason: "no such slot".into(),
            })
    }
}

/// Outcome of matching a descriptor against candidates.
#[derive(Debug)]
pub enum Resolution {
    Resolved(Args),
    /// The slots for which no candidate matched.
    Unsatisfied(Vec<Slot>),
}

impl Resolution {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Bind each slot to the first candidate that satisfies it.
///
/// Runs in O(slots × candidates); pools hold tens of entries so no index is
/// kept.
pub fn resolve_args<'a, I>(capabilities: &Capabilities, candidates: I) -> Resolution
where
    I: IntoIterator<Item = Candidate<'a>> + Clone,
{
    let mut bound = Vec::with_capacity(capabilities.slots().len());
    let mut missing = Vec::new();

    for slot in capabilities.slots() {
        match candidates
            .clone()
            .into_iter()
            .find(|candidate| slot.requirement.accepts(*candidate))
        {
            Some(candidate) => bound.push((slot.name, Bound::from(candidate))),
            None => missing.push(*slot),
        }
    }

    if missing.is_empty() {
        Resolution::Resolved(Args { bound })
    } else {
        Resolution::Unsatisfied(missing)
    }
}

/// Human-readable list of slots, for logs and failure reports.
pub(crate) fn describe_slots(slots: &[Slot]) -> String {
    slots
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::record::{container_record, record};
    use std::iter;

    #[derive(Debug, PartialEq)]
    struct Port(u16);

    #[derive(Debug, PartialEq)]
    struct Host(&'static str);

    fn candidates(values: &[FixtureValue]) -> impl Iterator<Item = Candidate<'_>> + Clone {
        values.iter().map(Candidate::Fixture)
    }

    #[test]
    fn binds_each_slot_by_type() {
        let pool = vec![FixtureValue::new(Host("db")), FixtureValue::new(Port(5432))];
        let caps = Capabilities::new().fixture::<Port>("port").fixture::<Host>("host");

        let Resolution::Resolved(args) = resolve_args(&caps, candidates(&pool)) else {
            panic!("expected resolution");
        };
        assert_eq!(args.len(), 2);
        assert_eq!(*args.fixture::<Port>("port").unwrap(), Port(5432));
        assert_eq!(*args.fixture::<Host>("host").unwrap(), Host("db"));
    }

    #[test]
    fn first_matching_candidate_wins() {
        let pool = vec![FixtureValue::new(Port(1)), FixtureValue::new(Port(2))];
        let caps = Capabilities::new().fixture::<Port>("port");

        let Resolution::Resolved(args) = resolve_args(&caps, candidates(&pool)) else {
            panic!("expected resolution");
        };
        assert_eq!(*args.fixture::<Port>("port").unwrap(), Port(1));
    }

    #[test]
    fn unsatisfied_lists_missing_slots() {
        let pool = vec![FixtureValue::new(Port(1))];
        let caps = Capabilities::new().fixture::<Port>("port").fixture::<Host>("host");

        match resolve_args(&caps, candidates(&pool)) {
            Resolution::Unsatisfied(missing) => {
                assert_eq!(missing.len(), 1);
                assert_eq!(missing[0].name, "host");
                assert!(missing[0].to_string().ends_with("Host"));
            }
            Resolution::Resolved(_) => panic!("host is not in the pool"),
        }
    }

    #[test]
    fn empty_descriptor_resolves_to_no_args() {
        let resolution = resolve_args(&Capabilities::new(), iter::empty());
        assert!(resolution.is_resolved());
    }

    #[test]
    fn event_slots_follow_class_lineage() {
        let container = Arc::new(Event::classify(container_record("c1", "start"), None).unwrap());
        let generic = Arc::new(Event::classify(record("volume", "create", "v1"), None).unwrap());

        let any = Capabilities::new().event("e");
        let only_containers = Capabilities::new().event_of("e", EventClass::Container);

        assert!(resolve_args(&any, iter::once(Candidate::Event(&container))).is_resolved());
        assert!(resolve_args(&any, iter::once(Candidate::Event(&generic))).is_resolved());
        assert!(
            resolve_args(&only_containers, iter::once(Candidate::Event(&container))).is_resolved()
        );
        assert!(
            !resolve_args(&only_containers, iter::once(Candidate::Event(&generic))).is_resolved()
        );
    }

    #[test]
    fn args_reject_wrong_kind_and_unknown_names() {
        let event = Arc::new(Event::classify(record("volume", "create", "v1"), None).unwrap());
        let pool = [FixtureValue::new(Port(1))];
        let caps = Capabilities::new().event("e").fixture::<Port>("port");
        let all = iter::once(Candidate::Event(&event)).chain(candidates(&pool));

        let Resolution::Resolved(args) = resolve_args(&caps, all) else {
            panic!("expected resolution");
        };
        assert!(args.event("e").is_ok());
        assert!(matches!(args.event("port"), Err(Error::Argument { .. })));
        assert!(matches!(args.fixture::<Host>("port"), Err(Error::Argument { .. })));
        assert!(matches!(args.fixture::<Port>("e"), Err(Error::Argument { .. })));
        assert!(matches!(args.fixture::<Port>("nope"), Err(Error::Argument { .. })));
    }
}
