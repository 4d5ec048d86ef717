use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier of an [`Event`]
///
/// Opaque and caller-supplied. The ordering of [`EventID`]s fixes the ordering of events in an
/// [`LPO`].
pub struct EventID(pub String);

impl EventID {
    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventID {
    fn from(value: &str) -> Self {
        EventID(value.to_string())
    }
}

impl From<String> for EventID {
    fn from(value: String) -> Self {
        EventID(value)
    }
}

impl From<&EventID> for EventID {
    fn from(value: &EventID) -> Self {
        value.clone()
    }
}

impl Display for EventID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier of an [`Arc`]
pub struct ArcID(pub String);

impl ArcID {
    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArcID {
    fn from(value: &str) -> Self {
        ArcID(value.to_string())
    }
}

impl From<String> for ArcID {
    fn from(value: String) -> Self {
        ArcID(value)
    }
}

impl Display for ArcID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
/// 2D coordinate attached to an [`Event`]
///
/// Layout metadata only: never read or written by the closure/skeleton algorithms.
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Position {
    /// Create a new [`Position`]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Labelled event of an [`LPO`]
pub struct Event {
    /// Unique identifier
    pub id: EventID,
    /// Display label (e.g., the executed activity)
    pub label: String,
    /// Layout position
    #[serde(default)]
    pub position: Position,
    /// Offset of the label relative to [`Event::position`]
    #[serde(default)]
    pub offset: Position,
}

impl Event {
    /// Create a new [`Event`] placed at the origin
    pub fn new(id: impl Into<EventID>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            position: Position::default(),
            offset: Position::default(),
        }
    }

    /// Set the layout position
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Set the label offset
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset = Position::new(x, y);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Precedence arc between two [`Event`]s of an [`LPO`]
///
/// Only stores the [`EventID`]s of source and target; use [`LPO::resolve`] to get the events
/// themselves.
pub struct Arc {
    /// Unique identifier
    pub id: ArcID,
    /// Preceding event
    pub source: EventID,
    /// Succeeding event
    pub target: EventID,
    /// Whether this arc is part of the user-declared (generating) relation
    pub generating: bool,
    /// Whether this arc belongs to the skeleton (transitive reduction) of the order
    #[serde(default)]
    pub skeleton: bool,
}

impl Arc {
    /// Create a new [`Arc`] (not flagged as skeleton arc)
    pub fn new(
        id: impl Into<ArcID>,
        source: impl Into<EventID>,
        target: impl Into<EventID>,
        generating: bool,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            generating,
            skeleton: false,
        }
    }

    /// Source and target of this arc
    pub fn pair(&self) -> (&EventID, &EventID) {
        (&self.source, &self.target)
    }
}

///
/// Error raised when an [`LPO`] would violate its structural invariants
///
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LPOError {
    /// An arc references an event id that is not part of the order
    #[error("arc {arc} references unknown event {event}")]
    UnknownEvent {
        /// Offending arc
        arc: ArcID,
        /// Missing event
        event: EventID,
    },
    /// An event or arc id is already in use
    #[error("id {id} is already in use")]
    DuplicateId {
        /// The duplicated id
        id: String,
    },
    /// An event is stored under a key that differs from its own id
    #[error("event {id} is stored under key {key}")]
    MismatchedEventKey {
        /// Key of the event map entry
        key: EventID,
        /// Id of the event itself
        id: EventID,
    },
    /// The generating relation is not acyclic
    #[error("generating relation contains a cycle through event {event}")]
    Cycle {
        /// An event on the cycle
        event: EventID,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "UncheckedLPO")]
///
/// Labelled partial order: [`Event`]s with precedence [`Arc`]s between them
///
/// Arcs flagged as `generating` form the user-declared relation. The analysis functions
/// ([`crate::analysis::transitive_closure::transitive_closure`] and
/// [`crate::analysis::skeleton::extract_skeleton`]) derive the remaining arcs and flags from it.
///
/// Every arc references existing events; this is enforced on insertion (and on deserialization).
pub struct LPO {
    /// Name of the order
    pub name: String,
    events: BTreeMap<EventID, Event>,
    arcs: Vec<Arc>,
    #[serde(skip)]
    arc_ids: HashSet<ArcID>,
    #[serde(skip)]
    next_arc_seq: u64,
}

#[derive(Deserialize)]
struct UncheckedLPO {
    name: String,
    #[serde(default)]
    events: BTreeMap<EventID, Event>,
    #[serde(default)]
    arcs: Vec<Arc>,
}

impl TryFrom<UncheckedLPO> for LPO {
    type Error = LPOError;

    fn try_from(value: UncheckedLPO) -> Result<Self, Self::Error> {
        let mut lpo = LPO::new(value.name);
        for (key, event) in value.events {
            if key != event.id {
                return Err(LPOError::MismatchedEventKey { key, id: event.id });
            }
            lpo.add_event(event)?;
        }
        for arc in value.arcs {
            lpo.add_arc(arc)?;
        }
        Ok(lpo)
    }
}

impl PartialEq for LPO {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.events == other.events && self.arcs == other.arcs
    }
}

impl Default for LPO {
    fn default() -> Self {
        Self::new("")
    }
}

impl LPO {
    /// Create a new [`LPO`] without events or arcs
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: BTreeMap::new(),
            arcs: Vec::new(),
            arc_ids: HashSet::new(),
            next_arc_seq: 0,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    ///
    /// Dangling arcs or duplicate ids are rejected like in [`LPO::add_arc`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Add an [`Event`]
    ///
    /// Fails with [`LPOError::DuplicateId`] if an event with the same id already exists.
    pub fn add_event(&mut self, event: Event) -> Result<EventID, LPOError> {
        if self.events.contains_key(&event.id) {
            return Err(LPOError::DuplicateId {
                id: event.id.to_string(),
            });
        }
        let id = event.id.clone();
        self.events.insert(id.clone(), event);
        Ok(id)
    }

    /// Add an [`Arc`]
    ///
    /// Fails with [`LPOError::UnknownEvent`] if its source or target is not an event of this order,
    /// and with [`LPOError::DuplicateId`] if the arc id is already used.
    pub fn add_arc(&mut self, arc: Arc) -> Result<ArcID, LPOError> {
        for endpoint in [&arc.source, &arc.target] {
            if !self.events.contains_key(endpoint) {
                return Err(LPOError::UnknownEvent {
                    arc: arc.id.clone(),
                    event: endpoint.clone(),
                });
            }
        }
        if !self.arc_ids.insert(arc.id.clone()) {
            return Err(LPOError::DuplicateId {
                id: arc.id.to_string(),
            });
        }
        let id = arc.id.clone();
        self.arcs.push(arc);
        Ok(id)
    }

    /// Add a generating arc with a sequentially assigned [`ArcID`]
    pub fn add_generating_arc(
        &mut self,
        source: impl Into<EventID>,
        target: impl Into<EventID>,
    ) -> Result<ArcID, LPOError> {
        let id = self.next_arc_id();
        self.add_arc(Arc::new(id, source, target, true))
    }

    /// Next free sequential [`ArcID`] (`arc_<n>`)
    ///
    /// Consecutive calls never return the same id, even if the returned ids are not used.
    pub fn next_arc_id(&mut self) -> ArcID {
        loop {
            self.next_arc_seq += 1;
            let candidate = ArcID(format!("arc_{}", self.next_arc_seq));
            if !self.arc_ids.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// All events, ordered by their [`EventID`]
    ///
    /// This ordering is used to index incidence matrices.
    pub fn events(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.values()
    }

    /// All event ids, in the same order as [`LPO::events`]
    pub fn event_ids(&self) -> impl Iterator<Item = &EventID> + '_ {
        self.events.keys()
    }

    /// Get an event by id
    pub fn event(&self, id: &EventID) -> Option<&Event> {
        self.events.get(id)
    }

    /// Check if an event with the given id exists
    pub fn contains_event(&self, id: &EventID) -> bool {
        self.events.contains_key(id)
    }

    /// Number of events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// All arcs in insertion order
    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub(crate) fn arcs_mut(&mut self) -> &mut [Arc] {
        &mut self.arcs
    }

    /// Replace the complete arc collection
    ///
    /// Callers must only pass arcs between existing events with unique ids.
    pub(crate) fn replace_arcs(&mut self, arcs: Vec<Arc>) {
        self.arc_ids = arcs.iter().map(|arc| arc.id.clone()).collect();
        self.arcs = arcs;
    }

    /// Get an arc by id
    pub fn arc(&self, id: &ArcID) -> Option<&Arc> {
        self.arcs.iter().find(|arc| &arc.id == id)
    }

    /// All arcs from `source` to `target`
    pub fn arcs_between<'a>(
        &'a self,
        source: &'a EventID,
        target: &'a EventID,
    ) -> impl Iterator<Item = &'a Arc> + 'a {
        self.arcs
            .iter()
            .filter(move |arc| &arc.source == source && &arc.target == target)
    }

    /// Arcs of the generating relation
    pub fn generating_arcs(&self) -> impl Iterator<Item = &Arc> + '_ {
        self.arcs.iter().filter(|arc| arc.generating)
    }

    /// Arcs flagged as skeleton arcs
    pub fn skeleton_arcs(&self) -> impl Iterator<Item = &Arc> + '_ {
        self.arcs.iter().filter(|arc| arc.skeleton)
    }

    /// Events directly preceding `event` in the generating relation
    pub fn preset_of(&self, event: &EventID) -> Vec<&EventID> {
        self.generating_arcs()
            .filter(|arc| &arc.target == event)
            .map(|arc| &arc.source)
            .collect()
    }

    /// Events directly succeeding `event` in the generating relation
    pub fn postset_of(&self, event: &EventID) -> Vec<&EventID> {
        self.generating_arcs()
            .filter(|arc| &arc.source == event)
            .map(|arc| &arc.target)
            .collect()
    }

    /// Look up source and target [`Event`] of an arc in this order
    pub fn resolve(&self, arc: &Arc) -> Result<(&Event, &Event), LPOError> {
        let lookup = |id: &EventID| {
            self.events.get(id).ok_or_else(|| LPOError::UnknownEvent {
                arc: arc.id.clone(),
                event: id.clone(),
            })
        };
        Ok((lookup(&arc.source)?, lookup(&arc.target)?))
    }

    /// Re-check that all arcs reference existing events and all ids are unique
    pub fn validate(&self) -> Result<(), LPOError> {
        let mut seen: HashSet<&ArcID> = HashSet::new();
        for arc in &self.arcs {
            self.resolve(arc)?;
            if !seen.insert(&arc.id) {
                return Err(LPOError::DuplicateId {
                    id: arc.id.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> LPO {
        let mut lpo = LPO::new("abc");
        for id in ["a", "b", "c"] {
            lpo.add_event(Event::new(id, id.to_uppercase())).unwrap();
        }
        lpo
    }

    #[test]
    fn duplicate_event_is_rejected() {
        let mut lpo = abc();
        let err = lpo.add_event(Event::new("b", "again")).unwrap_err();
        assert_eq!(err, LPOError::DuplicateId { id: "b".into() });
        assert_eq!(lpo.event(&"b".into()).unwrap().label, "B");
    }

    #[test]
    fn arc_to_unknown_event_is_rejected() {
        let mut lpo = abc();
        let err = lpo.add_arc(Arc::new("x", "z", "a", true)).unwrap_err();
        assert_eq!(
            err,
            LPOError::UnknownEvent {
                arc: "x".into(),
                event: "z".into()
            }
        );
        let err = lpo.add_arc(Arc::new("y", "a", "q", true)).unwrap_err();
        assert!(matches!(err, LPOError::UnknownEvent { event, .. } if event.as_str() == "q"));
        assert!(lpo.arcs().is_empty());
    }

    #[test]
    fn duplicate_arc_id_is_rejected() {
        let mut lpo = abc();
        lpo.add_arc(Arc::new("x", "a", "b", true)).unwrap();
        let err = lpo.add_arc(Arc::new("x", "b", "c", true)).unwrap_err();
        assert_eq!(err, LPOError::DuplicateId { id: "x".into() });
    }

    #[test]
    fn sequential_ids_skip_taken_ones() {
        let mut lpo = abc();
        lpo.add_arc(Arc::new("arc_1", "a", "b", true)).unwrap();
        let id = lpo.add_generating_arc("b", "c").unwrap();
        assert_eq!(id.as_str(), "arc_2");
        assert_eq!(lpo.next_arc_id().as_str(), "arc_3");
    }

    #[test]
    fn events_are_ordered_by_id() {
        let mut lpo = LPO::new("order");
        for id in ["m", "c", "x", "a"] {
            lpo.add_event(Event::new(id, id)).unwrap();
        }
        let ids: Vec<&str> = lpo.event_ids().map(EventID::as_str).collect();
        assert_eq!(ids, vec!["a", "c", "m", "x"]);
    }

    #[test]
    fn resolve_and_neighbourhood() {
        let mut lpo = abc();
        lpo.add_generating_arc("a", "b").unwrap();
        lpo.add_generating_arc("a", "c").unwrap();
        lpo.add_arc(Arc::new("derived", "b", "c", false)).unwrap();

        let arc = lpo.arc(&"derived".into()).unwrap();
        let (from, to) = lpo.resolve(arc).unwrap();
        assert_eq!((from.label.as_str(), to.label.as_str()), ("B", "C"));

        assert_eq!(lpo.postset_of(&"a".into()).len(), 2);
        assert!(lpo.preset_of(&"c".into()).iter().all(|id| id.as_str() == "a"));
        assert_eq!(lpo.generating_arcs().count(), 2);

        let (b, c) = (EventID::from("b"), EventID::from("c"));
        let between: Vec<&Arc> = lpo.arcs_between(&b, &c).collect();
        assert_eq!(between.len(), 1);
        assert_eq!(between[0].pair(), (&b, &c));
        assert_eq!(lpo.arcs_between(&c, &b).count(), 0);

        let foreign = Arc::new("foreign", "a", "zz", true);
        assert!(lpo.resolve(&foreign).is_err());
    }

    #[test]
    fn json_deserialization_validates_arcs() {
        let mut lpo = abc();
        lpo.add_generating_arc("a", "b").unwrap();
        let json = lpo.to_json().unwrap();
        let parsed = LPO::from_json(&json).unwrap();
        assert_eq!(parsed.arcs(), lpo.arcs());
        assert_eq!(parsed.event_count(), 3);
        assert!(parsed.validate().is_ok());

        let dangling = r#"{
            "name": "broken",
            "events": {"a": {"id": "a", "label": "A"}},
            "arcs": [{"id": "x", "source": "a", "target": "b", "generating": true}]
        }"#;
        let err = LPO::from_json(dangling).unwrap_err();
        assert!(err.to_string().contains("unknown event b"));

        let duplicate = r#"{
            "name": "twice",
            "events": {"a": {"id": "a", "label": "A"}, "b": {"id": "b", "label": "B"}},
            "arcs": [
                {"id": "x", "source": "a", "target": "b", "generating": true},
                {"id": "x", "source": "b", "target": "a", "generating": false}
            ]
        }"#;
        let err = LPO::from_json(duplicate).unwrap_err();
        assert!(err.to_string().contains("id x is already in use"));

        let renamed = r#"{
            "name": "renamed",
            "events": {"a": {"id": "b", "label": "B"}},
            "arcs": []
        }"#;
        let err = LPO::from_json(renamed).unwrap_err();
        assert!(err.to_string().contains("event b is stored under key a"));
    }
}
