//! Event envelope: a payload plus its out-of-band control flags.
//!
//! The payload ([`GameEvent`]) is data about the action. The control block
//! ([`EventControl`]) is what trigger resolution and stage handlers use to
//! steer it: identification, termination, response suppression and free-form
//! string flags. Both travel together as an [`Event`].
//!
//! ## Key Types
//!
//! - [`EventControl`]: identifier, termination and flag bookkeeping
//! - [`Event`]: payload + control, the unit the game processor handles

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::payload::GameEvent;
use super::stage::EventKind;

/// Control flags carried alongside an event payload.
///
/// `terminated` is monotone: once set it is never cleared, including by
/// [`EventControl::rollback_to`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventControl {
    identifier: Option<EventKind>,
    disresponsive: bool,
    uncancellable: bool,
    terminated: bool,
    flags: BTreeSet<String>,
    triggered_by: Vec<String>,
}

impl EventControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag the envelope with its kind. Tagging twice with the same kind is a
    /// no-op; the first tag wins.
    pub fn tag_identifier(&mut self, kind: EventKind) {
        if self.identifier.is_none() {
            self.identifier = Some(kind);
        }
    }

    #[must_use]
    pub fn has_identifier(&self, kind: EventKind) -> bool {
        self.identifier == Some(kind)
    }

    #[must_use]
    pub fn identifier(&self) -> Option<EventKind> {
        self.identifier
    }

    pub fn add_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    pub fn remove_flag(&mut self, flag: &str) -> bool {
        self.flags.remove(flag)
    }

    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    /// Stop propagation to further skills and stages.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn mark_uncancellable(&mut self) {
        self.uncancellable = true;
    }

    #[must_use]
    pub fn is_uncancellable(&self) -> bool {
        self.uncancellable
    }

    /// Remote players may not be asked to react to this event.
    pub fn mark_disresponsive(&mut self) {
        self.disresponsive = true;
    }

    #[must_use]
    pub fn is_disresponsive(&self) -> bool {
        self.disresponsive
    }

    /// Force a skill into play for this event. Named skills are exempt from
    /// the uniqueness rule during trigger resolution.
    pub fn add_triggered_by(&mut self, skill: impl Into<String>) {
        let skill = skill.into();
        if !self.triggered_by.contains(&skill) {
            self.triggered_by.push(skill);
        }
    }

    #[must_use]
    pub fn is_triggered_by(&self, skill: &str) -> bool {
        self.triggered_by.iter().any(|s| s == skill)
    }

    #[must_use]
    pub fn triggered_by(&self) -> &[String] {
        &self.triggered_by
    }

    /// Restore flags from an earlier copy of this control block, keeping
    /// termination if it has been set since.
    pub fn rollback_to(&mut self, snapshot: &EventControl) {
        let terminated = self.terminated;
        *self = snapshot.clone();
        self.terminated |= terminated;
    }
}

/// A gameplay action in flight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub payload: GameEvent,
    pub control: EventControl,
}

impl Event {
    /// Wrap a payload; the envelope is tagged with the payload's kind.
    pub fn new(payload: GameEvent) -> Self {
        let mut control = EventControl::new();
        control.tag_identifier(payload.kind());
        Self { payload, control }
    }

    /// The kind this envelope was tagged with.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.control.identifier().unwrap_or_else(|| self.payload.kind())
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.control.is_terminated()
    }

    pub fn terminate(&mut self) {
        self.control.terminate();
    }
}

impl From<GameEvent> for Event {
    fn from(payload: GameEvent) -> Self {
        Self::new(payload)
    }
}
