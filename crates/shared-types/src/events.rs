//! # Events
//!
//! Modules emit [`Event`]s through the context's [`EventManager`]. Kinds that
//! appear in the application's [`AllowList`] are tagged `publishable` at
//! emission time; the runtime's event pipeline later strips them from the
//! consensus-visible results and hands them to the external publisher.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Key/value attribute of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// Typed event emitted by a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: String,
    pub attributes: Vec<Attribute>,
    /// Destined for the external publisher instead of the block results.
    #[serde(default)]
    pub publishable: bool,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            attributes: Vec::new(),
            publishable: false,
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push(Attribute {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

/// Event kinds routed to the external publisher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    kinds: BTreeSet<String>,
}

impl AllowList {
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }

    /// Allow-list that publishes nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains(kind)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(String::as_str)
    }
}

/// Collects events for one execution scope.
#[derive(Debug, Clone)]
pub struct EventManager {
    allow_list: Arc<AllowList>,
    events: Vec<Event>,
}

impl EventManager {
    pub fn new(allow_list: Arc<AllowList>) -> Self {
        Self {
            allow_list,
            events: Vec::new(),
        }
    }

    /// Record an event, tagging it for publication when its kind is allowed.
    pub fn emit(&mut self, mut event: Event) {
        event.publishable = self.allow_list.contains(&event.kind);
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Take all recorded events in emission order.
    pub fn take(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
