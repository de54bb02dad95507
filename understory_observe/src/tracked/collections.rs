// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

use super::Tracked;
use crate::id::HandlerId;
use crate::registry::Registry;
use crate::value::{Map, Set, Value};

/// A tracked view of a [`Map`].
///
/// Every method call is an access event. Values stored in the map are
/// proxied as children of it; keys are left alone.
///
/// # Example
///
/// ```rust
/// use understory_observe::{Map, Registry};
///
/// let registry = Registry::new();
/// let scores = registry.proxy(Map::new());
/// let scores = scores.as_map().unwrap();
///
/// scores.set("ada", 10);
/// assert_eq!(scores.get("ada").as_number(), Some(10.0));
/// assert!(scores.delete("ada"));
/// assert!(!scores.delete("ada"));
/// ```
#[derive(Clone, Debug)]
pub struct TrackedMap {
    raw: Map,
    registry: Registry,
}

impl TrackedMap {
    pub(crate) fn new(raw: Map, registry: Registry) -> Self {
        Self { raw, registry }
    }

    /// Returns the wrapped map.
    #[must_use]
    pub fn raw(&self) -> &Map {
        &self.raw
    }

    /// Returns the handler of the wrapped map.
    #[must_use]
    pub fn handler(&self) -> Option<HandlerId> {
        self.registry.find(&self.raw)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.registry.touch(&self.raw);
        self.raw.len()
    }

    /// Returns `true` if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads the value under `key`. Missing keys read as undefined.
    pub fn get(&self, key: impl Into<Value>) -> Tracked {
        self.registry.touch(&self.raw);
        let value = self.raw.get(&key.into()).unwrap_or_default();
        self.registry.view(value)
    }

    /// Returns `true` if `key` is present.
    pub fn has(&self, key: impl Into<Value>) -> bool {
        self.registry.touch(&self.raw);
        self.raw.has(&key.into())
    }

    /// Returns views of the keys, in insertion order.
    pub fn keys(&self) -> Vec<Tracked> {
        self.registry.touch(&self.raw);
        self.views(self.raw.keys())
    }

    /// Returns views of the values, in insertion order.
    pub fn values(&self) -> Vec<Tracked> {
        self.registry.touch(&self.raw);
        self.views(self.raw.values())
    }

    /// Returns views of the entries, in insertion order.
    pub fn entries(&self) -> Vec<(Tracked, Tracked)> {
        self.registry.touch(&self.raw);
        self.raw
            .entries()
            .into_iter()
            .map(|(k, v)| (self.registry.view(k), self.registry.view(v)))
            .collect()
    }

    /// Stores `value` under `key`.
    ///
    /// Storing a value strictly equal to the present one does nothing.
    pub fn set(&self, key: impl Into<Value>, value: impl Into<Value>) {
        self.registry.touch(&self.raw);
        let key = key.into();
        let value = value.into();
        let old = self.raw.get(&key);
        if old.as_ref().is_some_and(|old| old.strict_equals(&value)) {
            return;
        }
        if let Some(handler) = self.registry.modify(&self.raw) {
            if let Some(old) = &old {
                self.registry.remove_child(handler, old);
            }
            self.registry.proxy_value(&value, Some(handler), None, true);
        }
        self.raw.set(key, value);
    }

    /// Removes `key`, returning `true` if it was present.
    pub fn delete(&self, key: impl Into<Value>) -> bool {
        self.registry.touch(&self.raw);
        let key = key.into();
        if !self.raw.has(&key) {
            return false;
        }
        let handler = self.registry.modify(&self.raw);
        let removed = self.raw.delete(&key);
        if let (Some(handler), Some(removed)) = (handler, removed) {
            self.registry.remove_child(handler, &removed);
        }
        true
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.registry.touch(&self.raw);
        if self.raw.is_empty() {
            return;
        }
        let handler = self.registry.modify(&self.raw);
        let removed = self.raw.clear();
        if let Some(handler) = handler {
            for (_, value) in &removed {
                self.registry.remove_child(handler, value);
            }
        }
    }

    fn views(&self, values: Vec<Value>) -> Vec<Tracked> {
        values.into_iter().map(|v| self.registry.view(v)).collect()
    }
}

view_conversions!(TrackedMap, Map);

/// A tracked view of a [`Set`].
///
/// Every method call is an access event. Elements added to the set are
/// stored as is: they are never proxied.
///
/// # Example
///
/// ```rust
/// use understory_observe::{Registry, Set};
///
/// let registry = Registry::new();
/// let tags = registry.proxy(Set::new());
/// let tags = tags.as_set().unwrap();
///
/// assert!(tags.add("red"));
/// assert!(!tags.add("red"));
/// assert!(tags.has("red"));
/// ```
#[derive(Clone, Debug)]
pub struct TrackedSet {
    raw: Set,
    registry: Registry,
}

impl TrackedSet {
    pub(crate) fn new(raw: Set, registry: Registry) -> Self {
        Self { raw, registry }
    }

    /// Returns the wrapped set.
    #[must_use]
    pub fn raw(&self) -> &Set {
        &self.raw
    }

    /// Returns the handler of the wrapped set.
    #[must_use]
    pub fn handler(&self) -> Option<HandlerId> {
        self.registry.find(&self.raw)
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.registry.touch(&self.raw);
        self.raw.len()
    }

    /// Returns `true` if the set has no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `value` is present.
    pub fn has(&self, value: impl Into<Value>) -> bool {
        self.registry.touch(&self.raw);
        self.raw.has(&value.into())
    }

    /// Returns views of the values, in insertion order.
    pub fn values(&self) -> Vec<Tracked> {
        self.registry.touch(&self.raw);
        self.raw
            .values()
            .into_iter()
            .map(|v| self.registry.view(v))
            .collect()
    }

    /// Inserts `value`, returning `false` if it was already present.
    pub fn add(&self, value: impl Into<Value>) -> bool {
        self.registry.touch(&self.raw);
        let value = value.into();
        if self.raw.has(&value) {
            return false;
        }
        self.registry.modify(&self.raw);
        self.raw.add(value)
    }

    /// Removes `value`, returning `true` if it was present.
    pub fn delete(&self, value: impl Into<Value>) -> bool {
        self.registry.touch(&self.raw);
        let value = value.into();
        if !self.raw.has(&value) {
            return false;
        }
        if let Some(handler) = self.registry.modify(&self.raw) {
            self.registry.remove_child(handler, &value);
        }
        self.raw.delete(&value)
    }

    /// Removes every value.
    pub fn clear(&self) {
        self.registry.touch(&self.raw);
        if self.raw.is_empty() {
            return;
        }
        let handler = self.registry.modify(&self.raw);
        let removed = self.raw.clear();
        if let Some(handler) = handler {
            for value in &removed {
                self.registry.remove_child(handler, value);
            }
        }
    }
}

view_conversions!(TrackedSet, Set);
