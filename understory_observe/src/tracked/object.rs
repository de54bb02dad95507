// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::rc::Rc;
use alloc::vec::Vec;

use super::Tracked;
use crate::id::HandlerId;
use crate::registry::Registry;
use crate::value::{Object, Value};

/// A tracked view of an [`Object`].
///
/// Reading a field is an access event. Writing a field is a modification
/// event, unless the new value is strictly equal to the old one.
///
/// # Example
///
/// ```rust
/// use understory_observe::{Object, Registry};
///
/// let registry = Registry::new();
/// let user = registry.proxy_deep(Object::new());
/// let user = user.as_object().unwrap();
///
/// user.set("name", "ada");
/// assert_eq!(user.get("name").as_str(), Some("ada"));
/// assert!(user.get("missing").is_undefined());
/// ```
#[derive(Clone, Debug)]
pub struct TrackedObject {
    raw: Object,
    registry: Registry,
}

impl TrackedObject {
    pub(crate) fn new(raw: Object, registry: Registry) -> Self {
        Self { raw, registry }
    }

    /// Returns the wrapped object.
    #[must_use]
    pub fn raw(&self) -> &Object {
        &self.raw
    }

    /// Returns the handler of the wrapped object.
    #[must_use]
    pub fn handler(&self) -> Option<HandlerId> {
        self.registry.find(&self.raw)
    }

    /// Reads a field. Missing fields read as undefined.
    pub fn get(&self, key: &str) -> Tracked {
        let value = self.raw.get(key).unwrap_or_default();
        self.registry.touch(&self.raw);
        self.registry.view(value)
    }

    /// Returns `true` if the field exists. Not an access event.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.raw.contains_key(key)
    }

    /// Returns the field names. Not an access event.
    #[must_use]
    pub fn keys(&self) -> Vec<Rc<str>> {
        self.raw.keys()
    }

    /// Writes a field.
    ///
    /// Returns `false` without notifying if the field is read-only. If the
    /// object is observed, a newly stored target is proxied as its child;
    /// the replaced value, if tracked, stops being one.
    pub fn set(&self, key: impl Into<Rc<str>>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let value = value.into();
        let old = self.raw.get(&key);
        if old.is_some() && !self.raw.is_writable(&key) {
            return false;
        }
        let old = old.unwrap_or_default();
        if old.strict_equals(&value) {
            return true;
        }
        if let Some(handler) = self.registry.modify(&self.raw) {
            self.registry.remove_child(handler, &old);
            if self.registry.contains(handler) {
                self.registry.proxy_value(&value, Some(handler), None, true);
            }
        }
        self.raw.set(key, value)
    }

    /// Deletes a field, returning `true` if it existed.
    ///
    /// Always a modification event. The deleted value keeps its edge to
    /// this object's handler.
    pub fn delete(&self, key: &str) -> bool {
        self.registry.modify(&self.raw);
        self.raw.remove(key).is_some()
    }
}

view_conversions!(TrackedObject, Object);
