// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proxy dispatch: installing handlers on a value and everything it holds.

use alloc::vec::Vec;

use crate::id::HandlerId;
use crate::registry::Registry;
use crate::tracked::{Tracked, TrackedArray};
use crate::value::{Array, Value};

impl Registry {
    /// Installs handlers on `value` and, depending on its kind and on
    /// whether it is observed, on the values it holds.
    ///
    /// - Primitives are returned as is.
    /// - A target that already has a handler gains `parent` as an extra
    ///   parent when `strict` is set. With `observed` left as `None` it
    ///   inherits whether `parent` is observed. The first time it is reached
    ///   as observed, its fields are proxied too.
    /// - A fresh array or map gets a handler that is never itself observed,
    ///   and its elements or values are always proxied as children.
    /// - A fresh set or date gets a handler only. Set elements are never
    ///   proxied.
    /// - A fresh object is observed if the registry predicate accepts it or
    ///   `observed` is `Some(true)`. Writable fields of an observed object are
    ///   proxied as observed children.
    ///
    /// Proxying works in place: the returned view wraps the very same target,
    /// and calling this again on the same target is idempotent.
    ///
    /// # Example
    ///
    /// ```rust
    /// use understory_observe::{Array, Object, Registry, Value};
    ///
    /// let registry = Registry::new();
    /// let inner = Object::new();
    /// let list: Array = [Value::from(inner.clone())].into_iter().collect();
    ///
    /// let tracked = registry.observable_proxy(list.clone(), None, None, true);
    /// let again = registry.observable_proxy(tracked.clone(), None, None, true);
    /// assert_eq!(tracked, again);
    ///
    /// // Array elements are always proxied.
    /// assert!(registry.find(&inner).is_some());
    /// ```
    pub fn observable_proxy(
        &self,
        value: impl Into<Value>,
        parent: Option<HandlerId>,
        observed: Option<bool>,
        strict: bool,
    ) -> Tracked {
        let value = value.into();
        self.proxy_value(&value, parent, observed, strict);
        self.view(value)
    }

    /// Proxies `value` as a root, inheriting nothing.
    pub fn proxy(&self, value: impl Into<Value>) -> Tracked {
        self.observable_proxy(value, None, None, true)
    }

    /// Proxies `value` as an observed root, deep-tracking everything it
    /// holds.
    pub fn proxy_deep(&self, value: impl Into<Value>) -> Tracked {
        self.observable_proxy(value, None, Some(true), true)
    }

    /// Collects `values` into a new array and proxies it as a root.
    pub fn observable_proxy_array<V: Into<Value>>(
        &self,
        values: impl IntoIterator<Item = V>,
    ) -> TrackedArray {
        let array: Array = values.into_iter().collect();
        self.proxy_value(&Value::Array(array.clone()), None, None, true);
        TrackedArray::new(array, self.clone())
    }

    /// Wraps `value` in a tracked view without installing anything.
    ///
    /// Accessors of the view report events only if the target already has
    /// a handler.
    #[must_use]
    pub fn view(&self, value: impl Into<Value>) -> Tracked {
        Tracked::new(value.into(), self.clone())
    }

    /// Proxies `value`, returning its handler when it is a target.
    pub(crate) fn proxy_value(
        &self,
        value: &Value,
        parent: Option<HandlerId>,
        observed: Option<bool>,
        strict: bool,
    ) -> Option<HandlerId> {
        if !value.is_target() {
            return None;
        }
        if let Some(handler) = self.find(value) {
            self.reproxy(value, handler, parent, observed, strict);
            return Some(handler);
        }

        match value {
            Value::Array(array) => {
                let handler = self.bind_new(value, parent, false)?;
                self.proxy_elements(handler, array.to_vec(), observed);
                Some(handler)
            }
            Value::Map(map) => {
                let handler = self.bind_new(value, parent, false)?;
                self.proxy_elements(handler, map.values(), observed);
                Some(handler)
            }
            Value::Set(_) | Value::Date(_) => self.bind_new(value, parent, false),
            Value::Object(object) => {
                let observed = self.is_observed_object(object) || observed == Some(true);
                let handler = self.bind_new(value, parent, observed)?;
                if observed {
                    self.set_deep(handler);
                    for field in object.writable_values() {
                        self.proxy_value(&field, Some(handler), Some(true), true);
                    }
                }
                Some(handler)
            }
            _ => None,
        }
    }

    /// Proxies the elements of a fresh array or the values of a fresh map.
    fn proxy_elements(&self, handler: HandlerId, elements: Vec<Value>, observed: Option<bool>) {
        let observed = observed.unwrap_or_else(|| self.contains(handler));
        if observed {
            self.set_deep(handler);
        }
        for element in elements {
            self.proxy_value(&element, Some(handler), Some(observed), true);
        }
    }

    fn reproxy(
        &self,
        value: &Value,
        handler: HandlerId,
        parent: Option<HandlerId>,
        observed: Option<bool>,
        strict: bool,
    ) {
        let mut observed = observed;
        if let Some(parent) = parent {
            if strict {
                self.add_parent(handler, parent);
            }
            if observed.is_none() {
                observed = Some(self.contains(parent));
            }
        }
        if observed != Some(true) {
            return;
        }
        if parent.is_none() && matches!(value, Value::Object(_)) {
            // An explicit deep root request.
            self.set_observed(handler, true);
        }
        if !self.set_deep(handler) {
            return;
        }
        let fields = match value {
            Value::Array(array) => array.to_vec(),
            Value::Map(map) => map.values(),
            Value::Object(object) => object.writable_values(),
            _ => return,
        };
        for field in fields {
            self.proxy_value(&field, Some(handler), Some(true), false);
        }
    }
}

/// Returns the raw value behind `value`.
///
/// Tracked views unwrap to the target they wrap; raw values and primitives
/// come back unchanged.
///
/// # Example
///
/// ```rust
/// use understory_observe::{Object, Registry, Value, observable_target};
///
/// let registry = Registry::new();
/// let object = Object::new();
/// let tracked = registry.proxy(object.clone());
///
/// assert_eq!(observable_target(tracked), Value::from(object));
/// assert_eq!(observable_target(3), Value::from(3));
/// ```
pub fn observable_target(value: impl Into<Value>) -> Value {
    value.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Class, Map, Object, Set};
    use crate::Date;

    #[test]
    fn primitives_pass_through() {
        let registry = Registry::new();
        let tracked = registry.proxy(5);
        assert_eq!(tracked.raw(), Value::from(5));
        assert_eq!(tracked.handler(), None);
        assert_eq!(registry.handler_count(), 0);
    }

    #[test]
    fn proxy_is_idempotent() {
        let registry = Registry::new();
        let object = Object::new();
        let first = registry.proxy(object.clone()).handler();
        let second = registry.proxy(object.clone()).handler();
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(registry.handler_count(), 1);
    }

    #[test]
    fn shallow_object_fields_stay_raw() {
        let registry = Registry::new();
        let inner = Object::new();
        let outer: Object = [("inner", inner.clone())].into_iter().collect();
        registry.proxy(outer);
        assert_eq!(registry.find(&inner), None);
    }

    #[test]
    fn observed_class_is_deep_by_default() {
        let registry = Registry::new();
        let inner = Object::new();
        let outer = Object::with_class(Class::observed("Model"));
        outer.insert("inner", inner.clone());
        let handler = registry.proxy(outer).handler().unwrap();

        let child = registry.find(&inner).unwrap();
        assert!(registry.is_observed(handler));
        assert!(registry.contains(child));
        assert_eq!(registry.graph().parents(child).collect::<Vec<_>>(), [handler]);
    }

    #[test]
    fn readonly_fields_are_not_proxied() {
        let registry = Registry::new();
        let inner = Object::new();
        let outer = Object::new();
        outer.insert_readonly("inner", inner.clone());
        registry.proxy_deep(outer);
        assert_eq!(registry.find(&inner), None);
    }

    #[test]
    fn arrays_and_maps_proxy_children_sets_do_not() {
        let registry = Registry::new();
        let in_array = Object::new();
        let in_map = Object::new();
        let in_set = Object::new();
        let key = Object::new();

        let map = Map::new();
        map.set(key.clone(), in_map.clone());
        let set: Set = [in_set.clone()].into_iter().collect();
        let array: crate::Array = [
            Value::from(in_array.clone()),
            Value::from(map),
            Value::from(set),
        ]
        .into_iter()
        .collect();
        registry.proxy(array);

        assert!(registry.find(&in_array).is_some());
        assert!(registry.find(&in_map).is_some());
        assert!(registry.find(&key).is_none());
        assert!(registry.find(&in_set).is_none());
    }

    #[test]
    fn repeated_child_is_refcounted() {
        let registry = Registry::new();
        let item = Object::new();
        let tracked = registry.observable_proxy_array([item.clone(), item.clone()]);
        let parent = tracked.handler().unwrap();
        let child = registry.find(&item).unwrap();
        assert_eq!(registry.graph().child_count(parent, child), 2);
    }

    #[test]
    fn cycles_terminate() {
        let registry = Registry::new();
        let a = Object::new();
        let b = Object::new();
        a.insert("b", b.clone());
        b.insert("a", a.clone());
        a.insert("me", a.clone());

        let ha = registry.proxy_deep(a.clone()).handler().unwrap();
        let hb = registry.find(&b).unwrap();
        assert!(registry.graph().parents(ha).any(|p| p == hb));
        assert!(registry.graph().parents(ha).any(|p| p == ha));
        assert_eq!(registry.handler_count(), 2);
    }

    #[test]
    fn deep_reproxy_reaches_previously_shallow_fields() {
        let registry = Registry::new();
        let inner = Object::new();
        let outer: Object = [("inner", inner.clone())].into_iter().collect();

        let handler = registry.proxy(outer.clone()).handler().unwrap();
        assert_eq!(registry.find(&inner), None);

        registry.proxy_deep(outer);
        assert!(registry.is_observed(handler));
        let child = registry.find(&inner).unwrap();
        assert_eq!(registry.graph().child_count(handler, child), 1);
    }

    #[test]
    fn existing_child_inherits_observed_parent() {
        let registry = Registry::new();
        let inner = Object::new();
        let leaf = Object::new();
        inner.insert("leaf", leaf.clone());
        registry.proxy(inner.clone());
        assert_eq!(registry.find(&leaf), None);

        let root = registry.create_handler(None, true).unwrap();
        registry.observable_proxy(inner.clone(), Some(root), None, true);
        assert!(registry.find(&leaf).is_some());

        let handler = registry.find(&inner).unwrap();
        assert_eq!(registry.graph().child_count(root, handler), 1);
    }

    #[test]
    fn only_strict_proxying_adds_parent_edges() {
        let registry = Registry::new();
        let child = Object::new();
        let handler = registry.proxy(child.clone()).handler().unwrap();
        let parent = registry.create_handler(None, false).unwrap();

        registry.observable_proxy(child.clone(), Some(parent), None, false);
        assert_eq!(registry.graph().child_count(parent, handler), 0);

        registry.observable_proxy(child, Some(parent), None, true);
        assert_eq!(registry.graph().child_count(parent, handler), 1);
    }

    #[test]
    fn deepening_skips_edges_to_already_tracked_fields() {
        let registry = Registry::new();
        let inner = Object::new();
        let leaf = Object::new();
        inner.insert("leaf", leaf.clone());
        let outer: Object = [("inner", inner.clone())].into_iter().collect();

        let inner_handler = registry.proxy(inner.clone()).handler().unwrap();
        let outer_handler = registry.proxy(outer.clone()).handler().unwrap();
        registry.proxy_deep(outer);

        // The field is deepened in turn but gains no edge to its holder.
        assert_eq!(registry.graph().child_count(outer_handler, inner_handler), 0);
        assert!(registry.graph().is_deep(inner_handler));
        let leaf_handler = registry.find(&leaf).unwrap();
        assert_eq!(registry.graph().child_count(inner_handler, leaf_handler), 1);
    }

    #[test]
    fn dates_get_a_handler_only() {
        let registry = Registry::new();
        let date = Date::from_millis(0.0);
        assert!(registry.proxy_deep(date.clone()).handler().is_some());
        assert_eq!(registry.handler_count(), 1);
    }
}
