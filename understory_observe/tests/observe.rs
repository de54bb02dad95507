// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `understory_observe` crate.
//!
//! These exercise proxying, event delivery, and propagation end to end,
//! through the public API only.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use understory_observe::{
    Array, Class, Date, Map, Object, Observer, Registry, Set, Tracked, Value, observable_target,
};

#[derive(Default)]
struct Spy {
    access: Cell<u32>,
    modify: Cell<u32>,
}

impl Observer for Spy {
    fn on_access(&self) {
        self.access.set(self.access.get() + 1);
    }
    fn on_modify(&self) {
        self.modify.set(self.modify.get() + 1);
    }
}

fn spy_on(registry: &Registry, value: &Tracked) -> Rc<Spy> {
    let spy = Rc::new(Spy::default());
    assert!(registry.attach(value, &spy));
    spy
}

#[test]
fn proxying_twice_returns_the_same_view() {
    let registry = Registry::new();
    let object = Object::new();
    let once = registry.proxy(object.clone());
    let twice = registry.proxy(once.clone());
    assert_eq!(once, twice);
    assert_eq!(once.handler(), twice.handler());
    assert_eq!(registry.handler_count(), 1);

    for primitive in [
        Value::Undefined,
        Value::Null,
        Value::from(true),
        Value::from(1.5),
        Value::from("s"),
    ] {
        let tracked = registry.proxy(primitive.clone());
        assert_eq!(tracked.raw(), primitive);
        assert_eq!(tracked.handler(), None);
    }
    assert_eq!(registry.handler_count(), 1);
}

#[test]
fn raw_target_unwraps_views() {
    let registry = Registry::new();
    let array = Array::new();
    let tracked = registry.proxy(array.clone());
    assert_eq!(tracked.raw(), Value::from(array.clone()));
    assert_eq!(observable_target(tracked), Value::from(array));
    assert_eq!(observable_target("plain"), Value::from("plain"));
}

#[test]
fn reading_a_field_is_one_access() {
    let registry = Registry::new();
    let object: Object = [("x", 1)].into_iter().collect();
    let tracked = registry.proxy_deep(object);
    let spy = spy_on(&registry, &tracked);

    let x = tracked.as_object().unwrap().get("x");
    assert_eq!(x.as_number(), Some(1.0));
    assert_eq!(spy.access.get(), 1);
    assert_eq!(spy.modify.get(), 0);
}

#[test]
fn access_does_not_propagate() {
    let registry = Registry::new();
    let child: Object = [("y", 2)].into_iter().collect();
    let root: Object = [("child", child)].into_iter().collect();
    let root = registry.proxy_deep(root);
    let spy = spy_on(&registry, &root);

    let child = root.as_object().unwrap().get("child");
    child.as_object().unwrap().get("y");
    // Only the read on the root itself counts.
    assert_eq!(spy.access.get(), 1);
}

#[test]
fn modification_in_a_cycle_terminates() {
    let registry = Registry::new();
    let a = registry.create_handler(None, false).unwrap();
    let b = registry.create_handler(Some(a), false).unwrap();
    registry.add_parent(a, b);

    let target_a = Value::from(Object::new());
    let target_b = Value::from(Object::new());
    registry.install_on(&target_a, Some(a)).unwrap();
    registry.install_on(&target_b, Some(b)).unwrap();
    let spy_a = spy_on(&registry, &registry.view(target_a.clone()));
    let spy_b = spy_on(&registry, &registry.view(target_b.clone()));

    registry.on_modify(b);
    assert_eq!(spy_a.modify.get(), 1);
    assert_eq!(spy_b.modify.get(), 1);
    assert!(registry.drop_modified(&target_a));
    assert!(registry.drop_modified(&target_b));
}

#[test]
fn modified_flag_is_edge_triggered() {
    let registry = Registry::new();
    let tracked = registry.proxy(Object::new());
    assert!(!registry.drop_modified(&tracked));

    tracked.as_object().unwrap().set("x", 1);
    assert!(registry.drop_modified(&tracked));
    assert!(!registry.drop_modified(&tracked));
    assert!(!registry.drop_modified(&Value::from(Object::new())));
}

#[test]
fn array_elements_are_tracked_immediately() {
    let registry = Registry::new();
    let element: Object = [("x", 1)].into_iter().collect();
    let array: Array = [element.clone()].into_iter().collect();
    let tracked = registry.proxy_deep(array);

    let first = tracked.as_array().unwrap().get(0);
    assert!(first.handler().is_some());
    assert_eq!(first.handler(), registry.find(&element));
}

#[test]
fn set_elements_stay_untracked() {
    let registry = Registry::new();
    let tracked = registry.proxy_deep(Set::new());
    let element = Object::new();
    tracked.as_set().unwrap().add(element.clone());
    assert_eq!(registry.find(&element), None);
}

#[test]
fn redundant_set_add_notifies_once() {
    let registry = Registry::new();
    let tracked = registry.proxy(Set::new());
    let spy = spy_on(&registry, &tracked);
    let set = tracked.as_set().unwrap();
    set.add(1);
    set.add(1);
    assert_eq!(spy.modify.get(), 1);
}

#[test]
fn push_on_nested_list_notifies_root_once() {
    let registry = Registry::new();
    let root: Object = [("list", Array::new())].into_iter().collect();
    let root = registry.proxy_deep(root);
    let spy = spy_on(&registry, &root);

    let list = root.as_object().unwrap().get("list");
    list.as_array().unwrap().push(1);
    assert_eq!(spy.modify.get(), 1);
}

#[test]
fn observer_on_both_ends_is_notified_once() {
    let registry = Registry::new();
    let inner = Object::new();
    let root: Object = [("inner", inner.clone())].into_iter().collect();
    let root = registry.proxy_deep(root);
    let spy = spy_on(&registry, &root);
    assert!(registry.attach(&inner, &spy));

    registry.view(inner).as_object().unwrap().set("z", 0);
    assert_eq!(spy.modify.get(), 1);
}

#[test]
fn modification_reaches_siblings() {
    let registry = Registry::new();
    let left = Object::new();
    let right = Object::new();
    let root: Object = [("left", left.clone()), ("right", right.clone())]
        .into_iter()
        .collect();
    registry.proxy_deep(root);
    let spy = spy_on(&registry, &registry.view(right));

    registry.view(left).as_object().unwrap().set("v", 1);
    assert_eq!(spy.modify.get(), 1);
}

#[test]
fn observed_class_objects_are_deep() {
    const TODO: Class = Class::observed("Todo");

    let registry = Registry::new();
    let tags = Array::new();
    let todo = Object::with_class(TODO);
    todo.insert("tags", tags.clone());
    let tracked = registry.proxy(todo);

    assert!(registry.is_observed(tracked.handler().unwrap()));
    assert!(registry.find(&tags).is_some());
}

#[test]
fn custom_predicate_selects_observed_objects() {
    let registry = Registry::builder()
        .is_observed(|object| object.contains_key("deep"))
        .build();
    let inner = Object::new();
    let shallow: Object = [("inner", inner.clone())].into_iter().collect();
    registry.proxy(shallow);
    assert_eq!(registry.find(&inner), None);

    let deep: Object = [("inner", Value::from(inner.clone())), ("deep", Value::from(true))]
        .into_iter()
        .collect();
    registry.proxy(deep);
    assert!(registry.find(&inner).is_some());
}

#[test]
fn map_values_propagate() {
    let registry = Registry::new();
    let value = Object::new();
    let map = Map::new();
    map.set("k", value.clone());
    let root: Object = [("map", map)].into_iter().collect();
    let root = registry.proxy_deep(root);
    let spy = spy_on(&registry, &root);

    registry.view(value).as_object().unwrap().set("x", 1);
    assert_eq!(spy.modify.get(), 1);
}

#[test]
fn date_setters_propagate() {
    let registry = Registry::new();
    let date = Date::from_utc(2020, 0, 1, 0, 0, 0, 0);
    let root: Object = [("when", date.clone())].into_iter().collect();
    let root = registry.proxy_deep(root);
    let spy = spy_on(&registry, &root);

    let when = root.as_object().unwrap().get("when");
    when.as_date().unwrap().set_utc_date(2);
    assert_eq!(spy.modify.get(), 1);
    assert_eq!(date.utc_date(), Some(2));
}

#[test]
fn shared_child_keeps_edge_until_last_slot_releases() {
    let registry = Registry::new();
    let shared = Object::new();
    let list = registry.observable_proxy_array([shared.clone(), shared.clone()]);
    let parent = list.handler().unwrap();
    let child = registry.find(&shared).unwrap();

    list.pop();
    assert_eq!(registry.graph().child_count(parent, child), 1);
    list.pop();
    assert_eq!(registry.graph().child_count(parent, child), 0);
    assert_eq!(registry.graph().parents(child).count(), 0);
}

#[test]
fn sweep_reclaims_dropped_targets() {
    let registry = Registry::new();
    let root = registry.proxy_deep(Object::new());
    {
        let temporary = Object::new();
        root.as_object().unwrap().set("tmp", temporary);
        root.as_object().unwrap().delete("tmp");
    }
    assert_eq!(registry.handler_count(), 2);
    assert_eq!(registry.sweep(), 1);
    assert_eq!(registry.handler_count(), 1);
    assert_eq!(registry.sweep(), 0);

    let root_handler = root.handler().unwrap();
    assert_eq!(registry.graph().children(root_handler).count(), 0);
}

#[test]
fn stale_ids_are_ignored() {
    let registry = Registry::new();
    let handler = registry.create_handler(None, true).unwrap();
    registry.dispose(handler);

    registry.on_modify(handler);
    registry.on_access(handler);
    assert!(!registry.contains(handler));
    assert!(!registry.add_parent(handler, handler));
    assert!(registry.create_handler(Some(handler), false).is_err());
    assert!(!registry.dispose(handler));
}

#[test]
fn dropped_observers_are_pruned() {
    let registry = Registry::new();
    let tracked = registry.proxy(Object::new());
    let spy = spy_on(&registry, &tracked);
    let handler = tracked.handler().unwrap();
    assert_eq!(registry.graph().observer_count(handler), 1);

    drop(spy);
    tracked.as_object().unwrap().set("x", 1);
    assert_eq!(registry.graph().observer_count(handler), 0);
}

/// Reads and writes tracked values from inside its callbacks.
struct Reentrant {
    registry: Registry,
    target: RefCell<Option<Tracked>>,
    late: Rc<Spy>,
    modified: Cell<u32>,
}

impl Observer for Reentrant {
    fn on_access(&self) {}

    fn on_modify(&self) {
        self.modified.set(self.modified.get() + 1);
        let target = self.target.borrow().clone();
        if let Some(target) = target {
            let object = target.as_object().unwrap();
            object.get("count");
            self.registry.attach(&target, &self.late);
            if self.modified.get() == 1 {
                object.set("echo", true);
            }
        }
    }
}

#[test]
fn observers_may_reenter_the_registry() {
    let registry = Registry::new();
    let tracked = registry.proxy_deep(Object::new());
    let observer = Rc::new(Reentrant {
        registry: registry.clone(),
        target: RefCell::new(Some(tracked.clone())),
        late: Rc::new(Spy::default()),
        modified: Cell::new(0),
    });
    assert!(registry.attach(&tracked, &observer));

    tracked.as_object().unwrap().set("count", 1);
    assert_eq!(observer.modified.get(), 2);
    assert_eq!(observer.late.modify.get(), 1);
    assert_eq!(registry.graph().observer_count(tracked.handler().unwrap()), 2);
}
