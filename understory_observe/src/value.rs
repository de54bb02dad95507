// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Values and the shared targets they reference.
//!
//! [`Value`] is a dynamically typed value: a primitive, or a handle to one of
//! five shared target kinds ([`Object`], [`Array`], [`Map`], [`Set`],
//! [`Date`]). Cloning a handle clones the reference, not the target, so
//! object graphs may share nodes and contain cycles.
//!
//! The methods on the target types are *raw*: they read and write the target
//! without telling any observer. Go through a [`Tracked`](crate::Tracked)
//! view to get notifications.

use alloc::collections::BTreeMap;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use hashbrown::DefaultHashBuilder;
use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::date::Date;

/// Identity of a shared target.
///
/// Two values have the same key exactly when they are handles to the same
/// target. Primitives have no key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TargetKey(usize);

impl TargetKey {
    pub(crate) fn of<T: ?Sized>(rc: &Rc<T>) -> Self {
        Self(Rc::as_ptr(rc).cast::<()>().addr())
    }
}

/// Anything that may name a shared target.
///
/// Implemented by [`Value`], the raw target handles, and the tracked views,
/// so registry lookups accept whichever one the caller holds.
pub trait ObservableTarget {
    /// Returns the identity of the referenced target, or `None` for
    /// primitives.
    fn target_key(&self) -> Option<TargetKey>;
}

/// A class marker carried by an [`Object`].
///
/// Objects of an *observed* class are deep-tracked by default whenever they
/// are proxied, the same as if the caller had asked for deep tracking.
///
/// # Example
///
/// ```rust
/// use understory_observe::{Class, Object};
///
/// const TODO: Class = Class::observed("Todo");
///
/// let todo = Object::with_class(TODO);
/// assert_eq!(todo.class(), Some(TODO));
/// assert!(TODO.is_observed());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Class {
    name: &'static str,
    observed: bool,
}

impl Class {
    /// Creates a plain (shallow by default) class marker.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            observed: false,
        }
    }

    /// Creates an observed (deep by default) class marker.
    #[must_use]
    pub const fn observed(name: &'static str) -> Self {
        Self {
            name,
            observed: true,
        }
    }

    /// Returns the class name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Returns `true` for observed classes.
    #[must_use]
    pub const fn is_observed(self) -> bool {
        self.observed
    }
}

/// A dynamically typed value.
///
/// Equality (`==`) is strict equality: primitives compare by value, with
/// `NaN != NaN` and `0.0 == -0.0`, and target handles compare by identity.
#[derive(Clone, Default)]
pub enum Value {
    /// The absent value.
    #[default]
    Undefined,
    /// The null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// An immutable string.
    String(Rc<str>),
    /// A plain object.
    Object(Object),
    /// An array.
    Array(Array),
    /// A keyed collection.
    Map(Map),
    /// A collection of unique values.
    Set(Set),
    /// A point in time.
    Date(Date),
}

impl Value {
    /// Returns `true` for [`Value::Undefined`].
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` if this value is a handle to a shared target.
    #[must_use]
    pub fn is_target(&self) -> bool {
        self.target_key().is_some()
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the object handle, if this is one.
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Returns the array handle, if this is one.
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the map handle, if this is one.
    #[must_use]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the set handle, if this is one.
    #[must_use]
    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Self::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the date handle, if this is one.
    #[must_use]
    pub fn as_date(&self) -> Option<&Date> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Strict equality: primitives by value, targets by identity.
    #[must_use]
    pub fn strict_equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            _ => match (self.target_key(), other.target_key()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Strict equality, except that `NaN` equals itself.
    ///
    /// This is the key equality used by [`Map`] and [`Set`].
    #[must_use]
    pub fn same_value_zero(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self.strict_equals(other),
        }
    }

    pub(crate) fn downgrade(&self) -> Option<WeakTarget> {
        match self {
            Self::Object(o) => Some(WeakTarget::Object(Rc::downgrade(&o.0))),
            Self::Array(a) => Some(WeakTarget::Array(Rc::downgrade(&a.0))),
            Self::Map(m) => Some(WeakTarget::Map(Rc::downgrade(&m.0))),
            Self::Set(s) => Some(WeakTarget::Set(Rc::downgrade(&s.0))),
            Self::Date(d) => Some(WeakTarget::Date(d.downgrade())),
            _ => None,
        }
    }
}

impl ObservableTarget for Value {
    fn target_key(&self) -> Option<TargetKey> {
        match self {
            Self::Object(o) => o.target_key(),
            Self::Array(a) => a.target_key(),
            Self::Map(m) => m.target_key(),
            Self::Set(s) => s.target_key(),
            Self::Date(d) => d.target_key(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::String(s) => f.debug_tuple("String").field(s).finish(),
            Self::Object(o) => fmt::Debug::fmt(o, f),
            Self::Array(a) => fmt::Debug::fmt(a, f),
            Self::Map(m) => fmt::Debug::fmt(m, f),
            Self::Set(s) => fmt::Debug::fmt(s, f),
            Self::Date(d) => fmt::Debug::fmt(d, f),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl From<Rc<str>> for Value {
    fn from(value: Rc<str>) -> Self {
        Self::String(value)
    }
}

impl From<Object> for Value {
    fn from(value: Object) -> Self {
        Self::Object(value)
    }
}

impl From<Array> for Value {
    fn from(value: Array) -> Self {
        Self::Array(value)
    }
}

impl From<Map> for Value {
    fn from(value: Map) -> Self {
        Self::Map(value)
    }
}

impl From<Set> for Value {
    fn from(value: Set) -> Self {
        Self::Set(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Self::Date(value)
    }
}

/// A weak reference to a target, held by registry bindings.
#[derive(Clone, Debug)]
pub(crate) enum WeakTarget {
    Object(Weak<ObjectData>),
    Array(Weak<RefCell<Vec<Value>>>),
    Map(Weak<RefCell<Keyed<(Value, Value)>>>),
    Set(Weak<RefCell<Keyed<Value>>>),
    Date(Weak<Cell<f64>>),
}

impl WeakTarget {
    /// Returns `true` while the target has not been dropped.
    pub(crate) fn is_alive(&self) -> bool {
        match self {
            Self::Object(w) => w.strong_count() > 0,
            Self::Array(w) => w.strong_count() > 0,
            Self::Map(w) => w.strong_count() > 0,
            Self::Set(w) => w.strong_count() > 0,
            Self::Date(w) => w.strong_count() > 0,
        }
    }
}

/// An object field.
#[derive(Clone, Debug)]
struct Field {
    value: Value,
    writable: bool,
}

#[derive(Debug)]
pub(crate) struct ObjectData {
    class: Option<Class>,
    fields: RefCell<BTreeMap<Rc<str>, Field>>,
}

/// A shared plain object: named fields, each writable or read-only.
///
/// Field iteration is ordered by name.
///
/// # Example
///
/// ```rust
/// use understory_observe::{Object, Value};
///
/// let point: Object = [("x", 1), ("y", 2)].into_iter().collect();
/// point.insert_readonly("id", "p1");
///
/// assert_eq!(point.get("x"), Some(Value::from(1)));
/// assert!(!point.set("id", "p2"));
/// assert_eq!(point.keys().len(), 3);
/// ```
#[derive(Clone)]
pub struct Object(Rc<ObjectData>);

impl Object {
    /// Creates an empty object with no class marker.
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(None)
    }

    /// Creates an empty object carrying `class`.
    #[must_use]
    pub fn with_class(class: Class) -> Self {
        Self::from_parts(Some(class))
    }

    fn from_parts(class: Option<Class>) -> Self {
        Self(Rc::new(ObjectData {
            class,
            fields: RefCell::new(BTreeMap::new()),
        }))
    }

    /// Returns the class marker, if any.
    #[must_use]
    pub fn class(&self) -> Option<Class> {
        self.0.class
    }

    /// Defines a writable field, replacing any previous definition.
    ///
    /// Returns the previous value.
    pub fn insert(&self, key: impl Into<Rc<str>>, value: impl Into<Value>) -> Option<Value> {
        self.define(key.into(), value.into(), true)
    }

    /// Defines a read-only field, replacing any previous definition.
    ///
    /// Returns the previous value.
    pub fn insert_readonly(
        &self,
        key: impl Into<Rc<str>>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        self.define(key.into(), value.into(), false)
    }

    fn define(&self, key: Rc<str>, value: Value, writable: bool) -> Option<Value> {
        self.0
            .fields
            .borrow_mut()
            .insert(key, Field { value, writable })
            .map(|f| f.value)
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.fields.borrow().get(key).map(|f| f.value.clone())
    }

    /// Assigns a field, creating it as writable if missing.
    ///
    /// Returns `false` (leaving the object unchanged) if the field is
    /// read-only.
    pub fn set(&self, key: impl Into<Rc<str>>, value: impl Into<Value>) -> bool {
        let key = key.into();
        let mut fields = self.0.fields.borrow_mut();
        match fields.get_mut(&key) {
            Some(field) if !field.writable => false,
            Some(field) => {
                field.value = value.into();
                true
            }
            None => {
                fields.insert(
                    key,
                    Field {
                        value: value.into(),
                        writable: true,
                    },
                );
                true
            }
        }
    }

    /// Removes a field, returning its value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.fields.borrow_mut().remove(key).map(|f| f.value)
    }

    /// Returns `true` if the field exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.fields.borrow().contains_key(key)
    }

    /// Returns `true` if the field exists and is writable.
    #[must_use]
    pub fn is_writable(&self, key: &str) -> bool {
        self.0.fields.borrow().get(key).is_some_and(|f| f.writable)
    }

    /// Returns the field names.
    #[must_use]
    pub fn keys(&self) -> Vec<Rc<str>> {
        self.0.fields.borrow().keys().cloned().collect()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.fields.borrow().len()
    }

    /// Returns `true` if the object has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.fields.borrow().is_empty()
    }

    /// Returns `true` if both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Snapshot of the values of all writable fields.
    pub(crate) fn writable_values(&self) -> Vec<Value> {
        self.0
            .fields
            .borrow()
            .values()
            .filter(|f| f.writable)
            .map(|f| f.value.clone())
            .collect()
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservableTarget for Object {
    fn target_key(&self) -> Option<TargetKey> {
        Some(TargetKey::of(&self.0))
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.0.class.map(Class::name))
            .field("keys", &self.keys())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Object
where
    K: Into<Rc<str>>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let object = Self::new();
        for (key, value) in iter {
            object.insert(key, value);
        }
        object
    }
}

/// A shared array.
///
/// Writing past the end extends the array with [`Value::Undefined`].
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    /// Creates an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an array owning `values`.
    #[must_use]
    pub fn from_vec(values: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(values)))
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` if the array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Writes the element at `index`, returning the previous element.
    ///
    /// Returns `None`, leaving the array alone, if no array can be long
    /// enough to hold `index`.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Option<Value> {
        let len = index.checked_add(1)?;
        let mut values = self.0.borrow_mut();
        if len > values.len() {
            values.resize(len, Value::Undefined);
        }
        Some(core::mem::replace(&mut values[index], value.into()))
    }

    /// Appends an element.
    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    /// Removes the last element.
    pub fn pop(&self) -> Option<Value> {
        self.0.borrow_mut().pop()
    }

    /// Returns a snapshot of the elements.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// Returns `true` if both handles refer to the same array.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }
}

impl ObservableTarget for Array {
    fn target_key(&self) -> Option<TargetKey> {
        Some(TargetKey::of(&self.0))
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array").field("len", &self.len()).finish()
    }
}

impl<V: Into<Value>> FromIterator<V> for Array {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::from_vec(iter.into_iter().map(Into::into).collect())
    }
}

/// Hashable form of [`Value::same_value_zero`].
///
/// Two values have equal keys exactly when they are same-value-zero equal:
/// every `NaN` maps to one key, `-0` folds into `+0`, strings compare by
/// contents, and targets by identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Undefined,
    Null,
    Bool(bool),
    Number(u64),
    String(Rc<str>),
    Target(TargetKey),
}

impl ValueKey {
    pub(crate) fn of(value: &Value) -> Self {
        match value {
            Value::Undefined => Self::Undefined,
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) if n.is_nan() => Self::Number(f64::NAN.to_bits()),
            Value::Number(n) if *n == 0.0 => Self::Number(0),
            Value::Number(n) => Self::Number(n.to_bits()),
            Value::String(s) => Self::String(s.clone()),
            _ => value.target_key().map_or(Self::Undefined, Self::Target),
        }
    }
}

/// Insertion-ordered storage behind [`Map`] and [`Set`].
pub(crate) type Keyed<V> = IndexMap<ValueKey, V, DefaultHashBuilder>;

/// A shared, insertion-ordered keyed collection.
///
/// Keys compare with [`Value::same_value_zero`]. Lookups are hashed;
/// deleting an entry shifts the later ones to keep their order.
#[derive(Clone, Default)]
pub struct Map(Rc<RefCell<Keyed<(Value, Value)>>>);

impl Map {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &Value) -> Option<Value> {
        self.0
            .borrow()
            .get(&ValueKey::of(key))
            .map(|(_, value)| value.clone())
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn has(&self, key: &Value) -> bool {
        self.0.borrow().contains_key(&ValueKey::of(key))
    }

    /// Stores `value` under `key`, returning the previous value.
    ///
    /// Replacing keeps the entry's original insertion position.
    pub fn set(&self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.0.borrow_mut().entry(ValueKey::of(&key)) {
            Entry::Occupied(mut slot) => Some(core::mem::replace(&mut slot.get_mut().1, value)),
            Entry::Vacant(slot) => {
                slot.insert((key, value));
                None
            }
        }
    }

    /// Removes `key`, returning its value.
    pub fn delete(&self, key: &Value) -> Option<Value> {
        self.0
            .borrow_mut()
            .shift_remove(&ValueKey::of(key))
            .map(|(_, value)| value)
    }

    /// Removes every entry, returning them in insertion order.
    pub fn clear(&self) -> Vec<(Value, Value)> {
        core::mem::take(&mut *self.0.borrow_mut())
            .into_values()
            .collect()
    }

    /// Returns a snapshot of the keys.
    #[must_use]
    pub fn keys(&self) -> Vec<Value> {
        self.0.borrow().values().map(|(k, _)| k.clone()).collect()
    }

    /// Returns a snapshot of the values.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.0.borrow().values().map(|(_, v)| v.clone()).collect()
    }

    /// Returns a snapshot of the entries.
    #[must_use]
    pub fn entries(&self) -> Vec<(Value, Value)> {
        self.0.borrow().values().cloned().collect()
    }

    /// Returns `true` if both handles refer to the same map.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl ObservableTarget for Map {
    fn target_key(&self) -> Option<TargetKey> {
        Some(TargetKey::of(&self.0))
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").field("len", &self.len()).finish()
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = Self::new();
        for (key, value) in iter {
            map.set(key, value);
        }
        map
    }
}

/// A shared, insertion-ordered collection of unique values.
///
/// Values compare with [`Value::same_value_zero`].
#[derive(Clone, Default)]
pub struct Set(Rc<RefCell<Keyed<Value>>>);

impl Set {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Returns `true` if the set has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns `true` if `value` is present.
    #[must_use]
    pub fn has(&self, value: &Value) -> bool {
        self.0.borrow().contains_key(&ValueKey::of(value))
    }

    /// Inserts `value`, returning `false` if it was already present.
    pub fn add(&self, value: impl Into<Value>) -> bool {
        let value = value.into();
        match self.0.borrow_mut().entry(ValueKey::of(&value)) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
        }
    }

    /// Removes `value`, returning `true` if it was present.
    pub fn delete(&self, value: &Value) -> bool {
        self.0
            .borrow_mut()
            .shift_remove(&ValueKey::of(value))
            .is_some()
    }

    /// Removes every value, returning them in insertion order.
    pub fn clear(&self) -> Vec<Value> {
        core::mem::take(&mut *self.0.borrow_mut())
            .into_values()
            .collect()
    }

    /// Returns a snapshot of the values.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.0.borrow().values().cloned().collect()
    }

    /// Returns `true` if both handles refer to the same set.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl ObservableTarget for Set {
    fn target_key(&self) -> Option<TargetKey> {
        Some(TargetKey::of(&self.0))
    }
}

impl fmt::Debug for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Set").field("len", &self.len()).finish()
    }
}

impl<V: Into<Value>> FromIterator<V> for Set {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let set = Self::new();
        for value in iter {
            set.add(value);
        }
        set
    }
}
