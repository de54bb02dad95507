// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracked views: values paired with the registry that observes them.
//!
//! A view's accessors read and write the raw target directly and report
//! every access and modification to the target's handler, if it has one.
//! Values read through a view come back as views themselves, so tracking
//! follows the path a reader takes through the object graph.

/// Implements the conversions every view type shares.
macro_rules! view_conversions {
    ($view:ident, $raw:ident) => {
        impl From<$view> for crate::value::Value {
            fn from(view: $view) -> Self {
                Self::$raw(view.raw)
            }
        }

        impl From<$view> for crate::tracked::Tracked {
            fn from(view: $view) -> Self {
                Self::$raw(view)
            }
        }

        impl crate::value::ObservableTarget for $view {
            fn target_key(&self) -> Option<crate::value::TargetKey> {
                crate::value::ObservableTarget::target_key(&self.raw)
            }
        }

        impl PartialEq for $view {
            fn eq(&self, other: &Self) -> bool {
                self.raw.ptr_eq(&other.raw)
            }
        }
    };
}

mod array;
mod collections;
mod date;
mod object;

pub use array::TrackedArray;
pub use collections::{TrackedMap, TrackedSet};
pub use date::TrackedDate;
pub use object::TrackedObject;

use crate::id::HandlerId;
use crate::registry::Registry;
use crate::value::{ObservableTarget, TargetKey, Value};

/// A value read through a [`Registry`].
///
/// Equality compares the wrapped raw values strictly.
#[derive(Clone, Debug)]
pub enum Tracked {
    /// A primitive, which is never tracked.
    Primitive(Value),
    /// A view of an object.
    Object(TrackedObject),
    /// A view of an array.
    Array(TrackedArray),
    /// A view of a map.
    Map(TrackedMap),
    /// A view of a set.
    Set(TrackedSet),
    /// A view of a date.
    Date(TrackedDate),
}

impl Tracked {
    pub(crate) fn new(value: Value, registry: Registry) -> Self {
        match value {
            Value::Object(raw) => Self::Object(TrackedObject::new(raw, registry)),
            Value::Array(raw) => Self::Array(TrackedArray::new(raw, registry)),
            Value::Map(raw) => Self::Map(TrackedMap::new(raw, registry)),
            Value::Set(raw) => Self::Set(TrackedSet::new(raw, registry)),
            Value::Date(raw) => Self::Date(TrackedDate::new(raw, registry)),
            primitive => Self::Primitive(primitive),
        }
    }

    /// Returns the raw value this view wraps.
    #[must_use]
    pub fn raw(&self) -> Value {
        match self {
            Self::Primitive(value) => value.clone(),
            Self::Object(view) => view.raw().clone().into(),
            Self::Array(view) => view.raw().clone().into(),
            Self::Map(view) => view.raw().clone().into(),
            Self::Set(view) => view.raw().clone().into(),
            Self::Date(view) => view.raw().clone().into(),
        }
    }

    /// Returns the handler of the wrapped target, if it has one.
    #[must_use]
    pub fn handler(&self) -> Option<HandlerId> {
        match self {
            Self::Primitive(_) => None,
            Self::Object(view) => view.handler(),
            Self::Array(view) => view.handler(),
            Self::Map(view) => view.handler(),
            Self::Set(view) => view.handler(),
            Self::Date(view) => view.handler(),
        }
    }

    /// Returns `true` for an undefined primitive.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Primitive(Value::Undefined))
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Primitive(value) => value.as_bool(),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Primitive(value) => value.as_number(),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Primitive(value) => value.as_str(),
            _ => None,
        }
    }

    /// Returns the object view, if this is one.
    #[must_use]
    pub fn as_object(&self) -> Option<&TrackedObject> {
        match self {
            Self::Object(view) => Some(view),
            _ => None,
        }
    }

    /// Returns the array view, if this is one.
    #[must_use]
    pub fn as_array(&self) -> Option<&TrackedArray> {
        match self {
            Self::Array(view) => Some(view),
            _ => None,
        }
    }

    /// Returns the map view, if this is one.
    #[must_use]
    pub fn as_map(&self) -> Option<&TrackedMap> {
        match self {
            Self::Map(view) => Some(view),
            _ => None,
        }
    }

    /// Returns the set view, if this is one.
    #[must_use]
    pub fn as_set(&self) -> Option<&TrackedSet> {
        match self {
            Self::Set(view) => Some(view),
            _ => None,
        }
    }

    /// Returns the date view, if this is one.
    #[must_use]
    pub fn as_date(&self) -> Option<&TrackedDate> {
        match self {
            Self::Date(view) => Some(view),
            _ => None,
        }
    }
}

impl From<Tracked> for Value {
    fn from(tracked: Tracked) -> Self {
        tracked.raw()
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.raw().strict_equals(&other.raw())
    }
}

impl ObservableTarget for Tracked {
    fn target_key(&self) -> Option<TargetKey> {
        match self {
            Self::Primitive(_) => None,
            Self::Object(view) => view.raw().target_key(),
            Self::Array(view) => view.raw().target_key(),
            Self::Map(view) => view.raw().target_key(),
            Self::Set(view) => view.raw().target_key(),
            Self::Date(view) => view.raw().target_key(),
        }
    }
}
