// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::cmp::Ordering;
use core::ops::{Bound, RangeBounds};

use super::Tracked;
use crate::id::HandlerId;
use crate::registry::Registry;
use crate::value::{Array, Value};

/// A tracked view of an [`Array`].
///
/// Arrays are always deep: every target stored in a tracked array is proxied
/// as a child of the array, whether or not the array is observed.
///
/// Every method call is an access event, as is reading the length. Index
/// writes and length writes are not. Mutators report a modification only
/// when they change the array.
///
/// # Example
///
/// ```rust
/// use understory_observe::{Object, Registry};
///
/// let registry = Registry::new();
/// let list = registry.observable_proxy_array([1, 2, 3]);
///
/// list.push(Object::new());
/// let removed = list.splice(0, Some(2), [0]);
/// assert_eq!(removed.len(), 2);
/// assert_eq!(list.len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct TrackedArray {
    raw: Array,
    registry: Registry,
}

impl TrackedArray {
    pub(crate) fn new(raw: Array, registry: Registry) -> Self {
        Self { raw, registry }
    }

    /// Returns the wrapped array.
    #[must_use]
    pub fn raw(&self) -> &Array {
        &self.raw
    }

    /// Returns the handler of the wrapped array.
    #[must_use]
    pub fn handler(&self) -> Option<HandlerId> {
        self.registry.find(&self.raw)
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.registry.touch(&self.raw);
        self.raw.len()
    }

    /// Returns `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads an element. Out-of-range indices read as undefined.
    pub fn get(&self, index: usize) -> Tracked {
        self.registry.touch(&self.raw);
        self.registry.view(self.raw.get(index).unwrap_or_default())
    }

    /// Returns views of all elements.
    pub fn values(&self) -> Vec<Tracked> {
        self.registry.touch(&self.raw);
        self.raw
            .to_vec()
            .into_iter()
            .map(|v| self.registry.view(v))
            .collect()
    }

    /// Returns `true` if some element is same-value-zero equal to `value`.
    ///
    /// Unlike [`index_of`](Self::index_of), this finds `NaN`.
    pub fn includes(&self, value: impl Into<Value>) -> bool {
        self.registry.touch(&self.raw);
        let value = value.into();
        self.raw.to_vec().iter().any(|v| v.same_value_zero(&value))
    }

    /// Returns the index of the first element strictly equal to `value`.
    pub fn index_of(&self, value: impl Into<Value>) -> Option<usize> {
        self.registry.touch(&self.raw);
        let value = value.into();
        self.raw.to_vec().iter().position(|v| v.strict_equals(&value))
    }

    /// Writes an element, extending the array with undefined if needed.
    ///
    /// Returns `true` if the array changed. Writing a value strictly equal
    /// to the current one, including undefined past the end, does nothing,
    /// and neither does writing at `usize::MAX`.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> bool {
        let value = value.into();
        let old = self.raw.get(index).unwrap_or_default();
        if old.strict_equals(&value) || index == usize::MAX {
            return false;
        }
        if let Some(handler) = self.registry.modify(&self.raw) {
            self.registry.remove_child(handler, &old);
            self.registry.proxy_value(&value, Some(handler), None, true);
        }
        self.raw.set(index, value).is_some()
    }

    /// Sets the length, truncating or extending with undefined.
    ///
    /// Truncated elements keep their edges to this array's handler.
    pub fn set_len(&self, len: usize) {
        if len == self.raw.len() {
            return;
        }
        self.registry.modify(&self.raw);
        self.raw.with_mut(|values| values.resize(len, Value::Undefined));
    }

    /// Appends an element, returning the new length.
    pub fn push(&self, value: impl Into<Value>) -> usize {
        self.registry.touch(&self.raw);
        let value = value.into();
        if let Some(handler) = self.registry.modify(&self.raw) {
            self.registry.proxy_value(&value, Some(handler), None, true);
        }
        self.raw.with_mut(|values| {
            values.push(value);
            values.len()
        })
    }

    /// Removes the last element. An empty array yields undefined.
    pub fn pop(&self) -> Tracked {
        self.registry.touch(&self.raw);
        if self.raw.is_empty() {
            return self.registry.view(Value::Undefined);
        }
        let handler = self.registry.modify(&self.raw);
        let removed = self.raw.pop().unwrap_or_default();
        self.release(handler, &removed);
        self.registry.view(removed)
    }

    /// Removes the first element. An empty array yields undefined.
    pub fn shift(&self) -> Tracked {
        self.registry.touch(&self.raw);
        if self.raw.is_empty() {
            return self.registry.view(Value::Undefined);
        }
        let handler = self.registry.modify(&self.raw);
        let removed = self.raw.with_mut(|values| values.remove(0));
        self.release(handler, &removed);
        self.registry.view(removed)
    }

    /// Inserts elements at the front, returning the new length.
    pub fn unshift<V: Into<Value>>(&self, values: impl IntoIterator<Item = V>) -> usize {
        self.registry.touch(&self.raw);
        let items = self.adopt_all(values);
        if items.is_empty() {
            return self.raw.len();
        }
        self.raw.with_mut(|values| {
            let tail = core::mem::replace(values, items);
            values.extend(tail);
            values.len()
        })
    }

    /// Removes `delete_count` elements at `start` and inserts `items` in
    /// their place, returning the removed elements.
    ///
    /// `start` is clamped to the length. A `delete_count` of `None` removes
    /// everything from `start` on.
    pub fn splice<V: Into<Value>>(
        &self,
        start: usize,
        delete_count: Option<usize>,
        items: impl IntoIterator<Item = V>,
    ) -> Vec<Tracked> {
        self.registry.touch(&self.raw);
        let len = self.raw.len();
        let start = start.min(len);
        let delete_count = delete_count.unwrap_or(len).min(len - start);
        let items: Vec<Value> = items.into_iter().map(Into::into).collect();
        if delete_count == 0 && items.is_empty() {
            return Vec::new();
        }

        let handler = self.registry.modify(&self.raw);
        if let Some(handler) = handler {
            for item in &items {
                self.registry.proxy_value(item, Some(handler), None, true);
            }
        }
        let removed: Vec<Value> = self
            .raw
            .with_mut(|values| values.splice(start..start + delete_count, items).collect());
        for value in &removed {
            self.release(handler, value);
        }
        removed.into_iter().map(|v| self.registry.view(v)).collect()
    }

    /// Writes `value` into every slot of `range`, clamped to the length.
    pub fn fill(&self, value: impl Into<Value>, range: impl RangeBounds<usize>) {
        self.registry.touch(&self.raw);
        let value = value.into();
        let (start, end) = clamp_range(&range, self.raw.len());
        if start >= end {
            return;
        }
        let handler = self.registry.modify(&self.raw);
        let old = self.raw.with_mut(|values| {
            values[start..end]
                .iter_mut()
                .map(|slot| core::mem::replace(slot, value.clone()))
                .collect::<Vec<_>>()
        });
        for previous in &old {
            self.release(handler, previous);
            if let Some(handler) = handler {
                self.registry.proxy_value(&value, Some(handler), None, true);
            }
        }
    }

    /// Reverses the elements in place.
    pub fn reverse(&self) {
        self.registry.touch(&self.raw);
        if self.raw.len() < 2 {
            return;
        }
        self.registry.modify(&self.raw);
        self.raw.with_mut(|values| values.reverse());
    }

    /// Sorts the elements with `compare`.
    ///
    /// The comparator sees raw values and may read the array.
    pub fn sort_by(&self, mut compare: impl FnMut(&Value, &Value) -> Ordering) {
        self.registry.touch(&self.raw);
        if self.raw.len() < 2 {
            return;
        }
        self.registry.modify(&self.raw);
        let mut sorted = self.raw.to_vec();
        sorted.sort_by(&mut compare);
        self.raw.with_mut(|values| *values = sorted);
    }

    /// Copies the elements of `source` to the slots starting at `target`.
    ///
    /// Both positions are clamped to the length, and the copy stops at the
    /// end of the array.
    pub fn copy_within(&self, source: impl RangeBounds<usize>, target: usize) {
        self.registry.touch(&self.raw);
        let len = self.raw.len();
        let (start, end) = clamp_range(&source, len);
        let target = target.min(len);
        let count = end.saturating_sub(start).min(len - target);
        if count == 0 {
            return;
        }
        let handler = self.registry.modify(&self.raw);
        let (copied, overwritten) = self.raw.with_mut(|values| {
            let copied = values[start..start + count].to_vec();
            let overwritten = values
                .splice(target..target + count, copied.iter().cloned())
                .collect::<Vec<_>>();
            (copied, overwritten)
        });
        if let Some(handler) = handler {
            for value in &copied {
                self.registry.proxy_value(value, Some(handler), None, true);
            }
        }
        for value in &overwritten {
            self.release(handler, value);
        }
    }

    /// Proxies inserted values as children, reporting one modification.
    fn adopt_all<V: Into<Value>>(&self, values: impl IntoIterator<Item = V>) -> Vec<Value> {
        let items: Vec<Value> = values.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return items;
        }
        if let Some(handler) = self.registry.modify(&self.raw) {
            for item in &items {
                self.registry.proxy_value(item, Some(handler), None, true);
            }
        }
        items
    }

    fn release(&self, handler: Option<HandlerId>, value: &Value) {
        if let Some(handler) = handler {
            self.registry.remove_child(handler, value);
        }
    }
}

fn clamp_range(range: &impl RangeBounds<usize>, len: usize) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    };
    (start.min(len), end.min(len))
}

view_conversions!(TrackedArray, Array);
