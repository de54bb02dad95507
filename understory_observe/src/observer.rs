// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! External observers and deferred notification.

use alloc::rc::{Rc, Weak};
use smallvec::SmallVec;

/// A consumer of access and modification events.
///
/// Observers are attached to a tracked value with
/// [`Registry::attach`](crate::Registry::attach). The registry never owns
/// them: it keeps a [`Weak`] reference, and an observer that has been dropped
/// is pruned the next time its handler notifies.
///
/// Callbacks run after the registry has released all of its internal
/// borrows, so an observer may read tracked values or attach and detach
/// other observers from inside a callback.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use understory_observe::{Object, Observer, Registry};
///
/// #[derive(Default)]
/// struct Counter {
///     modified: Cell<u32>,
/// }
///
/// impl Observer for Counter {
///     fn on_access(&self) {}
///     fn on_modify(&self) {
///         self.modified.set(self.modified.get() + 1);
///     }
/// }
///
/// let registry = Registry::new();
/// let state = registry.proxy_deep(Object::new());
/// let counter = Rc::new(Counter::default());
/// registry.attach(&state, &counter);
///
/// state.as_object().unwrap().set("count", 1);
/// assert_eq!(counter.modified.get(), 1);
/// ```
pub trait Observer {
    /// Called when a field or element of an observed value is read.
    fn on_access(&self);

    /// Called when an observed value, or any value connected to it in the
    /// handler graph, is modified.
    fn on_modify(&self);
}

/// Weakly held observers attached to one handler.
#[derive(Default)]
pub(crate) struct ObserverList {
    entries: SmallVec<[Weak<dyn Observer>; 2]>,
}

impl ObserverList {
    /// Adds `observer` unless it is already present.
    pub(crate) fn insert(&mut self, observer: Weak<dyn Observer>) -> bool {
        if self.position(&observer).is_some() {
            return false;
        }
        self.entries.push(observer);
        true
    }

    /// Removes `observer`, returning `true` if it was present.
    pub(crate) fn remove(&mut self, observer: &Weak<dyn Observer>) -> bool {
        match self.position(observer) {
            Some(pos) => {
                self.entries.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Upgrades live observers into `out`, dropping dead entries.
    pub(crate) fn collect_into(&mut self, out: &mut Notification) {
        self.entries.retain(|weak| match weak.upgrade() {
            Some(observer) => {
                out.push(observer);
                true
            }
            None => false,
        });
    }

    fn position(&self, observer: &Weak<dyn Observer>) -> Option<usize> {
        self.entries
            .iter()
            .position(|w| core::ptr::addr_eq(w.as_ptr(), observer.as_ptr()))
    }
}

impl core::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.entries.len())
            .finish()
    }
}

/// The kind of event a [`Notification`] delivers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum EventKind {
    Access,
    Modify,
}

/// Observers collected while the handler graph was borrowed.
///
/// The graph returns one of these from its event methods; the caller
/// releases the graph borrow and then calls [`dispatch`](Self::dispatch).
#[must_use = "observers are only notified when the notification is dispatched"]
pub(crate) struct Notification {
    kind: EventKind,
    observers: SmallVec<[Rc<dyn Observer>; 4]>,
}

impl Notification {
    pub(crate) fn new(kind: EventKind) -> Self {
        Self {
            kind,
            observers: SmallVec::new(),
        }
    }

    /// Adds `observer` unless the same observer was already collected.
    fn push(&mut self, observer: Rc<dyn Observer>) {
        let seen = self
            .observers
            .iter()
            .any(|o| core::ptr::addr_eq(Rc::as_ptr(o), Rc::as_ptr(&observer)));
        if !seen {
            self.observers.push(observer);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    /// Invokes the event callback on every collected observer.
    pub(crate) fn dispatch(self) {
        for observer in &self.observers {
            match self.kind {
                EventKind::Access => observer.on_access(),
                EventKind::Modify => observer.on_modify(),
            }
        }
    }
}

impl core::fmt::Debug for Notification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Notification")
            .field("kind", &self.kind)
            .field("observers", &self.observers.len())
            .finish()
    }
}
