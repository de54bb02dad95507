// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The registry: target bindings, observer attachment, and event delivery.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Ref, RefCell};
use core::fmt;

use hashbrown::HashMap;

use crate::graph::HandlerGraph;
use crate::id::{HandlerId, StaleHandlerError};
use crate::observer::Observer;
use crate::value::{Object, ObservableTarget, TargetKey, Value, WeakTarget};

type ObservedPredicate = Box<dyn Fn(&Object) -> bool>;

/// Association of one target with its handler.
#[derive(Debug)]
struct Binding {
    target: WeakTarget,
    handler: HandlerId,
}

struct RegistryInner {
    graph: RefCell<HandlerGraph>,
    bindings: RefCell<HashMap<TargetKey, Binding>>,
    is_observed: ObservedPredicate,
}

/// Owner of the handler graph and of the target to handler bindings.
///
/// A registry is an ordinary value: create one, hand clones of it to whoever
/// needs to proxy or observe values, and drop it when done. Clones share
/// state. Every [`Tracked`](crate::Tracked) view keeps a clone so that its
/// accessors can report to the right graph.
///
/// Bindings hold their target weakly. A target that is dropped leaves a
/// dead binding behind; [`sweep`](Self::sweep) disposes the handlers of dead
/// bindings in bulk.
///
/// All observer callbacks run after the registry has released its internal
/// borrows, so callbacks may use the registry freely.
///
/// # Example
///
/// ```rust
/// use understory_observe::{Array, Object, Registry, Value};
///
/// let registry = Registry::new();
/// let state: Object = [("items", Value::from(Array::new()))].into_iter().collect();
/// let tracked = registry.proxy_deep(state.clone());
///
/// let items = tracked.as_object().unwrap().get("items");
/// items.as_array().unwrap().push(1);
///
/// // The push reached the state object through the handler graph.
/// assert!(registry.drop_modified(&state));
/// assert!(!registry.drop_modified(&state));
/// ```
///
/// # See Also
///
/// - [`RegistryBuilder`]: Configures the observed-class predicate and
///   initial capacity.
/// - [`HandlerGraph`]: The graph the registry maintains.
#[derive(Clone)]
pub struct Registry {
    inner: Rc<RegistryInner>,
}

impl Registry {
    /// Creates a registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        RegistryBuilder::new().build()
    }

    /// Returns a builder for a configured registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Returns the handler bound to `target`, if any.
    ///
    /// A binding whose handler was disposed is removed and reported as
    /// absent.
    #[must_use]
    pub fn find(&self, target: &impl ObservableTarget) -> Option<HandlerId> {
        let key = target.target_key()?;
        let handler = self.inner.bindings.borrow().get(&key).map(|b| b.handler)?;
        if self.inner.graph.borrow().is_alive(handler) {
            return Some(handler);
        }
        self.inner.bindings.borrow_mut().remove(&key);
        None
    }

    /// Returns the handler bound to `value` when it is a target.
    ///
    /// Primitives yield `None`.
    #[must_use]
    pub fn find_if_object(&self, value: &Value) -> Option<HandlerId> {
        if value.is_target() {
            self.find(value)
        } else {
            None
        }
    }

    /// Binds `target` to `handler`, or removes its binding when `handler` is
    /// `None`.
    ///
    /// Returns the handler previously bound to the target. Removing a binding
    /// leaves the handler in the graph; dispose it if nothing else refers to
    /// it. Primitives cannot be bound and are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StaleHandlerError`] if `handler` was disposed. The existing
    /// binding is left untouched in that case.
    pub fn install_on(
        &self,
        target: &Value,
        handler: Option<HandlerId>,
    ) -> Result<Option<HandlerId>, StaleHandlerError> {
        let (Some(key), Some(weak)) = (target.target_key(), target.downgrade()) else {
            return Ok(None);
        };
        let mut bindings = self.inner.bindings.borrow_mut();
        match handler {
            Some(handler) => {
                if !self.inner.graph.borrow().is_alive(handler) {
                    return Err(StaleHandlerError { handler });
                }
                tracing::trace!(?handler, ?key, "binding installed");
                let previous = bindings.insert(
                    key,
                    Binding {
                        target: weak,
                        handler,
                    },
                );
                Ok(previous.map(|b| b.handler))
            }
            None => {
                let previous = bindings.remove(&key).map(|b| b.handler);
                tracing::trace!(handler = ?previous, ?key, "binding removed");
                Ok(previous)
            }
        }
    }

    /// Attaches `observer` to the handler of `target`.
    ///
    /// The registry keeps only a weak reference. Returns `false` if the
    /// target was never proxied or the observer is already attached.
    pub fn attach<O: Observer + 'static>(
        &self,
        target: &impl ObservableTarget,
        observer: &Rc<O>,
    ) -> bool {
        let Some(handler) = self.find(target) else {
            return false;
        };
        let weak: Weak<O> = Rc::downgrade(observer);
        let weak: Weak<dyn Observer> = weak;
        self.inner.graph.borrow_mut().attach(handler, weak)
    }

    /// Detaches `observer` from the handler of `target`.
    ///
    /// Returns `true` if it was attached.
    pub fn detach<O: Observer + 'static>(
        &self,
        target: &impl ObservableTarget,
        observer: &Rc<O>,
    ) -> bool {
        let Some(handler) = self.find(target) else {
            return false;
        };
        let weak: Weak<O> = Rc::downgrade(observer);
        let weak: Weak<dyn Observer> = weak;
        self.inner.graph.borrow_mut().detach(handler, &weak)
    }

    /// Returns and clears the modified flag of the handler of `target`.
    ///
    /// Unknown targets return `false`.
    pub fn drop_modified(&self, target: &impl ObservableTarget) -> bool {
        self.find(target)
            .is_some_and(|h| self.inner.graph.borrow_mut().take_modified(h))
    }

    /// Notifies the observers attached to `handler` of an access.
    pub fn on_access(&self, handler: HandlerId) {
        let notification = self.inner.graph.borrow_mut().on_access(handler);
        notification.dispatch();
    }

    /// Marks every handler connected to `handler` modified and notifies each
    /// of their observers once.
    pub fn on_modify(&self, handler: HandlerId) {
        let notification = self.inner.graph.borrow_mut().on_modify(handler);
        notification.dispatch();
    }

    /// Records one more slot of `parent` holding `child`.
    ///
    /// See [`HandlerGraph::add_parent`].
    pub fn add_parent(&self, child: HandlerId, parent: HandlerId) -> bool {
        self.inner.graph.borrow_mut().add_parent(child, parent)
    }

    /// Releases one slot of `parent` holding `child`.
    ///
    /// See [`HandlerGraph::remove_parent`].
    pub fn remove_parent(&self, child: HandlerId, parent: HandlerId) -> bool {
        self.inner.graph.borrow_mut().remove_parent(child, parent)
    }

    /// Releases one slot of `parent` holding `value`, if `value` is tracked.
    pub fn remove_child(&self, parent: HandlerId, value: &Value) -> bool {
        self.find_if_object(value)
            .is_some_and(|child| self.remove_parent(child, parent))
    }

    /// Returns `true` if `handler` is observed or has an observed ancestor.
    #[must_use]
    pub fn contains(&self, handler: HandlerId) -> bool {
        self.inner.graph.borrow().contains(handler)
    }

    /// Creates an unbound handler, optionally as a child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`StaleHandlerError`] if `parent` was disposed.
    pub fn create_handler(
        &self,
        parent: Option<HandlerId>,
        observed: bool,
    ) -> Result<HandlerId, StaleHandlerError> {
        self.inner.graph.borrow_mut().create(parent, observed)
    }

    /// Disposes `handler`, removing its edges.
    ///
    /// A binding to the disposed handler is dropped the next time its target
    /// is looked up.
    pub fn dispose(&self, handler: HandlerId) -> bool {
        self.inner.graph.borrow_mut().dispose(handler)
    }

    /// Disposes the handlers of every target that has been dropped.
    ///
    /// Also forgets bindings whose handler was disposed directly. Returns
    /// the number of handlers disposed.
    pub fn sweep(&self) -> usize {
        let mut dead = Vec::new();
        {
            let graph = self.inner.graph.borrow();
            self.inner.bindings.borrow_mut().retain(|_, binding| {
                if !binding.target.is_alive() {
                    dead.push(binding.handler);
                    return false;
                }
                graph.is_alive(binding.handler)
            });
        }
        let mut graph = self.inner.graph.borrow_mut();
        let reclaimed = dead.into_iter().filter(|&h| graph.dispose(h)).count();
        tracing::debug!(reclaimed, live = graph.len(), "swept dropped targets");
        reclaimed
    }

    /// Returns the number of live handlers.
    #[must_use]
    pub fn handler_count(&self) -> usize {
        self.inner.graph.borrow().len()
    }

    /// Returns the number of target bindings, dead or alive.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.inner.bindings.borrow().len()
    }

    /// Returns `true` if `handler` is marked observed.
    #[must_use]
    pub fn is_observed(&self, handler: HandlerId) -> bool {
        self.inner.graph.borrow().is_observed(handler)
    }

    /// Returns `true` if `handler` is marked modified.
    #[must_use]
    pub fn is_modified(&self, handler: HandlerId) -> bool {
        self.inner.graph.borrow().is_modified(handler)
    }

    /// Borrows the handler graph for inspection.
    ///
    /// # Panics
    ///
    /// Panics if called while the registry is updating the graph, which can
    /// only happen from inside a [`Debug`](core::fmt::Debug) impl reached
    /// during an update.
    #[must_use]
    pub fn graph(&self) -> Ref<'_, HandlerGraph> {
        self.inner.graph.borrow()
    }

    /// Returns `true` if the configured predicate deep-tracks `object`.
    pub(crate) fn is_observed_object(&self, object: &Object) -> bool {
        (self.inner.is_observed)(object)
    }

    /// Creates a handler for a fresh target and binds it.
    ///
    /// A stale `parent` is ignored.
    pub(crate) fn bind_new(
        &self,
        target: &Value,
        parent: Option<HandlerId>,
        observed: bool,
    ) -> Option<HandlerId> {
        let handler = {
            let mut graph = self.inner.graph.borrow_mut();
            let parent = parent.filter(|&p| graph.is_alive(p));
            graph.create(parent, observed).ok()?
        };
        self.install_on(target, Some(handler)).ok()?;
        Some(handler)
    }

    pub(crate) fn set_observed(&self, handler: HandlerId, observed: bool) {
        self.inner.graph.borrow_mut().set_observed(handler, observed);
    }

    pub(crate) fn set_deep(&self, handler: HandlerId) -> bool {
        self.inner.graph.borrow_mut().set_deep(handler)
    }

    /// Reports an access to the handler of `target`, if it has one.
    pub(crate) fn touch(&self, target: &impl ObservableTarget) {
        if let Some(handler) = self.find(target) {
            self.on_access(handler);
        }
    }

    /// Reports a modification of `target` and returns its handler.
    pub(crate) fn modify(&self, target: &impl ObservableTarget) -> Option<HandlerId> {
        let handler = self.find(target)?;
        self.on_modify(handler);
        Some(handler)
    }

    fn from_builder(builder: RegistryBuilder) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                graph: RefCell::new(HandlerGraph::with_capacity(builder.capacity)),
                bindings: RefCell::new(HashMap::with_capacity(builder.capacity)),
                is_observed: builder
                    .is_observed
                    .unwrap_or_else(|| Box::new(default_is_observed)),
            }),
        }
    }
}

fn default_is_observed(object: &Object) -> bool {
    object.class().is_some_and(|c| c.is_observed())
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.inner.graph.try_borrow().map(|g| g.len()).ok();
        let bindings = self.inner.bindings.try_borrow().map(|b| b.len()).ok();
        f.debug_struct("Registry")
            .field("handlers", &handlers)
            .field("bindings", &bindings)
            .finish_non_exhaustive()
    }
}

/// Builder for a configured [`Registry`].
///
/// # Example
///
/// ```rust
/// use understory_observe::{Object, Registry};
///
/// // Deep-track every object that has a "tracked" field.
/// let registry = Registry::builder()
///     .is_observed(|object| object.contains_key("tracked"))
///     .capacity(64)
///     .build();
///
/// let object: Object = [("tracked", true)].into_iter().collect();
/// let handler = registry.proxy(object).handler().unwrap();
/// assert!(registry.is_observed(handler));
/// ```
#[must_use]
pub struct RegistryBuilder {
    capacity: usize,
    is_observed: Option<ObservedPredicate>,
}

impl RegistryBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            capacity: 0,
            is_observed: None,
        }
    }

    /// Sets the number of handlers to reserve room for.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the predicate deciding which objects are deep-tracked by
    /// default.
    ///
    /// The default predicate accepts objects of an observed
    /// [`Class`](crate::Class).
    pub fn is_observed(mut self, predicate: impl Fn(&Object) -> bool + 'static) -> Self {
        self.is_observed = Some(Box::new(predicate));
        self
    }

    /// Builds the registry.
    pub fn build(self) -> Registry {
        Registry::from_builder(self)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("capacity", &self.capacity)
            .field("is_observed", &self.is_observed.is_some())
            .finish()
    }
}
