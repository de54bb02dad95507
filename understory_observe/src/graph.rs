// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler graph: per-target nodes with refcounted parent/child edges.

use alloc::rc::Weak;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use crate::id::{HandlerId, StaleHandlerError};
use crate::observer::{EventKind, Notification, Observer, ObserverList};
use crate::scratch::TraversalScratch;

/// One node of the handler graph.
#[derive(Debug, Default)]
struct HandlerNode {
    /// Explicit root of deep tracking.
    observed: bool,
    /// Fields were already proxied with `observed = true`.
    deep: bool,
    /// Edge-triggered dirty flag, consumed by `take_modified`.
    modified: bool,
    /// Back references. Never ownership.
    parents: HashSet<HandlerId>,
    /// Forward edges with the number of slots holding each child.
    children: HashMap<HandlerId, u32>,
    observers: ObserverList,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<HandlerNode>,
}

/// Arena of handler nodes linked by parent/child edges.
///
/// A handler exists for every tracked target. When a tracked value stores
/// another tracked value, the stored value's handler gets the container's
/// handler as a parent. Edges are refcounted because one child may sit in
/// several slots of the same parent; an edge disappears only when its last
/// slot lets go of the child.
///
/// The graph may contain cycles, including self edges. Every traversal
/// carries a visited guard.
///
/// Operations on a disposed (stale) [`HandlerId`] are silent no-ops.
///
/// # Example
///
/// ```rust
/// use understory_observe::HandlerGraph;
///
/// let mut graph = HandlerGraph::new();
/// let root = graph.create(None, true).unwrap();
/// let list = graph.create(Some(root), false).unwrap();
/// let item = graph.create(Some(list), false).unwrap();
///
/// // `item` sits under an observed root.
/// assert!(graph.contains(item));
///
/// // The same item stored in a second slot of `list`.
/// graph.add_parent(item, list);
/// assert_eq!(graph.child_count(list, item), 2);
///
/// graph.remove_parent(item, list);
/// assert!(graph.contains(item));
/// graph.remove_parent(item, list);
/// assert!(!graph.contains(item));
/// ```
///
/// # See Also
///
/// - [`Registry`](crate::Registry): Binds handlers to targets and delivers
///   observer notifications.
#[derive(Debug, Default)]
pub struct HandlerGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    scratch: TraversalScratch,
}

impl HandlerGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with room for `capacity` handlers.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
            scratch: TraversalScratch::with_capacity(capacity),
        }
    }

    /// Returns the number of live handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the graph has no live handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns `true` if `id` refers to a live handler.
    #[must_use]
    pub fn is_alive(&self, id: HandlerId) -> bool {
        self.node(id).is_some()
    }

    /// Creates a handler, optionally as a child of `parent`.
    ///
    /// Returns an error if `parent` is stale; nothing is created in that case.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` handler slots are allocated.
    pub fn create(
        &mut self,
        parent: Option<HandlerId>,
        observed: bool,
    ) -> Result<HandlerId, StaleHandlerError> {
        if let Some(parent) = parent
            && !self.is_alive(parent)
        {
            return Err(StaleHandlerError { handler: parent });
        }

        let node = HandlerNode {
            observed,
            ..HandlerNode::default()
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                HandlerId::new(index, slot.generation)
            }
            None => {
                let index =
                    u32::try_from(self.slots.len()).expect("too many handlers for HandlerId (u32)");
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                HandlerId::new(index, 0)
            }
        };
        self.live += 1;

        if let Some(parent) = parent {
            self.add_parent(id, parent);
        }
        tracing::trace!(handler = ?id, ?parent, observed, "handler created");
        Ok(id)
    }

    /// Removes a handler and every edge touching it.
    ///
    /// Returns `false` if `id` was already stale. The id (and every copy of
    /// it) is stale afterwards.
    pub fn dispose(&mut self, id: HandlerId) -> bool {
        let Some(node) = self
            .slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.take())
        else {
            return false;
        };

        for parent in node.parents.iter().copied() {
            if let Some(parent) = self.node_mut(parent) {
                parent.children.remove(&id);
            }
        }
        for child in node.children.keys().copied() {
            if let Some(child) = self.node_mut(child) {
                child.parents.remove(&id);
            }
        }

        let slot = &mut self.slots[id.slot()];
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index());
        self.live -= 1;
        tracing::trace!(handler = ?id, "handler disposed");
        true
    }

    /// Returns the root-of-tracking marker of `id`.
    #[must_use]
    pub fn is_observed(&self, id: HandlerId) -> bool {
        self.node(id).is_some_and(|n| n.observed)
    }

    /// Sets the root-of-tracking marker of `id`.
    pub fn set_observed(&mut self, id: HandlerId, observed: bool) {
        if let Some(node) = self.node_mut(id) {
            node.observed = observed;
        }
    }

    /// Adds `parent` as a parent of `child`, incrementing the edge count.
    ///
    /// Returns `false` if either handler is stale.
    pub fn add_parent(&mut self, child: HandlerId, parent: HandlerId) -> bool {
        if !self.is_alive(child) {
            return false;
        }
        let Some(parent_node) = self.node_mut(parent) else {
            return false;
        };
        *parent_node.children.entry(child).or_insert(0) += 1;
        if let Some(child_node) = self.node_mut(child) {
            child_node.parents.insert(parent);
        }
        true
    }

    /// Decrements the `parent -> child` edge, deleting it at zero.
    ///
    /// Returns `true` if an edge count was decremented. Removing an edge that
    /// does not exist does nothing.
    pub fn remove_parent(&mut self, child: HandlerId, parent: HandlerId) -> bool {
        let Some(parent_node) = self.node_mut(parent) else {
            return false;
        };
        let Some(count) = parent_node.children.get_mut(&child) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            parent_node.children.remove(&child);
            if let Some(child_node) = self.node_mut(child) {
                child_node.parents.remove(&parent);
            }
        }
        true
    }

    /// Returns how many slots of `parent` hold `child`.
    #[must_use]
    pub fn child_count(&self, parent: HandlerId, child: HandlerId) -> u32 {
        self.node(parent)
            .and_then(|n| n.children.get(&child).copied())
            .unwrap_or(0)
    }

    /// Returns an iterator over the direct parents of `id`.
    ///
    /// The iteration order is not specified.
    pub fn parents(&self, id: HandlerId) -> impl Iterator<Item = HandlerId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.parents.iter().copied())
    }

    /// Returns an iterator over the direct children of `id`.
    ///
    /// The iteration order is not specified.
    pub fn children(&self, id: HandlerId) -> impl Iterator<Item = HandlerId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|n| n.children.keys().copied())
    }

    /// Returns `true` if `id` is observed or has an observed ancestor.
    #[must_use]
    pub fn contains(&self, id: HandlerId) -> bool {
        self.contains_with_guards(id, &mut HashSet::new())
    }

    /// Upward-only search for an observed handler, starting at `id`.
    ///
    /// Every handler visited is recorded in `guards`, and handlers already in
    /// `guards` are not visited again. Passing the same guard set to several
    /// queries skips ancestors that an earlier query already ruled out.
    pub fn contains_with_guards(&self, id: HandlerId, guards: &mut HashSet<HandlerId>) -> bool {
        let mut stack = Vec::new();
        stack.push(id);
        while let Some(current) = stack.pop() {
            if !guards.insert(current) {
                continue;
            }
            let Some(node) = self.node(current) else {
                continue;
            };
            if node.observed {
                return true;
            }
            stack.extend(node.parents.iter().copied().filter(|p| !guards.contains(p)));
        }
        false
    }

    /// Returns the dirty flag of `id` without clearing it.
    #[must_use]
    pub fn is_modified(&self, id: HandlerId) -> bool {
        self.node(id).is_some_and(|n| n.modified)
    }

    /// Returns and clears the dirty flag of `id`.
    pub fn take_modified(&mut self, id: HandlerId) -> bool {
        self.node_mut(id).is_some_and(|n| core::mem::take(&mut n.modified))
    }

    /// Returns the number of observers attached to `id`, dead ones included
    /// until the next notification prunes them.
    #[must_use]
    pub fn observer_count(&self, id: HandlerId) -> usize {
        self.node(id).map_or(0, |n| n.observers.len())
    }

    pub(crate) fn attach(&mut self, id: HandlerId, observer: Weak<dyn Observer>) -> bool {
        self.node_mut(id).is_some_and(|n| n.observers.insert(observer))
    }

    pub(crate) fn detach(&mut self, id: HandlerId, observer: &Weak<dyn Observer>) -> bool {
        self.node_mut(id).is_some_and(|n| n.observers.remove(observer))
    }

    /// Returns `true` once the fields of `id` have been proxied as observed.
    #[must_use]
    pub fn is_deep(&self, id: HandlerId) -> bool {
        self.node(id).is_some_and(|n| n.deep)
    }

    /// Marks `id` deep, returning `true` if it was not deep before.
    pub(crate) fn set_deep(&mut self, id: HandlerId) -> bool {
        self.node_mut(id)
            .is_some_and(|n| !core::mem::replace(&mut n.deep, true))
    }

    /// Collects the observers of `id` alone.
    pub(crate) fn on_access(&mut self, id: HandlerId) -> Notification {
        let mut out = Notification::new(EventKind::Access);
        if let Some(node) = self.node_mut(id) {
            node.observers.collect_into(&mut out);
        }
        out
    }

    /// Marks the whole connected component of `id` modified and collects
    /// every observer attached anywhere in it.
    ///
    /// The walk follows parent and child edges from every visited handler.
    pub(crate) fn on_modify(&mut self, id: HandlerId) -> Notification {
        let mut out = Notification::new(EventKind::Modify);
        let mut scratch = core::mem::take(&mut self.scratch);
        scratch.reset();
        scratch.stack.push(id);

        while let Some(current) = scratch.stack.pop() {
            if !scratch.visited.insert(current) {
                continue;
            }
            let Some(node) = self.node_mut(current) else {
                continue;
            };
            node.modified = true;
            node.observers.collect_into(&mut out);
            scratch.stack.extend(
                node.parents
                    .iter()
                    .chain(node.children.keys())
                    .copied()
                    .filter(|h| !scratch.visited.contains(h)),
            );
        }

        tracing::debug!(
            handler = ?id,
            reached = scratch.visited.len(),
            observers = out.len(),
            "modification propagated"
        );
        self.scratch = scratch;
        out
    }

    fn node(&self, id: HandlerId) -> Option<&HandlerNode> {
        self.slots
            .get(id.slot())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: HandlerId) -> Option<&mut HandlerNode> {
        self.slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
    }
}
