// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Observe: fine-grained observation of shared object graphs.
//!
//! This crate tracks reads and writes on graphs of shared values (objects,
//! arrays, maps, sets, and dates) and tells interested observers when
//! something they depend on was read or changed. It is built from:
//!
//! - **Values** ([`Value`], [`Object`], [`Array`], [`Map`], [`Set`], [`Date`]):
//!   A small dynamic object model. The five target kinds are shared handles,
//!   so graphs may share nodes and contain cycles.
//! - **Handler graph** ([`HandlerGraph`]): One node per tracked target, linked
//!   by refcounted parent/child edges that mirror which target holds which.
//! - **Registry** ([`Registry`], [`RegistryBuilder`]): Binds targets to
//!   handlers, attaches [`Observer`]s, and delivers events.
//! - **Proxy dispatch** ([`Registry::observable_proxy`]): Installs handlers on
//!   a value and, depending on its kind, on what it holds.
//! - **Tracked views** ([`Tracked`] and friends): The accessors through which
//!   reads become access events and writes become modification events.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_observe::{Array, Object, Observer, Registry, Value};
//!
//! #[derive(Default)]
//! struct Repaint {
//!     needed: Cell<bool>,
//! }
//!
//! impl Observer for Repaint {
//!     fn on_access(&self) {}
//!     fn on_modify(&self) {
//!         self.needed.set(true);
//!     }
//! }
//!
//! let registry = Registry::new();
//! let state: Object = [("todos", Value::from(Array::new()))].into_iter().collect();
//! let state = registry.proxy_deep(state);
//!
//! let repaint = Rc::new(Repaint::default());
//! registry.attach(&state, &repaint);
//!
//! // A push on a nested array reaches the observer of the root.
//! let todos = state.as_object().unwrap().get("todos");
//! todos.as_array().unwrap().push("write docs");
//! assert!(repaint.needed.get());
//! ```
//!
//! ## Shallow and Deep Tracking
//!
//! An object is *observed* when it is proxied with `observed = Some(true)`
//! (see [`Registry::proxy_deep`]) or when the registry's predicate accepts it
//! (by default: objects of an observed [`Class`]). Observed objects have
//! their writable fields proxied as children, and so does anything later
//! stored into them. Objects that are not observed are tracked shallowly:
//! their own reads and writes report events, but what they hold is left
//! alone.
//!
//! Arrays and maps are always deep. Sets never proxy their elements. Dates
//! have no children.
//!
//! ## Propagation
//!
//! An access notifies only the observers of the handler that was read. A
//! modification marks the whole connected component of the modified handler,
//! walking both parent and child edges, and notifies every observer attached
//! anywhere in it exactly once. The modified flag is edge-triggered: read and
//! clear it with [`Registry::drop_modified`].
//!
//! Observers run after the registry has released its internal borrows, so
//! they may read tracked values, attach or detach observers, or even modify
//! values from inside a callback.
//!
//! ## Reclamation
//!
//! The registry holds targets weakly. When a target is dropped its handler
//! stays in the graph until [`Registry::sweep`] disposes it. Handler ids are
//! generation-checked; using a disposed id is a silent no-op, or a
//! [`StaleHandlerError`] where a call would otherwise create state.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.
//!
//! ## Features
//!
//! This crate currently has no optional features. All functionality is always
//! available.

#![no_std]

extern crate alloc;

mod date;
mod graph;
mod id;
mod observer;
mod proxy;
mod registry;
mod scratch;
mod tracked;
mod value;

pub use date::Date;
pub use graph::HandlerGraph;
pub use id::{HandlerId, StaleHandlerError};
pub use observer::Observer;
pub use proxy::observable_target;
pub use registry::{Registry, RegistryBuilder};
pub use tracked::{Tracked, TrackedArray, TrackedDate, TrackedMap, TrackedObject, TrackedSet};
pub use value::{Array, Class, Map, Object, ObservableTarget, Set, TargetKey, Value};
