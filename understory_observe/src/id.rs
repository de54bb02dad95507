// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handler identification.

use core::fmt;

/// A generation-checked handle to a node of the
/// [`HandlerGraph`](crate::HandlerGraph).
///
/// Handler slots are reused after [`dispose`](crate::HandlerGraph::dispose);
/// the generation makes every id issued before disposal stale, so an old id
/// can never address the node that later reuses its slot.
///
/// # Example
///
/// ```rust
/// use understory_observe::HandlerGraph;
///
/// let mut graph = HandlerGraph::new();
/// let id = graph.create(None, false).unwrap();
/// assert!(graph.is_alive(id));
///
/// graph.dispose(id);
/// assert!(!graph.is_alive(id));
///
/// // The slot is reused, but the old id stays stale.
/// let reused = graph.create(None, false).unwrap();
/// assert_eq!(reused.index(), id.index());
/// assert_ne!(reused, id);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId {
    index: u32,
    generation: u32,
}

impl HandlerId {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the arena slot index of this handler.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation of the slot at the time this id was issued.
    #[must_use]
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    #[inline]
    pub(crate) fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerId({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler {}v{}", self.index, self.generation)
    }
}

/// Error returned when a caller-supplied [`HandlerId`] no longer refers to a
/// live handler.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct StaleHandlerError {
    /// The stale handler id.
    pub handler: HandlerId,
}

impl fmt::Debug for StaleHandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StaleHandlerError {{ handler: {:?} }}", self.handler)
    }
}

impl fmt::Display for StaleHandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} was disposed", self.handler)
    }
}

impl core::error::Error for StaleHandlerError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn handler_id_debug_and_display() {
        let id = HandlerId::new(3, 7);
        assert_eq!(format!("{:?}", id), "HandlerId(3v7)");
        assert_eq!(format!("{}", id), "handler 3v7");
    }

    #[test]
    fn generation_distinguishes_ids() {
        let a = HandlerId::new(1, 0);
        let b = HandlerId::new(1, 1);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
    }

    #[test]
    fn stale_error_display() {
        let err = StaleHandlerError {
            handler: HandlerId::new(2, 5),
        };
        assert_eq!(format!("{}", err), "handler 2v5 was disposed");
    }
}
