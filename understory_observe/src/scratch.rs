// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reusable scratch buffers for handler graph traversals.

use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::id::HandlerId;

/// Reusable scratch storage for graph traversals.
///
/// Every modification walks the connected component of the modified handler
/// and every containment query walks its ancestors. The graph keeps one
/// scratch instance and reuses its capacity across those walks.
#[derive(Debug, Default)]
pub(crate) struct TraversalScratch {
    pub(crate) stack: Vec<HandlerId>,
    pub(crate) visited: HashSet<HandlerId>,
}

impl TraversalScratch {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            stack: Vec::with_capacity(capacity),
            visited: HashSet::with_capacity(capacity),
        }
    }

    pub(crate) fn reset(&mut self) {
        self.stack.clear();
        self.visited.clear();
    }
}
