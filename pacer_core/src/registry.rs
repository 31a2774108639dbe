// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Liveness markers for issued animation handles.

use alloc::collections::BTreeMap;

use crate::animation::AnimationId;

/// Outcome of a compaction pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Compacted {
    pub(crate) removed: usize,
    pub(crate) retained: usize,
}

/// Maps issued handles to a running (`true`) or stopped (`false`) marker.
///
/// Stopped markers linger until a compaction pass drops them; a handle that
/// was never issued, or whose marker was compacted away, reads as not
/// running.
#[derive(Debug)]
pub(crate) struct Registry {
    live: BTreeMap<AnimationId, bool>,
    next: AnimationId,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            live: BTreeMap::new(),
            next: AnimationId::first(),
        }
    }

    /// Issues the next handle without registering it.
    pub(crate) fn issue(&mut self) -> AnimationId {
        let id = self.next;
        self.next = id.next();
        id
    }

    /// Marks a freshly issued handle as running.
    pub(crate) fn mark_running(&mut self, id: AnimationId) {
        self.live.insert(id, true);
    }

    /// Flips a running handle to stopped. Returns whether it was running.
    pub(crate) fn stop(&mut self, id: AnimationId) -> bool {
        match self.live.get_mut(&id) {
            Some(live) if *live => {
                *live = false;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_running(&self, id: AnimationId) -> bool {
        self.live.get(&id).copied().unwrap_or(false)
    }

    pub(crate) fn running_count(&self) -> usize {
        self.live.values().filter(|live| **live).count()
    }

    /// Number of markers held, stopped ones included.
    pub(crate) fn len(&self) -> usize {
        self.live.len()
    }

    /// Drops every stopped marker.
    pub(crate) fn compact(&mut self) -> Compacted {
        let before = self.live.len();
        self.live.retain(|_, live| *live);
        Compacted {
            removed: before - self.live.len(),
            retained: self.live.len(),
        }
    }
}
