/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Bounded, cursor-based undo/redo history.
//!
//! The log always starts with the `NewCanvas` sentinel. `cursor` indexes the
//! most recently applied action; `cursor == 0` means nothing can be undone.

pub mod actions;

use log::{debug, warn};

use crate::graph::{Graph, NodeId};
pub use actions::{ActionKind, Custody, EditText, EditorAction, MoveNodes, NodeBatch};

/// Default cap on log length, sentinel included.
pub const DEFAULT_HISTORY_CAPACITY: usize = 128;

#[derive(Debug, Clone)]
pub struct ActionLog {
    actions: Vec<EditorAction>,
    cursor: usize,
    capacity: usize,
}

impl ActionLog {
    /// New log holding only the sentinel. `capacity` is clamped to at least 2
    /// so one real action always fits next to the sentinel.
    pub fn new(capacity: usize) -> Self {
        Self {
            actions: vec![EditorAction::NewCanvas],
            cursor: 0,
            capacity: capacity.max(2),
        }
    }

    /// Append an applied action.
    ///
    /// Drops every action after the cursor, appends, and evicts the oldest
    /// real action once the log exceeds its capacity. A `NewCanvas` action is
    /// refused since only the sentinel may hold that variant.
    pub fn push(&mut self, action: EditorAction) -> bool {
        if action.kind() == ActionKind::NewCanvas {
            warn!("history: refusing to append a second NewCanvas sentinel");
            return false;
        }
        let discarded = self.actions.len() - (self.cursor + 1);
        if discarded > 0 {
            debug!("history: dropping {discarded} redo entries");
        }
        self.actions.truncate(self.cursor + 1);
        self.actions.push(action);
        self.cursor = self.actions.len() - 1;

        if self.actions.len() > self.capacity {
            let evicted = self.actions.remove(1);
            self.cursor -= 1;
            debug!("history: evicted oldest {:?} entry", evicted.kind());
        }
        true
    }

    /// Reverse the action under the cursor. Returns false when only the
    /// sentinel is applied.
    pub fn undo(&mut self, graph: &mut Graph) -> bool {
        if self.cursor < 1 {
            return false;
        }
        self.actions[self.cursor].undo(graph);
        self.cursor -= 1;
        true
    }

    /// Re-apply the action after the cursor. Returns false at the end of
    /// the log.
    pub fn redo(&mut self, graph: &mut Graph) -> bool {
        if self.cursor + 1 >= self.actions.len() {
            return false;
        }
        self.cursor += 1;
        self.actions[self.cursor].redo(graph);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 1
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.actions.len()
    }

    /// Number of entries, sentinel included.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Always false: the sentinel is never removed.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&EditorAction> {
        self.actions.get(index)
    }

    /// Whether any create or delete entry, applied or not, holds `id`.
    pub fn holds_node(&self, id: NodeId) -> bool {
        self.actions
            .iter()
            .filter_map(EditorAction::batch)
            .any(|batch| batch.holds(id))
    }

    pub fn kinds(&self) -> Vec<ActionKind> {
        self.actions.iter().map(EditorAction::kind).collect()
    }

    /// Drop every entry but the sentinel.
    pub fn reset(&mut self) {
        self.actions.truncate(1);
        self.cursor = 0;
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
