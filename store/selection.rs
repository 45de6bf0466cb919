/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::graph::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionUpdateMode {
    Replace,
    Add,
    Toggle,
}

/// Selected node ids in the order they were picked.
///
/// The first id anchors a paste.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    order: Vec<NodeId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ordered(&self) -> &[NodeId] {
        &self.order
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.order.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Plain click replaces the selection with `id`; a multi-select click
    /// flips its membership.
    pub fn select(&mut self, id: NodeId, multi_select: bool) {
        if multi_select {
            self.toggle(id);
        } else {
            self.order.clear();
            self.order.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    /// Apply `ids` in order. Duplicates within `ids` count once for `Add`
    /// and `Replace`.
    pub fn update_many(&mut self, ids: Vec<NodeId>, mode: SelectionUpdateMode) {
        match mode {
            SelectionUpdateMode::Replace => {
                self.order.clear();
                self.extend(ids);
            },
            SelectionUpdateMode::Add => self.extend(ids),
            SelectionUpdateMode::Toggle => {
                for id in ids {
                    self.toggle(id);
                }
            },
        }
    }

    /// Drop ids for which `is_live` returns false.
    pub(crate) fn retain_live(&mut self, is_live: impl Fn(NodeId) -> bool) {
        self.order.retain(|id| is_live(*id));
    }

    fn extend(&mut self, ids: Vec<NodeId>) {
        for id in ids {
            if !self.contains(id) {
                self.order.push(id);
            }
        }
    }

    fn toggle(&mut self, id: NodeId) {
        match self.order.iter().position(|existing| *existing == id) {
            Some(index) => {
                self.order.remove(index);
            },
            None => self.order.push(id),
        }
    }
}
