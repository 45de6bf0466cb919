/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Reversible editor actions.

use euclid::default::Vector2D;
use log::warn;

use crate::graph::{DetachedNodes, FieldAddress, FieldValue, Graph, NodeId};

/// Discriminant of an [`EditorAction`], for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    NewCanvas,
    MoveNodes,
    EditText,
    CreateNodes,
    DeleteNodes,
}

/// A recorded mutation that can be reversed and re-applied.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// History sentinel; always the first entry, never applied or reversed.
    NewCanvas,
    MoveNodes(MoveNodes),
    EditText(EditText),
    CreateNodes(NodeBatch),
    DeleteNodes(NodeBatch),
}

impl EditorAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            EditorAction::NewCanvas => ActionKind::NewCanvas,
            EditorAction::MoveNodes(_) => ActionKind::MoveNodes,
            EditorAction::EditText(_) => ActionKind::EditText,
            EditorAction::CreateNodes(_) => ActionKind::CreateNodes,
            EditorAction::DeleteNodes(_) => ActionKind::DeleteNodes,
        }
    }

    /// The node batch of a create or delete action.
    pub fn batch(&self) -> Option<&NodeBatch> {
        match self {
            EditorAction::CreateNodes(batch) | EditorAction::DeleteNodes(batch) => Some(batch),
            _ => None,
        }
    }

    pub(crate) fn undo(&mut self, graph: &mut Graph) {
        match self {
            EditorAction::NewCanvas => {},
            EditorAction::MoveNodes(moves) => moves.shift(graph, 1.0),
            EditorAction::EditText(edit) => edit.assign(graph, false),
            EditorAction::CreateNodes(batch) => batch.reclaim(graph),
            EditorAction::DeleteNodes(batch) => batch.release(graph),
        }
    }

    pub(crate) fn redo(&mut self, graph: &mut Graph) {
        match self {
            EditorAction::NewCanvas => {},
            EditorAction::MoveNodes(moves) => moves.shift(graph, -1.0),
            EditorAction::EditText(edit) => edit.assign(graph, true),
            EditorAction::CreateNodes(batch) => batch.release(graph),
            EditorAction::DeleteNodes(batch) => batch.reclaim(graph),
        }
    }
}

/// Per-node positional deltas. Each delta is `previous - current`, so undo
/// adds it back and redo subtracts it.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveNodes {
    deltas: Vec<(NodeId, Vector2D<f32>)>,
}

impl MoveNodes {
    pub fn new(deltas: Vec<(NodeId, Vector2D<f32>)>) -> Self {
        Self { deltas }
    }

    pub fn deltas(&self) -> &[(NodeId, Vector2D<f32>)] {
        &self.deltas
    }

    fn shift(&self, graph: &mut Graph, sign: f32) {
        for (id, delta) in &self.deltas {
            match graph.get_node_mut(*id) {
                Some(node) => node.position += *delta * sign,
                None => warn!("move: node {id} is not live"),
            }
        }
    }
}

/// Before/after snapshot of one text field.
#[derive(Debug, Clone, PartialEq)]
pub struct EditText {
    field: FieldAddress,
    before: String,
    after: String,
}

impl EditText {
    /// Build the action, or `None` when the text did not change.
    pub fn commit(field: FieldAddress, before: String, after: String) -> Option<Self> {
        if before == after {
            return None;
        }
        Some(Self {
            field,
            before,
            after,
        })
    }

    pub fn field(&self) -> FieldAddress {
        self.field
    }

    pub fn before(&self) -> &str {
        &self.before
    }

    pub fn after(&self) -> &str {
        &self.after
    }

    fn assign(&self, graph: &mut Graph, forward: bool) {
        let text = if forward { &self.after } else { &self.before };
        let addr = self.field;
        match graph
            .get_node_mut(addr.node)
            .and_then(|node| node.field_value_mut(addr.component, addr.field))
        {
            Some(FieldValue::Text(current)) => current.clone_from(text),
            Some(_) => warn!(
                "edit: field {}/{} on node {} is not text",
                addr.component, addr.field, addr.node
            ),
            None => warn!(
                "edit: field {}/{} on node {} is gone",
                addr.component, addr.field, addr.node
            ),
        }
    }
}

/// Who currently owns the nodes of a create/delete action.
#[derive(Debug, Clone, PartialEq)]
pub enum Custody {
    /// The nodes are live in the graph; the action only remembers their ids.
    OwnedByStore(Vec<NodeId>),
    /// The nodes were lifted out of the graph and live inside the action.
    OwnedByAction(DetachedNodes),
}

/// The node set moved by a `CreateNodes` or `DeleteNodes` action.
///
/// Ownership moves as a whole: `release` hands every node to the graph and
/// `reclaim` takes every node back. Dropping the batch drops the nodes only
/// while it holds them.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBatch {
    custody: Custody,
}

impl NodeBatch {
    /// Batch for nodes that are already live.
    pub fn live(ids: Vec<NodeId>) -> Self {
        Self {
            custody: Custody::OwnedByStore(ids),
        }
    }

    /// Batch for nodes that were just lifted out of the graph.
    pub fn detached(nodes: DetachedNodes) -> Self {
        Self {
            custody: Custody::OwnedByAction(nodes),
        }
    }

    pub fn custody(&self) -> &Custody {
        &self.custody
    }

    pub fn owns_nodes(&self) -> bool {
        matches!(self.custody, Custody::OwnedByAction(_))
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        match &self.custody {
            Custody::OwnedByStore(ids) => ids.clone(),
            Custody::OwnedByAction(detached) => detached.ids(),
        }
    }

    /// Whether `id` belongs to this batch, whichever side holds it.
    pub fn holds(&self, id: NodeId) -> bool {
        match &self.custody {
            Custody::OwnedByStore(ids) => ids.contains(&id),
            Custody::OwnedByAction(detached) => detached.nodes.iter().any(|node| node.id() == id),
        }
    }

    /// Action → graph.
    fn release(&mut self, graph: &mut Graph) {
        let Custody::OwnedByAction(detached) = &mut self.custody else {
            warn!("release: batch does not hold its nodes");
            return;
        };
        match graph.attach_nodes(std::mem::take(detached)) {
            Ok(ids) => self.custody = Custody::OwnedByStore(ids),
            Err(refused) => {
                warn!("release: {} nodes stay with the action", refused.len());
                *detached = refused;
            },
        }
    }

    /// Graph → action.
    fn reclaim(&mut self, graph: &mut Graph) {
        let Custody::OwnedByStore(ids) = &self.custody else {
            warn!("reclaim: batch already holds its nodes");
            return;
        };
        let detached = graph.detach_nodes(ids);
        self.custody = Custody::OwnedByAction(detached);
    }
}
