/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Paste: clone a node set under fresh ids and rewire internal connections.

use std::collections::HashMap;

use euclid::default::{Point2D, Vector2D};
use log::{debug, warn};

use super::{GraphStore, SelectionUpdateMode};
use crate::graph::{Connection, DetachedNodes, Graph, Node, NodeId, PinAddress};
use crate::history::{EditorAction, NodeBatch};

/// Nodes and internal connections a paste clones from.
#[derive(Debug, Clone, Default)]
pub struct PasteSource {
    nodes: Vec<Node>,
    /// Connections keyed by their input end.
    inbound: HashMap<PinAddress, Connection>,
}

impl PasteSource {
    /// Snapshot live nodes, in the given order. Dead ids are skipped.
    pub fn from_live(graph: &Graph, ids: &[NodeId]) -> Self {
        let mut source = Self::default();
        for &id in ids {
            let Some(node) = graph.get_node(id) else {
                debug!("paste: copied node {id} no longer exists");
                continue;
            };
            for slot in node.input_slots() {
                let to = PinAddress::new(id, slot);
                if let Some(connection) = graph.connection_into(to) {
                    source.inbound.insert(to, *connection);
                }
            }
            source.nodes.push(node.clone());
        }
        source
    }

    pub fn from_detached(detached: &DetachedNodes) -> Self {
        Self {
            nodes: detached.nodes().to_vec(),
            inbound: detached
                .connections()
                .iter()
                .map(|connection| (connection.to, *connection))
                .collect(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position the paste target maps onto: the first node's position.
    pub fn anchor(&self) -> Option<Point2D<f32>> {
        self.nodes.first().map(|node| node.position)
    }

    fn connection_into(&self, to: PinAddress) -> Option<&Connection> {
        self.inbound.get(&to)
    }
}

/// Bounded original-to-clone id table for a single paste.
///
/// Once full, further originals stay unmapped; their clones still paste but
/// never receive reconstructed connections.
#[derive(Debug, Clone)]
pub struct PasteRemapper {
    map: HashMap<NodeId, NodeId>,
    capacity: usize,
}

impl PasteRemapper {
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Record `original -> clone`. False when the table is full.
    pub fn register(&mut self, original: NodeId, clone: NodeId) -> bool {
        if self.map.len() >= self.capacity && !self.map.contains_key(&original) {
            return false;
        }
        self.map.insert(original, clone);
        true
    }

    pub fn lookup(&self, original: NodeId) -> Option<NodeId> {
        self.map.get(&original).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Result of a paste.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PasteOutcome {
    /// Fresh ids, in source order.
    pub clones: Vec<NodeId>,
    /// Connections rebuilt between clones.
    pub connections: usize,
    /// Clones whose original did not fit in the id table.
    pub unmapped: usize,
}

pub(super) fn paste_into(
    store: &mut GraphStore,
    source: PasteSource,
    target: Point2D<f32>,
) -> PasteOutcome {
    let offset: Vector2D<f32> = match source.anchor() {
        Some(anchor) => target - anchor,
        None => return PasteOutcome::default(),
    };

    let mut remapper = PasteRemapper::new(store.paste_map_capacity);
    let mut outcome = PasteOutcome::default();
    let mut clones = Vec::with_capacity(source.nodes.len());
    for original in &source.nodes {
        let Some(id) = store.allocate_id() else {
            break;
        };
        let mut clone = original.detached_clone(id);
        clone.position += offset;
        if !remapper.register(original.id(), id) {
            outcome.unmapped += 1;
        }
        clones.push(clone);
    }

    for clone in clones {
        let id = clone.id();
        if store.graph.insert_node(clone).is_some() {
            outcome.clones.push(id);
        } else {
            warn!("paste: fresh id {id} was already live");
        }
    }
    if outcome.clones.is_empty() {
        return outcome;
    }
    store.add_editor_action(EditorAction::CreateNodes(NodeBatch::live(
        outcome.clones.clone(),
    )));

    for original in &source.nodes {
        let Some(clone_id) = remapper.lookup(original.id()) else {
            continue;
        };
        for slot in original.input_slots() {
            let Some(connection) = source.connection_into(PinAddress::new(original.id(), slot))
            else {
                continue;
            };
            let Some(from_clone) = remapper.lookup(connection.from.node) else {
                continue;
            };
            let from = PinAddress::new(from_clone, connection.from.slot);
            let to = PinAddress::new(clone_id, slot);
            match store.graph.connect(from, to) {
                Ok(_) => outcome.connections += 1,
                Err(error) => warn!("paste: could not rewire {from} -> {to}: {error}"),
            }
        }
    }

    store
        .selection
        .update_many(outcome.clones.clone(), SelectionUpdateMode::Replace);
    debug!(
        "paste: {} nodes, {} connections, {} unmapped",
        outcome.clones.len(),
        outcome.connections,
        outcome.unmapped
    );
    outcome
}
