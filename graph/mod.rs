/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Graph data structures for the node editor.
//!
//! Core structures:
//! - `Graph`: node, connection and group tables backed by generational slot maps
//! - `Node`: template instance with position, size, pins and components
//! - `Connection`: directed link from an output pin to an input pin
//!
//! Boundary: the graph keeps pin back-references and the connection table in
//! lock-step. Every method either updates both sides or neither; callers never
//! touch back-references directly.

use std::collections::{HashMap, HashSet};

use log::warn;
use slotmap::SlotMap;

pub mod connection;
pub mod node;
pub mod pin;

pub use connection::{ConnectError, Connection, ConnectionKey};
pub use node::{
    Color, Component, Field, FieldAddress, FieldValue, GroupKey, Node, NodeGroup, NodeId, NodeKey,
};
pub use pin::{InputPin, OutputPin, PinAddress, PinSlot, PinType};

/// Nodes lifted out of the graph together with everything needed to put them
/// back: the connections that touched them and their group memberships.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetachedNodes {
    pub(crate) nodes: Vec<Node>,
    pub(crate) connections: Vec<Connection>,
    pub(crate) memberships: Vec<(GroupKey, NodeId)>,
}

impl DetachedNodes {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(Node::id).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The live document graph.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: SlotMap<NodeKey, Node>,
    /// Stable id to slot mapping.
    id_to_node: HashMap<NodeId, NodeKey>,
    connections: SlotMap<ConnectionKey, Connection>,
    groups: SlotMap<GroupKey, NodeGroup>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Returns `None` without touching the graph when the id is
    /// already live or is the absent sentinel.
    ///
    /// Any back-references carried by the node are dropped; connections are
    /// only ever created through [`Graph::connect`].
    pub fn insert_node(&mut self, mut node: Node) -> Option<NodeKey> {
        let id = node.id();
        if id.is_absent() || self.id_to_node.contains_key(&id) {
            return None;
        }
        node.clear_connections();
        let key = self.nodes.insert(node);
        self.id_to_node.insert(id, key);
        Some(key)
    }

    /// Remove a node, every connection touching it and its group memberships.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let key = *self.id_to_node.get(&id)?;
        for conn in self.connection_keys_touching(id) {
            self.disconnect(conn);
        }
        for group in self.groups.values_mut() {
            group.members.retain(|member| *member != id);
        }
        self.id_to_node.remove(&id);
        self.nodes.remove(key)
    }

    /// Lift the given live nodes out of the graph. Ids that are not live are
    /// ignored. Node order follows `ids`.
    pub fn detach_nodes(&mut self, ids: &[NodeId]) -> DetachedNodes {
        let mut detached = DetachedNodes::default();
        let mut seen: HashSet<ConnectionKey> = HashSet::new();

        for &id in ids {
            if !self.contains_node(id) {
                continue;
            }
            for key in self.connection_keys_touching(id) {
                if seen.insert(key)
                    && let Some(conn) = self.connections.get(key)
                {
                    detached.connections.push(*conn);
                }
            }
            for (group_key, group) in &self.groups {
                if group.contains(id) {
                    detached.memberships.push((group_key, id));
                }
            }
        }

        for &id in ids {
            if let Some(node) = self.remove_node(id) {
                detached.nodes.push(node);
            }
        }
        detached
    }

    /// Put detached nodes back, restoring their connections and group
    /// memberships where the other side still exists.
    ///
    /// All or nothing: if any id is live or the absent sentinel, the bundle is
    /// handed back untouched.
    pub fn attach_nodes(&mut self, detached: DetachedNodes) -> Result<Vec<NodeId>, DetachedNodes> {
        if let Some(clash) = detached
            .nodes
            .iter()
            .map(Node::id)
            .find(|id| id.is_absent() || self.contains_node(*id))
        {
            warn!("attach: node {clash} is already live, refusing the whole bundle");
            return Err(detached);
        }
        let mut attached = Vec::with_capacity(detached.nodes.len());
        for node in detached.nodes {
            let id = node.id();
            if self.insert_node(node).is_some() {
                attached.push(id);
            }
        }
        for (group_key, id) in detached.memberships {
            if let Some(group) = self.groups.get_mut(group_key)
                && !group.members.contains(&id)
            {
                group.members.push(id);
            }
        }
        for conn in detached.connections {
            if let Err(e) = self.connect(conn.from, conn.to) {
                warn!("attach: could not restore connection {} -> {}: {e}", conn.from, conn.to);
            }
        }
        Ok(attached)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.id_to_node.contains_key(&id)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(*self.id_to_node.get(&id)?)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(*self.id_to_node.get(&id)?)
    }

    /// Slot handle for a live node.
    pub fn node_key(&self, id: NodeId) -> Option<NodeKey> {
        self.id_to_node.get(&id).copied()
    }

    pub fn node_by_key(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Live node ids in ascending order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.id_to_node.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Highest live node id, if any.
    pub fn max_node_id(&self) -> Option<NodeId> {
        self.id_to_node.keys().copied().max()
    }

    /// Link `from` (an output pin) to `to` (an input pin).
    ///
    /// All-or-nothing: on error neither pin nor the connection table changes.
    pub fn connect(
        &mut self,
        from: PinAddress,
        to: PinAddress,
    ) -> Result<ConnectionKey, ConnectError> {
        let source = self
            .get_node(from.node)
            .ok_or(ConnectError::UnknownNode(from.node))?;
        let output_type = source
            .output(from.slot)
            .ok_or(ConnectError::UnknownPin(from))?
            .pin_type;
        let target = self
            .get_node(to.node)
            .ok_or(ConnectError::UnknownNode(to.node))?;
        let input = target.input(to.slot).ok_or(ConnectError::UnknownPin(to))?;
        if input.is_connected() {
            return Err(ConnectError::InputOccupied(to));
        }
        if !input.pin_type.accepts(output_type) {
            return Err(ConnectError::TypeMismatch {
                output: output_type,
                input: input.pin_type,
            });
        }

        let key = self.connections.insert(Connection::new(from, to));
        // Both endpoints were resolved above.
        if let Some(pin) = self.get_node_mut(to.node).and_then(|n| n.input_mut(to.slot)) {
            pin.connection = Some(key);
        }
        if let Some(pin) = self.get_node_mut(from.node).and_then(|n| n.output_mut(from.slot)) {
            pin.connections.push(key);
        }
        Ok(key)
    }

    /// Remove a connection and clear both back-references.
    pub fn disconnect(&mut self, key: ConnectionKey) -> Option<Connection> {
        let conn = self.connections.remove(key)?;
        if let Some(pin) = self
            .get_node_mut(conn.to.node)
            .and_then(|n| n.input_mut(conn.to.slot))
            && pin.connection == Some(key)
        {
            pin.connection = None;
        }
        if let Some(pin) = self
            .get_node_mut(conn.from.node)
            .and_then(|n| n.output_mut(conn.from.slot))
        {
            pin.connections.retain(|existing| *existing != key);
        }
        Some(conn)
    }

    /// Remove whatever connection feeds the given input pin.
    pub fn disconnect_input(&mut self, to: PinAddress) -> Option<Connection> {
        let key = self.get_node(to.node)?.input(to.slot)?.connection()?;
        self.disconnect(key)
    }

    pub fn connection(&self, key: ConnectionKey) -> Option<&Connection> {
        self.connections.get(key)
    }

    pub fn connections(&self) -> impl Iterator<Item = (ConnectionKey, &Connection)> {
        self.connections.iter()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The connection feeding `to`, if any.
    pub fn connection_into(&self, to: PinAddress) -> Option<&Connection> {
        let key = self.get_node(to.node)?.input(to.slot)?.connection()?;
        self.connections.get(key)
    }

    fn connection_keys_touching(&self, id: NodeId) -> Vec<ConnectionKey> {
        self.connections
            .iter()
            .filter(|(_, conn)| conn.touches(id))
            .map(|(key, _)| key)
            .collect()
    }

    /// Add a group. Members that are not live are dropped.
    pub fn add_group(&mut self, mut group: NodeGroup, members: &[NodeId]) -> GroupKey {
        group.members.clear();
        for &id in members {
            if self.contains_node(id) && !group.members.contains(&id) {
                group.members.push(id);
            }
        }
        self.groups.insert(group)
    }

    pub fn remove_group(&mut self, key: GroupKey) -> Option<NodeGroup> {
        self.groups.remove(key)
    }

    pub fn group(&self, key: GroupKey) -> Option<&NodeGroup> {
        self.groups.get(key)
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupKey, &NodeGroup)> {
        self.groups.iter()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
