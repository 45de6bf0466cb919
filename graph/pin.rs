/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Typed pins and the addresses used to reach them.

use super::connection::ConnectionKey;
use super::node::NodeId;

/// Value type carried by a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinType {
    Boolean,
    String,
    Integer,
    Float,
    /// Opaque payload; an input of this type accepts any source.
    Data,
}

impl PinType {
    /// Whether an input pin of this type may be fed by an output of `source`.
    pub fn accepts(self, source: PinType) -> bool {
        self == source || self == PinType::Data
    }
}

/// An input socket. Holds at most one connection back-reference.
#[derive(Debug, Clone, PartialEq)]
pub struct InputPin {
    pub name: String,
    pub pin_type: PinType,
    pub(crate) connection: Option<ConnectionKey>,
}

impl InputPin {
    pub fn new(name: impl Into<String>, pin_type: PinType) -> Self {
        Self {
            name: name.into(),
            pin_type,
            connection: None,
        }
    }

    /// The connection feeding this pin, if any.
    pub fn connection(&self) -> Option<ConnectionKey> {
        self.connection
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

/// An output socket. May be the source of any number of connections.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPin {
    pub name: String,
    pub pin_type: PinType,
    pub(crate) connections: Vec<ConnectionKey>,
}

impl OutputPin {
    pub fn new(name: impl Into<String>, pin_type: PinType) -> Self {
        Self {
            name: name.into(),
            pin_type,
            connections: Vec::new(),
        }
    }

    pub fn connections(&self) -> &[ConnectionKey] {
        &self.connections
    }

    pub fn is_connected(&self) -> bool {
        !self.connections.is_empty()
    }
}

/// Position of a pin inside its node.
///
/// `component == None` addresses a pin owned directly by the node; otherwise
/// the pin belongs to the component at that index. `index` is the position in
/// the owner's input or output list, depending on which side is addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinSlot {
    pub component: Option<usize>,
    pub index: usize,
}

impl PinSlot {
    /// A pin owned by the node itself.
    pub const fn node(index: usize) -> Self {
        Self {
            component: None,
            index,
        }
    }

    /// A pin owned by the component at `component`.
    pub const fn component(component: usize, index: usize) -> Self {
        Self {
            component: Some(component),
            index,
        }
    }
}

/// Fully qualified pin: node identity plus slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinAddress {
    pub node: NodeId,
    pub slot: PinSlot,
}

impl PinAddress {
    pub const fn new(node: NodeId, slot: PinSlot) -> Self {
        Self { node, slot }
    }
}

impl std::fmt::Display for PinAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.slot.component {
            Some(component) => write!(f, "{}:{}/{}", self.node, component, self.slot.index),
            None => write!(f, "{}:-/{}", self.node, self.slot.index),
        }
    }
}
