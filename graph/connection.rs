/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Directed links between an output pin and an input pin.

use slotmap::new_key_type;

use super::node::NodeId;
use super::pin::{PinAddress, PinType};

new_key_type! {
    /// Generation-checked handle into the graph's connection table.
    pub struct ConnectionKey;
}

/// A link from an output pin to an input pin.
///
/// Endpoints are addressed by stable node identity and pin slot, so the same
/// value doubles as the record kept by actions while nodes are detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Connection {
    pub from: PinAddress,
    pub to: PinAddress,
}

impl Connection {
    pub const fn new(from: PinAddress, to: PinAddress) -> Self {
        Self { from, to }
    }

    /// Whether either endpoint sits on `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from.node == node || self.to.node == node
    }
}

/// Why a connect request was refused. The graph is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    UnknownNode(NodeId),
    UnknownPin(PinAddress),
    /// The input already has a connection; disconnect it first.
    InputOccupied(PinAddress),
    TypeMismatch { output: PinType, input: PinType },
}

impl std::fmt::Display for ConnectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectError::UnknownNode(id) => write!(f, "node {id} is not live"),
            ConnectError::UnknownPin(addr) => write!(f, "no pin at {addr}"),
            ConnectError::InputOccupied(addr) => write!(f, "input {addr} is already connected"),
            ConnectError::TypeMismatch { output, input } => {
                write!(f, "cannot feed {output:?} output into {input:?} input")
            },
        }
    }
}

impl std::error::Error for ConnectError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::pin::PinSlot;

    #[test]
    fn touches_matches_either_endpoint() {
        let a = NodeId::new(1);
        let b = NodeId::new(2);
        let conn = Connection::new(
            PinAddress::new(a, PinSlot::node(0)),
            PinAddress::new(b, PinSlot::component(0, 1)),
        );
        assert!(conn.touches(a));
        assert!(conn.touches(b));
        assert!(!conn.touches(NodeId::new(3)));
    }
}
