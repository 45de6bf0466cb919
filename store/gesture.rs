/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! In-progress pointer and keyboard gestures.
//!
//! Each gesture is a value owned by the host for its duration. Dragging and
//! typing update the graph live; `commit` records exactly one action and
//! consumes the value. Dropping a connection drag abandons it; node drags and
//! text sessions restore what they touched via `cancel`.

use euclid::default::{Point2D, Vector2D};
use log::debug;

use super::GraphStore;
use crate::graph::{ConnectError, ConnectionKey, FieldAddress, FieldValue, NodeId, PinAddress};
use crate::history::{EditText, EditorAction, MoveNodes};

/// Dragging a set of nodes with the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDrag {
    grab: Point2D<f32>,
    origins: Vec<(NodeId, Point2D<f32>)>,
}

impl NodeDrag {
    /// Start dragging the live nodes among `ids`, grabbed at `cursor`.
    pub fn begin(store: &GraphStore, ids: &[NodeId], cursor: Point2D<f32>) -> Option<Self> {
        let origins: Vec<_> = ids
            .iter()
            .filter_map(|id| store.node(*id).map(|node| (*id, node.position)))
            .collect();
        if origins.is_empty() {
            return None;
        }
        Some(Self {
            grab: cursor,
            origins,
        })
    }

    pub fn offset(&self, cursor: Point2D<f32>) -> Vector2D<f32> {
        cursor - self.grab
    }

    pub fn drag_to(&self, store: &mut GraphStore, cursor: Point2D<f32>) {
        let offset = self.offset(cursor);
        for (id, origin) in &self.origins {
            store.set_position(*id, *origin + offset);
        }
    }

    /// Record the drag as one `MoveNodes` action. A drag that ends where it
    /// started records nothing.
    pub fn commit(self, store: &mut GraphStore) -> bool {
        let deltas: Vec<_> = self
            .origins
            .iter()
            .filter_map(|(id, origin)| {
                let current = store.node(*id)?.position;
                let delta = *origin - current;
                (delta != Vector2D::zero()).then_some((*id, delta))
            })
            .collect();
        if deltas.is_empty() {
            debug!("drag: nothing moved");
            return false;
        }
        store.add_editor_action(EditorAction::MoveNodes(MoveNodes::new(deltas)))
    }

    pub fn cancel(self, store: &mut GraphStore) {
        for (id, origin) in self.origins {
            store.set_position(id, origin);
        }
    }
}

/// Dragging a wire out of an output pin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionDrag {
    from: PinAddress,
    cursor: Point2D<f32>,
}

impl ConnectionDrag {
    /// Start from `from`, which must name an existing output pin.
    pub fn begin(store: &GraphStore, from: PinAddress, cursor: Point2D<f32>) -> Option<Self> {
        store.node(from.node)?.output(from.slot)?;
        Some(Self { from, cursor })
    }

    pub fn source(&self) -> PinAddress {
        self.from
    }

    pub fn cursor(&self) -> Point2D<f32> {
        self.cursor
    }

    pub fn update(&mut self, cursor: Point2D<f32>) {
        self.cursor = cursor;
    }

    /// Whether dropping on `to` would connect. Used for hover feedback.
    pub fn accepts(&self, store: &GraphStore, to: PinAddress) -> bool {
        let source = store
            .node(self.from.node)
            .and_then(|node| node.output(self.from.slot));
        let target = store.node(to.node).and_then(|node| node.input(to.slot));
        match (source, target) {
            (Some(output), Some(input)) => {
                !input.is_connected() && input.pin_type.accepts(output.pin_type)
            },
            _ => false,
        }
    }

    pub fn commit(
        self,
        store: &mut GraphStore,
        to: PinAddress,
    ) -> Result<ConnectionKey, ConnectError> {
        store.connect(self.from, to)
    }
}

/// Typing into one text field.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditSession {
    field: FieldAddress,
    original: String,
}

impl TextEditSession {
    /// Start editing `field`; `None` unless it exists and holds text.
    pub fn begin(store: &GraphStore, field: FieldAddress) -> Option<Self> {
        let value = &store.node(field.node)?.field(field.component, field.field)?.value;
        let FieldValue::Text(original) = value else {
            return None;
        };
        Some(Self {
            field,
            original: original.clone(),
        })
    }

    pub fn field(&self) -> FieldAddress {
        self.field
    }

    pub fn update(&self, store: &mut GraphStore, text: &str) -> bool {
        store.set_text_field(self.field, text).is_some()
    }

    /// Record the session as one `EditText` action, or nothing if the text
    /// ended up unchanged.
    pub fn commit(self, store: &mut GraphStore) -> bool {
        let current = store
            .node(self.field.node)
            .and_then(|node| node.field(self.field.component, self.field.field))
            .and_then(|field| field.value.as_text())
            .map(str::to_string);
        let Some(current) = current else {
            return false;
        };
        match EditText::commit(self.field, self.original, current) {
            Some(action) => store.add_editor_action(EditorAction::EditText(action)),
            None => false,
        }
    }

    pub fn cancel(self, store: &mut GraphStore) {
        store.set_text_field(self.field, &self.original);
    }
}
