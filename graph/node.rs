/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Nodes, their components and field state, and node groups.

use euclid::default::{Point2D, Rect, Size2D};

use super::pin::{InputPin, OutputPin, PinSlot};
use crate::registries::templates::NodeBlueprint;

/// Document-level node identity. Allocated monotonically by the store and
/// stable across undo/redo and save/load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Reserved "no node" value; never allocated.
    pub const ABSENT: NodeId = NodeId(u32::MAX);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_absent(self) -> bool {
        self.0 == u32::MAX
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_absent() {
            f.write_str("<absent>")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// RGBA node tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0x5a, 0x5f, 0x6b)
    }
}

/// Value held by a component field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Whether `other` carries the same variant, ignoring the payload.
    pub fn same_kind(&self, other: &FieldValue) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Address of one field inside one component of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldAddress {
    pub node: NodeId,
    pub component: usize,
    pub field: usize,
}

impl FieldAddress {
    pub const fn new(node: NodeId, component: usize, field: usize) -> Self {
        Self {
            node,
            component,
            field,
        }
    }
}

/// A named sub-widget of a node.
///
/// The pin lists and the field list have a fixed shape once built: callers
/// may change field values but never add or remove pins or fields, since
/// connections and saved documents refer to them by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    name: String,
    inputs: Vec<InputPin>,
    outputs: Vec<OutputPin>,
    fields: Vec<Field>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_input(mut self, pin: InputPin) -> Self {
        self.inputs.push(pin);
        self
    }

    pub fn with_output(mut self, pin: OutputPin) -> Self {
        self.outputs.push(pin);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push(Field::new(name, value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &[InputPin] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputPin] {
        &self.outputs
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    pub fn field_value_mut(&mut self, index: usize) -> Option<&mut FieldValue> {
        self.fields.get_mut(index).map(|field| &mut field.value)
    }

    fn clear_connections(&mut self) {
        for pin in &mut self.inputs {
            pin.connection = None;
        }
        for pin in &mut self.outputs {
            pin.connections.clear();
        }
    }
}

/// A node on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    template: String,
    /// Top-left corner in canvas space.
    pub position: Point2D<f32>,
    pub size: Size2D<f32>,
    pub color: Color,
    inputs: Vec<InputPin>,
    outputs: Vec<OutputPin>,
    components: Vec<Component>,
}

impl Node {
    /// Build a node from a template blueprint.
    pub fn from_blueprint(
        id: NodeId,
        template: impl Into<String>,
        position: Point2D<f32>,
        blueprint: NodeBlueprint,
    ) -> Self {
        Self {
            id,
            template: template.into(),
            position,
            size: blueprint.size,
            color: blueprint.color,
            inputs: blueprint.inputs,
            outputs: blueprint.outputs,
            components: blueprint.components,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Pins owned by the node itself (component index `-1` on disk).
    pub fn inputs(&self) -> &[InputPin] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[OutputPin] {
        &self.outputs
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, index: usize) -> Option<&Component> {
        self.components.get(index)
    }

    pub fn component_mut(&mut self, index: usize) -> Option<&mut Component> {
        self.components.get_mut(index)
    }

    pub fn field(&self, component: usize, field: usize) -> Option<&Field> {
        self.components.get(component)?.field(field)
    }

    pub fn field_value_mut(&mut self, component: usize, field: usize) -> Option<&mut FieldValue> {
        self.components.get_mut(component)?.field_value_mut(field)
    }

    /// Bounding rectangle in canvas space.
    pub fn bounds(&self) -> Rect<f32> {
        Rect::new(self.position, self.size)
    }

    pub fn input(&self, slot: PinSlot) -> Option<&InputPin> {
        match slot.component {
            None => self.inputs.get(slot.index),
            Some(c) => self.components.get(c)?.inputs.get(slot.index),
        }
    }

    pub fn output(&self, slot: PinSlot) -> Option<&OutputPin> {
        match slot.component {
            None => self.outputs.get(slot.index),
            Some(c) => self.components.get(c)?.outputs.get(slot.index),
        }
    }

    pub(crate) fn input_mut(&mut self, slot: PinSlot) -> Option<&mut InputPin> {
        match slot.component {
            None => self.inputs.get_mut(slot.index),
            Some(c) => self.components.get_mut(c)?.inputs.get_mut(slot.index),
        }
    }

    pub(crate) fn output_mut(&mut self, slot: PinSlot) -> Option<&mut OutputPin> {
        match slot.component {
            None => self.outputs.get_mut(slot.index),
            Some(c) => self.components.get_mut(c)?.outputs.get_mut(slot.index),
        }
    }

    /// Every input slot, node-owned pins first, then components in order.
    pub fn input_slots(&self) -> Vec<PinSlot> {
        let mut slots: Vec<PinSlot> = (0..self.inputs.len()).map(PinSlot::node).collect();
        for (c, component) in self.components.iter().enumerate() {
            slots.extend((0..component.inputs.len()).map(|i| PinSlot::component(c, i)));
        }
        slots
    }

    /// Deep copy under a new identity with every connection back-reference
    /// dropped.
    pub fn detached_clone(&self, id: NodeId) -> Node {
        let mut clone = self.clone();
        clone.id = id;
        clone.clear_connections();
        clone
    }

    pub(crate) fn clear_connections(&mut self) {
        for pin in &mut self.inputs {
            pin.connection = None;
        }
        for pin in &mut self.outputs {
            pin.connections.clear();
        }
        for component in &mut self.components {
            component.clear_connections();
        }
    }

    pub(crate) fn has_connections(&self) -> bool {
        self.inputs.iter().any(InputPin::is_connected)
            || self.outputs.iter().any(OutputPin::is_connected)
            || self.components.iter().any(|component| {
                component.inputs.iter().any(InputPin::is_connected)
                    || component.outputs.iter().any(OutputPin::is_connected)
            })
    }
}

slotmap::new_key_type! {
    /// Generation-checked handle into the graph's node table.
    pub struct NodeKey;
    /// Generation-checked handle into the graph's group table.
    pub struct GroupKey;
}

/// Named frame around a set of nodes. Membership is non-owning.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGroup {
    pub name: String,
    pub bounds: Rect<f32>,
    pub(crate) members: Vec<NodeId>,
}

impl NodeGroup {
    pub fn new(name: impl Into<String>, bounds: Rect<f32>) -> Self {
        Self {
            name: name.into(),
            bounds,
            members: Vec::new(),
        }
    }

    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::pin::PinType;

    fn blueprint() -> NodeBlueprint {
        NodeBlueprint {
            size: Size2D::new(120.0, 60.0),
            color: Color::default(),
            inputs: vec![InputPin::new("in", PinType::Float)],
            outputs: vec![OutputPin::new("out", PinType::Float)],
            components: vec![
                Component::new("body")
                    .with_input(InputPin::new("a", PinType::Integer))
                    .with_field("label", FieldValue::Text("hi".to_string())),
            ],
        }
    }

    #[test]
    fn slots_resolve_node_and_component_pins() {
        let node = Node::from_blueprint(NodeId::new(0), "t", Point2D::zero(), blueprint());
        assert_eq!(node.input(PinSlot::node(0)).map(|p| p.pin_type), Some(PinType::Float));
        assert_eq!(
            node.input(PinSlot::component(0, 0)).map(|p| p.pin_type),
            Some(PinType::Integer)
        );
        assert!(node.input(PinSlot::component(1, 0)).is_none());
        assert!(node.output(PinSlot::component(0, 0)).is_none());
        assert_eq!(
            node.input_slots(),
            vec![PinSlot::node(0), PinSlot::component(0, 0)]
        );
    }

    #[test]
    fn detached_clone_drops_back_references() {
        let mut node = Node::from_blueprint(NodeId::new(3), "t", Point2D::zero(), blueprint());
        let mut keys = slotmap::SlotMap::<crate::graph::ConnectionKey, ()>::with_key();
        let key = keys.insert(());
        if let Some(pin) = node.input_mut(PinSlot::component(0, 0)) {
            pin.connection = Some(key);
        }
        assert!(node.has_connections());

        let clone = node.detached_clone(NodeId::new(9));
        assert_eq!(clone.id(), NodeId::new(9));
        assert!(!clone.has_connections());
        assert_eq!(clone.field(0, 0), node.field(0, 0));
    }

    #[test]
    fn absent_sentinel_is_reserved() {
        assert!(NodeId::ABSENT.is_absent());
        assert!(!NodeId::new(0).is_absent());
        assert_eq!(NodeId::ABSENT.to_string(), "<absent>");
    }
}
