/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Template capability: resolves node and component names to constructors.
//!
//! The store and the document codec receive a `TemplateRegistry` at
//! construction time; nothing here is global.

use std::collections::HashMap;

use euclid::default::Size2D;
use log::warn;

use crate::graph::{Color, Component, FieldValue, InputPin, OutputPin, PinType};

/// Everything a node needs besides identity and position.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBlueprint {
    pub size: Size2D<f32>,
    pub color: Color,
    pub inputs: Vec<InputPin>,
    pub outputs: Vec<OutputPin>,
    pub components: Vec<Component>,
}

/// Name to constructor lookup consumed by the store and the codec.
pub trait TemplateRegistry {
    /// Build a fresh blueprint for `template`, or `None` if it is unknown.
    fn node_blueprint(&self, template: &str) -> Option<NodeBlueprint>;

    /// Build a fresh component for `template`, or `None` if it is unknown.
    fn component(&self, template: &str) -> Option<Component>;

    fn has_node_template(&self, template: &str) -> bool {
        self.node_blueprint(template).is_some()
    }
}

pub type ComponentConstructor = fn() -> Component;

/// Declarative node template. Components are referenced by name and built on
/// every instantiation.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTemplate {
    pub size: Size2D<f32>,
    pub color: Color,
    pub inputs: Vec<(String, PinType)>,
    pub outputs: Vec<(String, PinType)>,
    pub components: Vec<String>,
}

impl NodeTemplate {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Size2D::new(width, height),
            color: Color::default(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            components: Vec::new(),
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn input(mut self, name: &str, pin_type: PinType) -> Self {
        self.inputs.push((name.to_string(), pin_type));
        self
    }

    pub fn output(mut self, name: &str, pin_type: PinType) -> Self {
        self.outputs.push((name.to_string(), pin_type));
        self
    }

    pub fn component(mut self, name: &str) -> Self {
        self.components.push(name.to_string());
        self
    }
}

/// In-memory `TemplateRegistry`.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    nodes: HashMap<String, NodeTemplate>,
    components: HashMap<String, ComponentConstructor>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_component(&mut self, name: &str, constructor: ComponentConstructor) {
        self.components.insert(name.to_string(), constructor);
    }

    pub fn register_node(&mut self, name: &str, template: NodeTemplate) {
        self.nodes.insert(name.to_string(), template);
    }

    /// Registered node template names, sorted.
    pub fn node_template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Built-in templates shipped with the editor.
    pub fn core_seed() -> Self {
        let mut catalog = Self::new();
        catalog.register_component("value.float", || {
            Component::new("value.float")
                .with_output(OutputPin::new("value", PinType::Float))
                .with_field("value", FieldValue::Float(0.0))
        });
        catalog.register_component("value.text", || {
            Component::new("value.text")
                .with_output(OutputPin::new("text", PinType::String))
                .with_field("text", FieldValue::Text(String::new()))
        });
        catalog.register_component("math.binary", || {
            Component::new("math.binary")
                .with_input(InputPin::new("a", PinType::Float))
                .with_input(InputPin::new("b", PinType::Float))
                .with_output(OutputPin::new("result", PinType::Float))
                .with_field("op", FieldValue::Text("add".to_string()))
        });
        catalog.register_component("logic.toggle", || {
            Component::new("logic.toggle")
                .with_output(OutputPin::new("state", PinType::Boolean))
                .with_field("enabled", FieldValue::Bool(false))
        });
        catalog.register_component("note.body", || {
            Component::new("note.body")
                .with_field("title", FieldValue::Text(String::new()))
                .with_field("body", FieldValue::Text(String::new()))
        });
        catalog.register_component("debug.probe", || {
            Component::new("debug.probe")
                .with_field("label", FieldValue::Text("probe".to_string()))
                .with_field("samples", FieldValue::Integer(0))
        });

        catalog.register_node(
            "constant",
            NodeTemplate::new(140.0, 60.0)
                .color(Color::rgb(0x3b, 0x82, 0xc4))
                .component("value.float"),
        );
        catalog.register_node(
            "text",
            NodeTemplate::new(180.0, 80.0).component("value.text"),
        );
        catalog.register_node(
            "math",
            NodeTemplate::new(160.0, 90.0)
                .color(Color::rgb(0x8a, 0x5c, 0xc9))
                .component("math.binary"),
        );
        catalog.register_node(
            "toggle",
            NodeTemplate::new(120.0, 50.0).component("logic.toggle"),
        );
        catalog.register_node(
            "note",
            NodeTemplate::new(220.0, 140.0)
                .color(Color::rgb(0xd9, 0xb4, 0x4a))
                .component("note.body"),
        );
        catalog.register_node(
            "probe",
            NodeTemplate::new(150.0, 70.0)
                .input("in", PinType::Data)
                .component("debug.probe"),
        );
        catalog.register_node(
            "relay",
            NodeTemplate::new(100.0, 40.0)
                .input("in", PinType::Float)
                .output("out", PinType::Float),
        );
        catalog
    }
}

impl TemplateRegistry for TemplateCatalog {
    fn node_blueprint(&self, template: &str) -> Option<NodeBlueprint> {
        let entry = self.nodes.get(template)?;
        let mut components = Vec::with_capacity(entry.components.len());
        for name in &entry.components {
            let Some(component) = self.component(name) else {
                warn!("node template '{template}' references unknown component '{name}'");
                return None;
            };
            components.push(component);
        }
        Some(NodeBlueprint {
            size: entry.size,
            color: entry.color,
            inputs: entry
                .inputs
                .iter()
                .map(|(name, pin_type)| InputPin::new(name.clone(), *pin_type))
                .collect(),
            outputs: entry
                .outputs
                .iter()
                .map(|(name, pin_type)| OutputPin::new(name.clone(), *pin_type))
                .collect(),
            components,
        })
    }

    fn component(&self, template: &str) -> Option<Component> {
        self.components.get(template).map(|constructor| constructor())
    }
}
