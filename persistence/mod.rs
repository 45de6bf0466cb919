/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Document persistence as line-oriented text.
//!
//! Layout:
//! - `--EditorData--`: `cameraX|cameraY|zoom`
//! - `--Nodes--`: `template|id|x|y|width|height|<fields>|~|<fields>|~...`
//! - `--Connections--`: `fromId|fromComponent|fromPin|toId|toComponent|toPin`
//! - `--Groups--`: `name|x|y|width|height|id,id,...`
//!
//! Saving is atomic: the document is rendered in memory, written to a
//! temporary file next to the target, then renamed over it. Loading reads the
//! whole file before touching the store, and skips records that fail to parse
//! or validate instead of failing.

pub mod format;

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use euclid::default::{Point2D, Rect, Size2D};
use log::{debug, warn};
use tempfile::NamedTempFile;

use crate::graph::{Graph, Node, NodeGroup, NodeId, PinAddress, PinSlot};
use crate::registries::TemplateRegistry;
use crate::store::{Camera, GraphStore};
use format::{
    DELIMITER, END_OF_COMPONENT, SECTION_CONNECTIONS, SECTION_EDITOR, SECTION_GROUPS,
    SECTION_NODES,
};

/// Counts reported after a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub nodes: usize,
    pub connections: usize,
    pub groups: usize,
    /// Records dropped as malformed or invalid.
    pub skipped: usize,
}

/// A decoded document, not yet installed in a store.
#[derive(Debug, Clone)]
pub struct Document {
    pub graph: Graph,
    /// One past the highest loaded node id.
    pub next_id: u32,
    pub camera: Camera,
}

/// Errors from saving or loading a document file
#[derive(Debug)]
pub enum PersistenceError {
    Io(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

/// Render `graph` and `camera` as document text.
pub fn encode_document(graph: &Graph, camera: Camera) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", format::section_marker(SECTION_EDITOR));
    let _ = writeln!(
        out,
        "{}|{}|{}",
        camera.target.x, camera.target.y, camera.zoom
    );

    let _ = writeln!(out, "{}", format::section_marker(SECTION_NODES));
    for id in graph.node_ids() {
        if let Some(node) = graph.get_node(id) {
            out.push_str(&encode_node(node));
            out.push('\n');
        }
    }

    let _ = writeln!(out, "{}", format::section_marker(SECTION_CONNECTIONS));
    let mut connections: Vec<_> = graph.connections().map(|(_, c)| *c).collect();
    connections.sort();
    for connection in connections {
        let _ = writeln!(
            out,
            "{}|{}|{}|{}|{}|{}",
            connection.from.node.raw(),
            format::encode_component_index(connection.from.slot.component),
            connection.from.slot.index,
            connection.to.node.raw(),
            format::encode_component_index(connection.to.slot.component),
            connection.to.slot.index,
        );
    }

    let _ = writeln!(out, "{}", format::section_marker(SECTION_GROUPS));
    for (_, group) in graph.groups() {
        let members: Vec<String> = group
            .members()
            .iter()
            .map(|id| id.raw().to_string())
            .collect();
        let _ = writeln!(
            out,
            "{}|{}|{}|{}|{}|{}",
            format::escape(&group.name),
            group.bounds.origin.x,
            group.bounds.origin.y,
            group.bounds.size.width,
            group.bounds.size.height,
            members.join(","),
        );
    }
    out
}

fn encode_node(node: &Node) -> String {
    let mut tokens = vec![
        format::escape(node.template()),
        node.id().raw().to_string(),
        node.position.x.to_string(),
        node.position.y.to_string(),
        node.size.width.to_string(),
        node.size.height.to_string(),
    ];
    for component in node.components() {
        tokens.extend(component.fields().iter().map(|f| format::encode_value(&f.value)));
        tokens.push(END_OF_COMPONENT.to_string());
    }
    tokens.join(&DELIMITER.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Editor,
    Nodes,
    Connections,
    Groups,
    Unknown,
}

/// Parse document text, building nodes from `registry`.
///
/// Connection and group records are resolved after every node record has
/// been read, so their ids are checked against the complete node table.
pub fn decode_document(text: &str, registry: &dyn TemplateRegistry) -> (Document, LoadReport) {
    let mut report = LoadReport::default();
    let mut graph = Graph::new();
    let mut camera = Camera::default();
    let mut connection_lines = Vec::new();
    let mut group_lines = Vec::new();
    let mut section = Section::Preamble;

    for (number, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if let Some(name) = format::parse_section_marker(line) {
            section = match name {
                SECTION_EDITOR => Section::Editor,
                SECTION_NODES => Section::Nodes,
                SECTION_CONNECTIONS => Section::Connections,
                SECTION_GROUPS => Section::Groups,
                other => {
                    warn!("load: skipping unknown section '{other}' at line {}", number + 1);
                    Section::Unknown
                },
            };
            continue;
        }
        match section {
            Section::Preamble => {
                warn!("load: line {} precedes any section", number + 1);
                report.skipped += 1;
            },
            Section::Editor => match decode_camera(line) {
                Some(decoded) => camera = decoded,
                None => {
                    warn!("load: malformed editor record at line {}", number + 1);
                    report.skipped += 1;
                },
            },
            Section::Nodes => match decode_node(line, registry) {
                Some(node) => {
                    let id = node.id();
                    if graph.insert_node(node).is_some() {
                        report.nodes += 1;
                    } else {
                        warn!("load: duplicate or reserved node id {id} at line {}", number + 1);
                        report.skipped += 1;
                    }
                },
                None => {
                    warn!("load: skipping node record at line {}", number + 1);
                    report.skipped += 1;
                },
            },
            Section::Connections => connection_lines.push((number + 1, line)),
            Section::Groups => group_lines.push((number + 1, line)),
            Section::Unknown => {},
        }
    }

    let next_id = graph
        .max_node_id()
        .map_or(0, |id| id.raw().saturating_add(1));

    for (number, line) in connection_lines {
        if connect_record(&mut graph, next_id, line) {
            report.connections += 1;
        } else {
            warn!("load: skipping connection record at line {number}");
            report.skipped += 1;
        }
    }

    for (number, line) in group_lines {
        match decode_group(line) {
            Some((group, members)) => {
                graph.add_group(group, &members);
                report.groups += 1;
            },
            None => {
                warn!("load: skipping group record at line {number}");
                report.skipped += 1;
            },
        }
    }

    debug!(
        "load: {} nodes, {} connections, {} groups, {} skipped",
        report.nodes, report.connections, report.groups, report.skipped
    );
    (
        Document {
            graph,
            next_id,
            camera,
        },
        report,
    )
}

fn decode_camera(line: &str) -> Option<Camera> {
    let tokens = format::split_record(line);
    let [x, y, zoom] = tokens[..] else {
        return None;
    };
    let camera = Camera {
        target: Point2D::new(x.parse().ok()?, y.parse().ok()?),
        zoom: zoom.parse().ok()?,
    };
    camera.is_valid().then_some(camera)
}

fn decode_node(line: &str, registry: &dyn TemplateRegistry) -> Option<Node> {
    let tokens = format::split_record(line);
    if tokens.len() < 6 {
        return None;
    }
    let template = format::unescape(tokens[0])?;
    let id = NodeId::new(tokens[1].parse().ok()?);
    let position = Point2D::new(tokens[2].parse().ok()?, tokens[3].parse().ok()?);
    let size = Size2D::new(tokens[4].parse().ok()?, tokens[5].parse().ok()?);

    let Some(blueprint) = registry.node_blueprint(&template) else {
        warn!("load: unknown template '{template}' for node {id}");
        return None;
    };
    let mut node = Node::from_blueprint(id, template, position, blueprint);
    node.size = size;

    let mut blocks: Vec<&[&str]> = tokens[6..].split(|t| *t == END_OF_COMPONENT).collect();
    // Trailing piece after the last marker; empty for a well-formed record.
    if let Some(tail) = blocks.pop()
        && !tail.is_empty()
    {
        warn!("load: node {id} has {} fields after its last component", tail.len());
    }
    if blocks.len() != node.components().len() {
        warn!(
            "load: node {id} saved {} components, template '{}' has {}",
            blocks.len(),
            node.template(),
            node.components().len()
        );
    }
    for (index, block) in blocks.into_iter().enumerate() {
        restore_component_fields(&mut node, index, block);
    }
    Some(node)
}

/// Apply one saved field block. A block that does not match the component's
/// shape is ignored as a whole, leaving the template defaults.
fn restore_component_fields(node: &mut Node, index: usize, block: &[&str]) {
    let id = node.id();
    let Some(component) = node.component_mut(index) else {
        return;
    };
    if block.len() != component.fields().len() {
        warn!(
            "load: node {id} component {index} has {} fields, expected {}",
            block.len(),
            component.fields().len()
        );
        return;
    }
    let mut values = Vec::with_capacity(block.len());
    for (field, token) in component.fields().iter().zip(block) {
        match format::decode_value(token) {
            Some(value) if value.same_kind(&field.value) => values.push(value),
            _ => {
                warn!("load: node {id} component {index} field '{}' is malformed", field.name);
                return;
            },
        }
    }
    for (field, value) in values.into_iter().enumerate() {
        if let Some(slot) = component.field_value_mut(field) {
            *slot = value;
        }
    }
}

fn connect_record(graph: &mut Graph, next_id: u32, line: &str) -> bool {
    let tokens = format::split_record(line);
    let [from_node, from_component, from_pin, to_node, to_component, to_pin] = tokens[..] else {
        return false;
    };
    let Some(from) = decode_pin_address(next_id, from_node, from_component, from_pin) else {
        return false;
    };
    let Some(to) = decode_pin_address(next_id, to_node, to_component, to_pin) else {
        return false;
    };
    match graph.connect(from, to) {
        Ok(_) => true,
        Err(error) => {
            warn!("load: {error}");
            false
        },
    }
}

fn decode_pin_address(
    next_id: u32,
    node: &str,
    component: &str,
    pin: &str,
) -> Option<PinAddress> {
    let raw: u32 = node.parse().ok()?;
    if raw >= next_id {
        return None;
    }
    let component = format::decode_component_index(component)?;
    let index: usize = pin.parse().ok()?;
    Some(PinAddress::new(
        NodeId::new(raw),
        PinSlot { component, index },
    ))
}

fn decode_group(line: &str) -> Option<(NodeGroup, Vec<NodeId>)> {
    let tokens = format::split_record(line);
    let [name, x, y, width, height, members] = tokens[..] else {
        return None;
    };
    let bounds = Rect::new(
        Point2D::new(x.parse().ok()?, y.parse().ok()?),
        Size2D::new(width.parse().ok()?, height.parse().ok()?),
    );
    let members = members
        .split(',')
        .filter(|raw| !raw.is_empty())
        .map(|raw| raw.parse().ok().map(NodeId::new))
        .collect::<Option<Vec<_>>>()?;
    Some((NodeGroup::new(format::unescape(name)?, bounds), members))
}

/// Write the store's document to `path` atomically and mark it clean.
pub fn save_document(store: &mut GraphStore, path: &Path) -> Result<(), PersistenceError> {
    let text = encode_document(store.graph(), store.camera());
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .map_err(|e| PersistenceError::Io(format!("Failed to create temp file: {e}")))?;
    file.write_all(text.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| PersistenceError::Io(format!("Failed to write document: {e}")))?;
    file.persist(path).map_err(|e| {
        PersistenceError::Io(format!("Failed to replace {}: {}", path.display(), e.error))
    })?;
    store.mark_clean();
    debug!("save: wrote {}", path.display());
    Ok(())
}

/// Replace the store's document with the one at `path`.
///
/// The store is untouched when the file cannot be read.
pub fn load_document(store: &mut GraphStore, path: &Path) -> Result<LoadReport, PersistenceError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PersistenceError::Io(format!("Failed to read {}: {e}", path.display())))?;
    let (document, report) = decode_document(&text, store.registry());
    store.replace_document(document.graph, document.next_id, document.camera);
    Ok(report)
}
