/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The editable document: graph, history, selection and clipboard.
//!
//! `GraphStore` is the single mutation entry point. Structural edits that the
//! user can take back (create, delete, cut, paste, move, text edits) go
//! through [`GraphStore::add_editor_action`]; connection edits and direct
//! inserts/removals mark the document dirty but are not recorded.

use euclid::default::{Point2D, Rect, Vector2D};
use log::{debug, warn};

use crate::graph::{
    ConnectError, ConnectionKey, DetachedNodes, FieldAddress, FieldValue, Graph, GroupKey, Node,
    NodeGroup, NodeId, PinAddress,
};
use crate::history::{ActionLog, EditText, EditorAction, MoveNodes, NodeBatch};
use crate::prefs::EditorConfig;
use crate::registries::TemplateRegistry;

pub mod gesture;
pub mod paste;
pub mod selection;

pub use gesture::{ConnectionDrag, NodeDrag, TextEditSession};
pub use paste::{PasteOutcome, PasteRemapper, PasteSource};
pub use selection::{SelectionState, SelectionUpdateMode};

/// Default cap on the paste id-mapping table.
pub const DEFAULT_PASTE_MAP_CAPACITY: usize = 512;

/// Editor camera, persisted with the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub target: Point2D<f32>,
    pub zoom: f32,
}

impl Camera {
    /// Whether the camera survives a save and load unchanged.
    pub fn is_valid(&self) -> bool {
        self.target.x.is_finite()
            && self.target.y.is_finite()
            && self.zoom.is_finite()
            && self.zoom > 0.0
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            target: Point2D::zero(),
            zoom: 1.0,
        }
    }
}

/// What the last copy or cut left for paste.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Clipboard {
    #[default]
    Empty,
    /// Ids of live nodes, resolved when pasting.
    Live(Vec<NodeId>),
    /// Snapshot of nodes that were cut out of the graph.
    Detached(DetachedNodes),
}

pub struct GraphStore {
    graph: Graph,
    history: ActionLog,
    selection: SelectionState,
    clipboard: Clipboard,
    registry: Box<dyn TemplateRegistry>,
    /// Next id to hand out; always above every live id.
    next_id: u32,
    camera: Camera,
    dirty: bool,
    paste_map_capacity: usize,
}

impl GraphStore {
    pub fn new(registry: Box<dyn TemplateRegistry>) -> Self {
        Self::with_config(registry, &EditorConfig::default())
    }

    pub fn with_config(registry: Box<dyn TemplateRegistry>, config: &EditorConfig) -> Self {
        Self {
            graph: Graph::new(),
            history: ActionLog::new(config.history_capacity),
            selection: SelectionState::new(),
            clipboard: Clipboard::Empty,
            registry,
            next_id: 0,
            camera: Camera::default(),
            dirty: false,
            paste_map_capacity: config.paste_map_capacity,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.get_node(id)
    }

    pub fn history(&self) -> &ActionLog {
        &self.history
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn registry(&self) -> &dyn TemplateRegistry {
        self.registry.as_ref()
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Returns false, leaving the camera as is, for a non-finite target or a
    /// zoom that is not a positive finite number.
    pub fn set_camera(&mut self, camera: Camera) -> bool {
        if !camera.is_valid() {
            debug!("camera: refusing {camera:?}");
            return false;
        }
        if self.camera != camera {
            self.camera = camera;
            self.dirty = true;
        }
        true
    }

    /// Unsaved changes since the last save or load.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Upper bound (exclusive) of ids handed out so far.
    pub fn max_assigned_id(&self) -> u32 {
        self.next_id
    }

    fn allocate_id(&mut self) -> Option<NodeId> {
        if self.next_id >= NodeId::ABSENT.raw() {
            warn!("node id space exhausted");
            return None;
        }
        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        Some(id)
    }

    /// Instantiate `template` at `position`, recorded as one `CreateNodes`
    /// action. Unknown templates return `None` and consume no id.
    pub fn create_node(&mut self, template: &str, position: Point2D<f32>) -> Option<NodeId> {
        let Some(blueprint) = self.registry.node_blueprint(template) else {
            debug!("create: unknown template '{template}'");
            return None;
        };
        let id = self.allocate_id()?;
        self.graph
            .insert_node(Node::from_blueprint(id, template, position, blueprint))?;
        self.add_editor_action(EditorAction::CreateNodes(NodeBatch::live(vec![id])));
        Some(id)
    }

    /// Insert a prebuilt node. No-op returning false if its id is live or is
    /// still held by a create or delete entry in the history.
    pub fn insert_node(&mut self, node: Node) -> bool {
        let id = node.id();
        if self.history.holds_node(id) {
            debug!("insert: node {id} is held by history");
            return false;
        }
        if self.graph.insert_node(node).is_none() {
            return false;
        }
        self.next_id = self.next_id.max(id.raw().saturating_add(1));
        self.dirty = true;
        true
    }

    /// Remove and drop a node with its connections and group memberships.
    /// Not recorded in history.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if self.graph.remove_node(id).is_none() {
            return false;
        }
        self.selection.retain_live(|candidate| candidate != id);
        self.dirty = true;
        true
    }

    pub fn connect(
        &mut self,
        from: PinAddress,
        to: PinAddress,
    ) -> Result<ConnectionKey, ConnectError> {
        let key = self.graph.connect(from, to)?;
        self.dirty = true;
        Ok(key)
    }

    pub fn disconnect(&mut self, key: ConnectionKey) -> bool {
        let removed = self.graph.disconnect(key).is_some();
        self.dirty |= removed;
        removed
    }

    pub fn disconnect_input(&mut self, to: PinAddress) -> bool {
        let removed = self.graph.disconnect_input(to).is_some();
        self.dirty |= removed;
        removed
    }

    pub fn select(&mut self, id: NodeId, multi_select: bool) {
        if self.graph.contains_node(id) {
            self.selection.select(id, multi_select);
        }
    }

    pub fn update_selection(&mut self, ids: Vec<NodeId>, mode: SelectionUpdateMode) {
        let live = ids
            .into_iter()
            .filter(|id| self.graph.contains_node(*id))
            .collect();
        self.selection.update_many(live, mode);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Remember the current selection for a later paste. Returns how many
    /// nodes were copied.
    pub fn copy(&mut self) -> usize {
        let ids = self.selection.ordered().to_vec();
        let count = ids.len();
        if count > 0 {
            self.clipboard = Clipboard::Live(ids);
        }
        count
    }

    /// Copy the selection and delete it as one `DeleteNodes` action.
    pub fn cut(&mut self) -> usize {
        let ids = self.selection.ordered().to_vec();
        let detached = self.graph.detach_nodes(&ids);
        if detached.is_empty() {
            return 0;
        }
        let count = detached.len();
        self.clipboard = Clipboard::Detached(detached.clone());
        self.selection.clear();
        self.add_editor_action(EditorAction::DeleteNodes(NodeBatch::detached(detached)));
        count
    }

    /// Delete the selection as one `DeleteNodes` action.
    pub fn delete_selection(&mut self) -> usize {
        let ids = self.selection.ordered().to_vec();
        self.delete_nodes(&ids)
    }

    /// Delete the given nodes as one `DeleteNodes` action.
    pub fn delete_nodes(&mut self, ids: &[NodeId]) -> usize {
        let detached = self.graph.detach_nodes(ids);
        if detached.is_empty() {
            return 0;
        }
        let count = detached.len();
        self.selection.retain_live(|id| self.graph.contains_node(id));
        self.add_editor_action(EditorAction::DeleteNodes(NodeBatch::detached(detached)));
        count
    }

    /// Duplicate the clipboard so its first node lands on `target`.
    pub fn paste(&mut self, target: Point2D<f32>) -> Option<PasteOutcome> {
        let source = match &self.clipboard {
            Clipboard::Empty => return None,
            Clipboard::Live(ids) => PasteSource::from_live(&self.graph, ids),
            Clipboard::Detached(detached) => PasteSource::from_detached(detached),
        };
        if source.is_empty() {
            return None;
        }
        Some(paste::paste_into(self, source, target))
    }

    /// Translate nodes by `delta`, recorded as one `MoveNodes` action.
    pub fn move_nodes(&mut self, ids: &[NodeId], delta: Vector2D<f32>) -> bool {
        if delta == Vector2D::zero() {
            return false;
        }
        let mut moved = Vec::new();
        for &id in ids {
            if let Some(node) = self.graph.get_node_mut(id) {
                node.position += delta;
                moved.push((id, -delta));
            }
        }
        if moved.is_empty() {
            return false;
        }
        self.add_editor_action(EditorAction::MoveNodes(MoveNodes::new(moved)))
    }

    /// Replace a text field, recorded as one `EditText` action. Unchanged
    /// text records nothing and returns false.
    pub fn edit_text(&mut self, field: FieldAddress, text: &str) -> bool {
        let Some(before) = self.set_text_field(field, text) else {
            return false;
        };
        match EditText::commit(field, before, text.to_string()) {
            Some(action) => self.add_editor_action(EditorAction::EditText(action)),
            None => false,
        }
    }

    pub fn add_group(&mut self, name: &str, bounds: Rect<f32>, members: &[NodeId]) -> GroupKey {
        self.dirty = true;
        self.graph.add_group(NodeGroup::new(name, bounds), members)
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupKey, &NodeGroup)> {
        self.graph.groups()
    }

    pub fn remove_group(&mut self, key: GroupKey) -> bool {
        let removed = self.graph.remove_group(key).is_some();
        self.dirty |= removed;
        removed
    }

    /// Record an already-applied action. The only way into the history.
    pub fn add_editor_action(&mut self, action: EditorAction) -> bool {
        let added = self.history.push(action);
        self.dirty |= added;
        added
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.graph);
        if undone {
            self.after_history_step();
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.graph);
        if redone {
            self.after_history_step();
        }
        redone
    }

    fn after_history_step(&mut self) {
        let graph = &self.graph;
        self.selection.retain_live(|id| graph.contains_node(id));
        self.dirty = true;
    }

    /// Set a node position without recording anything. Used by gestures,
    /// which record one action when they commit.
    pub(crate) fn set_position(&mut self, id: NodeId, position: Point2D<f32>) -> bool {
        match self.graph.get_node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            },
            None => false,
        }
    }

    /// Assign a text field without recording anything; returns the previous
    /// text, or `None` if the field is missing or not text.
    pub(crate) fn set_text_field(&mut self, field: FieldAddress, text: &str) -> Option<String> {
        let value = self
            .graph
            .get_node_mut(field.node)?
            .field_value_mut(field.component, field.field)?;
        let FieldValue::Text(current) = value else {
            return None;
        };
        Some(std::mem::replace(current, text.to_string()))
    }

    /// Swap in a freshly loaded document: history, selection and clipboard
    /// start over and the document is clean.
    pub(crate) fn replace_document(&mut self, graph: Graph, next_id: u32, camera: Camera) {
        self.graph = graph;
        self.next_id = next_id;
        self.camera = camera;
        self.history.reset();
        self.selection.clear();
        self.clipboard = Clipboard::Empty;
        self.dirty = false;
    }
}
