use euclid::default::{Point2D, Vector2D};
use nodeshell::graph::{FieldAddress, PinAddress, PinSlot};
use nodeshell::persistence::encode_document;
use nodeshell::store::SelectionUpdateMode;
use nodeshell::{EditorConfig, GraphStore, NodeId, TemplateCatalog};

pub(crate) struct TestHarness {
    pub(crate) store: GraphStore,
}

impl TestHarness {
    pub(crate) fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub(crate) fn with_config(config: EditorConfig) -> Self {
        Self {
            store: GraphStore::with_config(Box::new(TemplateCatalog::core_seed()), &config),
        }
    }

    pub(crate) fn add_node(&mut self, template: &str, x: f32, y: f32) -> NodeId {
        self.store
            .create_node(template, Point2D::new(x, y))
            .expect("template should be registered")
    }

    /// Wire relay `from`'s output into relay `to`'s input.
    pub(crate) fn wire(&mut self, from: NodeId, to: NodeId) {
        self.store
            .connect(relay_pin(from), relay_pin(to))
            .expect("relay pins should connect");
    }

    pub(crate) fn select(&mut self, ids: &[NodeId]) {
        self.store
            .update_selection(ids.to_vec(), SelectionUpdateMode::Replace);
    }

    pub(crate) fn nudge(&mut self, id: NodeId, dx: f32, dy: f32) -> bool {
        self.store.move_nodes(&[id], Vector2D::new(dx, dy))
    }

    pub(crate) fn retitle(&mut self, note: NodeId, title: &str) -> bool {
        self.store.edit_text(FieldAddress::new(note, 0, 0), title)
    }

    pub(crate) fn position(&self, id: NodeId) -> Point2D<f32> {
        self.store.node(id).expect("node should be live").position
    }

    pub(crate) fn text(&self) -> String {
        encode_document(self.store.graph(), self.store.camera())
    }

    pub(crate) fn undo_all(&mut self) -> usize {
        let mut steps = 0;
        while self.store.undo() {
            steps += 1;
        }
        steps
    }

    /// Every pin back-reference resolves to a live connection that names
    /// that pin, and every connection is referenced from both ends.
    pub(crate) fn assert_back_references_consistent(&self) {
        let graph = self.store.graph();
        for node in graph.nodes() {
            for slot in node.input_slots() {
                let pin = node.input(slot).unwrap();
                if let Some(key) = pin.connection() {
                    let connection = graph
                        .connection(key)
                        .unwrap_or_else(|| panic!("{} holds a dead connection", node.id()));
                    assert_eq!(connection.to, PinAddress::new(node.id(), slot));
                }
            }
        }
        for (key, connection) in graph.connections() {
            let source = graph.get_node(connection.from.node).unwrap();
            assert!(source.output(connection.from.slot).unwrap().connections().contains(&key));
            let target = graph.get_node(connection.to.node).unwrap();
            assert_eq!(target.input(connection.to.slot).unwrap().connection(), Some(key));
        }
    }
}

pub(crate) fn relay_pin(id: NodeId) -> PinAddress {
    PinAddress::new(id, PinSlot::node(0))
}
