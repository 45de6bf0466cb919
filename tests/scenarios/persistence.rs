use euclid::default::{Point2D, Rect, Size2D};
use nodeshell::graph::{FieldAddress, PinAddress, PinSlot};
use nodeshell::persistence::{load_document, save_document};
use nodeshell::store::Camera;
use proptest::prelude::*;
use tempfile::TempDir;

use super::harness::{TestHarness, relay_pin};

#[derive(Debug, Clone)]
struct NodeShape {
    note: bool,
    x: f32,
    y: f32,
    body: String,
}

fn node_shape() -> impl Strategy<Value = NodeShape> {
    (
        any::<bool>(),
        -1.0e6f32..1.0e6,
        -1.0e6f32..1.0e6,
        ".{0,24}",
    )
        .prop_map(|(note, x, y, body)| NodeShape { note, x, y, body })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn save_then_load_preserves_document(
        shapes in prop::collection::vec(node_shape(), 0..12),
        wires in prop::collection::vec((any::<usize>(), any::<usize>()), 0..16),
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.graph");

        let mut harness = TestHarness::new();
        let mut relays = Vec::new();
        for shape in &shapes {
            if shape.note {
                let id = harness.add_node("note", shape.x, shape.y);
                harness.store.edit_text(FieldAddress::new(id, 0, 1), &shape.body);
            } else {
                relays.push(harness.add_node("relay", shape.x, shape.y));
            }
        }
        if !relays.is_empty() {
            for (from, to) in wires {
                let from = relays[from % relays.len()];
                let to = relays[to % relays.len()];
                let _ = harness.store.connect(relay_pin(from), relay_pin(to));
            }
        }
        let expected = harness.text();
        save_document(&mut harness.store, &path).unwrap();

        let mut loaded = TestHarness::new();
        let report = load_document(&mut loaded.store, &path).unwrap();
        prop_assert_eq!(report.nodes, shapes.len());
        prop_assert_eq!(report.connections, harness.store.graph().connection_count());
        prop_assert_eq!(report.skipped, 0);
        prop_assert_eq!(loaded.text(), expected);
        loaded.assert_back_references_consistent();
    }
}

#[test]
fn test_load_restores_camera_groups_and_allocator() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.graph");
    let mut harness = TestHarness::new();
    let a = harness.add_node("relay", 0.0, 0.0);
    let b = harness.add_node("toggle", 0.0, 80.0);
    harness.store.add_group(
        "inputs",
        Rect::new(Point2D::new(-10.0, -10.0), Size2D::new(300.0, 200.0)),
        &[a, b],
    );
    let camera = Camera {
        target: Point2D::new(120.0, -40.0),
        zoom: 2.0,
    };
    harness.store.set_camera(camera);
    save_document(&mut harness.store, &path).unwrap();

    let mut loaded = TestHarness::new();
    let report = load_document(&mut loaded.store, &path).unwrap();
    assert_eq!(report.groups, 1);
    assert_eq!(loaded.store.camera(), camera);
    let (_, group) = loaded.store.groups().next().unwrap();
    assert_eq!(group.name, "inputs");
    assert_eq!(group.members(), &[a, b]);

    let c = loaded.add_node("relay", 0.0, 0.0);
    assert!(c > b);
}

#[test]
fn test_load_skips_invalid_connection_lines() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("hand-written.graph");
    std::fs::write(
        &path,
        "--Nodes--\n\
         relay|0|0|0|100|40\n\
         relay|1|100|0|100|40\n\
         --Connections--\n\
         0|-1|0|1|-1|0\n\
         0|-1|0|5|-1|0\n\
         1|-1|0|1|-1|3\n\
         1|-1|0|1|-1|0\n\
         0|-1|0\n",
    )
    .unwrap();

    let mut harness = TestHarness::new();
    let report = load_document(&mut harness.store, &path).unwrap();
    assert_eq!(report.nodes, 2);
    assert_eq!(report.connections, 1);
    // Out-of-range id, out-of-range pin, occupied input, short record.
    assert_eq!(report.skipped, 4);
    harness.assert_back_references_consistent();
}

#[test]
fn test_component_pins_survive_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.graph");
    let mut harness = TestHarness::new();
    let constant = harness.add_node("constant", 0.0, 0.0);
    let math = harness.add_node("math", 200.0, 0.0);
    let result = PinAddress::new(math, PinSlot::component(0, 0));
    harness
        .store
        .connect(
            PinAddress::new(constant, PinSlot::component(0, 0)),
            PinAddress::new(math, PinSlot::component(0, 1)),
        )
        .unwrap();
    save_document(&mut harness.store, &path).unwrap();

    let mut loaded = TestHarness::new();
    load_document(&mut loaded.store, &path).unwrap();
    let graph = loaded.store.graph();
    let into_b = graph
        .connection_into(PinAddress::new(math, PinSlot::component(0, 1)))
        .unwrap();
    assert_eq!(into_b.from, PinAddress::new(constant, PinSlot::component(0, 0)));
    assert!(!graph.get_node(math).unwrap().output(result.slot).unwrap().is_connected());
}
