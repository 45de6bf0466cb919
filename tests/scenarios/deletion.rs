use nodeshell::graph::{PinAddress, PinSlot};

use super::harness::TestHarness;

#[test]
fn test_delete_removes_every_touching_connection() {
    let mut harness = TestHarness::new();
    let hub = harness.add_node("relay", 0.0, 0.0);
    let left = harness.add_node("relay", -100.0, 0.0);
    let right = harness.add_node("relay", 100.0, 0.0);
    let far = harness.add_node("relay", 200.0, 0.0);
    harness.wire(left, hub);
    harness.wire(hub, right);
    harness.wire(right, far);
    assert_eq!(harness.store.graph().connection_count(), 3);

    assert_eq!(harness.store.delete_nodes(&[hub]), 1);
    assert_eq!(harness.store.graph().connection_count(), 1);
    harness.assert_back_references_consistent();
    let left_node = harness.store.node(left).unwrap();
    assert!(left_node.outputs()[0].connections().is_empty());
    let right_node = harness.store.node(right).unwrap();
    assert!(right_node.inputs()[0].connection().is_none());
    assert!(right_node.outputs()[0].is_connected());

    harness.store.undo();
    assert_eq!(harness.store.graph().connection_count(), 3);
    harness.assert_back_references_consistent();
}

#[test]
fn test_delete_drops_component_connections() {
    let mut harness = TestHarness::new();
    let constant = harness.add_node("constant", 0.0, 0.0);
    let math = harness.add_node("math", 200.0, 0.0);
    let probe = harness.add_node("probe", 400.0, 0.0);
    // constant.value -> math.b, math.result -> probe.in
    harness
        .store
        .connect(
            PinAddress::new(constant, PinSlot::component(0, 0)),
            PinAddress::new(math, PinSlot::component(0, 1)),
        )
        .unwrap();
    harness
        .store
        .connect(
            PinAddress::new(math, PinSlot::component(0, 0)),
            PinAddress::new(probe, PinSlot::node(0)),
        )
        .unwrap();

    harness.select(&[constant]);
    assert_eq!(harness.store.delete_selection(), 1);
    assert_eq!(harness.store.graph().connection_count(), 1);
    assert!(harness.store.selection().is_empty());
    let math_node = harness.store.node(math).unwrap();
    assert!(math_node.input(PinSlot::component(0, 1)).unwrap().connection().is_none());
    harness.assert_back_references_consistent();
}

#[test]
fn test_delete_unknown_ids_records_nothing() {
    let mut harness = TestHarness::new();
    let a = harness.add_node("relay", 0.0, 0.0);
    let len = harness.store.history().len();
    harness.store.delete_nodes(&[a]);
    assert_eq!(harness.store.delete_nodes(&[a]), 0);
    assert_eq!(harness.store.history().len(), len + 1);
}
