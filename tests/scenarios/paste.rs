use euclid::default::Point2D;
use nodeshell::history::ActionKind;

use super::harness::{TestHarness, relay_pin};

#[test]
fn test_paste_two_connected_nodes() {
    let mut harness = TestHarness::new();
    let a = harness.add_node("relay", 0.0, 0.0);
    let b = harness.add_node("relay", 100.0, 0.0);
    harness.wire(a, b);
    harness.select(&[a, b]);
    assert_eq!(harness.store.copy(), 2);
    let len = harness.store.history().len();

    let outcome = harness.store.paste(Point2D::new(50.0, 50.0)).unwrap();

    let [a2, b2] = outcome.clones[..] else {
        panic!("expected two clones, got {:?}", outcome.clones);
    };
    assert_eq!(harness.position(a2), Point2D::new(50.0, 50.0));
    assert_eq!(harness.position(b2), Point2D::new(150.0, 50.0));
    assert_eq!(outcome.connections, 1);
    assert_eq!(harness.store.graph().connection_count(), 2);

    let history = harness.store.history();
    assert_eq!(history.len(), len + 1);
    assert_eq!(history.cursor(), history.len() - 1);
    assert_eq!(
        history.get(history.cursor()).map(|action| action.kind()),
        Some(ActionKind::CreateNodes)
    );
    harness.assert_back_references_consistent();
}

#[test]
fn test_paste_rewires_only_within_the_copy() {
    let mut harness = TestHarness::new();
    let a = harness.add_node("relay", 0.0, 0.0);
    let b = harness.add_node("relay", 100.0, 0.0);
    let c = harness.add_node("relay", 200.0, 0.0);
    harness.wire(a, b);
    harness.wire(b, c);
    harness.select(&[b, c]);
    harness.store.copy();

    let outcome = harness.store.paste(Point2D::new(100.0, 300.0)).unwrap();
    let [b2, c2] = outcome.clones[..] else {
        panic!("expected two clones, got {:?}", outcome.clones);
    };
    let graph = harness.store.graph();
    assert_eq!(graph.connection_into(relay_pin(c2)).map(|c| c.from), Some(relay_pin(b2)));
    assert!(graph.connection_into(relay_pin(b2)).is_none());
    // Originals keep their wiring, and nothing crosses between the sets.
    assert_eq!(graph.connection_into(relay_pin(c)).map(|c| c.from), Some(relay_pin(b)));
    assert_eq!(graph.connection_count(), 3);
    assert_eq!(harness.store.selection().ordered(), &[b2, c2]);
}

#[test]
fn test_paste_repeatedly_yields_fresh_ids() {
    let mut harness = TestHarness::new();
    let note = harness.add_node("note", 0.0, 0.0);
    harness.retitle(note, "template");
    harness.select(&[note]);
    harness.store.copy();

    let first = harness.store.paste(Point2D::new(0.0, 200.0)).unwrap();
    let second = harness.store.paste(Point2D::new(0.0, 400.0)).unwrap();
    assert_ne!(first.clones, second.clones);
    for id in first.clones.iter().chain(&second.clones) {
        let title = &harness.store.node(*id).unwrap().field(0, 0).unwrap().value;
        assert_eq!(title.as_text(), Some("template"));
    }
    assert_eq!(harness.store.graph().node_count(), 3);
}

#[test]
fn test_paste_after_source_deleted_uses_copy_time_ids() {
    let mut harness = TestHarness::new();
    let a = harness.add_node("relay", 0.0, 0.0);
    let b = harness.add_node("relay", 10.0, 0.0);
    harness.select(&[a, b]);
    harness.store.copy();
    harness.store.delete_nodes(&[a]);

    let outcome = harness.store.paste(Point2D::new(0.0, 0.0)).unwrap();
    assert_eq!(outcome.clones.len(), 1);
    assert_eq!(harness.position(outcome.clones[0]), Point2D::new(0.0, 0.0));
}
