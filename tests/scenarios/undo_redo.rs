use nodeshell::EditorConfig;
use nodeshell::history::ActionKind;
use proptest::prelude::*;

use super::harness::TestHarness;

#[derive(Debug, Clone)]
enum Op {
    Create { note: bool, x: i16, y: i16 },
    Move { pick: usize, dx: i16, dy: i16 },
    Delete { pick: usize },
    Retitle { pick: usize, title: String },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<bool>(), any::<i16>(), any::<i16>())
            .prop_map(|(note, x, y)| Op::Create { note, x, y }),
        (any::<usize>(), -500i16..500, -500i16..500)
            .prop_map(|(pick, dx, dy)| Op::Move { pick, dx, dy }),
        any::<usize>().prop_map(|pick| Op::Delete { pick }),
        (any::<usize>(), "[a-z|~ ]{0,8}").prop_map(|(pick, title)| Op::Retitle { pick, title }),
    ]
}

/// Apply `op`; true when it recorded an action.
fn apply(harness: &mut TestHarness, op: &Op) -> bool {
    let live = harness.store.graph().node_ids();
    let pick = |index: usize| (!live.is_empty()).then(|| live[index % live.len()]);
    match op {
        Op::Create { note, x, y } => {
            let template = if *note { "note" } else { "relay" };
            harness.add_node(template, f32::from(*x), f32::from(*y));
            true
        },
        Op::Move { pick: index, dx, dy } => match pick(*index) {
            Some(id) => harness.nudge(id, f32::from(*dx), f32::from(*dy)),
            None => false,
        },
        Op::Delete { pick: index } => match pick(*index) {
            Some(id) => harness.store.delete_nodes(&[id]) > 0,
            None => false,
        },
        Op::Retitle { pick: index, title } => match pick(*index) {
            Some(id) => harness.retitle(id, title),
            None => false,
        },
    }
}

proptest! {
    #[test]
    fn undo_then_redo_inverts_any_sequence(ops in prop::collection::vec(op(), 1..40)) {
        let mut harness = TestHarness::new();
        let a = harness.add_node("relay", 0.0, 0.0);
        let b = harness.add_node("relay", 100.0, 0.0);
        harness.wire(a, b);
        let before = harness.text();

        let recorded = ops.iter().filter(|op| apply(&mut harness, op)).count();
        let after = harness.text();

        for _ in 0..recorded {
            prop_assert!(harness.store.undo());
        }
        prop_assert_eq!(harness.text(), before);
        harness.assert_back_references_consistent();

        for _ in 0..recorded {
            prop_assert!(harness.store.redo());
        }
        prop_assert!(!harness.store.history().can_redo());
        prop_assert_eq!(harness.text(), after);
        harness.assert_back_references_consistent();
    }
}

#[test]
fn test_new_action_clears_redo_tail() {
    let mut harness = TestHarness::new();
    let a = harness.add_node("relay", 0.0, 0.0);
    harness.nudge(a, 10.0, 0.0);
    harness.nudge(a, 10.0, 0.0);
    harness.store.undo();
    assert!(harness.store.history().can_redo());

    harness.nudge(a, 0.0, 5.0);
    assert!(!harness.store.history().can_redo());
    assert_eq!(
        harness.store.history().kinds(),
        vec![
            ActionKind::NewCanvas,
            ActionKind::CreateNodes,
            ActionKind::MoveNodes,
            ActionKind::MoveNodes,
        ]
    );
}

#[test]
fn test_history_is_bounded_and_evicted_action_is_unreachable() {
    let mut harness = TestHarness::with_config(EditorConfig {
        history_capacity: 8,
        ..EditorConfig::default()
    });
    let a = harness.add_node("relay", 0.0, 0.0);
    for _ in 0..8 {
        harness.nudge(a, 1.0, 0.0);
    }
    assert_eq!(harness.store.history().len(), 8);
    assert_eq!(harness.store.history().cursor(), 7);

    // The create and the first move fell off the front.
    assert_eq!(harness.undo_all(), 7);
    assert!(harness.store.node(a).is_some());
    assert_eq!(harness.position(a).x, 1.0);
    assert_eq!(
        harness.store.history().get(0).map(|action| action.kind()),
        Some(ActionKind::NewCanvas)
    );
}

#[test]
fn test_undo_at_sentinel_is_refused() {
    let mut harness = TestHarness::new();
    assert!(!harness.store.undo());
    assert!(!harness.store.redo());
    harness.add_node("relay", 0.0, 0.0);
    assert!(harness.store.undo());
    assert!(!harness.store.undo());
    assert_eq!(harness.store.graph().node_count(), 0);
}
