use nodeshell::VERSION;

mod deletion;
mod harness;
mod paste;
mod persistence;
mod undo_redo;

#[test]
fn scenarios_binary_smoke_runs() {
    assert!(!VERSION.is_empty());
}
