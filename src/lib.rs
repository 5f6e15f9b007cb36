//! Shared helpers for the workspace-level keyscope scenario tests

use std::cell::Cell;
use std::rc::Rc;

use keyscope::KeyEvent;

/// Install a debug-level fmt subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A handler that counts its invocations
pub fn counter() -> (Rc<Cell<u32>>, impl Fn(&KeyEvent) + 'static) {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    (count, move |_: &KeyEvent| c.set(c.get() + 1))
}
