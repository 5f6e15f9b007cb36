//! Property-based tests for scope dispatch
//! Covers single-key delivery, override blocking, chord windows and
//! idempotent teardown.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use keyscope::*;
use proptest::prelude::*;

/// Strategy for generating single-key binding names
fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (b'a'..=b'z').prop_map(|c| (c as char).to_string()),
        (b'0'..=b'9').prop_map(|c| (c as char).to_string()),
        Just("escape".to_string()),
        Just("enter".to_string()),
        Just("arrowdown".to_string()),
        Just("arrowup".to_string()),
        Just("tab".to_string()),
        Just("/".to_string()),
    ]
}

/// Operations a region lifecycle can perform on a scope
#[derive(Debug, Clone)]
enum Op {
    Activate(usize),
    Deactivate(usize),
    Unregister(usize),
}

fn op_strategy(scopes: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..scopes).prop_map(Op::Activate),
        (0..scopes).prop_map(Op::Deactivate),
        (0..scopes).prop_map(Op::Unregister),
    ]
}

fn counted() -> (Rc<Cell<u32>>, ShortcutDecl) {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    (
        count,
        ShortcutDecl::handler(move |_: &KeyEvent| c.set(c.get() + 1)),
    )
}

proptest! {
    /// Dispatching a bound key while its scope is eligible invokes the
    /// handler exactly once.
    #[test]
    fn prop_single_key_fires_once(key in key_strategy()) {
        let store = ShortcutStore::new();
        let dispatcher = store.attach_dispatcher();
        let _init = store.init_region("region");
        let (count, decl) = counted();
        let _scope = store.create_shortcut_scope([(key.clone(), decl)], ScopeOptions::default());

        let outcome = dispatcher.dispatch(&mut KeyEvent::new(key));
        prop_assert!(outcome.is_handled());
        prop_assert_eq!(count.get(), 1);
    }

    /// While any overriding scope is active, keys bound only in plain
    /// scopes never fire, and keys of every overriding scope still do.
    #[test]
    fn prop_override_blocks_plain_scopes(overrides in prop::collection::vec(any::<bool>(), 1..6)) {
        let store = ShortcutStore::new();
        let dispatcher = store.attach_dispatcher();
        let _init = store.init_region("region");

        let mut handles = Vec::new();
        let mut counts = Vec::new();
        for (i, flag) in overrides.iter().enumerate() {
            let (count, decl) = counted();
            let options = ScopeOptions {
                overrides: *flag,
                ..ScopeOptions::labeled(format!("scope-{}", i))
            };
            handles.push(store.create_shortcut_scope([(i.to_string(), decl)], options));
            counts.push(count);
        }

        let blocked = overrides.iter().any(|flag| *flag);
        for (i, flag) in overrides.iter().enumerate() {
            dispatcher.dispatch(&mut KeyEvent::new(i.to_string()));
            let expected = if !blocked || *flag { 1 } else { 0 };
            prop_assert_eq!(counts[i].get(), expected);
        }
    }

    /// A two-step chord fires only when the gap is inside the window.
    #[test]
    fn prop_chord_respects_window(gap_ms in 0u64..1500) {
        let store = ShortcutStore::new();
        let dispatcher = store.attach_dispatcher();
        let _init = store.init_region("region");
        let (count, decl) = counted();
        let _scope = store.create_shortcut_scope([("g,g", decl)], ScopeOptions::default());

        let t0 = Instant::now();
        dispatcher.dispatch(&mut KeyEvent::new("g").at(t0));
        dispatcher.dispatch(&mut KeyEvent::new("g").at(t0 + Duration::from_millis(gap_ms)));

        let expected = if gap_ms < 600 { 1 } else { 0 };
        prop_assert_eq!(count.get(), expected);
        prop_assert!(store.pending_chord().len() <= 1);
    }

    /// Any sequence of lifecycle operations keeps the stack inside the
    /// registry, and repeating an operation changes nothing.
    #[test]
    fn prop_lifecycle_ops_are_idempotent(ops in prop::collection::vec(op_strategy(4), 0..40)) {
        let store = ShortcutStore::new();
        let _init = store.init_region("region");
        let handles: Vec<ScopeHandle> = (0..4)
            .map(|i| {
                store.create_shortcut_scope(
                    [("x", ShortcutDecl::handler(|_: &KeyEvent| {}))],
                    ScopeOptions {
                        overrides: i % 2 == 0,
                        ..ScopeOptions::labeled(format!("scope-{}", i))
                    }
                    .inactive(),
                )
            })
            .collect();

        for op in ops {
            let apply = |op: &Op| match op {
                Op::Activate(i) => { handles[*i].activate(); }
                Op::Deactivate(i) => { handles[*i].deactivate(); }
                Op::Unregister(i) => { handles[*i].unregister(); }
            };
            apply(&op);
            let active_once = store.list_active_scopes();
            let registered_once = store.list_registered_scopes().len();
            apply(&op);
            prop_assert_eq!(store.list_active_scopes(), active_once.clone());
            prop_assert_eq!(store.list_registered_scopes().len(), registered_once);

            for info in &active_once {
                prop_assert!(store.is_registered(info.scope_id));
            }
        }
    }
}
