//! End-to-end scenarios: regions mounting, overlays opening and closing,
//! and a single dispatcher routing every keystroke.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use keyscope::*;
use keyscope_integration_tests::{counter, init_tracing};

#[test]
fn modal_blocks_search_until_deactivated() {
    init_tracing();
    let store = ShortcutStore::new();
    let dispatcher = store.attach_dispatcher();

    let (closed, close) = counter();
    let (focused, focus_search) = counter();

    let modal_init = store.init_region("modal");
    let modal = store.create_shortcut_scope(
        [("escape", ShortcutDecl::handler(close))],
        ScopeOptions::labeled("M").overriding(),
    );
    drop(modal_init);

    let search_init = store.init_region("search-bar");
    let _search = store.create_shortcut_scope(
        [("/", ShortcutDecl::handler(focus_search))],
        ScopeOptions::labeled("S"),
    );
    drop(search_init);

    assert_eq!(
        dispatcher.dispatch(&mut KeyEvent::new("/")),
        DispatchOutcome::Unmatched
    );
    assert_eq!(focused.get(), 0);

    modal.deactivate();
    assert!(dispatcher.dispatch(&mut KeyEvent::new("/")).is_handled());
    assert_eq!(focused.get(), 1);
    assert_eq!(closed.get(), 0);
}

#[test]
fn go_to_top_chord_timing() {
    init_tracing();
    let store = ShortcutStore::new();
    let dispatcher = store.attach_dispatcher();
    let (top, go_to_top) = counter();

    let _init = store.init_region("document");
    let _scope = store.create_shortcut_scope(
        [("g,g", ShortcutDecl::handler(go_to_top))],
        ScopeOptions::default(),
    );

    let t0 = Instant::now();
    dispatcher.dispatch(&mut KeyEvent::new("g").at(t0));
    dispatcher.dispatch(&mut KeyEvent::new("g").at(t0 + Duration::from_millis(50)));
    assert_eq!(top.get(), 1);

    let t1 = t0 + Duration::from_secs(10);
    dispatcher.dispatch(&mut KeyEvent::new("g").at(t1));
    dispatcher.dispatch(&mut KeyEvent::new("g").at(t1 + Duration::from_millis(1000)));
    assert_eq!(top.get(), 1);
}

#[test]
fn menu_with_confirmation_dialog() {
    init_tracing();
    let store = ShortcutStore::new();
    let dispatcher = store.attach_dispatcher();
    let log = Rc::new(RefCell::new(Vec::<&'static str>::new()));

    // Page-level navigation, always mounted
    let page_init = store.init_region("page");
    let page_log = log.clone();
    let _page = store.create_shortcut_scope(
        [(
            "j",
            ShortcutDecl::handler(move |_: &KeyEvent| page_log.borrow_mut().push("page:j")),
        )],
        ScopeOptions::labeled("page"),
    );
    drop(page_init);

    // Menu owns one scope and grafts its close behavior onto it
    let menu_init = store.init_region("menu");
    let menu_log = log.clone();
    let menu = store.create_shortcut_scope(
        [(
            "arrowdown",
            ShortcutDecl::handler(move |_: &KeyEvent| menu_log.borrow_mut().push("menu:down")),
        )],
        ScopeOptions::labeled("menu").overriding().inactive(),
    );
    let menu_close_log = log.clone();
    let menu_closable = attach_closable(
        &store,
        ClosableOptions::new(move || menu_close_log.borrow_mut().push("menu:close"))
            .outside_click(Rect::new(0, 0, 30, 12))
            .graft_onto(&menu),
    );
    drop(menu_init);

    menu_closable.activate();
    assert_eq!(store.list_active_scopes().len(), 2);
    assert_eq!(store.list_registered_scopes().len(), 2);

    // Confirmation dialog opened from within the menu
    let dialog_init = store.init_region("confirm");
    let dialog_log = log.clone();
    let dialog = attach_closable(
        &store,
        ClosableOptions {
            label: "confirm".to_string(),
            ..ClosableOptions::new(move || dialog_log.borrow_mut().push("confirm:close"))
        },
    );
    drop(dialog_init);
    dialog.activate();

    for key in ["j", "ArrowDown", "Escape"] {
        dispatcher.dispatch(&mut KeyEvent::new(key));
    }
    dialog.deactivate();
    dispatcher.dispatch(&mut KeyEvent::new("Escape"));
    dispatcher.dispatch_pointer(&PointerEvent::new(50, 3));
    menu_closable.deactivate();
    dispatcher.dispatch(&mut KeyEvent::new("j"));

    assert_eq!(
        *log.borrow(),
        vec!["menu:down", "confirm:close", "menu:close", "menu:close", "page:j"]
    );

    // Help shows what is reachable now
    let entries = ShortcutHelp::entries(&store);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].scope, "page");

    drop(dialog);
    drop(menu);
    assert_eq!(store.list_registered_scopes().len(), 1);
}
