//! Closable overlays
//!
//! Layers "Escape closes", "click outside closes" and "close button closes"
//! onto a scope. A region that already owns a scope passes it as
//! `existing_scope`; the escape binding and pointer listeners are then
//! grafted onto that same scope and removed in the same `unregister` call.
//! Otherwise the closable creates and owns a minimal scope of its own.

use std::rc::Rc;

use crate::models::{KeyEvent, Rect, ScopeId};
use crate::normalize::ShortcutDecl;
use crate::scope::{ScopeHandle, ScopeOptions};
use crate::store::{PointerAction, PointerListener, PointerRule, ShortcutStore};

/// Key grafted onto the scope when `close_on_esc` is set
pub const CLOSE_KEY: &str = "escape";

/// Options for [`attach_closable`]
pub struct ClosableOptions<'a> {
    pub on_close: Rc<dyn Fn()>,
    pub close_on_esc: bool,
    pub close_on_outside_click: bool,
    pub close_on_close_button: bool,
    /// Area of the overlay; presses outside it close when enabled
    pub bounds: Option<Rect>,
    /// Area of the close button
    pub close_button: Option<Rect>,
    /// Override flag for an own scope; ignored when grafting
    pub overrides: bool,
    /// Label for an own scope; ignored when grafting
    pub label: String,
    /// Scope to graft onto instead of creating a second one
    pub existing_scope: Option<&'a ScopeHandle>,
}

impl<'a> ClosableOptions<'a> {
    /// Escape-only closable with an overriding own scope
    pub fn new<F>(on_close: F) -> Self
    where
        F: Fn() + 'static,
    {
        ClosableOptions {
            on_close: Rc::new(on_close),
            close_on_esc: true,
            close_on_outside_click: false,
            close_on_close_button: false,
            bounds: None,
            close_button: None,
            overrides: true,
            label: String::new(),
            existing_scope: None,
        }
    }

    /// Close on presses outside `bounds`
    pub fn outside_click(mut self, bounds: Rect) -> Self {
        self.close_on_outside_click = true;
        self.bounds = Some(bounds);
        self
    }

    /// Close on presses inside the button area
    pub fn close_button(mut self, area: Rect) -> Self {
        self.close_on_close_button = true;
        self.close_button = Some(area);
        self
    }

    /// Attach to an existing scope instead of creating one
    pub fn graft_onto(mut self, scope: &'a ScopeHandle) -> Self {
        self.existing_scope = Some(scope);
        self
    }
}

enum ClosableScope {
    /// Own scope; dropped with the handle
    Owned(ScopeHandle),
    /// Caller's scope; torn down by its owner
    Grafted { store: ShortcutStore, id: ScopeId },
    Inert,
}

/// Activation handle returned by [`attach_closable`]
pub struct ClosableHandle {
    scope: ClosableScope,
}

impl ClosableHandle {
    fn target(&self) -> Option<(&ShortcutStore, ScopeId)> {
        match &self.scope {
            ClosableScope::Owned(handle) => handle.store().zip(handle.id()),
            ClosableScope::Grafted { store, id } => Some((store, *id)),
            ClosableScope::Inert => None,
        }
    }

    /// Activate the underlying scope
    pub fn activate(&self) -> bool {
        self.target()
            .is_some_and(|(store, id)| store.activate(id))
    }

    /// Deactivate the underlying scope
    pub fn deactivate(&self) -> bool {
        self.target()
            .is_some_and(|(store, id)| store.deactivate(id))
    }

    /// Whether the underlying scope is on the active stack
    pub fn is_active(&self) -> bool {
        self.target()
            .is_some_and(|(store, id)| store.is_active(id))
    }

    /// Scope carrying the close bindings, `None` when inert
    pub fn scope_id(&self) -> Option<ScopeId> {
        self.target().map(|(_, id)| id)
    }

    /// True when the closable shares a scope owned by someone else
    pub fn is_grafted(&self) -> bool {
        matches!(self.scope, ClosableScope::Grafted { .. })
    }
}

fn escape_binding(on_close: &Rc<dyn Fn()>) -> (&'static str, ShortcutDecl) {
    let on_close = Rc::clone(on_close);
    (
        CLOSE_KEY,
        ShortcutDecl::described(move |_: &KeyEvent| on_close(), "Close"),
    )
}

fn install_pointer_listeners(store: &ShortcutStore, id: ScopeId, options: &ClosableOptions<'_>) {
    let action: PointerAction = {
        let on_close = Rc::clone(&options.on_close);
        Rc::new(move || on_close())
    };

    if options.close_on_outside_click {
        match options.bounds {
            Some(bounds) => store.add_pointer_listener(PointerListener {
                scope: id,
                rule: PointerRule::Outside(bounds),
                action: Rc::clone(&action),
            }),
            None => tracing::warn!(scope = %id, "close_on_outside_click without bounds; ignored"),
        }
    }

    if options.close_on_close_button {
        match options.close_button {
            Some(area) => store.add_pointer_listener(PointerListener {
                scope: id,
                rule: PointerRule::Inside(area),
                action,
            }),
            None => tracing::warn!(scope = %id, "close_on_close_button without a button area; ignored"),
        }
    }
}

/// Attach close behavior to a region
///
/// With `existing_scope` nothing new is registered: the escape binding is
/// merged into that scope and activation follows it. Without it, an own
/// scope is created (inactive until [`ClosableHandle::activate`]) inside
/// the region currently initializing on `store`.
pub fn attach_closable(store: &ShortcutStore, options: ClosableOptions<'_>) -> ClosableHandle {
    if let Some(existing) = options.existing_scope {
        let Some((owner_store, id)) = existing.store().zip(existing.id()) else {
            tracing::error!("attach_closable given an inert scope; close behavior disabled");
            return ClosableHandle {
                scope: ClosableScope::Inert,
            };
        };
        if !owner_store.same_store(store) {
            tracing::warn!(scope = %id, "attach_closable scope belongs to another store; using the scope's store");
        }

        if options.close_on_esc {
            owner_store.add_bindings(id, [escape_binding(&options.on_close)]);
        }
        install_pointer_listeners(owner_store, id, &options);
        tracing::debug!(scope = %id, "Closable grafted onto existing scope");

        return ClosableHandle {
            scope: ClosableScope::Grafted {
                store: owner_store.clone(),
                id,
            },
        };
    }

    let bindings: Vec<(&str, ShortcutDecl)> = if options.close_on_esc {
        vec![escape_binding(&options.on_close)]
    } else {
        Vec::new()
    };
    let label = if options.label.is_empty() {
        "closable".to_string()
    } else {
        options.label.clone()
    };
    let handle = store.create_shortcut_scope(
        bindings,
        ScopeOptions {
            auto_activate: false,
            label,
            overrides: options.overrides,
        },
    );

    match handle.id() {
        Some(id) => {
            install_pointer_listeners(store, id, &options);
            ClosableHandle {
                scope: ClosableScope::Owned(handle),
            }
        }
        None => ClosableHandle {
            scope: ClosableScope::Inert,
        },
    }
}

impl ShortcutStore {
    /// Attach close behavior; see [`attach_closable`]
    pub fn attach_closable(&self, options: ClosableOptions<'_>) -> ClosableHandle {
        attach_closable(self, options)
    }
}
