//! Region-owned shortcut scopes
//!
//! A region marks its initialization with [`ShortcutStore::init_region`] and
//! creates its scope inside it. The returned [`ScopeHandle`] is the region's
//! lifetime: dropping it unregisters the scope.

use crate::models::ScopeId;
use crate::normalize::{BindingInfo, ShortcutDecl};
use crate::store::ShortcutStore;

/// How a new scope should be registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeOptions {
    /// Push onto the active stack right after registration
    pub auto_activate: bool,
    /// Human readable name; defaults to the owning region's name
    pub label: String,
    /// While active, restrict dispatch to overriding scopes
    pub overrides: bool,
}

impl Default for ScopeOptions {
    fn default() -> Self {
        ScopeOptions {
            auto_activate: true,
            label: String::new(),
            overrides: false,
        }
    }
}

impl ScopeOptions {
    /// Default options with a label
    pub fn labeled(label: impl Into<String>) -> Self {
        ScopeOptions {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Block non-overriding scopes while active
    pub fn overriding(mut self) -> Self {
        self.overrides = true;
        self
    }

    /// Register without activating
    pub fn inactive(mut self) -> Self {
        self.auto_activate = false;
        self
    }
}

/// Marks a region's initialization; scopes created while it lives are
/// owned by that region
#[must_use = "the region is only current while the guard is alive"]
pub struct RegionInit {
    store: ShortcutStore,
    depth: usize,
}

impl Drop for RegionInit {
    fn drop(&mut self) {
        self.store.inner.borrow_mut().regions.truncate(self.depth);
    }
}

struct LiveScope {
    store: ShortcutStore,
    id: ScopeId,
}

/// Handle to one region's scope
///
/// An inert handle is returned when no region was initializing; every
/// operation on it is a no-op.
pub struct ScopeHandle {
    live: Option<LiveScope>,
}

impl ShortcutStore {
    /// Begin a region's initialization
    pub fn init_region(&self, name: impl Into<String>) -> RegionInit {
        let mut state = self.inner.borrow_mut();
        let depth = state.regions.len();
        state.regions.push(name.into());
        RegionInit {
            store: self.clone(),
            depth,
        }
    }

    /// Innermost region currently initializing
    pub fn current_region(&self) -> Option<String> {
        self.inner.borrow().regions.last().cloned()
    }

    /// Register a scope for the region being initialized
    pub fn create_shortcut_scope<K, I>(&self, bindings: I, options: ScopeOptions) -> ScopeHandle
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, ShortcutDecl)>,
    {
        let Some(owner) = self.current_region() else {
            tracing::error!(
                label = %options.label,
                "create_shortcut_scope called outside a region initialization; shortcuts disabled"
            );
            return ScopeHandle::inert();
        };

        let label = if options.label.is_empty() {
            owner.clone()
        } else {
            options.label
        };

        let Some(id) = self.register(&label, &owner, options.overrides, bindings) else {
            return ScopeHandle::inert();
        };

        if options.auto_activate {
            self.activate(id);
        }

        ScopeHandle {
            live: Some(LiveScope {
                store: self.clone(),
                id,
            }),
        }
    }
}

impl ScopeHandle {
    /// A handle bound to no scope
    pub fn inert() -> Self {
        ScopeHandle { live: None }
    }

    /// True when the handle is bound to no scope
    pub fn is_inert(&self) -> bool {
        self.live.is_none()
    }

    /// Id of the scope, `None` when inert
    pub fn id(&self) -> Option<ScopeId> {
        self.live.as_ref().map(|live| live.id)
    }

    /// Store holding the scope, `None` when inert
    pub fn store(&self) -> Option<&ShortcutStore> {
        self.live.as_ref().map(|live| &live.store)
    }

    /// Push the scope onto the active stack
    pub fn activate(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| live.store.activate(live.id))
    }

    /// Remove the scope from the active stack
    pub fn deactivate(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| live.store.deactivate(live.id))
    }

    /// Whether the scope is still registered
    pub fn is_registered(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| live.store.is_registered(live.id))
    }

    /// Whether the scope is on the active stack
    pub fn is_active(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| live.store.is_active(live.id))
    }

    /// Label the scope was registered under
    pub fn label(&self) -> Option<String> {
        self.live
            .as_ref()
            .and_then(|live| live.store.get_scope_label(live.id))
    }

    /// Merge bindings without changing activation
    pub fn add_shortcuts<K, I>(&self, bindings: I) -> bool
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, ShortcutDecl)>,
    {
        self.live
            .as_ref()
            .is_some_and(|live| live.store.add_bindings(live.id, bindings))
    }

    /// Remove the named shortcuts, or all of them with `None`. The scope
    /// stays registered and keeps its active status.
    pub fn remove_shortcuts(&self, keys: Option<&[&str]>) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| live.store.remove_bindings(live.id, keys))
    }

    /// Current bindings, sorted by key
    pub fn get_shortcuts(&self) -> Vec<BindingInfo> {
        self.live
            .as_ref()
            .and_then(|live| live.store.get_bindings(live.id))
            .unwrap_or_default()
    }

    /// Tear the scope down now; also happens on drop
    pub fn unregister(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| live.store.unregister(live.id))
    }
}

impl Drop for ScopeHandle {
    fn drop(&mut self) {
        self.unregister();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KeyEvent;

    fn noop() -> ShortcutDecl {
        ShortcutDecl::handler(|_: &KeyEvent| {})
    }

    #[test]
    fn test_scope_outside_region_is_inert() {
        let store = ShortcutStore::new();
        let handle = store.create_shortcut_scope([("a", noop())], ScopeOptions::default());

        assert!(handle.is_inert());
        assert!(!handle.activate());
        assert!(!handle.is_registered());
        assert!(handle.get_shortcuts().is_empty());
        assert!(store.list_registered_scopes().is_empty());
    }

    #[test]
    fn test_label_defaults_to_region_name() {
        let store = ShortcutStore::new();
        let _init = store.init_region("sidebar");
        let handle = store.create_shortcut_scope([("a", noop())], ScopeOptions::default());

        assert_eq!(handle.label().as_deref(), Some("sidebar"));
        assert!(handle.is_active());
    }

    #[test]
    fn test_region_guard_restores_outer_region() {
        let store = ShortcutStore::new();
        let outer = store.init_region("menu");
        {
            let _inner = store.init_region("submenu");
            assert_eq!(store.current_region().as_deref(), Some("submenu"));
        }
        assert_eq!(store.current_region().as_deref(), Some("menu"));
        drop(outer);
        assert_eq!(store.current_region(), None);
    }

    #[test]
    fn test_drop_unregisters() {
        let store = ShortcutStore::new();
        let _init = store.init_region("modal");
        let handle = store.create_shortcut_scope(
            [("escape", noop())],
            ScopeOptions::labeled("modal").overriding(),
        );
        let id = handle.id().unwrap();
        assert!(store.is_active(id));

        drop(handle);
        assert!(!store.is_registered(id));
        assert!(store.list_active_scopes().is_empty());
    }

    #[test]
    fn test_remove_all_keeps_registration_and_activation() {
        let store = ShortcutStore::new();
        let _init = store.init_region("list");
        let handle =
            store.create_shortcut_scope([("j", noop()), ("k", noop())], ScopeOptions::default());

        assert!(handle.remove_shortcuts(None));
        assert!(handle.get_shortcuts().is_empty());
        assert!(handle.is_registered());
        assert!(handle.is_active());
    }

    #[test]
    fn test_explicit_unregister_then_drop_is_safe() {
        let store = ShortcutStore::new();
        let _init = store.init_region("toast");
        let handle = store.create_shortcut_scope([("x", noop())], ScopeOptions::default());

        assert!(handle.unregister());
        assert!(!handle.unregister());
        assert!(!handle.deactivate());
        drop(handle);
    }
}
