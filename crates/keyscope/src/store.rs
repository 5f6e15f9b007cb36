//! Injectable shortcut store
//!
//! One [`ShortcutStore`] holds the scope registry, the active stack, the
//! shared chord state and the pointer listeners installed by closable
//! regions. Cloning the store shares the same instance. Production code
//! uses [`ShortcutStore::global`]; tests build their own.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Instant;

use serde::Serialize;

use crate::chord::{extends, ChordLookup, ChordMatcher, ChordOutcome};
use crate::config::DispatcherConfig;
use crate::models::{PointerEvent, Rect, ScopeId};
use crate::normalize::{Binding, BindingInfo, ShortcutDecl};
use crate::registry::{ScopeRegistration, ScopeRegistry};
use crate::stack::ActiveStack;

/// Callback run by a pointer listener
pub type PointerAction = Rc<dyn Fn()>;

/// Where a press must land for a pointer listener to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerRule {
    /// Anywhere outside the rect
    Outside(Rect),
    /// Inside the rect
    Inside(Rect),
}

impl PointerRule {
    /// Does the press satisfy this rule
    pub fn matches(&self, event: &PointerEvent) -> bool {
        match self {
            PointerRule::Outside(rect) => !rect.contains(event.column, event.row),
            PointerRule::Inside(rect) => rect.contains(event.column, event.row),
        }
    }
}

/// Pointer callback owned by a scope and removed with it
#[derive(Clone)]
pub struct PointerListener {
    pub scope: ScopeId,
    pub rule: PointerRule,
    pub action: PointerAction,
}

/// Active scope as reported by diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveScopeInfo {
    pub scope_id: ScopeId,
    pub label: String,
    pub overrides: bool,
}

/// Binding that won resolution for a keystroke
pub(crate) struct Resolved {
    pub scope: ScopeId,
    pub binding: Binding,
}

pub(crate) enum KeyResolution {
    Resolved(Resolved),
    Pending(Vec<String>),
    Unmatched,
}

pub(crate) struct StoreState {
    pub(crate) registry: ScopeRegistry,
    pub(crate) stack: ActiveStack,
    pub(crate) matcher: ChordMatcher,
    pub(crate) pointer_listeners: Vec<PointerListener>,
    /// Regions currently running their initialization, innermost last
    pub(crate) regions: Vec<String>,
    pub(crate) next_id: u64,
    pub(crate) dispatcher_attached: bool,
}

/// Eligible registrations in dispatch priority order
struct Eligible<'a> {
    scopes: Vec<&'a ScopeRegistration>,
}

impl Eligible<'_> {
    fn winner(&self, key: &str) -> Option<&ScopeRegistration> {
        self.scopes
            .iter()
            .copied()
            .find(|scope| scope.bindings.contains_key(key))
    }
}

impl ChordLookup for Eligible<'_> {
    fn has_exact(&self, candidate: &str) -> bool {
        self.winner(candidate).is_some()
    }

    fn has_prefix(&self, candidate: &str) -> bool {
        self.scopes
            .iter()
            .any(|scope| scope.bindings.keys().any(|key| extends(key, candidate)))
    }
}

/// Shared handle to the registry, active stack and chord state
#[derive(Clone)]
pub struct ShortcutStore {
    pub(crate) inner: Rc<RefCell<StoreState>>,
}

thread_local! {
    static GLOBAL_STORE: ShortcutStore = ShortcutStore::new();
}

impl ShortcutStore {
    /// Create a store with the default chord window
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    /// Create a store with dispatcher settings
    pub fn with_config(config: DispatcherConfig) -> Self {
        ShortcutStore {
            inner: Rc::new(RefCell::new(StoreState {
                registry: ScopeRegistry::new(),
                stack: ActiveStack::new(),
                matcher: ChordMatcher::new(config.chord_window()),
                pointer_listeners: Vec::new(),
                regions: Vec::new(),
                next_id: 1,
                dispatcher_attached: false,
            })),
        }
    }

    /// The process-wide store for this UI thread
    pub fn global() -> Self {
        GLOBAL_STORE.with(|store| store.clone())
    }

    /// Two handles share one underlying store
    pub fn same_store(&self, other: &ShortcutStore) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn allocate_id(&self) -> ScopeId {
        let mut state = self.inner.borrow_mut();
        let id = ScopeId(state.next_id);
        state.next_id += 1;
        id
    }

    /// Register a scope under a freshly allocated id
    pub(crate) fn register<K, I>(
        &self,
        label: &str,
        owner: &str,
        overrides: bool,
        decls: I,
    ) -> Option<ScopeId>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, ShortcutDecl)>,
    {
        let id = self.allocate_id();
        let result = self
            .inner
            .borrow_mut()
            .registry
            .register(id, label, owner, overrides, decls);
        match result {
            Ok(()) => {
                tracing::debug!(scope = %id, label, owner, overrides, "Registered shortcut scope");
                Some(id)
            }
            Err(e) => {
                tracing::error!(scope = %id, error = %e, "Failed to register shortcut scope");
                None
            }
        }
    }

    /// Merge bindings into a registered scope without touching activation
    pub fn add_bindings<K, I>(&self, id: ScopeId, decls: I) -> bool
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, ShortcutDecl)>,
    {
        self.inner.borrow_mut().registry.add_bindings(id, decls)
    }

    /// Remove named bindings, or all of them when `keys` is `None`
    pub fn remove_bindings(&self, id: ScopeId, keys: Option<&[&str]>) -> bool {
        self.inner.borrow_mut().registry.remove_bindings(id, keys)
    }

    /// Remove a scope, its active entry and its pointer listeners in one step
    pub fn unregister(&self, id: ScopeId) -> bool {
        let mut state = self.inner.borrow_mut();
        let removed = state.registry.unregister(id).is_some();
        state.stack.deactivate(id);
        state.pointer_listeners.retain(|listener| listener.scope != id);
        if removed {
            tracing::debug!(scope = %id, "Unregistered shortcut scope");
        }
        removed
    }

    /// Put a registered scope on the active stack with its override flag
    pub fn activate(&self, id: ScopeId) -> bool {
        let mut state = self.inner.borrow_mut();
        let Some(overrides) = state.registry.get(id).map(|scope| scope.overrides) else {
            tracing::warn!(scope = %id, "Cannot activate unregistered scope");
            return false;
        };
        let pushed = state.stack.activate(id, overrides);
        if pushed {
            tracing::debug!(scope = %id, overrides, "Activated shortcut scope");
        }
        pushed
    }

    /// Remove a scope from the active stack; unknown ids are ignored
    pub fn deactivate(&self, id: ScopeId) -> bool {
        let removed = self.inner.borrow_mut().stack.deactivate(id);
        if removed {
            tracing::debug!(scope = %id, "Deactivated shortcut scope");
        }
        removed
    }

    /// Whether a scope is on the active stack
    pub fn is_active(&self, id: ScopeId) -> bool {
        self.inner.borrow().stack.is_active(id)
    }

    /// Whether a scope is registered
    pub fn is_registered(&self, id: ScopeId) -> bool {
        self.inner.borrow().registry.contains(id)
    }

    /// Bindings of one scope, sorted by key
    pub fn get_bindings(&self, id: ScopeId) -> Option<Vec<BindingInfo>> {
        self.inner
            .borrow()
            .registry
            .get_bindings(id)
            .map(|bindings| bindings.values().map(Binding::info).collect())
    }

    /// Label of a registered scope
    pub fn get_scope_label(&self, id: ScopeId) -> Option<String> {
        self.inner.borrow().registry.get_label(id).map(str::to_string)
    }

    /// Active scopes in activation order
    pub fn list_active_scopes(&self) -> Vec<ActiveScopeInfo> {
        let state = self.inner.borrow();
        state
            .stack
            .list_active()
            .iter()
            .map(|entry| ActiveScopeInfo {
                scope_id: entry.scope_id,
                label: state
                    .registry
                    .get_label(entry.scope_id)
                    .unwrap_or_default()
                    .to_string(),
                overrides: entry.overrides,
            })
            .collect()
    }

    /// Every registered scope with its bindings
    pub fn list_registered_scopes(&self) -> BTreeMap<ScopeId, Vec<BindingInfo>> {
        let state = self.inner.borrow();
        state
            .registry
            .list_scopes()
            .into_iter()
            .filter_map(|id| {
                state
                    .registry
                    .get_bindings(id)
                    .map(|bindings| (id, bindings.values().map(Binding::info).collect()))
            })
            .collect()
    }

    /// Scopes eligible for the next keystroke, most recent first
    pub fn eligible_scopes(&self) -> Vec<ScopeId> {
        self.inner.borrow().stack.eligible()
    }

    /// Keys of a partial chord awaiting its next step
    pub fn pending_chord(&self) -> Vec<String> {
        self.inner.borrow().matcher.pending().to_vec()
    }

    /// Drop all scopes, listeners and chord state
    pub fn reset(&self) {
        let mut state = self.inner.borrow_mut();
        state.registry.clear();
        state.stack.clear();
        state.matcher.reset();
        state.pointer_listeners.clear();
        state.regions.clear();
    }

    pub(crate) fn add_pointer_listener(&self, listener: PointerListener) {
        let mut state = self.inner.borrow_mut();
        if !state.registry.contains(listener.scope) {
            tracing::debug!(scope = %listener.scope, "Pointer listener for unknown scope ignored");
            return;
        }
        state.pointer_listeners.push(listener);
    }

    /// Number of pointer listeners owned by a scope
    pub fn pointer_listener_count(&self, id: ScopeId) -> usize {
        self.inner
            .borrow()
            .pointer_listeners
            .iter()
            .filter(|listener| listener.scope == id)
            .count()
    }

    /// Run the chord matcher over the eligible bindings for one token
    pub(crate) fn resolve_token(&self, token: &str, now: Instant) -> KeyResolution {
        let mut guard = self.inner.borrow_mut();
        let state = &mut *guard;
        let registry = &state.registry;
        let matcher = &mut state.matcher;

        let eligible = Eligible {
            scopes: state
                .stack
                .eligible()
                .into_iter()
                .filter_map(|id| registry.get(id))
                .collect(),
        };

        match matcher.feed(token, now, &eligible) {
            ChordOutcome::Matched(key) => match eligible.winner(&key) {
                Some(scope) => match scope.bindings.get(&key) {
                    Some(binding) => KeyResolution::Resolved(Resolved {
                        scope: scope.id,
                        binding: binding.clone(),
                    }),
                    None => KeyResolution::Unmatched,
                },
                None => KeyResolution::Unmatched,
            },
            ChordOutcome::Pending(keys) => KeyResolution::Pending(keys),
            ChordOutcome::NoMatch => KeyResolution::Unmatched,
        }
    }

    /// Run `f` over the eligible registrations, most recent first
    pub(crate) fn with_eligible<R>(&self, f: impl FnOnce(&[&ScopeRegistration]) -> R) -> R {
        let state = self.inner.borrow();
        let scopes: Vec<&ScopeRegistration> = state
            .stack
            .eligible()
            .into_iter()
            .filter_map(|id| state.registry.get(id))
            .collect();
        f(&scopes)
    }

    pub(crate) fn expire_chord(&self, now: Instant) -> bool {
        self.inner.borrow_mut().matcher.expire(now)
    }

    /// Pointer actions whose scope is active and whose rule matches
    pub(crate) fn pointer_actions(&self, event: &PointerEvent) -> Vec<PointerAction> {
        let state = self.inner.borrow();
        state
            .pointer_listeners
            .iter()
            .filter(|listener| state.stack.is_active(listener.scope))
            .filter(|listener| listener.rule.matches(event))
            .map(|listener| Rc::clone(&listener.action))
            .collect()
    }
}

impl Default for ShortcutStore {
    fn default() -> Self {
        Self::new()
    }
}
