//! Active scope stack and override resolution

use crate::models::ScopeId;

/// A scope that is currently live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEntry {
    pub scope_id: ScopeId,
    pub overrides: bool,
}

/// Tracks which scopes are live, in activation order
#[derive(Debug, Default)]
pub struct ActiveStack {
    entries: Vec<ActiveEntry>,
}

impl ActiveStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a scope; activating an already active scope changes nothing
    pub fn activate(&mut self, scope_id: ScopeId, overrides: bool) -> bool {
        if self.is_active(scope_id) {
            return false;
        }
        self.entries.push(ActiveEntry {
            scope_id,
            overrides,
        });
        true
    }

    /// Drop a scope from the stack; returns false if it was not active
    pub fn deactivate(&mut self, scope_id: ScopeId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.scope_id != scope_id);
        self.entries.len() != before
    }

    /// Check if a scope is on the stack
    pub fn is_active(&self, scope_id: ScopeId) -> bool {
        self.entries.iter().any(|entry| entry.scope_id == scope_id)
    }

    /// Active entries in activation order (oldest first)
    pub fn list_active(&self) -> &[ActiveEntry] {
        &self.entries
    }

    /// True when at least one overriding scope is live
    pub fn is_blocked(&self) -> bool {
        self.entries.iter().any(|entry| entry.overrides)
    }

    /// Scopes allowed to receive the next keystroke, most recent first
    ///
    /// While any overriding scope is active only overriding scopes are
    /// eligible. Every overriding scope stays eligible, so nested overlays
    /// keep each other's bindings working.
    pub fn eligible(&self) -> Vec<ScopeId> {
        let blocked = self.is_blocked();
        self.entries
            .iter()
            .rev()
            .filter(|entry| !blocked || entry.overrides)
            .map(|entry| entry.scope_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
