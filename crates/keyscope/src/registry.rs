//! Scope registry: per-region binding storage

use std::collections::BTreeMap;

use crate::{
    error::RegistryError,
    models::ScopeId,
    normalize::{normalize_binding, normalize_binding_key, Binding, ShortcutDecl},
};

/// Bindings and metadata owned by one region
#[derive(Debug, Clone)]
pub struct ScopeRegistration {
    pub id: ScopeId,
    pub label: String,
    /// Name of the region whose initialization created the scope
    pub owner: String,
    pub overrides: bool,
    pub bindings: BTreeMap<String, Binding>,
}

/// Registry for storing and looking up scopes by id
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    scopes: BTreeMap<ScopeId, ScopeRegistration>,
}

/// Normalize a batch of declarations, skipping keys that do not parse
fn normalize_all<K, I>(scope: ScopeId, decls: I) -> Vec<Binding>
where
    K: AsRef<str>,
    I: IntoIterator<Item = (K, ShortcutDecl)>,
{
    let mut bindings = Vec::new();
    for (declared, decl) in decls {
        match normalize_binding_key(declared.as_ref()) {
            Ok(key) => bindings.push(normalize_binding(key, decl)),
            Err(e) => {
                tracing::warn!(scope = %scope, key = declared.as_ref(), error = %e, "Skipping shortcut with invalid key");
            }
        }
    }
    bindings
}

impl ScopeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a normalized registration; each id may be registered once
    pub fn register<K, I>(
        &mut self,
        id: ScopeId,
        label: impl Into<String>,
        owner: impl Into<String>,
        overrides: bool,
        decls: I,
    ) -> Result<(), RegistryError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, ShortcutDecl)>,
    {
        if self.scopes.contains_key(&id) {
            return Err(RegistryError::DuplicateScope(id.get()));
        }

        let bindings = normalize_all(id, decls)
            .into_iter()
            .map(|binding| (binding.key.clone(), binding))
            .collect();

        self.scopes.insert(
            id,
            ScopeRegistration {
                id,
                label: label.into(),
                owner: owner.into(),
                overrides,
                bindings,
            },
        );
        Ok(())
    }

    /// Merge more bindings into a scope; later keys replace earlier ones.
    /// Returns false when the scope is unknown.
    pub fn add_bindings<K, I>(&mut self, id: ScopeId, decls: I) -> bool
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, ShortcutDecl)>,
    {
        let Some(scope) = self.scopes.get_mut(&id) else {
            tracing::debug!(scope = %id, "add_bindings on unknown scope ignored");
            return false;
        };
        for binding in normalize_all(id, decls) {
            scope.bindings.insert(binding.key.clone(), binding);
        }
        true
    }

    /// Delete the named keys, or every binding when `keys` is `None`
    pub fn remove_bindings(&mut self, id: ScopeId, keys: Option<&[&str]>) -> bool {
        let Some(scope) = self.scopes.get_mut(&id) else {
            tracing::debug!(scope = %id, "remove_bindings on unknown scope ignored");
            return false;
        };
        match keys {
            None => scope.bindings.clear(),
            Some(keys) => {
                for declared in keys {
                    // Accept either the canonical form or the declared spelling
                    let key = normalize_binding_key(declared)
                        .unwrap_or_else(|_| declared.to_string());
                    scope.bindings.remove(&key);
                }
            }
        }
        true
    }

    /// Remove a scope entirely; unknown ids are a no-op
    pub fn unregister(&mut self, id: ScopeId) -> Option<ScopeRegistration> {
        self.scopes.remove(&id)
    }

    /// Get a registration by id
    pub fn get(&self, id: ScopeId) -> Option<&ScopeRegistration> {
        self.scopes.get(&id)
    }

    /// Bindings of a scope, keyed by canonical key
    pub fn get_bindings(&self, id: ScopeId) -> Option<&BTreeMap<String, Binding>> {
        self.scopes.get(&id).map(|scope| &scope.bindings)
    }

    /// Label of a scope
    pub fn get_label(&self, id: ScopeId) -> Option<&str> {
        self.scopes.get(&id).map(|scope| scope.label.as_str())
    }

    /// Registered scopes in registration order
    pub fn list_scopes(&self) -> Vec<ScopeId> {
        self.scopes.keys().copied().collect()
    }

    /// Check if a scope is registered
    pub fn contains(&self, id: ScopeId) -> bool {
        self.scopes.contains_key(&id)
    }

    /// Number of registered scopes
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Remove every scope
    pub fn clear(&mut self) {
        self.scopes.clear();
    }
}
