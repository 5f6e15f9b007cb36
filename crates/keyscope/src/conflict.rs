//! Conflict detection across the eligible scopes

use std::collections::BTreeMap;

use crate::models::ScopeId;
use crate::store::ShortcutStore;

/// A binding that cannot fire as declared right now
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// Several eligible scopes bind the same key; only `winner` fires
    Shadowed {
        key: String,
        winner: ScopeId,
        shadowed: Vec<ScopeId>,
    },
    /// A leading part of the chord is itself a binding and fires first
    UnreachableChord {
        chord: String,
        scope: ScopeId,
        prefix: String,
        prefix_scope: ScopeId,
    },
}

/// Detects bindings that the current eligible set makes unreachable
pub struct ConflictDetector;

impl ConflictDetector {
    /// Detect all conflicts among the scopes eligible for the next keystroke
    pub fn detect(store: &ShortcutStore) -> Vec<Conflict> {
        store.with_eligible(|scopes| {
            // key -> scopes binding it, in dispatch priority order
            let mut owners: BTreeMap<&str, Vec<ScopeId>> = BTreeMap::new();
            for scope in scopes {
                for key in scope.bindings.keys() {
                    owners.entry(key.as_str()).or_default().push(scope.id);
                }
            }

            let mut conflicts = Vec::new();
            for (key, ids) in &owners {
                if ids.len() > 1 {
                    conflicts.push(Conflict::Shadowed {
                        key: key.to_string(),
                        winner: ids[0],
                        shadowed: ids[1..].to_vec(),
                    });
                }
            }

            for (key, ids) in &owners {
                let steps: Vec<&str> = key.split(',').collect();
                // Shortest prefix wins since it fires first
                let hit = (1..steps.len()).find_map(|len| {
                    let prefix = steps[..len].join(",");
                    owners
                        .get(prefix.as_str())
                        .map(|prefix_ids| (prefix, prefix_ids[0]))
                });
                if let Some((prefix, prefix_scope)) = hit {
                    conflicts.push(Conflict::UnreachableChord {
                        chord: key.to_string(),
                        scope: ids[0],
                        prefix,
                        prefix_scope,
                    });
                }
            }

            conflicts
        })
    }
}
