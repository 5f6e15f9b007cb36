//! Help listing for the shortcuts that would fire right now

use std::collections::HashSet;

use serde::Serialize;

use crate::store::ShortcutStore;

/// One line of the help overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    pub scope: String,
    pub key: String,
    pub description: String,
}

pub struct ShortcutHelp;

impl ShortcutHelp {
    /// Eligible bindings in dispatch priority order; shadowed keys are
    /// listed once, under the scope that wins them
    pub fn entries(store: &ShortcutStore) -> Vec<HelpEntry> {
        store.with_eligible(|scopes| {
            let mut seen = HashSet::new();
            let mut entries = Vec::new();
            for scope in scopes {
                for binding in scope.bindings.values() {
                    if seen.insert(binding.key.clone()) {
                        entries.push(HelpEntry {
                            scope: scope.label.clone(),
                            key: binding.key.clone(),
                            description: binding.description.clone(),
                        });
                    }
                }
            }
            entries
        })
    }

    /// Render entries grouped by scope
    pub fn render(entries: &[HelpEntry]) -> String {
        let mut output = String::from("# Active Shortcuts\n");
        let mut current: Option<&str> = None;
        for entry in entries {
            if current != Some(entry.scope.as_str()) {
                output.push_str(&format!("\n## {}\n\n", entry.scope));
                current = Some(entry.scope.as_str());
            }
            if entry.description.is_empty() {
                output.push_str(&format!("- `{}`\n", entry.key));
            } else {
                output.push_str(&format!("- `{}`: {}\n", entry.key, entry.description));
            }
        }
        output
    }

    /// Case-insensitive search over keys and descriptions
    pub fn search<'a>(entries: &'a [HelpEntry], query: &str) -> Vec<&'a HelpEntry> {
        let query = query.to_lowercase();
        entries
            .iter()
            .filter(|entry| {
                entry.key.contains(&query) || entry.description.to_lowercase().contains(&query)
            })
            .collect()
    }
}
