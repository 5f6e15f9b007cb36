//! Declarative shortcut configuration
//!
//! Scopes can be described in JSON or YAML and bound to handlers through an
//! [`ActionTable`]. Values that do not resolve to a known action still
//! produce a binding, normalized into a warned no-op.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chord::DEFAULT_CHORD_WINDOW;
use crate::error::ConfigError;
use crate::models::KeyEvent;
use crate::normalize::{Handler, ShortcutDecl};
use crate::scope::{ScopeHandle, ScopeOptions};
use crate::store::ShortcutStore;

/// Settings for the key dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Time allowed between chord steps, in milliseconds
    pub chord_timeout_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig {
            chord_timeout_ms: DEFAULT_CHORD_WINDOW.as_millis() as u64,
        }
    }
}

impl DispatcherConfig {
    /// Chord timeout as a `Duration`
    pub fn chord_window(&self) -> Duration {
        Duration::from_millis(self.chord_timeout_ms)
    }
}

fn default_true() -> bool {
    true
}

/// One scope as written in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeConfig {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub overrides: bool,
    #[serde(default = "default_true")]
    pub auto_activate: bool,
    /// Key or chord -> action name, or `{ action, description }`
    #[serde(default)]
    pub bindings: BTreeMap<String, Value>,
}

/// Top-level shortcut configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortcutConfig {
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub scopes: BTreeMap<String, ScopeConfig>,
}

/// A named handler that config files can refer to
#[derive(Clone)]
struct Action {
    handler: Handler,
    description: String,
}

/// Named handlers available to declarative configs
#[derive(Clone, Default)]
pub struct ActionTable {
    actions: HashMap<String, Action>,
}

impl ActionTable {
    /// Create an empty action table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action; its description defaults to its name
    pub fn register<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&KeyEvent) + 'static,
    {
        let name = name.into();
        self.register_described(name.clone(), f, name)
    }

    /// Register an action with an explicit description
    pub fn register_described<F>(
        &mut self,
        name: impl Into<String>,
        f: F,
        description: impl Into<String>,
    ) -> &mut Self
    where
        F: Fn(&KeyEvent) + 'static,
    {
        self.actions.insert(
            name.into(),
            Action {
                handler: std::rc::Rc::new(f),
                description: description.into(),
            },
        );
        self
    }

    /// Check if an action name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Number of registered actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    fn decl(&self, name: &str, description: Option<&str>) -> ShortcutDecl {
        match self.actions.get(name) {
            Some(action) => ShortcutDecl::Described {
                handler: action.handler.clone(),
                description: description
                    .map(str::to_string)
                    .unwrap_or_else(|| action.description.clone()),
            },
            None => ShortcutDecl::invalid(format!("Unknown action: {}", name)),
        }
    }

    /// Turn one config value into a declaration
    pub fn resolve(&self, value: &Value) -> ShortcutDecl {
        match value {
            Value::String(name) => self.decl(name, None),
            Value::Object(map) => match map.get("action").and_then(Value::as_str) {
                Some(name) => self.decl(name, map.get("description").and_then(Value::as_str)),
                None => ShortcutDecl::invalid("Binding object without an action"),
            },
            other => ShortcutDecl::invalid(format!(
                "Expected an action name or {{ action, description }}, got {}",
                other
            )),
        }
    }
}

impl ScopeConfig {
    /// Declarations for every configured binding, in key order
    pub fn resolve(&self, actions: &ActionTable) -> Vec<(String, ShortcutDecl)> {
        self.bindings
            .iter()
            .map(|(key, value)| (key.clone(), actions.resolve(value)))
            .collect()
    }

    /// Scope options, with `name` as the fallback label
    pub fn options(&self, name: &str) -> ScopeOptions {
        ScopeOptions {
            auto_activate: self.auto_activate,
            label: self.label.clone().unwrap_or_else(|| name.to_string()),
            overrides: self.overrides,
        }
    }
}

impl ShortcutConfig {
    /// Parse a JSON config
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse a YAML config
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse by format name ("json", "yaml" or "yml")
    pub fn parse(content: &str, format: &str) -> Result<Self, ConfigError> {
        match format.to_lowercase().as_str() {
            "json" => Self::from_json(content),
            "yaml" | "yml" => Self::from_yaml(content),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Create every configured scope, each inside its own region init.
    /// The returned handles own the scopes; dropping one unregisters it.
    pub fn create_scopes(
        &self,
        store: &ShortcutStore,
        actions: &ActionTable,
    ) -> BTreeMap<String, ScopeHandle> {
        self.scopes
            .iter()
            .map(|(name, scope)| {
                let _init = store.init_region(name.clone());
                let handle = store.create_shortcut_scope(scope.resolve(actions), scope.options(name));
                (name.clone(), handle)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize_binding, INVALID_DESCRIPTION};

    fn actions() -> ActionTable {
        let mut table = ActionTable::new();
        table
            .register("search.focus", |_: &KeyEvent| {})
            .register_described("nav.top", |_: &KeyEvent| {}, "Go to top");
        table
    }

    #[test]
    fn test_defaults() {
        let config = ShortcutConfig::from_json("{}").unwrap();
        assert_eq!(config.dispatcher.chord_timeout_ms, 600);
        assert!(config.scopes.is_empty());
    }

    #[test]
    fn test_parse_json_scope() {
        let config = ShortcutConfig::from_json(
            r#"{
                "dispatcher": { "chord_timeout_ms": 400 },
                "scopes": {
                    "search": {
                        "bindings": { "/": "search.focus", "g,g": { "action": "nav.top" } }
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.dispatcher.chord_window(), Duration::from_millis(400));
        let scope = &config.scopes["search"];
        assert!(scope.auto_activate);
        assert!(!scope.overrides);
        assert_eq!(scope.options("search").label, "search");

        let decls = scope.resolve(&actions());
        let described: Vec<String> = decls
            .into_iter()
            .map(|(key, decl)| normalize_binding(key, decl).description)
            .collect();
        assert_eq!(described, vec!["search.focus", "Go to top"]);
    }

    #[test]
    fn test_parse_yaml_scope() {
        let yaml = "scopes:\n  menu:\n    label: Main menu\n    overrides: true\n    bindings:\n      escape:\n        action: nav.top\n        description: Close\n";
        let config = ShortcutConfig::parse(yaml, "yml").unwrap();
        let menu = &config.scopes["menu"];
        assert!(menu.overrides);
        assert_eq!(menu.options("menu").label, "Main menu");
        let (_, decl) = menu.resolve(&actions()).remove(0);
        assert_eq!(normalize_binding("escape", decl).description, "Close");
    }

    #[test]
    fn test_unknown_action_becomes_invalid() {
        let table = actions();
        for value in [
            serde_json::json!("does.not.exist"),
            serde_json::json!(42),
            serde_json::json!({ "description": "no action" }),
        ] {
            let binding = normalize_binding("x", table.resolve(&value));
            assert_eq!(binding.description, INVALID_DESCRIPTION);
        }
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            ShortcutConfig::parse("", "toml"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ShortcutConfig::from_json("{"),
            Err(ConfigError::InvalidJson(_))
        ));
    }
}
