//! Binding normalization
//!
//! Every shortcut declaration passes through here exactly once, at the
//! registry boundary. Downstream code only ever sees [`Binding`], whose
//! handler is always callable.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::error::KeyParseError;
use crate::models::{KeyEvent, Modifier};

/// Callback invoked with the event that resolved a binding
pub type Handler = Rc<dyn Fn(&KeyEvent)>;

/// Description given to bindings whose declaration could not be used
pub const INVALID_DESCRIPTION: &str = "Invalid shortcut";

/// A shortcut as declared by a caller, before normalization
#[derive(Clone)]
pub enum ShortcutDecl {
    /// A bare handler; `name` becomes the description
    Handler { handler: Handler, name: String },
    /// A handler with an explicit description
    Described { handler: Handler, description: String },
    /// Something that is not a usable shortcut; carries what was wrong
    Invalid(String),
}

impl ShortcutDecl {
    /// Declare a bare handler. Function items contribute their own name as
    /// the description; closures get an empty one.
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&KeyEvent) + 'static,
    {
        ShortcutDecl::Handler {
            handler: Rc::new(f),
            name: fn_name::<F>(),
        }
    }

    /// Declare a handler with an explicit description
    pub fn described<F>(f: F, description: impl Into<String>) -> Self
    where
        F: Fn(&KeyEvent) + 'static,
    {
        ShortcutDecl::Described {
            handler: Rc::new(f),
            description: description.into(),
        }
    }

    /// Declare an unusable shortcut; it normalizes to a no-op
    pub fn invalid(reason: impl Into<String>) -> Self {
        ShortcutDecl::Invalid(reason.into())
    }
}

impl fmt::Debug for ShortcutDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutDecl::Handler { name, .. } => f.debug_tuple("Handler").field(name).finish(),
            ShortcutDecl::Described { description, .. } => {
                f.debug_tuple("Described").field(description).finish()
            }
            ShortcutDecl::Invalid(reason) => f.debug_tuple("Invalid").field(reason).finish(),
        }
    }
}

impl<F> From<F> for ShortcutDecl
where
    F: Fn(&KeyEvent) + 'static,
{
    fn from(f: F) -> Self {
        ShortcutDecl::handler(f)
    }
}

/// Last path segment of a function item's type name, or "" for closures
fn fn_name<F>() -> String {
    let full = std::any::type_name::<F>();
    if full.contains("{{closure}}") {
        return String::new();
    }
    full.rsplit("::").next().unwrap_or_default().to_string()
}

/// Canonical binding record
#[derive(Clone)]
pub struct Binding {
    pub key: String,
    pub handler: Handler,
    pub description: String,
}

impl Binding {
    /// Run the handler with the triggering event
    pub fn invoke(&self, event: &KeyEvent) {
        (self.handler)(event)
    }

    /// Handler-free copy for diagnostics
    pub fn info(&self) -> BindingInfo {
        BindingInfo {
            key: self.key.clone(),
            description: self.description.clone(),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Handler-free view of a binding for diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingInfo {
    pub key: String,
    pub description: String,
}

/// Turn a declaration into a binding; never fails
pub fn normalize_binding(key: impl Into<String>, decl: ShortcutDecl) -> Binding {
    let key = key.into();
    match decl {
        ShortcutDecl::Handler { handler, name } => Binding {
            key,
            handler,
            description: name,
        },
        ShortcutDecl::Described {
            handler,
            description,
        } => Binding {
            key,
            handler,
            description,
        },
        ShortcutDecl::Invalid(reason) => {
            tracing::warn!(key = %key, reason = %reason, "Invalid shortcut declaration, using no-op");
            Binding {
                key,
                handler: Rc::new(|_: &KeyEvent| {}),
                description: INVALID_DESCRIPTION.to_string(),
            }
        }
    }
}

/// Canonical name for a single key, or `None` for bare modifiers
///
/// Named keys are lowercased and aliased. Single characters keep their
/// case, since `G` and `g` are different keys.
pub fn normalize_key_name(raw: &str) -> Option<String> {
    if raw == " " {
        return Some("space".to_string());
    }
    let trimmed = raw.trim();
    match trimmed {
        "" => return None,
        "," => return Some("comma".to_string()),
        "+" => return Some("plus".to_string()),
        _ => {}
    }
    if trimmed.chars().count() == 1 {
        return Some(trimmed.to_string());
    }

    let lower = trimmed.to_lowercase();
    let name = match lower.as_str() {
        "shift" | "control" | "ctrl" | "alt" | "altgraph" | "meta" | "os" | "super" | "hyper" => {
            return None
        }
        "esc" => "escape",
        "return" => "enter",
        "up" => "arrowup",
        "down" => "arrowdown",
        "left" => "arrowleft",
        "right" => "arrowright",
        "del" => "delete",
        "ins" => "insert",
        "spacebar" => "space",
        "pgup" | "page_up" => "pageup",
        "pgdn" | "page_down" => "pagedown",
        other => other,
    };
    Some(name.to_string())
}

/// Build the token for one step
///
/// Modifiers are sorted and deduplicated. On a single character, Shift is
/// folded into the character's case: `shift+g` is `G`. With Ctrl, Alt or
/// Meta held and no Shift, the character is lowercased so `Ctrl+K` and a
/// ctrl-k press agree.
fn canonical_token(mut modifiers: Vec<Modifier>, key: &str) -> String {
    modifiers.sort();
    modifiers.dedup();

    let key = if key.chars().count() == 1 {
        let shifted = modifiers.contains(&Modifier::Shift);
        modifiers.retain(|m| *m != Modifier::Shift);
        if shifted {
            key.to_uppercase()
        } else if !modifiers.is_empty() {
            key.to_lowercase()
        } else {
            key.to_string()
        }
    } else {
        key.to_string()
    };

    let mut token = String::new();
    for modifier in &modifiers {
        token.push_str(&modifier.to_string());
        token.push('+');
    }
    token.push_str(&key);
    token
}

fn normalize_step(step: &str, declared: &str) -> Result<String, KeyParseError> {
    let step = step.trim();
    if step.is_empty() {
        return Err(KeyParseError::EmptyStep(declared.to_string()));
    }
    if step == "+" {
        return Ok("plus".to_string());
    }

    let parts: Vec<&str> = step.split('+').collect();
    let (last, mods) = match parts.split_last() {
        Some(split) => split,
        None => return Err(KeyParseError::EmptyStep(declared.to_string())),
    };
    let key = normalize_key_name(last)
        .ok_or_else(|| KeyParseError::MissingKey(step.to_string()))?;

    let mut modifiers = Vec::with_capacity(mods.len());
    for part in mods {
        modifiers.push(part.parse::<Modifier>()?);
    }

    Ok(canonical_token(modifiers, &key))
}

/// Canonical form of a declared key or comma-joined chord
///
/// `"g, g"` becomes `"g,g"`, `"Shift+Ctrl+K"` becomes `"ctrl+K"`, and a
/// lone `","` is the `comma` key.
pub fn normalize_binding_key(declared: &str) -> Result<String, KeyParseError> {
    let trimmed = declared.trim();
    if trimmed.is_empty() {
        return Err(KeyParseError::Empty);
    }
    if trimmed == "," {
        return Ok("comma".to_string());
    }
    let steps = declared
        .split(',')
        .map(|step| normalize_step(step, declared))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(steps.join(","))
}

/// Canonical single-key token for a live event
pub fn event_token(event: &KeyEvent) -> Option<String> {
    let key = normalize_key_name(&event.key)?;
    Some(canonical_token(event.modifiers.clone(), &key))
}
