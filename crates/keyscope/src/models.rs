//! Core data models for shortcut dispatch

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::error::KeyParseError;

/// Represents a keyboard modifier (Ctrl, Alt, Shift, Meta)
///
/// The derived ordering is the canonical order used when modifiers are
/// written into a binding key (`ctrl+alt+shift+meta+k`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Ctrl,
    Alt,
    Shift,
    Meta,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Ctrl => write!(f, "ctrl"),
            Modifier::Alt => write!(f, "alt"),
            Modifier::Shift => write!(f, "shift"),
            Modifier::Meta => write!(f, "meta"),
        }
    }
}

impl FromStr for Modifier {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ctrl" | "control" => Ok(Modifier::Ctrl),
            "alt" | "option" => Ok(Modifier::Alt),
            "shift" => Ok(Modifier::Shift),
            "meta" | "cmd" | "command" | "super" => Ok(Modifier::Meta),
            _ => Err(KeyParseError::InvalidModifier(s.to_string())),
        }
    }
}

/// Stable identity of a registered scope
///
/// Allocated by the store, never chosen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ScopeId(pub(crate) u64);

impl ScopeId {
    /// Raw numeric value, for logging and diagnostics
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope-{}", self.0)
    }
}

/// What kind of element had focus when a key was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventTarget {
    #[default]
    Other,
    TextInput,
    TextArea,
    ContentEditable,
}

impl EventTarget {
    /// Text-editing targets swallow shortcuts so typing is never hijacked
    pub fn is_text_editing(&self) -> bool {
        matches!(
            self,
            EventTarget::TextInput | EventTarget::TextArea | EventTarget::ContentEditable
        )
    }
}

/// A raw keydown event as delivered by the host
#[derive(Debug, Clone)]
pub struct KeyEvent {
    /// Host key name ("a", "ArrowDown", "Escape", "/")
    pub key: String,
    pub modifiers: Vec<Modifier>,
    pub target: EventTarget,
    pub timestamp: Instant,
    default_prevented: bool,
}

impl KeyEvent {
    /// Create a keydown event stamped with the current time
    pub fn new(key: impl Into<String>) -> Self {
        KeyEvent {
            key: key.into(),
            modifiers: Vec::new(),
            target: EventTarget::Other,
            timestamp: Instant::now(),
            default_prevented: false,
        }
    }

    /// Set the held modifiers
    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers = modifiers.into_iter().collect();
        self
    }

    /// Set the element kind that had focus
    pub fn with_target(mut self, target: EventTarget) -> Self {
        self.target = target;
        self
    }

    /// Override the arrival time (hosts replaying input, tests)
    pub fn at(mut self, timestamp: Instant) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Check if a modifier was held
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Ask the host to skip its default handling of this key
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a handler consumed the key
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// A primary-button press at a cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub column: u16,
    pub row: u16,
}

impl PointerEvent {
    /// Create a press at a cell position
    pub fn new(column: u16, row: u16) -> Self {
        PointerEvent { column, row }
    }
}

/// Screen area occupied by a region or one of its controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    /// Create a rect from its origin and size
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the right and bottom edges are outside
    pub fn contains(&self, column: u16, row: u16) -> bool {
        let right = u32::from(self.x) + u32::from(self.width);
        let bottom = u32::from(self.y) + u32::from(self.height);
        column >= self.x
            && u32::from(column) < right
            && row >= self.y
            && u32::from(row) < bottom
    }
}
