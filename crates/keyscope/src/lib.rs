//! Scoped keyboard shortcuts for applications built from many regions
//!
//! This crate coordinates key bindings across independently mounted UI
//! regions with:
//! - Binding normalization into one canonical shape
//! - A per-region scope registry with add/remove of bindings
//! - An active stack where overriding scopes block everything else
//! - Multi-key chords (`g,g`) with a timeout window
//! - A single dispatcher that routes every keydown
//! - Closable overlays that graft Escape / outside-click onto a scope
//! - JSON and YAML scope configuration, conflict detection and help listing

pub mod chord;
pub mod closable;
pub mod config;
pub mod conflict;
pub mod dispatcher;
pub mod error;
pub mod help;
#[cfg(feature = "crossterm")]
pub mod host;
pub mod models;
pub mod normalize;
pub mod registry;
pub mod scope;
pub mod stack;
pub mod store;

// Re-export public types
pub use chord::{ChordMatcher, ChordOutcome, ChordState, DEFAULT_CHORD_WINDOW};
pub use closable::{attach_closable, ClosableHandle, ClosableOptions};
pub use config::{ActionTable, DispatcherConfig, ScopeConfig, ShortcutConfig};
pub use conflict::{Conflict, ConflictDetector};
pub use dispatcher::{DispatchOutcome, KeyDispatcher};
pub use error::{ConfigError, KeyParseError, RegistryError};
pub use help::{HelpEntry, ShortcutHelp};
pub use models::{EventTarget, KeyEvent, Modifier, PointerEvent, Rect, ScopeId};
pub use normalize::{
    event_token, normalize_binding, normalize_binding_key, normalize_key_name, Binding,
    BindingInfo, Handler, ShortcutDecl, INVALID_DESCRIPTION,
};
pub use registry::{ScopeRegistration, ScopeRegistry};
pub use scope::{RegionInit, ScopeHandle, ScopeOptions};
pub use stack::{ActiveEntry, ActiveStack};
pub use store::{ActiveScopeInfo, ShortcutStore};
