//! Key event dispatcher
//!
//! The one listener that sees every raw keydown. Each event is normalized,
//! fed through the shared chord matcher against the bindings that are
//! eligible right now, and the winning handler runs with the original event.

use std::time::Instant;

use crate::models::{KeyEvent, PointerEvent, ScopeId};
use crate::normalize::event_token;
use crate::store::{KeyResolution, ShortcutStore};

/// What happened to one keydown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A binding ran; default handling was prevented
    Handled { scope: ScopeId, key: String },
    /// Part of a chord; waiting for the next key
    Pending { keys: Vec<String> },
    /// No eligible binding matched
    Unmatched,
    /// The event came from a text-editing control
    Suppressed,
    /// A bare modifier or an empty key name
    Ignored,
}

impl DispatchOutcome {
    /// True when a binding ran
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled { .. })
    }
}

/// Handle to the store's single keydown listener
#[derive(Clone)]
pub struct KeyDispatcher {
    store: ShortcutStore,
}

impl ShortcutStore {
    /// Attach the keydown listener. Attaching again returns a handle to the
    /// same listener instead of installing a second one.
    pub fn attach_dispatcher(&self) -> KeyDispatcher {
        let mut state = self.inner.borrow_mut();
        if state.dispatcher_attached {
            tracing::warn!("Key dispatcher already attached; reusing the existing listener");
        } else {
            state.dispatcher_attached = true;
            tracing::debug!("Key dispatcher attached");
        }
        KeyDispatcher {
            store: self.clone(),
        }
    }

    /// Whether a key dispatcher has been attached
    pub fn has_dispatcher(&self) -> bool {
        self.inner.borrow().dispatcher_attached
    }
}

impl KeyDispatcher {
    /// Store this dispatcher routes into
    pub fn store(&self) -> &ShortcutStore {
        &self.store
    }

    /// Route one keydown to at most one handler
    pub fn dispatch(&self, event: &mut KeyEvent) -> DispatchOutcome {
        if event.target.is_text_editing() {
            tracing::trace!(key = %event.key, "Keydown in text-editing target, shortcuts suppressed");
            return DispatchOutcome::Suppressed;
        }

        let Some(token) = event_token(event) else {
            return DispatchOutcome::Ignored;
        };

        // The store borrow ends here, so handlers may mutate scopes freely
        let resolution = self.store.resolve_token(&token, event.timestamp);

        match resolution {
            KeyResolution::Resolved(resolved) => {
                tracing::debug!(
                    scope = %resolved.scope,
                    key = %resolved.binding.key,
                    description = %resolved.binding.description,
                    "Shortcut resolved"
                );
                event.prevent_default();
                resolved.binding.invoke(event);
                DispatchOutcome::Handled {
                    scope: resolved.scope,
                    key: resolved.binding.key,
                }
            }
            KeyResolution::Pending(keys) => {
                tracing::trace!(?keys, "Chord pending");
                DispatchOutcome::Pending { keys }
            }
            KeyResolution::Unmatched => DispatchOutcome::Unmatched,
        }
    }

    /// Route a primary-button press to closable listeners. Returns how many
    /// listeners fired.
    pub fn dispatch_pointer(&self, event: &PointerEvent) -> usize {
        let actions = self.store.pointer_actions(event);
        for action in &actions {
            action();
        }
        actions.len()
    }

    /// Clear a partial chord whose window elapsed; for hosts with a timer
    pub fn tick(&self, now: Instant) -> bool {
        self.store.expire_chord(now)
    }
}
