//! Terminal host adapter
//!
//! Converts crossterm input into [`KeyEvent`] / [`PointerEvent`] so a
//! terminal event loop can feed the dispatcher directly.

use crossterm::event::{
    Event, KeyCode, KeyEvent as CtKeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};

use crate::dispatcher::{DispatchOutcome, KeyDispatcher};
use crate::models::{KeyEvent, Modifier, PointerEvent};

fn key_name(code: &KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(c) => return Some(c.to_string()),
        KeyCode::F(n) => return Some(format!("f{}", n)),
        KeyCode::Backspace => "backspace",
        KeyCode::Enter => "enter",
        KeyCode::Left => "arrowleft",
        KeyCode::Right => "arrowright",
        KeyCode::Up => "arrowup",
        KeyCode::Down => "arrowdown",
        KeyCode::Home => "home",
        KeyCode::End => "end",
        KeyCode::PageUp => "pageup",
        KeyCode::PageDown => "pagedown",
        KeyCode::Tab | KeyCode::BackTab => "tab",
        KeyCode::Delete => "delete",
        KeyCode::Insert => "insert",
        KeyCode::Esc => "escape",
        _ => return None,
    };
    Some(name.to_string())
}

fn modifiers(mods: KeyModifiers, code: &KeyCode) -> Vec<Modifier> {
    let mut out = Vec::new();
    if mods.contains(KeyModifiers::CONTROL) {
        out.push(Modifier::Ctrl);
    }
    if mods.contains(KeyModifiers::ALT) {
        out.push(Modifier::Alt);
    }
    if mods.contains(KeyModifiers::SHIFT) || matches!(code, KeyCode::BackTab) {
        out.push(Modifier::Shift);
    }
    if mods.intersects(KeyModifiers::SUPER | KeyModifiers::META) {
        out.push(Modifier::Meta);
    }
    out
}

/// Convert a crossterm key press; keys with no shortcut name map to `None`
pub fn key_event_from_crossterm(event: &CtKeyEvent) -> Option<KeyEvent> {
    let name = key_name(&event.code)?;
    Some(KeyEvent::new(name).with_modifiers(modifiers(event.modifiers, &event.code)))
}

/// A left-button press as a pointer event
pub fn pointer_from_mouse(event: &MouseEvent) -> Option<PointerEvent> {
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            Some(PointerEvent::new(event.column, event.row))
        }
        _ => None,
    }
}

impl KeyDispatcher {
    /// Feed one crossterm event. Key releases and unrelated events are
    /// ignored; left-button presses go to closable listeners.
    pub fn dispatch_crossterm(&self, event: &Event) -> DispatchOutcome {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                match key_event_from_crossterm(key) {
                    Some(mut converted) => self.dispatch(&mut converted),
                    None => DispatchOutcome::Ignored,
                }
            }
            Event::Mouse(mouse) => {
                if let Some(pointer) = pointer_from_mouse(mouse) {
                    self.dispatch_pointer(&pointer);
                }
                DispatchOutcome::Ignored
            }
            _ => DispatchOutcome::Ignored,
        }
    }
}
