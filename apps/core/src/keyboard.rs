//! Key events, platform modifier rules and the scoped listener registry.
//!
//! The picker's own bindings never look at modifiers. A listener registered
//! on the [`KeyboardHub`] sees every event first and can claim it; its
//! registration lives exactly as long as the returned [`KeyListenerGuard`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Mac,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::Mac
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    pub fn modifier_label(&self) -> &'static str {
        match self {
            Self::Mac => "⌘",
            Self::Windows | Self::Linux => "Ctrl",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Command on a Mac keyboard, Control everywhere else.
    pub fn platform_modifier_held(&self, platform: Platform) -> bool {
        match platform {
            Platform::Mac => self.meta,
            Platform::Windows | Platform::Linux => self.ctrl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Up,
    Down,
    Enter,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Part of an input-method composition; never treated as a command.
    pub composing: bool,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            composing: false,
        }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn char(ch: char) -> Self {
        Self::plain(Key::Char(ch))
    }

    /// Parses chords like `Ctrl+Enter`, `Meta+Shift+Up` or `x`.
    pub fn parse(input: &str) -> Result<Self, String> {
        let parts: Vec<&str> = input
            .split('+')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        let Some((key_raw, modifier_parts)) = parts.split_last() else {
            return Err("key chord is empty".to_string());
        };

        let mut modifiers = Modifiers::NONE;
        for part in modifier_parts {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "meta" | "cmd" | "command" | "super" => modifiers.meta = true,
                _ => return Err(format!("unsupported modifier: {part}")),
            }
        }

        let key = match key_raw.to_ascii_lowercase().as_str() {
            "enter" | "return" => Key::Enter,
            "esc" | "escape" => Key::Escape,
            "up" => Key::Up,
            "down" => Key::Down,
            "backspace" => Key::Backspace,
            "space" => Key::Char(' '),
            _ => {
                let mut chars = key_raw.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => Key::Char(ch),
                    _ => return Err(format!("unsupported key: {key_raw}")),
                }
            }
        };

        Ok(Self::new(key, modifiers))
    }
}

/// What a key press means to the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    MoveUp,
    MoveDown,
    Confirm { modifier_held: bool },
    Dismiss,
    Insert(char),
    DeleteBack,
    Ignore,
}

/// The picker's built-in bindings. Modifier state is not consulted.
pub fn default_binding(event: &KeyEvent) -> KeyCommand {
    if event.composing {
        return KeyCommand::Ignore;
    }
    match event.key {
        Key::Up => KeyCommand::MoveUp,
        Key::Down => KeyCommand::MoveDown,
        Key::Enter => KeyCommand::Confirm {
            modifier_held: false,
        },
        Key::Escape => KeyCommand::Dismiss,
        Key::Backspace => KeyCommand::DeleteBack,
        Key::Char(ch) if !ch.is_control() => KeyCommand::Insert(ch),
        Key::Char(_) | Key::Other => KeyCommand::Ignore,
    }
}

/// Claims platform-modifier+Enter as a modifier confirm.
pub fn modifier_confirm_listener(platform: Platform) -> impl Fn(&KeyEvent) -> Option<KeyCommand> {
    move |event| {
        let claimed = event.key == Key::Enter
            && !event.composing
            && event.modifiers.platform_modifier_held(platform);
        claimed.then_some(KeyCommand::Confirm {
            modifier_held: true,
        })
    }
}

type KeyListener = Box<dyn Fn(&KeyEvent) -> Option<KeyCommand>>;

#[derive(Default)]
struct HubInner {
    next_id: u64,
    listeners: Vec<(u64, KeyListener)>,
}

/// Low-level keyboard listener registry owned by the host surface.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    inner: Rc<RefCell<HubInner>>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> KeyListenerGuard
    where
        F: Fn(&KeyEvent) -> Option<KeyCommand> + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Box::new(listener)));
        tracing::debug!(listener_id = id, "keyboard listener attached");
        KeyListenerGuard {
            hub: Rc::downgrade(&self.inner),
            id,
        }
    }

    /// Offers the event to listeners in registration order.
    pub fn dispatch(&self, event: &KeyEvent) -> Option<KeyCommand> {
        let inner = self.inner.borrow();
        inner.listeners.iter().find_map(|(_, listener)| listener(event))
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

/// Detaches its listener when dropped.
#[must_use = "dropping the guard detaches the listener immediately"]
pub struct KeyListenerGuard {
    hub: Weak<RefCell<HubInner>>,
    id: u64,
}

impl Drop for KeyListenerGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.hub.upgrade() {
            inner
                .borrow_mut()
                .listeners
                .retain(|(listener_id, _)| *listener_id != self.id);
            tracing::debug!(listener_id = self.id, "keyboard listener detached");
        }
    }
}
