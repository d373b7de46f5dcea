// Keylaunch Event Types
// Key press/release events delivered by the platform input source

use std::fmt;

use crate::modifier::ModifierKey;

/// Whether a key went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Press,
    Release,
}

impl EventKind {
    /// Returns true if this is a PRESS event
    pub fn is_press(self) -> bool {
        matches!(self, EventKind::Press)
    }

    /// Returns true if this is a RELEASE event
    pub fn is_release(self) -> bool {
        matches!(self, EventKind::Release)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Press => write!(f, "press"),
            EventKind::Release => write!(f, "release"),
        }
    }
}

/// What the event carries: a printable character or one of the tracked
/// modifiers. Keys that are neither never leave the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Modifier(ModifierKey),
}

/// A single keyboard event.
///
/// Transient: produced by the platform input source and consumed immediately
/// by the listener loop. Nothing retains these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub kind: EventKind,
    pub input: KeyInput,
}

impl KeyEvent {
    pub fn new(kind: EventKind, input: KeyInput) -> Self {
        Self { kind, input }
    }

    /// A character going down
    pub fn press_char(ch: char) -> Self {
        Self::new(EventKind::Press, KeyInput::Char(ch))
    }

    /// A character coming back up
    pub fn release_char(ch: char) -> Self {
        Self::new(EventKind::Release, KeyInput::Char(ch))
    }

    /// A modifier going down
    pub fn press_modifier(key: ModifierKey) -> Self {
        Self::new(EventKind::Press, KeyInput::Modifier(key))
    }

    /// A modifier coming back up
    pub fn release_modifier(key: ModifierKey) -> Self {
        Self::new(EventKind::Release, KeyInput::Modifier(key))
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.input {
            KeyInput::Char(ch) => write!(f, "{} '{}'", self.kind, ch),
            KeyInput::Modifier(m) => write!(f, "{} {}", self.kind, m),
        }
    }
}
