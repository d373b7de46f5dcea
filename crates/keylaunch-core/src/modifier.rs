// Keylaunch Modifier System
// Command/Shift/Option state, tracked independently of the character window

use std::fmt;

/// The three modifiers this tool distinguishes.
///
/// Other modifiers (ctrl, caps lock, fn) are irrelevant to both trigger
/// grammars and are filtered out at the input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    Command,
    Shift,
    Option,
}

impl ModifierKey {
    /// Parse a modifier from a common alias
    pub fn from_alias(alias: &str) -> Option<Self> {
        match alias {
            "Command" | "Cmd" | "Super" | "Meta" | "Win" => Some(ModifierKey::Command),
            "Shift" => Some(ModifierKey::Shift),
            "Option" | "Opt" | "Alt" => Some(ModifierKey::Option),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ModifierKey::Command => "command",
            ModifierKey::Shift => "shift",
            ModifierKey::Option => "option",
        }
    }
}

impl fmt::Display for ModifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Current held-down state of the three modifiers.
///
/// Each flag is mutated only on press/release of the corresponding modifier;
/// the character window never touches these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierState {
    command: bool,
    shift: bool,
    option: bool,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press or release of the given modifier
    pub fn set(&mut self, key: ModifierKey, pressed: bool) {
        match key {
            ModifierKey::Command => self.command = pressed,
            ModifierKey::Shift => self.shift = pressed,
            ModifierKey::Option => self.option = pressed,
        }
    }

    pub fn is_pressed(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Command => self.command,
            ModifierKey::Shift => self.shift,
            ModifierKey::Option => self.option,
        }
    }

    pub fn command(&self) -> bool {
        self.command
    }

    pub fn shift(&self) -> bool {
        self.shift
    }

    pub fn option(&self) -> bool {
        self.option
    }
}
