// Keylaunch Config Model - JSON with Serde
// Shortcut configuration: settings, app launches, command sequences

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix that distinguishes modifier shortcuts from typed sequences.
pub const CMD_PREFIX: &str = "cmd+";

/// Feature toggles and timing knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Erase the typed characters of a matched sequence before acting
    #[serde(default = "default_backspace_custom_combo")]
    pub backspace_custom_combo: bool,

    /// Maximum age of a buffered character, in seconds
    #[serde(default = "default_combo_timeout_seconds")]
    pub combo_timeout_seconds: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backspace_custom_combo: default_backspace_custom_combo(),
            combo_timeout_seconds: default_combo_timeout_seconds(),
        }
    }
}

fn default_backspace_custom_combo() -> bool {
    true
}

fn default_combo_timeout_seconds() -> f64 {
    5.0
}

/// One step of a command sequence.
///
/// Exactly one of `command` (written into a fresh terminal session) or
/// `file_command` (a file resolved against the scripts directory, with
/// shell-style arguments) is expected; a step with neither is skipped with
/// a warning at dispatch time.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommandStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_command: Option<String>,

    /// Seconds to wait after this step before starting the next
    #[serde(default)]
    pub delay: f64,

    /// Human-readable label, surfaced in the cheatsheet and the ledger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl CommandStep {
    pub fn terminal(command: &str) -> Self {
        Self {
            command: Some(command.to_string()),
            file_command: None,
            delay: 0.0,
            comment: None,
        }
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }
}

/// One immutable configuration snapshot.
///
/// Maps keep their file order (IndexMap) so the cheatsheet prints shortcuts
/// the way the operator wrote them. Replaced wholesale on reload, never
/// patched in place.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShortcutConfig {
    #[serde(default)]
    pub settings: Settings,

    /// code -> launch target path
    #[serde(default)]
    pub apps: IndexMap<String, String>,

    /// code -> ordered command steps
    #[serde(default)]
    pub commands: IndexMap<String, Vec<CommandStep>>,
}

impl ShortcutConfig {
    /// Is this code bound to anything, app or command sequence?
    pub fn is_configured(&self, code: &str) -> bool {
        self.apps.contains_key(code) || self.commands.contains_key(code)
    }

    /// Is this code a configured typed sequence (not a cmd+ shortcut)?
    pub fn is_custom_combo(&self, code: &str) -> bool {
        !code.starts_with(CMD_PREFIX) && self.is_configured(code)
    }

    /// All configured codes, apps then commands, in file order.
    pub fn configured_codes(&self) -> impl Iterator<Item = &str> {
        self.apps
            .keys()
            .chain(self.commands.keys())
            .map(String::as_str)
    }
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        let mut apps = IndexMap::new();
        apps.insert("cmd+1".to_string(), "/usr/bin/firefox".to_string());
        apps.insert("cmd+2".to_string(), "/usr/bin/code".to_string());
        apps.insert("cmd+3".to_string(), "~/Documents".to_string());

        let mut commands = IndexMap::new();
        commands.insert(
            "cmd+4".to_string(),
            vec![CommandStep::terminal("htop")],
        );
        commands.insert(
            "bld".to_string(),
            vec![
                CommandStep::terminal("cargo build --release")
                    .with_delay(2.0)
                    .with_comment("Release build"),
                CommandStep::terminal("cargo test"),
            ],
        );

        Self {
            settings: Settings::default(),
            apps,
            commands,
        }
    }
}
