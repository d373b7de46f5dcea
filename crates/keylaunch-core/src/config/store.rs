// Keylaunch Config Store
// On-disk configuration with lazy staleness detection and atomic reload

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Local;
use indexmap::IndexMap;

use super::model::{CommandStep, ShortcutConfig};

/// Configuration store errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Parse(String),
}

/// Holds the active configuration snapshot and knows when the file behind it
/// has changed.
///
/// Staleness is checked lazily, at the moment a combo is about to be
/// dispatched, not via a filesystem watch. Reload latency is therefore
/// bounded by "next combo match", an accepted trade-off for a tool with a
/// single operator.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    mtime: Option<SystemTime>,
    config: ShortcutConfig,
}

impl ConfigStore {
    /// Open the configuration file, writing the built-in defaults first if
    /// no file exists yet.
    ///
    /// A file that exists but does not parse is a hard error: there is no
    /// safe default to fall back to once an operator has written one.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let default = ShortcutConfig::default();
            let content = serde_json::to_string_pretty(&default)
                .map_err(|e| ConfigError::Parse(e.to_string()))?;
            fs::write(&path, content)?;
            println!("Created default config file at {}", path.display());
        }

        let config = Self::parse_file(&path)?;
        let mtime = Self::read_mtime(&path);

        Ok(Self {
            path,
            mtime,
            config,
        })
    }

    /// Reload if the file's modification time differs from the last-seen one.
    ///
    /// The snapshot is swapped wholesale on success and `true` is returned so
    /// the caller can refresh dependent state. Errors while statting or
    /// re-parsing are logged and treated as "no change": the previous
    /// snapshot and timestamp stay put, so the check repeats on the next
    /// combo.
    pub fn check_and_reload(&mut self) -> bool {
        let current = match fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                log::error!(
                    "error checking config file {}: {}",
                    self.path.display(),
                    e
                );
                return false;
            }
        };

        if Some(current) == self.mtime {
            return false;
        }

        match Self::parse_file(&self.path) {
            Ok(config) => {
                self.config = config;
                self.mtime = Some(current);
                println!(
                    "[{}] Config reloaded - file was modified",
                    Local::now().format("%Y-%m-%d %I:%M %p")
                );
                true
            }
            Err(e) => {
                log::error!(
                    "config reload failed, keeping previous snapshot: {}",
                    e
                );
                false
            }
        }
    }

    /// Default configuration directory (~/.config/keylaunch)
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("keylaunch"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The active snapshot
    pub fn config(&self) -> &ShortcutConfig {
        &self.config
    }

    pub fn apps(&self) -> &IndexMap<String, String> {
        &self.config.apps
    }

    pub fn commands(&self) -> &IndexMap<String, Vec<CommandStep>> {
        &self.config.commands
    }

    pub fn is_configured(&self, code: &str) -> bool {
        self.config.is_configured(code)
    }

    pub fn is_custom_combo(&self, code: &str) -> bool {
        self.config.is_custom_combo(code)
    }

    pub fn backspace_custom_combo(&self) -> bool {
        self.config.settings.backspace_custom_combo
    }

    pub fn combo_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.config.settings.combo_timeout_seconds.max(0.0))
    }

    fn parse_file(path: &Path) -> Result<ShortcutConfig, ConfigError> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn read_mtime(path: &Path) -> Option<SystemTime> {
        match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(t) => Some(t),
            Err(e) => {
                log::error!(
                    "error getting config file modification time for {}: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::time::Duration;

    fn write_config(path: &Path, timeout: f64, codes: &[&str]) {
        let apps: Vec<String> = codes
            .iter()
            .map(|c| format!("\"{}\": \"/usr/bin/true\"", c))
            .collect();
        let json = format!(
            "{{ \"settings\": {{ \"combo_timeout_seconds\": {} }}, \"apps\": {{ {} }} }}",
            timeout,
            apps.join(", ")
        );
        fs::write(path, json).unwrap();
    }

    fn bump_mtime(path: &Path, seconds_forward: i64) {
        let meta = fs::metadata(path).unwrap();
        let mtime = FileTime::from_last_modification_time(&meta);
        let bumped = FileTime::from_unix_time(mtime.unix_seconds() + seconds_forward, 0);
        filetime::set_file_mtime(path, bumped).unwrap();
    }

    #[test]
    fn test_open_creates_default_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let store = ConfigStore::open(&path).unwrap();
        assert!(path.exists());
        assert!(!store.apps().is_empty());
        assert_eq!(store.combo_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_open_fails_on_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        match ConfigStore::open(&path) {
            Err(ConfigError::Parse(_)) => {}
            other => panic!("expected parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_check_and_reload_unchanged_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        write_config(&path, 5.0, &["cmd+1"]);

        let mut store = ConfigStore::open(&path).unwrap();
        assert!(!store.check_and_reload());
        assert!(store.is_configured("cmd+1"));
    }

    #[test]
    fn test_check_and_reload_swaps_snapshot_on_mtime_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        write_config(&path, 5.0, &["cmd+1"]);

        let mut store = ConfigStore::open(&path).unwrap();
        write_config(&path, 2.0, &["cmd+2"]);
        bump_mtime(&path, 10);

        assert!(store.check_and_reload());
        assert!(!store.is_configured("cmd+1"));
        assert!(store.is_configured("cmd+2"));
        assert_eq!(store.combo_timeout(), Duration::from_secs(2));

        // Second check with no further writes is a no-op.
        assert!(!store.check_and_reload());
    }

    #[test]
    fn test_reload_keeps_previous_snapshot_on_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        write_config(&path, 5.0, &["cmd+1"]);

        let mut store = ConfigStore::open(&path).unwrap();
        fs::write(&path, "{ broken").unwrap();
        bump_mtime(&path, 10);

        assert!(!store.check_and_reload());
        assert!(store.is_configured("cmd+1"));

        // Fixing the file makes the next check succeed.
        write_config(&path, 3.0, &["cmd+3"]);
        bump_mtime(&path, 20);
        assert!(store.check_and_reload());
        assert!(store.is_configured("cmd+3"));
    }

    #[test]
    fn test_missing_file_during_check_is_no_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        write_config(&path, 5.0, &["cmd+1"]);

        let mut store = ConfigStore::open(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(!store.check_and_reload());
        assert!(store.is_configured("cmd+1"));
    }
}
