// Keylaunch Pipeline Integration Tests
//
// These tests drive the complete event-to-action path:
// KeyEvent -> Listener -> ComboTracker -> ConfigStore -> ActionDispatcher -> UsageLedger

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use keylaunch_core::{
    reconcile, ActionDispatcher, ConfigStore, ExecError, ExecRequest, Executor, InjectError,
    KeyEvent, KeyInjector, Listener, ModifierKey, UsageLedger,
};

/// Records every executed request and backspace burst in arrival order.
#[derive(Clone, Default)]
struct ActionLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ActionLog {
    fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    fn push(&self, entry: String) {
        self.entries.lock().unwrap().push(entry);
    }
}

#[derive(Clone)]
struct RecordingExecutor {
    log: ActionLog,
}

impl Executor for RecordingExecutor {
    fn execute(&self, request: &ExecRequest) -> Result<(), ExecError> {
        let entry = match request {
            ExecRequest::LaunchApp { path } => format!("launch:{}", path.display()),
            ExecRequest::OpenPath { path } => format!("open:{}", path.display()),
            ExecRequest::TerminalCommand { command } => format!("term:{}", command),
            ExecRequest::RunFile { program, .. } => format!("file:{}", program.display()),
        };
        self.log.push(entry);
        Ok(())
    }
}

struct RecordingInjector {
    log: ActionLog,
}

impl KeyInjector for RecordingInjector {
    fn backspace(&mut self, count: usize) -> Result<(), InjectError> {
        self.log.push(format!("backspace:{}", count));
        Ok(())
    }
}

struct Harness {
    dir: tempfile::TempDir,
    log: ActionLog,
    listener: Listener,
}

impl Harness {
    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.json")
    }

    fn type_chars(&mut self, chars: &str) {
        for ch in chars.chars() {
            self.listener.handle_event(KeyEvent::press_char(ch));
            self.listener.handle_event(KeyEvent::release_char(ch));
        }
    }

    fn hold(&mut self, key: ModifierKey) {
        self.listener.handle_event(KeyEvent::press_modifier(key));
    }

    fn release(&mut self, key: ModifierKey) {
        self.listener.handle_event(KeyEvent::release_modifier(key));
    }
}

fn write_config(path: &Path, json: &str) {
    fs::write(path, json).unwrap();
}

fn bump_mtime(path: &Path, seconds_forward: i64) {
    let meta = fs::metadata(path).unwrap();
    let mtime = filetime::FileTime::from_last_modification_time(&meta);
    let bumped = filetime::FileTime::from_unix_time(mtime.unix_seconds() + seconds_forward, 0);
    filetime::set_file_mtime(path, bumped).unwrap();
}

fn harness(config_json: &str) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    write_config(&config_path, config_json);

    let config = ConfigStore::open(&config_path).unwrap();
    let ledger = UsageLedger::open(dir.path().join("usage.csv")).unwrap();

    let log = ActionLog::default();
    let dispatcher = ActionDispatcher::new(
        dir.path().to_path_buf(),
        Box::new(RecordingExecutor { log: log.clone() }),
    );
    let injector = Box::new(RecordingInjector { log: log.clone() });

    let listener = Listener::new(config, ledger, dispatcher, injector);
    Harness { dir, log, listener }
}

#[test]
fn test_custom_combo_dispatches_clears_and_records() {
    let mut h = harness(
        r#"{ "commands": { "ab": [ { "command": "ls", "comment": "List" } ] } }"#,
    );

    h.type_chars("ab");

    // Backspaces went out before the action, then the buffer was cleared.
    assert_eq!(h.log.entries(), vec!["backspace:2", "term:ls"]);
    assert!(h.listener.tracker().is_empty());

    // One dispatch, one ledger row.
    assert_eq!(h.listener.ledger().count("ab"), 1);
    let record = h.listener.ledger().get("ab").unwrap();
    assert_eq!(record.comment, "List");
    assert!(!record.last_used.is_empty());

    // The row made it to disk.
    let content = fs::read_to_string(h.listener.ledger().path()).unwrap();
    assert!(content.lines().any(|l| l.starts_with("ab,1,")));
}

#[test]
fn test_custom_combo_backspace_disabled() {
    let mut h = harness(
        r#"{
            "settings": { "backspace_custom_combo": false },
            "commands": { "ab": [ { "command": "ls" } ] }
        }"#,
    );

    h.type_chars("ab");
    assert_eq!(h.log.entries(), vec!["term:ls"]);
}

#[test]
fn test_custom_combo_needs_exact_window_match() {
    let mut h = harness(r#"{ "commands": { "ab": [ { "command": "ls" } ] } }"#);

    // 'x' is still in the window, so the buffered string is "xab".
    h.type_chars("xab");
    assert!(h.log.entries().is_empty());
    assert_eq!(h.listener.ledger().count("ab"), 0);
}

#[test]
fn test_cmd_combo_dispatches_app() {
    let dir = tempfile::tempdir().unwrap();
    let app_dir = dir.path().join("target-dir");
    fs::create_dir(&app_dir).unwrap();

    let mut h = harness(&format!(
        r#"{{ "apps": {{ "cmd+1": "{}" }} }}"#,
        app_dir.display()
    ));

    h.hold(ModifierKey::Command);
    h.type_chars("1");
    h.release(ModifierKey::Command);

    assert_eq!(h.log.entries(), vec![format!("open:{}", app_dir.display())]);
    assert_eq!(h.listener.ledger().count("cmd+1"), 1);
}

#[test]
fn test_shift_with_command_suppresses_dispatch() {
    let mut h = harness(r#"{ "commands": { "cmd+1": [ { "command": "ls" } ] } }"#);

    h.hold(ModifierKey::Command);
    h.hold(ModifierKey::Shift);
    h.type_chars("1");

    assert!(h.log.entries().is_empty());
    assert_eq!(h.listener.ledger().count("cmd+1"), 0);

    // Releasing shift re-arms the shortcut.
    h.release(ModifierKey::Shift);
    h.type_chars("1");
    assert_eq!(h.log.entries(), vec!["term:ls"]);
    assert_eq!(h.listener.ledger().count("cmd+1"), 1);
}

#[test]
fn test_option_with_command_suppresses_dispatch() {
    let mut h = harness(r#"{ "commands": { "cmd+1": [ { "command": "ls" } ] } }"#);

    h.hold(ModifierKey::Command);
    h.hold(ModifierKey::Option);
    h.type_chars("1");

    assert!(h.log.entries().is_empty());
    assert_eq!(h.listener.ledger().count("cmd+1"), 0);
}

#[test]
fn test_unconfigured_combo_is_ignored() {
    let mut h = harness(r#"{ "commands": { "ab": [ { "command": "ls" } ] } }"#);

    h.hold(ModifierKey::Command);
    h.type_chars("9");

    assert!(h.log.entries().is_empty());
    assert!(h.listener.ledger().is_empty());
}

#[test]
fn test_config_change_reloads_reconciles_and_updates_timeout() {
    let mut h = harness(
        r#"{
            "settings": { "combo_timeout_seconds": 5.0 },
            "commands": {
                "ab": [ { "command": "ls" } ],
                "cd": [ { "command": "pwd" } ]
            }
        }"#,
    );

    // Use both codes so the ledger has rows for each.
    h.type_chars("ab");
    h.type_chars("cd");
    assert_eq!(h.listener.ledger().count("ab"), 1);
    assert_eq!(h.listener.ledger().count("cd"), 1);

    // Drop "cd" and tighten the timeout behind the store's back.
    let config_path = h.config_path();
    write_config(
        &config_path,
        r#"{
            "settings": { "combo_timeout_seconds": 2.0 },
            "commands": { "ab": [ { "command": "ls" } ] }
        }"#,
    );
    bump_mtime(&config_path, 10);

    // The next dispatch notices the change first.
    h.type_chars("ab");

    assert_eq!(h.listener.tracker().timeout(), Duration::from_secs(2));
    assert!(!h.listener.ledger().contains("cd"));
    assert_eq!(h.listener.ledger().count("ab"), 2);
}

#[test]
fn test_startup_reconciliation_removes_orphans() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let ledger_path = dir.path().join("usage.csv");

    write_config(
        &config_path,
        r#"{ "commands": { "ab": [ { "command": "ls" } ] } }"#,
    );
    fs::write(
        &ledger_path,
        "code,count,last_action,comment\nab,3,2026-01-01 10:00:00,Run: ls\nzz,7,2026-01-02 10:00:00,stale\n",
    )
    .unwrap();

    let config = ConfigStore::open(&config_path).unwrap();
    let mut ledger = UsageLedger::open(&ledger_path).unwrap();

    let removed = reconcile(&mut ledger, config.config()).unwrap();
    assert_eq!(removed, vec!["zz".to_string()]);
    assert_eq!(ledger.count("ab"), 3);

    let content = fs::read_to_string(&ledger_path).unwrap();
    assert!(!content.contains("zz"));
}

#[test]
fn test_ledger_survives_restart() {
    let mut h = harness(r#"{ "commands": { "ab": [ { "command": "ls" } ] } }"#);
    h.type_chars("ab");
    h.type_chars("ab");

    let ledger_path = h.listener.ledger().path().to_path_buf();
    let reloaded = UsageLedger::open(&ledger_path).unwrap();
    assert_eq!(reloaded.count("ab"), 2);
    assert_eq!(
        reloaded.get("ab").unwrap().last_used,
        h.listener.ledger().get("ab").unwrap().last_used
    );
}

#[test]
fn test_repeated_dispatches_accumulate() {
    let mut h = harness(
        r#"{ "commands": {
            "ab": [ { "command": "ls" } ],
            "cd": [ { "command": "pwd" } ]
        } }"#,
    );

    for _ in 0..3 {
        h.type_chars("ab");
        h.type_chars("cd");
    }
    h.type_chars("ab");

    assert_eq!(h.listener.ledger().count("ab"), 4);
    assert_eq!(h.listener.ledger().count("cd"), 3);
}
