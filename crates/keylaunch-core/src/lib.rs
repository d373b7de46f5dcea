// Keylaunch Core Library
// Combo recognition, configuration, action dispatch and usage accounting

pub mod config;
pub mod dispatch;
pub mod display;
pub mod event;
pub mod input;
pub mod ledger;
pub mod listener;
pub mod modifier;
pub mod reconcile;
pub mod tracker;

pub use config::{CommandStep, ConfigError, ConfigStore, Settings, ShortcutConfig, CMD_PREFIX};
pub use dispatch::{
    split_args, ActionDispatcher, DispatchError, ExecError, ExecRequest, Executor,
    SystemExecutor,
};
pub use display::action_comment;
pub use event::{EventKind, KeyEvent, KeyInput};
pub use input::{
    DeviceInfo, InjectError, InputError, InputSource, KeyInjector, NoopInjector,
    VirtualKeyboard,
};
pub use ledger::{LedgerError, UsageLedger, UsageRecord, LEDGER_HEADER};
pub use listener::Listener;
pub use modifier::{ModifierKey, ModifierState};
pub use reconcile::{orphaned_entries, reconcile};
pub use tracker::{ComboTracker, DEFAULT_MAX_COMBO_LEN};
