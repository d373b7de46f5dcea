// Keylaunch Config API
// Shortcut configuration model and on-disk store

pub mod model;
pub mod store;

pub use model::{CommandStep, Settings, ShortcutConfig, CMD_PREFIX};
pub use store::{ConfigError, ConfigStore};
