// Keylaunch Input Layer
// Keyboard observation and synthetic key injection

pub mod inject;
pub mod keymap;
pub mod source;

pub use inject::{InjectError, KeyInjector, NoopInjector, VirtualKeyboard, VIRT_DEVICE_NAME};
pub use keymap::{char_for_code, modifier_for_code, KEY_BACKSPACE};
pub use source::{DeviceInfo, InputError, InputResult, InputSource};
