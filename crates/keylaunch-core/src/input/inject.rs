// Keylaunch Key Injection
// uinput virtual device for synthetic backspaces

use super::keymap::KEY_BACKSPACE;

/// Name prefix of the virtual device; the input source filters it out.
pub const VIRT_DEVICE_NAME: &str = "Keylaunch (virtual)";

/// Injection errors
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error("failed to create virtual device: {0}")]
    DeviceCreation(String),

    #[error("failed to write event: {0}")]
    Write(String),
}

/// Sends synthetic key taps into the focused application.
///
/// Used to erase the typed characters of a matched sequence before its
/// action runs; which sink backs it is an environment concern.
pub trait KeyInjector {
    /// Tap backspace `count` times, synchronously.
    fn backspace(&mut self, count: usize) -> Result<(), InjectError>;
}

/// uinput-backed injector.
pub struct VirtualKeyboard {
    device: evdev::uinput::VirtualDevice,
}

impl VirtualKeyboard {
    /// Create the virtual device. Requires write access to /dev/uinput.
    pub fn new() -> Result<Self, InjectError> {
        use evdev::uinput::VirtualDeviceBuilder;
        use evdev::AttributeSet;

        let mut keys = AttributeSet::new();
        keys.insert(evdev::Key::new(KEY_BACKSPACE));

        let device = VirtualDeviceBuilder::new()
            .map_err(|e: std::io::Error| InjectError::DeviceCreation(e.to_string()))?
            .name(&format!("{} Keyboard", VIRT_DEVICE_NAME))
            .with_keys(&keys)
            .map_err(|e: std::io::Error| InjectError::DeviceCreation(e.to_string()))?
            .build()
            .map_err(|e: std::io::Error| InjectError::DeviceCreation(e.to_string()))?;

        Ok(Self { device })
    }

    fn tap(&mut self, code: u16) -> Result<(), InjectError> {
        use evdev::{EventType, InputEvent};

        // SYN after each edge is required for the kernel to deliver it.
        let events = [
            InputEvent::new(EventType::KEY, code, 1),
            InputEvent::new(EventType::SYNCHRONIZATION, 0, 0),
            InputEvent::new(EventType::KEY, code, 0),
            InputEvent::new(EventType::SYNCHRONIZATION, 0, 0),
        ];
        self.device
            .emit(&events)
            .map_err(|e: std::io::Error| InjectError::Write(e.to_string()))
    }
}

impl KeyInjector for VirtualKeyboard {
    fn backspace(&mut self, count: usize) -> Result<(), InjectError> {
        for _ in 0..count {
            self.tap(KEY_BACKSPACE)?;
        }
        Ok(())
    }
}

/// Injector that does nothing.
///
/// Used in tests and when /dev/uinput is unavailable; the combo still
/// dispatches, the typed characters just stay on screen.
#[derive(Debug, Default)]
pub struct NoopInjector;

impl KeyInjector for NoopInjector {
    fn backspace(&mut self, _count: usize) -> Result<(), InjectError> {
        Ok(())
    }
}
