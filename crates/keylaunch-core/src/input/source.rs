// Keylaunch Input Source
// evdev keyboard observer: polls devices and emits KeyEvents

use std::os::unix::io::AsRawFd;

use evdev::{Device, EventType, Key};

use super::inject::VIRT_DEVICE_NAME;
use super::keymap::{char_for_code, modifier_for_code, KEY_LEFT_SHIFT, KEY_RIGHT_SHIFT};
use crate::event::{EventKind, KeyEvent, KeyInput};

/// Result type for input source operations
pub type InputResult<T> = Result<T, InputError>;

/// Errors that can occur while reading keyboards
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("no keyboard devices found")]
    NoKeyboards,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Device information for listing devices
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Device index
    pub index: usize,
    /// Device name
    pub name: String,
    /// Device path (if available)
    pub path: Option<String>,
}

/// Observes every attached keyboard and turns raw events into KeyEvents.
///
/// Devices are read without grabbing: the keystrokes still reach whatever
/// application has focus; this source only watches them go by. The virtual
/// injector device is filtered out so synthetic backspaces never feed back
/// into the combo window.
pub struct InputSource {
    devices: Vec<Device>,
    poll_fds: Vec<libc::pollfd>,
    left_shift: bool,
    right_shift: bool,
}

impl InputSource {
    /// Open all attached keyboards for observation.
    pub fn open() -> InputResult<Self> {
        let devices = Self::find_keyboards()?;
        let poll_fds = Self::create_poll_fds(&devices);
        Ok(Self {
            devices,
            poll_fds,
            left_shift: false,
            right_shift: false,
        })
    }

    /// List all available keyboard devices, for the --list-devices flag.
    pub fn list_devices() -> InputResult<Vec<DeviceInfo>> {
        let mut infos = Vec::new();
        let mut index = 0;

        for (path, device) in evdev::enumerate() {
            if Self::is_keyboard_device(&device) {
                infos.push(DeviceInfo {
                    index,
                    name: device.name().unwrap_or("Unknown").to_string(),
                    path: path.to_str().map(|s| s.to_string()),
                });
                index += 1;
            }
        }

        if infos.is_empty() {
            return Err(InputError::NoKeyboards);
        }

        Ok(infos)
    }

    /// Poll for events with a timeout in milliseconds.
    ///
    /// Returns an empty vector on timeout or EINTR; only fatal IO errors
    /// surface as Err. Key repeats are swallowed here: forwarding them would
    /// multiply combo characters per physical keystroke.
    pub fn poll(&mut self, timeout_ms: i32) -> InputResult<Vec<KeyEvent>> {
        let mut events = Vec::new();

        let poll_result = unsafe {
            libc::poll(
                self.poll_fds.as_mut_ptr(),
                self.poll_fds.len() as libc::nfds_t,
                timeout_ms,
            )
        };

        if poll_result < 0 {
            let err = std::io::Error::last_os_error();
            // EINTR just means a signal arrived (e.g. Ctrl+C); the caller
            // checks its running flag and decides.
            if err.raw_os_error() == Some(libc::EINTR) {
                return Ok(events);
            }
            return Err(InputError::Io(err));
        }

        if poll_result == 0 {
            return Ok(events);
        }

        for (i, device) in self.devices.iter_mut().enumerate() {
            if self.poll_fds[i].revents & libc::POLLIN == 0 {
                continue;
            }
            let raw_events = match device.fetch_events() {
                Ok(iter) => iter,
                Err(_) => continue,
            };
            for raw in raw_events {
                if raw.event_type() != EventType::KEY {
                    continue;
                }
                let kind = match raw.value() {
                    0 => EventKind::Release,
                    1 => EventKind::Press,
                    _ => continue, // repeat
                };
                let code = raw.code();

                if code == KEY_LEFT_SHIFT {
                    self.left_shift = kind.is_press();
                } else if code == KEY_RIGHT_SHIFT {
                    self.right_shift = kind.is_press();
                }

                if let Some(modifier) = modifier_for_code(code) {
                    events.push(KeyEvent::new(kind, KeyInput::Modifier(modifier)));
                } else if let Some(ch) =
                    char_for_code(code, self.left_shift || self.right_shift)
                {
                    events.push(KeyEvent::new(kind, KeyInput::Char(ch)));
                }
            }
        }

        Ok(events)
    }

    /// Get the names of all observed devices
    pub fn device_names(&self) -> Vec<String> {
        self.devices
            .iter()
            .map(|d| d.name().unwrap_or("Unknown").to_string())
            .collect()
    }

    /// Number of observed devices
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn create_poll_fds(devices: &[Device]) -> Vec<libc::pollfd> {
        devices
            .iter()
            .map(|d| libc::pollfd {
                fd: d.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect()
    }

    fn find_keyboards() -> InputResult<Vec<Device>> {
        let mut keyboards = Vec::new();

        for (_path, device) in evdev::enumerate() {
            if Self::is_keyboard_device(&device) {
                keyboards.push(device);
            }
        }

        if keyboards.is_empty() {
            return Err(InputError::NoKeyboards);
        }

        Ok(keyboards)
    }

    /// Check if a device is a keyboard worth observing
    fn is_keyboard_device(device: &Device) -> bool {
        if !device.supported_events().contains(EventType::KEY) {
            return false;
        }

        // Never read our own injector back; that would loop backspaces
        // into the combo window.
        let device_name = device.name().unwrap_or("");
        if device_name.starts_with(VIRT_DEVICE_NAME) {
            return false;
        }

        let keys = match device.supported_keys() {
            Some(k) => k,
            None => return false,
        };

        // QWERTY row plus A, Z and SPACE marks a real keyboard rather than
        // a headset button or power switch.
        const QWERTY_CODES: &[u16] = &[16, 17, 18, 19, 20, 21];
        const A_Z_SPACE_CODES: &[u16] = &[57, 30, 44];

        let qwerty_present = QWERTY_CODES
            .iter()
            .all(|code| keys.contains(Key::new(*code)));
        let az_present = A_Z_SPACE_CODES
            .iter()
            .all(|code| keys.contains(Key::new(*code)));

        qwerty_present && az_present
    }
}
