// Keylaunch Combo Tracker
// Rolling window of recently typed characters plus modifier state

use std::time::{Duration, Instant};

use smallvec::SmallVec;

use crate::modifier::{ModifierKey, ModifierState};

/// Default maximum number of buffered characters.
pub const DEFAULT_MAX_COMBO_LEN: usize = 3;

/// One buffered keystroke with its arrival time.
#[derive(Debug, Clone, Copy)]
struct ComboKeystroke {
    ch: char,
    at: Instant,
}

/// Tracks the sliding window of typed characters and the held modifiers.
///
/// The window holds at most `max_len` entries and no entry older than the
/// combo timeout survives an insert: stale entries are pruned from the front
/// before every `add_key`, and inserting beyond capacity evicts the oldest.
/// Uses SmallVec so the common 3-character window never touches the heap.
#[derive(Debug)]
pub struct ComboTracker {
    timeout: Duration,
    max_len: usize,
    window: SmallVec<[ComboKeystroke; 4]>,
    modifiers: ModifierState,
}

impl ComboTracker {
    pub fn new(timeout: Duration, max_len: usize) -> Self {
        Self {
            timeout,
            max_len,
            window: SmallVec::new(),
            modifiers: ModifierState::new(),
        }
    }

    /// Append a typed character, pruning anything older than the timeout
    /// first and evicting the oldest entry if the window is full.
    pub fn add_key(&mut self, ch: char) {
        self.add_key_at(ch, Instant::now());
    }

    /// Like `add_key` but with an explicit arrival time.
    pub fn add_key_at(&mut self, ch: char, now: Instant) {
        self.prune(now);

        self.window.push(ComboKeystroke { ch, at: now });

        if self.window.len() > self.max_len {
            self.window.remove(0);
        }
    }

    /// The currently buffered characters, oldest first.
    ///
    /// Pure read: pruning happens on insert, not here.
    pub fn current_combo(&self) -> String {
        self.window.iter().map(|k| k.ch).collect()
    }

    /// Empty the window.
    ///
    /// Called after a successful multi-character match so the same
    /// keystrokes cannot also satisfy a shorter code afterwards.
    pub fn clear(&mut self) {
        self.window.clear();
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Record a modifier press or release
    pub fn set_modifier(&mut self, key: ModifierKey, pressed: bool) {
        self.modifiers.set(key, pressed);
    }

    pub fn modifiers(&self) -> &ModifierState {
        &self.modifiers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Replace the window timeout (picked up from a config reload)
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn prune(&mut self, now: Instant) {
        while let Some(front) = self.window.first() {
            if now.saturating_duration_since(front.at) > self.timeout {
                self.window.remove(0);
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ComboTracker {
        ComboTracker::new(Duration::from_secs(5), DEFAULT_MAX_COMBO_LEN)
    }

    #[test]
    fn test_combo_concatenates_in_arrival_order() {
        let mut t = tracker();
        let start = Instant::now();
        t.add_key_at('a', start);
        t.add_key_at('b', start + Duration::from_millis(300));
        t.add_key_at('c', start + Duration::from_millis(600));
        assert_eq!(t.current_combo(), "abc");
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut t = tracker();
        let start = Instant::now();
        for (i, ch) in ['a', 'b', 'c', 'd'].into_iter().enumerate() {
            t.add_key_at(ch, start + Duration::from_millis(100 * i as u64));
        }
        assert_eq!(t.current_combo(), "bcd");
        assert_eq!(t.len(), DEFAULT_MAX_COMBO_LEN);
    }

    #[test]
    fn test_timeout_prunes_stale_entries() {
        let mut t = tracker();
        let start = Instant::now();
        t.add_key_at('a', start);
        t.add_key_at('b', start + Duration::from_secs(1));

        // 6 seconds of silence: both buffered keys are stale by the time
        // the next one arrives.
        t.add_key_at('d', start + Duration::from_secs(7));
        assert_eq!(t.current_combo(), "d");
    }

    #[test]
    fn test_entries_within_timeout_survive() {
        let mut t = tracker();
        let start = Instant::now();
        t.add_key_at('a', start);
        t.add_key_at('b', start + Duration::from_secs(4));
        assert_eq!(t.current_combo(), "ab");
    }

    #[test]
    fn test_clear_empties_window() {
        let mut t = tracker();
        t.add_key('a');
        t.add_key('b');
        assert!(!t.is_empty());
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.current_combo(), "");
    }

    #[test]
    fn test_clear_does_not_touch_modifiers() {
        let mut t = tracker();
        t.set_modifier(ModifierKey::Command, true);
        t.add_key('a');
        t.clear();
        assert!(t.modifiers().command());
    }

    #[test]
    fn test_set_timeout_applies_to_later_inserts() {
        let mut t = tracker();
        let start = Instant::now();
        t.add_key_at('a', start);
        t.set_timeout(Duration::from_secs(1));
        t.add_key_at('b', start + Duration::from_secs(2));
        assert_eq!(t.current_combo(), "b");
    }

    #[test]
    fn test_modifier_roundtrip() {
        let mut t = tracker();
        t.set_modifier(ModifierKey::Shift, true);
        assert!(t.modifiers().shift());
        t.set_modifier(ModifierKey::Shift, false);
        assert!(!t.modifiers().shift());
    }
}
