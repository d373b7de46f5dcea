// Keylaunch Listener Loop
// Single control loop: events in, combo matches out, one dispatch at a time

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::config::{ConfigStore, CMD_PREFIX};
use crate::dispatch::ActionDispatcher;
use crate::display;
use crate::event::{EventKind, KeyEvent, KeyInput};
use crate::input::KeyInjector;
use crate::ledger::UsageLedger;
use crate::reconcile::reconcile;
use crate::tracker::{ComboTracker, DEFAULT_MAX_COMBO_LEN};

/// How long `run` waits on the event channel before rechecking the
/// shutdown flag.
const RECV_TIMEOUT: Duration = Duration::from_millis(200);

/// The one place all state meets.
///
/// Owns the tracker, config store, dispatcher, ledger and injector outright
/// and is driven by exactly one thread, so no event is ever processed
/// concurrently with another. Everything that happens while handling a
/// single event (including a sequence's inter-step delays and the ledger
/// rewrite) blocks the next event; keystrokes typed during that stall are
/// simply missed.
pub struct Listener {
    tracker: ComboTracker,
    config: ConfigStore,
    dispatcher: ActionDispatcher,
    ledger: UsageLedger,
    injector: Box<dyn KeyInjector>,
}

impl Listener {
    pub fn new(
        config: ConfigStore,
        ledger: UsageLedger,
        dispatcher: ActionDispatcher,
        injector: Box<dyn KeyInjector>,
    ) -> Self {
        let tracker = ComboTracker::new(config.combo_timeout(), DEFAULT_MAX_COMBO_LEN);
        Self {
            tracker,
            config,
            dispatcher,
            ledger,
            injector,
        }
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    pub fn tracker(&self) -> &ComboTracker {
        &self.tracker
    }

    /// Consume events from the bounded channel until the flag drops or the
    /// source hangs up.
    pub fn run(&mut self, events: &Receiver<KeyEvent>, running: &AtomicBool) {
        while running.load(Ordering::SeqCst) {
            match events.recv_timeout(RECV_TIMEOUT) {
                Ok(event) => self.handle_event(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("input source disconnected, stopping listener");
                    break;
                }
            }
        }
    }

    /// Process one event: modifiers flip their flag, character presses go
    /// through both trigger grammars, everything else is a no-op.
    pub fn handle_event(&mut self, event: KeyEvent) {
        match (event.kind, event.input) {
            (kind, KeyInput::Modifier(key)) => {
                self.tracker.set_modifier(key, kind.is_press());
            }
            (EventKind::Press, KeyInput::Char(ch)) => self.handle_char(ch),
            (EventKind::Release, KeyInput::Char(_)) => {}
        }
    }

    fn handle_char(&mut self, ch: char) {
        self.tracker.add_key(ch);

        // Grammar (a): typed sequences, evaluated on every character no
        // matter which modifiers are down.
        let combo = self.tracker.current_combo();
        if self.config.is_custom_combo(&combo) {
            if self.config.backspace_custom_combo() {
                if let Err(e) = self.injector.backspace(combo.chars().count()) {
                    log::error!("backspace injection failed: {}", e);
                }
            }
            self.handle_combo(&combo);
            // Clear so these keystrokes can't also satisfy a shorter code.
            self.tracker.clear();
        }

        // Grammar (b): command shortcuts, only with command alone.
        if self.tracker.modifiers().command() {
            if !self.tracker.modifiers().shift() && !self.tracker.modifiers().option() {
                self.handle_combo(&format!("{}{}", CMD_PREFIX, ch));
            }
            // Shift or option alongside command is not a configured
            // combination - skip silently.
        }
    }

    /// One matched combo: staleness check, then dispatch, then ledger.
    fn handle_combo(&mut self, code: &str) {
        if self.config.check_and_reload() {
            self.tracker.set_timeout(self.config.combo_timeout());
            if let Err(e) = reconcile(&mut self.ledger, self.config.config()) {
                log::error!("ledger reconciliation failed: {}", e);
            }
            display::print_cheatsheet(self.config.config(), &self.ledger);
        }

        if !self.config.is_configured(code) {
            return;
        }

        if let Some(target) = self.config.apps().get(code) {
            self.dispatcher.open_app(target);
        } else if let Some(steps) = self.config.commands().get(code) {
            self.dispatcher.run_steps(code, steps);
        }

        let comment = display::action_comment(self.config.config(), code);
        if let Err(e) = self.ledger.record(code, &comment) {
            log::error!("failed to persist ledger for {}: {}", code, e);
        }
    }
}
