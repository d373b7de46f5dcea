// Keylaunch CLI
// Wires the keyboard observer, listener loop and shutdown handling together

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::Context;
use clap::Parser;

use keylaunch_core::display;
use keylaunch_core::{
    reconcile, ActionDispatcher, ConfigStore, InputSource, KeyEvent, KeyInjector, Listener,
    NoopInjector, SystemExecutor, UsageLedger, VirtualKeyboard,
};

/// Bounded queue between the input thread and the listener. Events arriving
/// while the listener is stalled in a long action sequence overflow this and
/// are dropped, matching the one-at-a-time processing model.
const EVENT_QUEUE_CAPACITY: usize = 128;

/// Poll timeout for the input thread, so it notices shutdown promptly.
const INPUT_POLL_TIMEOUT_MS: i32 = 100;

/// Keystroke-driven automation dispatcher
#[derive(Parser, Debug)]
#[command(name = "keylaunch")]
#[command(version = "0.3.0")]
#[command(about = "Keystroke-driven automation dispatcher", long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Usage ledger file
    #[arg(short, long, value_name = "LEDGER")]
    ledger: Option<PathBuf>,

    /// Directory file commands resolve against
    #[arg(short, long, value_name = "DIR")]
    scripts_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// List available keyboard devices
    #[arg(long)]
    list_devices: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.list_devices {
        return list_devices();
    }

    let base_dir = default_base_dir();
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| base_dir.join("config.json"));
    let ledger_path = args
        .ledger
        .clone()
        .unwrap_or_else(|| base_dir.join("usage.csv"));
    let scripts_dir = args.scripts_dir.clone().unwrap_or(base_dir);

    // A corrupt config is the one fatal startup error: a missing file heals
    // itself with defaults, a broken one must not be silently repaired.
    let config = ConfigStore::open(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;

    if args.check_config {
        println!("Configuration is valid");
        return Ok(());
    }

    let mut ledger = UsageLedger::open(&ledger_path)
        .with_context(|| format!("opening usage ledger at {}", ledger_path.display()))?;

    if let Err(e) = reconcile(&mut ledger, config.config()) {
        log::error!("startup ledger reconciliation failed: {}", e);
    }

    let dispatcher = ActionDispatcher::new(scripts_dir, Box::new(SystemExecutor::new()));
    let injector: Box<dyn KeyInjector> = match VirtualKeyboard::new() {
        Ok(keyboard) => Box::new(keyboard),
        Err(e) => {
            log::warn!(
                "backspace injection unavailable ({}); matched sequences will stay on screen",
                e
            );
            Box::new(NoopInjector)
        }
    };

    println!("keylaunch started. Using config: {}", config.path().display());
    println!("Usage ledger: {}", ledger_path.display());
    println!("Config auto-reload enabled - changes are detected on the next combo");
    display::print_cheatsheet(config.config(), &ledger);
    display::print_usage_stats(&ledger);
    display::print_recent(&ledger);
    display::print_least_used(config.config(), &ledger);
    println!("\nPress Ctrl+C to exit.");

    let running = Arc::new(AtomicBool::new(true));
    spawn_signal_handler(running.clone());

    let source = InputSource::open().context("opening keyboard devices")?;
    log::info!("observing {} keyboard device(s)", source.device_count());

    let (tx, rx) = mpsc::sync_channel(EVENT_QUEUE_CAPACITY);
    let reader = spawn_input_thread(source, tx, running.clone());

    let mut listener = Listener::new(config, ledger, dispatcher, injector);
    listener.run(&rx, &running);

    running.store(false, Ordering::SeqCst);
    let _ = reader.join();

    println!("\nkeylaunch stopped.");
    println!("Final usage statistics:");
    display::print_usage_stats(listener.ledger());
    display::print_recent(listener.ledger());

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn default_base_dir() -> PathBuf {
    ConfigStore::default_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn list_devices() -> anyhow::Result<()> {
    let devices = InputSource::list_devices().context("finding keyboard devices")?;
    println!("Found {} keyboard device(s):", devices.len());
    for device in &devices {
        match &device.path {
            Some(path) => println!("  {}: {} ({})", device.index, device.name, path),
            None => println!("  {}: {}", device.index, device.name),
        }
    }
    Ok(())
}

fn spawn_signal_handler(running: Arc<AtomicBool>) {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    std::thread::spawn(move || {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM]) {
            if signals.forever().next().is_some() {
                println!("\nReceived signal, shutting down gracefully...");
                running.store(false, Ordering::SeqCst);
            }
        }
    });
}

fn spawn_input_thread(
    mut source: InputSource,
    tx: SyncSender<KeyEvent>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while running.load(Ordering::SeqCst) {
            match source.poll(INPUT_POLL_TIMEOUT_MS) {
                Ok(events) => {
                    for event in events {
                        // Queue full means the listener is mid-action;
                        // those keystrokes are deliberately missed.
                        if tx.try_send(event).is_err() {
                            log::debug!("event queue full, dropping key event");
                        }
                    }
                }
                Err(e) => {
                    log::error!("input poll failed: {}", e);
                    break;
                }
            }
        }
    })
}
