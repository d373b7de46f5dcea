// Keylaunch Ledger Reconciliation
// Drops ledger rows whose code no longer exists in the configuration

use std::collections::HashSet;

use chrono::Local;

use crate::config::ShortcutConfig;
use crate::ledger::{LedgerError, UsageLedger, UsageRecord};

/// Remove every ledger row whose code is in neither the app table nor the
/// command table, rewrite the file, and return the removed codes.
///
/// A configured code is never removed, even at count 0; only orphans go.
/// Runs at process start and after every successful config reload.
pub fn reconcile(
    ledger: &mut UsageLedger,
    config: &ShortcutConfig,
) -> Result<Vec<String>, LedgerError> {
    let valid: HashSet<&str> = config.configured_codes().collect();

    let orphaned: Vec<String> = ledger
        .records()
        .filter(|record| !valid.contains(record.code.as_str()))
        .map(|record| record.code.clone())
        .collect();

    if orphaned.is_empty() {
        log::info!("ledger is already clean - no outdated entries found");
        return Ok(orphaned);
    }

    ledger.remove_codes(&orphaned)?;

    println!(
        "[{}] Ledger cleaned up: removed {} outdated entries",
        Local::now().format("%Y-%m-%d %I:%M %p"),
        orphaned.len()
    );
    log::info!("removed outdated ledger entries: {}", orphaned.join(", "));

    Ok(orphaned)
}

/// The rows `reconcile` would remove, without touching anything.
pub fn orphaned_entries<'a>(
    ledger: &'a UsageLedger,
    config: &ShortcutConfig,
) -> Vec<&'a UsageRecord> {
    let valid: HashSet<&str> = config.configured_codes().collect();
    ledger
        .records()
        .filter(|record| !valid.contains(record.code.as_str()))
        .collect()
}
