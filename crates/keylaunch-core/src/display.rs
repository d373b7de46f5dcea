// Keylaunch Display
// Operator-facing summaries: cheatsheet, usage stats, recent and least-used

use std::path::Path;

use crate::config::ShortcutConfig;
use crate::ledger::UsageLedger;

const NARROW_RULE: usize = 50;
const WIDE_RULE: usize = 60;

/// Derive the human-readable label stored alongside a dispatched code.
///
/// Apps get "Open <name>"; command sequences prefer the first step's
/// explicit comment, then its command or file text, then a generic count.
pub fn action_comment(config: &ShortcutConfig, code: &str) -> String {
    let mut comment = String::new();

    if let Some(target) = config.apps.get(code) {
        let name = Path::new(target)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.clone());
        comment = format!("Open {}", name);
    }

    if let Some(steps) = config.commands.get(code) {
        if let Some(first) = steps.first() {
            comment = if let Some(c) = &first.comment {
                c.clone()
            } else if let Some(c) = &first.command {
                format!("Run: {}", c)
            } else if let Some(f) = &first.file_command {
                format!("File: {}", f)
            } else {
                format!("{} commands", steps.len())
            };
        }
    }

    comment
}

/// Print the configured shortcuts with their settings and usage counts.
pub fn print_cheatsheet(config: &ShortcutConfig, ledger: &UsageLedger) {
    println!("\n{}", "=".repeat(NARROW_RULE));
    println!("{:^width$}", "Keylaunch Cheatsheet", width = NARROW_RULE);
    println!("{}", "=".repeat(NARROW_RULE));

    println!("\nSettings:");
    println!(
        "  Backspace Custom Combo: {}",
        if config.settings.backspace_custom_combo {
            "Yes"
        } else {
            "No"
        }
    );
    println!(
        "  Combo Timeout: {} seconds",
        config.settings.combo_timeout_seconds
    );

    println!("\nConfigured App Shortcuts:");
    for (code, target) in &config.apps {
        let name = Path::new(target)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| target.clone());
        println!("  {:<10} : {} ({})", code, name, ledger.count(code));
    }

    println!("\nCommand Shortcuts:");
    for (code, steps) in &config.commands {
        let count = ledger.count(code);
        if let Some(first) = steps.first() {
            if let Some(comment) = &first.comment {
                println!("  {:<10} : {} ({})", code, comment, count);
            } else if let Some(command) = &first.command {
                println!("  {:<10} : {} ({})", code, command, count);
            } else {
                println!("  {:<10} : {} commands ({})", code, steps.len(), count);
            }
        }
    }

    println!("{}", "=".repeat(NARROW_RULE));
}

/// Print the ten most used shortcuts with totals.
pub fn print_usage_stats(ledger: &UsageLedger) {
    println!("\n{}", "=".repeat(WIDE_RULE));
    println!("{:^width$}", "Action Usage Statistics", width = WIDE_RULE);
    println!("{}", "=".repeat(WIDE_RULE));

    if ledger.is_empty() {
        println!("No usage data available yet.");
        return;
    }

    print_table_header();
    for record in ledger.stats().iter().take(10) {
        print_row(&record.code, &record.count.to_string(), &record.last_used, &record.comment);
    }

    println!("\nTotal actions logged: {}", ledger.total_count());
    println!("Unique shortcuts used: {}", ledger.len());
}

/// Print the ten most recently used shortcuts.
pub fn print_recent(ledger: &UsageLedger) {
    println!("\n{}", "=".repeat(WIDE_RULE));
    println!("{:^width$}", "10 Most Recent Commands", width = WIDE_RULE);
    println!("{}", "=".repeat(WIDE_RULE));

    if ledger.is_empty() {
        println!("No usage data available yet.");
        return;
    }

    print_table_header();
    for record in ledger.recent().iter().take(10) {
        print_row(&record.code, &record.count.to_string(), &record.last_used, &record.comment);
    }

    println!("{}", "=".repeat(WIDE_RULE));
}

/// Print the eight least used shortcuts, counting configured codes that have
/// never fired as zero.
pub fn print_least_used(config: &ShortcutConfig, ledger: &UsageLedger) {
    println!("\n{}", "=".repeat(WIDE_RULE));
    println!("{:^width$}", "Least Used Commands", width = WIDE_RULE);
    println!("{}", "=".repeat(WIDE_RULE));

    // (code, count, last_used, comment) including never-used configured codes
    let mut entries: Vec<(String, u64, String, String)> = ledger
        .records()
        .map(|r| {
            (
                r.code.clone(),
                r.count,
                r.last_used.clone(),
                r.comment.clone(),
            )
        })
        .collect();

    for code in config.configured_codes() {
        if !ledger.contains(code) {
            entries.push((
                code.to_string(),
                0,
                "Never".to_string(),
                action_comment(config, code),
            ));
        }
    }

    entries.sort_by_key(|(_, count, _, _)| *count);

    print_table_header();
    for (code, count, last_used, comment) in entries.iter().take(8) {
        print_row(code, &count.to_string(), last_used, comment);
    }

    println!("{}", "=".repeat(WIDE_RULE));
}

fn print_table_header() {
    println!(
        "{:<12} {:<8} {:<20} {}",
        "Code", "Count", "Last Used", "Comment"
    );
    println!("{}", "-".repeat(WIDE_RULE));
}

fn print_row(code: &str, count: &str, last_used: &str, comment: &str) {
    let short_comment: String = comment.chars().take(25).collect();
    println!("{:<12} {:<8} {:<20} {}", code, count, last_used, short_comment);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandStep;

    fn config() -> ShortcutConfig {
        let json = r#"
        {
            "apps": { "cmd+1": "/usr/bin/firefox" },
            "commands": {
                "xx": [ { "command": "ls -la", "comment": "List files" } ],
                "yy": [ { "command": "htop" } ],
                "ff": [ { "file_command": "organize.py" } ]
            }
        }
        "#;
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_action_comment_app() {
        assert_eq!(action_comment(&config(), "cmd+1"), "Open firefox");
    }

    #[test]
    fn test_action_comment_prefers_explicit_comment() {
        assert_eq!(action_comment(&config(), "xx"), "List files");
    }

    #[test]
    fn test_action_comment_falls_back_to_command_text() {
        assert_eq!(action_comment(&config(), "yy"), "Run: htop");
        assert_eq!(action_comment(&config(), "ff"), "File: organize.py");
    }

    #[test]
    fn test_action_comment_generic_label() {
        let mut cfg = config();
        cfg.commands.insert(
            "nn".to_string(),
            vec![
                CommandStep {
                    command: None,
                    file_command: None,
                    delay: 0.0,
                    comment: None,
                },
                CommandStep::terminal("x"),
            ],
        );
        assert_eq!(action_comment(&cfg, "nn"), "2 commands");
    }

    #[test]
    fn test_action_comment_unknown_code_is_empty() {
        assert_eq!(action_comment(&config(), "nope"), "");
    }
}
