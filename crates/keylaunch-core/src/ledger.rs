// Keylaunch Usage Ledger
// Persistent per-combo usage counters, rewritten wholesale on every update

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use indexmap::IndexMap;

/// Header row of the persisted table.
pub const LEDGER_HEADER: &str = "code,count,last_action,comment";

/// Timestamp format used for the last_action column.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Ledger persistence errors
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub code: String,
    pub count: u64,
    pub last_used: String,
    pub comment: String,
}

/// Mapping from combo code to usage record, mirrored to a flat file.
///
/// Every update rewrites the entire table sorted by code; the strategy trades
/// write efficiency for simplicity and is not crash-atomic mid-write. After a
/// failed write the in-memory map is ahead of the file and stays
/// authoritative until the next successful write.
#[derive(Debug)]
pub struct UsageLedger {
    path: PathBuf,
    records: IndexMap<String, UsageRecord>,
}

impl UsageLedger {
    /// Open the ledger file, creating an empty one (header only) if absent.
    ///
    /// Rows with an unparsable count load as 0 rather than failing, to
    /// tolerate hand-edited or corrupted files.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, format!("{}\n", LEDGER_HEADER))?;
            println!("Created ledger file at {}", path.display());
        }

        let records = Self::load(&path)?;
        Ok(Self { path, records })
    }

    fn load(path: &Path) -> Result<IndexMap<String, UsageRecord>, LedgerError> {
        let content = fs::read_to_string(path)?;
        let mut records = IndexMap::new();

        // First line is the header.
        for line in content.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_csv_line(line);
            let code = match fields.first() {
                Some(code) if !code.is_empty() => code.clone(),
                _ => continue,
            };
            let record = UsageRecord {
                code: code.clone(),
                count: parse_count(fields.get(1).map(String::as_str).unwrap_or("")),
                last_used: fields.get(2).cloned().unwrap_or_default(),
                comment: fields.get(3).cloned().unwrap_or_default(),
            };
            records.insert(code, record);
        }

        Ok(records)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Increment the count for `code`, stamp the current time, store the
    /// comment, and rewrite the whole table.
    ///
    /// The in-memory row is updated before the write is attempted, so a
    /// write failure leaves memory ahead of disk.
    pub fn record(&mut self, code: &str, comment: &str) -> Result<(), LedgerError> {
        let now = Local::now().format(TIMESTAMP_FORMAT).to_string();

        let entry = self
            .records
            .entry(code.to_string())
            .or_insert_with(|| UsageRecord {
                code: code.to_string(),
                count: 0,
                last_used: String::new(),
                comment: String::new(),
            });
        entry.count += 1;
        entry.last_used = now;
        entry.comment = comment.to_string();
        let count = entry.count;

        self.persist()?;
        log::info!("logged action: {} (count: {})", code, count);
        Ok(())
    }

    /// Rewrite the backing file: header plus one row per record, sorted by
    /// code.
    pub fn persist(&self) -> Result<(), LedgerError> {
        let mut rows: Vec<&UsageRecord> = self.records.values().collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));

        let mut out = String::with_capacity(64 * (rows.len() + 1));
        out.push_str(LEDGER_HEADER);
        out.push('\n');
        for record in rows {
            out.push_str(&escape_field(&record.code));
            out.push(',');
            out.push_str(&record.count.to_string());
            out.push(',');
            out.push_str(&escape_field(&record.last_used));
            out.push(',');
            out.push_str(&escape_field(&record.comment));
            out.push('\n');
        }

        fs::write(&self.path, out)?;
        Ok(())
    }

    /// Current in-memory count for `code`, 0 if unseen.
    pub fn count(&self, code: &str) -> u64 {
        self.records.get(code).map(|r| r.count).unwrap_or(0)
    }

    pub fn get(&self, code: &str) -> Option<&UsageRecord> {
        self.records.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.records.contains_key(code)
    }

    /// Records in load order.
    pub fn records(&self) -> impl Iterator<Item = &UsageRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records by descending count, ties in load order. Pure read.
    pub fn stats(&self) -> Vec<&UsageRecord> {
        let mut rows: Vec<&UsageRecord> = self.records.values().collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }

    /// All records by most recent use first.
    ///
    /// The timestamp format sorts correctly as text; never-stamped rows sink
    /// to the end.
    pub fn recent(&self) -> Vec<&UsageRecord> {
        let mut rows: Vec<&UsageRecord> = self.records.values().collect();
        rows.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        rows
    }

    /// Sum of all counts.
    pub fn total_count(&self) -> u64 {
        self.records.values().map(|r| r.count).sum()
    }

    /// Drop the given codes from the map and rewrite the file.
    pub fn remove_codes(&mut self, codes: &[String]) -> Result<(), LedgerError> {
        for code in codes {
            self.records.shift_remove(code);
        }
        self.persist()
    }
}

/// Count parser that tolerates junk: empty strings, non-numeric text, and
/// negative values all load as 0.
fn parse_count(raw: &str) -> u64 {
    raw.trim().parse().unwrap_or(0)
}

/// Quote a field if it contains a delimiter, quote, or newline.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one table row into fields, honoring quoted fields with doubled
/// quotes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                current.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == ',' {
            fields.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    fields.push(current);
    fields
}
