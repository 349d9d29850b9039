//! Append-only blocked-command log (spec.md §4.5, §6).
//!
//! Writers use `O_APPEND` so concurrent wrapper invocations never interleave
//! partial lines; readers simply parse whatever is on disk a line at a time,
//! skipping anything that fails to parse (a torn last line from a crash mid
//! write should not take down `safety blocked`).

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use chrono::{Duration, Utc};

use crate::errors::PolicyError;
use crate::types::BlockedEntry;

/// Append one record to the blocked-command log, creating the parent
/// directory and the file itself if needed.
pub fn append_blocked(path: &Path, entry: &BlockedEntry) -> Result<(), PolicyError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(PolicyError::LogAppendFailed)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(PolicyError::LogAppendFailed)?;

    let line = serde_json::to_string(entry).map_err(|e| PolicyError::LogAppendFailed(e.into()))?;
    writeln!(file, "{line}").map_err(PolicyError::LogAppendFailed)?;
    Ok(())
}

/// `safety blocked [--hours N]` — entries from the last `hours`, optionally
/// filtered to one session, most recent first.
pub fn recent_blocked(
    path: &Path,
    session: Option<&str>,
    hours: u64,
) -> Result<Vec<BlockedEntry>, PolicyError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = std::fs::File::open(path).map_err(|e| PolicyError::ReadFailed {
        path: path.display().to_string(),
        source: e,
    })?;
    let cutoff = Utc::now() - Duration::hours(hours as i64);
    let reader = BufReader::new(file);

    let mut entries: Vec<BlockedEntry> = reader
        .lines()
        .map_while(Result::ok)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<BlockedEntry>(&line).ok())
        .filter(|entry| entry.timestamp >= cutoff)
        .filter(|entry| session.is_none_or(|s| entry.session.as_deref() == Some(s)))
        .collect();

    entries.reverse();
    Ok(entries)
}
