//! Shared helpers for CLI commands.

use std::env;
use std::path::{Path, PathBuf};

use chompix_core::config::ClientConfig;
use chompix_core::db::{Database, EntryStore, LibSqlEntryStore};
use chompix_core::models::Entry;
use chompix_core::sync::Connectivity;
use serde::Serialize;

use crate::error::CliError;

/// Env var that forces the connectivity signal offline (for scripts/tests)
pub const ENV_OFFLINE: &str = "CHOMPIX_OFFLINE";

pub async fn open_database(path: &Path) -> Result<Database, CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Database::open(path).await?)
}

pub async fn open_store(path: &Path) -> Result<(Database, LibSqlEntryStore), CliError> {
    let db = open_database(path).await?;
    let store = LibSqlEntryStore::new(db.connection().clone());
    Ok((db, store))
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> PathBuf {
    cli_db_path
        .or_else(|| env::var_os("CHOMPIX_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(default_db_path)
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chompix")
        .join("chompix.db")
}

/// The connectivity signal for a CLI invocation: online unless forced off.
pub fn connectivity_from_env() -> Connectivity {
    let forced_offline = env::var(ENV_OFFLINE)
        .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
        .unwrap_or(false);
    Connectivity::new(!forced_offline)
}

pub fn client_config() -> ClientConfig {
    ClientConfig::from_env()
}

pub async fn list_entries(
    store: &LibSqlEntryStore,
    unsynced_only: bool,
) -> Result<Vec<Entry>, CliError> {
    let entries = if unsynced_only {
        store.list_unsynced().await?
    } else {
        store.list_all().await?
    };
    Ok(entries)
}

#[derive(Debug, Serialize)]
pub struct EntryListItem {
    pub id: i64,
    pub timestamp: String,
    pub event_datetime: String,
    pub text: String,
    pub preview: String,
    pub has_photo: bool,
    pub synced: bool,
    pub relative_time: String,
}

pub fn entry_to_list_item(entry: &Entry) -> EntryListItem {
    let now_ms = chrono::Utc::now().timestamp_millis();
    EntryListItem {
        id: entry.id.as_i64(),
        timestamp: entry.timestamp.clone(),
        event_datetime: entry.event_datetime.clone(),
        text: entry.text.clone(),
        preview: entry_preview(entry, 80),
        has_photo: entry.has_photo(),
        synced: entry.synced,
        relative_time: format_relative_time(timestamp_millis(&entry.timestamp), now_ms),
    }
}

pub fn format_entry_lines(entries: &[Entry]) -> Vec<String> {
    let now_ms = chrono::Utc::now().timestamp_millis();
    entries
        .iter()
        .map(|entry| {
            let preview = entry_preview(entry, 40);
            let relative_time = format_relative_time(timestamp_millis(&entry.timestamp), now_ms);
            let marker = if entry.synced { " " } else { "*" };
            let photo = if entry.has_photo() { "[photo]" } else { "" };

            if photo.is_empty() {
                format!("{:>6}{marker} {preview:<40}  {relative_time}", entry.id)
            } else {
                format!(
                    "{:>6}{marker} {preview:<40}  {relative_time:<10}  {photo}",
                    entry.id
                )
            }
        })
        .collect()
}

pub fn entry_preview(entry: &Entry, max_chars: usize) -> String {
    let first_line = entry.text.lines().next().unwrap_or("").trim();
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// Parse an ISO-8601 timestamp to Unix ms; unparseable values render as "?"
/// (relative times only, the raw string is always preserved elsewhere).
pub fn timestamp_millis(timestamp: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    if timestamp_ms == 0 {
        return "?".to_string();
    }

    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

pub fn normalize_text(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
