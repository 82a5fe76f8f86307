//! `chompix export` - dump the local diary as JSON or Markdown.

use std::path::Path;

use chompix_core::models::Entry;
use serde::Serialize;

use crate::cli::ExportFormat;
use crate::commands::common::{list_entries, open_store};
use crate::error::CliError;

pub async fn run_export(
    format: ExportFormat,
    output_path: Option<&Path>,
    db_path: &Path,
) -> Result<(), CliError> {
    let (_db, store) = open_store(db_path).await?;
    let entries = list_entries(&store, false).await?;

    let rendered = match format {
        ExportFormat::Json => render_json_export(&entries)?,
        ExportFormat::Markdown => render_markdown_export(&entries),
    };

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct EntryExportItem<'a> {
    id: i64,
    timestamp: &'a str,
    event_datetime: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo: Option<&'a str>,
    synced: bool,
}

fn export_item(entry: &Entry) -> EntryExportItem<'_> {
    EntryExportItem {
        id: entry.id.as_i64(),
        timestamp: &entry.timestamp,
        event_datetime: &entry.event_datetime,
        text: &entry.text,
        photo: entry.photo.as_deref(),
        synced: entry.synced,
    }
}

fn render_json_export(entries: &[Entry]) -> Result<String, CliError> {
    let items = entries.iter().map(export_item).collect::<Vec<_>>();
    Ok(serde_json::to_string_pretty(&items)?)
}

fn render_markdown_export(entries: &[Entry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str("---\n");
        out.push_str(&format!("id: {}\n", entry.id));
        out.push_str(&format!("timestamp: {}\n", entry.timestamp));
        out.push_str(&format!("event_datetime: {}\n", entry.event_datetime));
        out.push_str(&format!("synced: {}\n", entry.synced));
        if entry.has_photo() {
            out.push_str("photo: attached\n");
        }
        out.push_str("---\n\n");
        out.push_str(&entry.text);
        out.push_str("\n\n");
    }
    out
}
