//! `chompix add` - create a diary entry locally (sync happens separately).

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chompix_core::db::EntryStore;
use chompix_core::models::EntryDraft;

use crate::commands::common::{normalize_text, open_store};
use crate::error::CliError;

pub async fn run_add(
    text_parts: &[String],
    photo_path: Option<&Path>,
    at: Option<&str>,
    event_at: Option<&str>,
    db_path: &Path,
) -> Result<(), CliError> {
    let draft = build_draft(text_parts, photo_path, at, event_at)?;

    let (_db, store) = open_store(db_path).await?;
    let entry = store.create(draft).await?;

    println!("{}", entry.id);
    Ok(())
}

fn build_draft(
    text_parts: &[String],
    photo_path: Option<&Path>,
    at: Option<&str>,
    event_at: Option<&str>,
) -> Result<EntryDraft, CliError> {
    let text = normalize_text(&text_parts.join(" "));
    let photo = photo_path.map(encode_photo).transpose()?;

    if text.is_none() && photo.is_none() {
        return Err(CliError::EmptyEntry);
    }

    Ok(EntryDraft {
        timestamp: at.map(|value| validate_timestamp(value)).transpose()?,
        event_datetime: event_at.map(|value| validate_timestamp(value)).transpose()?,
        text,
        photo,
    })
}

fn encode_photo(path: &Path) -> Result<String, CliError> {
    let bytes = std::fs::read(path)
        .map_err(|error| CliError::PhotoUnreadable(path.display().to_string(), error))?;
    Ok(BASE64.encode(bytes))
}

fn validate_timestamp(value: &str) -> Result<String, CliError> {
    let trimmed = value.trim();
    chrono::DateTime::parse_from_rfc3339(trimmed)
        .map_err(|_| CliError::InvalidTimestamp(trimmed.to_string()))?;
    Ok(trimmed.to_string())
}
