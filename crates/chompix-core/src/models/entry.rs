//! Diary entry model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::util::iso_timestamp_now;

/// A unique identifier for a diary entry.
///
/// Locally assigned by the store (SQLite autoincrement); entries pulled from
/// the server carry the server-assigned id instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(i64);

impl EntryId {
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl From<i64> for EntryId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// A food-diary entry in the local store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier within the local store
    pub id: EntryId,
    /// Creation time, ISO-8601
    pub timestamp: String,
    /// When the meal happened, ISO-8601 (defaults to `timestamp`)
    pub event_datetime: String,
    /// Free-form diary text
    pub text: String,
    /// Optional base64 photo payload
    pub photo: Option<String>,
    /// True once the server has acknowledged this entry
    pub synced: bool,
}

impl Entry {
    #[must_use]
    pub const fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    /// Wire shape for uploading this entry to the server.
    #[must_use]
    pub fn to_upload(&self) -> EntryUpload {
        EntryUpload {
            timestamp: self.timestamp.clone(),
            event_datetime: self.event_datetime.clone(),
            text: self.text.clone(),
            photo: self.photo.clone(),
        }
    }
}

/// Fields for a new local entry; anything missing is defaulted at create time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub timestamp: Option<String>,
    pub event_datetime: Option<String>,
    pub text: Option<String>,
    pub photo: Option<String>,
}

impl EntryDraft {
    /// Create a draft holding only diary text.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Apply create-time defaults: `timestamp` to now, `event_datetime` to
    /// the timestamp, `text` to empty.
    #[must_use]
    pub fn resolve(self) -> ResolvedDraft {
        let timestamp = self.timestamp.unwrap_or_else(iso_timestamp_now);
        let event_datetime = self.event_datetime.unwrap_or_else(|| timestamp.clone());
        ResolvedDraft {
            timestamp,
            event_datetime,
            text: self.text.unwrap_or_default(),
            photo: self.photo,
        }
    }
}

/// An [`EntryDraft`] with all defaults applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDraft {
    pub timestamp: String,
    pub event_datetime: String,
    pub text: String,
    pub photo: Option<String>,
}

/// JSON body for `POST /api/entries`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryUpload {
    pub timestamp: String,
    pub event_datetime: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

/// An entry as the server returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Server-assigned identifier
    pub id: EntryId,
    pub timestamp: String,
    #[serde(default)]
    pub event_datetime: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub photo: Option<String>,
}

impl ServerEntry {
    /// The meal time, falling back to the creation timestamp when the server
    /// omits `event_datetime`.
    #[must_use]
    pub fn event_datetime_or_timestamp(&self) -> &str {
        self.event_datetime.as_deref().unwrap_or(&self.timestamp)
    }
}
