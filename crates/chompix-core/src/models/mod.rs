//! Data models shared across Chompix

mod entry;

pub use entry::{Entry, EntryDraft, EntryId, EntryUpload, ResolvedDraft, ServerEntry};
