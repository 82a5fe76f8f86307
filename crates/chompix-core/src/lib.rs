//! chompix-core - Core library for Chompix
//!
//! This crate contains the shared models, the local entry store, the server
//! API client, the sync engine, and the offline cache used by all Chompix
//! interfaces.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Entry, EntryDraft, EntryId, ServerEntry};
