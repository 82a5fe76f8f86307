//! Database layer for Chompix

mod connection;
mod entry_store;
mod migrations;

pub use connection::Database;
pub use entry_store::{EntryStore, LibSqlEntryStore};
