pub mod add;
pub mod cache_cmd;
pub mod common;
pub mod completions;
pub mod delete;
pub mod export;
pub mod list;
pub mod sync_cmd;
