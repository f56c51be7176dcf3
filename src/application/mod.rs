//! Application layer - Use cases and orchestration

pub mod bootstrap;
pub mod edit_entry;
pub mod list_entries;
pub mod repository;

pub use edit_entry::{EditEntryService, Outcome};
pub use list_entries::list_entries;
