//! Domain layer - Log dates and entries

pub mod date;
pub mod entry;

pub use date::LogDate;
pub use entry::{annotate, LogEntry, MalformedEntry, ENTRY_FILE};
