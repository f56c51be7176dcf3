//! List entries use case

use crate::domain::LogEntry;
use crate::error::Result;
use crate::infrastructure::FileSystemStore;

/// All entries in the repository, newest first
pub fn list_entries(store: &FileSystemStore) -> Result<Vec<LogEntry>> {
    store.list_all()
}
