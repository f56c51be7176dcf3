//! Output formatting utilities

use crate::domain::LogEntry;

/// Format a list of entries for display
pub fn format_entry_list(entries: &[LogEntry]) -> String {
    if entries.is_empty() {
        return "No entries found".to_string();
    }

    let mut output = String::new();
    for entry in entries {
        output.push_str(&format!("{}  [{}] {}", entry.date, entry.index, entry.topic));
        match entry.media.len() {
            0 => {}
            1 => output.push_str("  (1 file)"),
            n => output.push_str(&format!("  ({} files)", n)),
        }
        output.push('\n');
    }
    output
}
