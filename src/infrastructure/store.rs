//! File system entry store

use crate::domain::{LogDate, LogEntry, ENTRY_FILE};
use crate::error::{KlogError, Result};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Persistence of log entries
pub trait EntryStore {
    /// All entries stored for `date`, ascending by index
    fn entries_for(&self, date: LogDate) -> Result<Vec<LogEntry>>;

    /// A blank entry with an unused index for `date`. Nothing is written.
    fn new_entry(&self, date: LogDate) -> Result<LogEntry>;

    /// Attach the regular file at `source` to `entry`.
    /// The copy happens on [`EntryStore::commit`].
    fn attach_media(&self, entry: &mut LogEntry, source: &Path) -> io::Result<()>;

    /// Drop the attached file at `position` of the entry's media list and
    /// return its name. A stored file is deleted on [`EntryStore::commit`].
    fn detach_media(&self, entry: &mut LogEntry, position: usize) -> io::Result<String>;

    /// Delete the entry directory. Returns whether anything was removed.
    fn remove(&mut self, entry: &LogEntry) -> Result<bool>;

    /// Write the entry, copy staged media and delete detached media.
    /// Returns whether anything changed.
    fn commit(&mut self, entry: &mut LogEntry) -> Result<bool>;
}

/// Entries laid out as `YYYY/MM/DD/<index>/entry.txt` below a root directory
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    pub root: PathBuf,
}

impl FileSystemStore {
    /// Create a new store with the given root directory
    pub fn new(root: PathBuf) -> Self {
        FileSystemStore { root }
    }

    fn day_dir(&self, date: LogDate) -> PathBuf {
        self.root
            .join(format!("{:04}", date.year()))
            .join(format!("{:02}", date.month()))
            .join(format!("{:02}", date.day()))
    }

    /// Numeric subdirectories of a day directory, sorted
    fn indices(&self, date: LogDate) -> Result<Vec<usize>> {
        let day_dir = self.day_dir(date);
        if !day_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut indices = Vec::new();
        for entry in fs::read_dir(&day_dir)? {
            let Ok(entry) = entry else {
                continue;
            };
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(index) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<usize>().ok())
            {
                indices.push(index);
            }
        }

        indices.sort_unstable();
        Ok(indices)
    }

    fn read_entry(path: &Path, index: usize) -> Result<LogEntry> {
        let contents = fs::read_to_string(path)?;
        LogEntry::from_file_contents(&contents, index).map_err(|reason| KlogError::CorruptEntry {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Write a file using a best-effort atomic replace:
    /// write to a temp file in the same directory, then rename into place.
    ///
    /// On Windows, `rename` does not overwrite existing files, so we remove the destination first.
    fn write_atomic(path: &Path, content: &str) -> Result<()> {
        let tmp_name = format!(
            "{}.klog-tmp-{}",
            path.file_name()
                .and_then(|s| s.to_str())
                .unwrap_or(ENTRY_FILE),
            std::process::id()
        );
        let tmp_path = path.with_file_name(tmp_name);

        fs::write(&tmp_path, content)?;

        if cfg!(windows) && path.exists() {
            fs::remove_file(path)?;
        }

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Remove now-empty day, month and year directories above `dir`
    fn prune_empty_parents(&self, dir: &Path) {
        let mut current = dir.parent();
        while let Some(parent) = current {
            if parent == self.root || !parent.starts_with(&self.root) {
                break;
            }
            if fs::remove_dir(parent).is_err() {
                break;
            }
            current = parent.parent();
        }
    }

    /// Every entry in the store, newest date first, index ascending within a date.
    /// Unreadable entries are skipped with a warning.
    pub fn list_all(&self) -> Result<Vec<LogEntry>> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(5)
            .into_iter()
            .filter_entry(|entry| {
                if !entry.file_type().is_dir() {
                    return true;
                }
                entry
                    .file_name()
                    .to_str()
                    .map_or(true, |name| !name.starts_with('.'))
            });

        for entry in walker {
            let Ok(entry) = entry else {
                continue;
            };
            if entry.depth() != 5 || !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name() != ENTRY_FILE {
                continue;
            }
            let Some(index) = entry
                .path()
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<usize>().ok())
            else {
                continue;
            };

            match Self::read_entry(entry.path(), index) {
                Ok(log_entry) => entries.push(log_entry),
                Err(e) => warn!("Skipping {}: {}", entry.path().display(), e),
            }
        }

        entries.sort_by(|a, b| b.date.cmp(&a.date).then(a.index.cmp(&b.index)));
        Ok(entries)
    }
}

impl EntryStore for FileSystemStore {
    fn entries_for(&self, date: LogDate) -> Result<Vec<LogEntry>> {
        let mut entries = Vec::new();

        for index in self.indices(date)? {
            let path = self.day_dir(date).join(index.to_string()).join(ENTRY_FILE);
            if !path.is_file() {
                debug!("No {} in {}", ENTRY_FILE, path.display());
                continue;
            }

            let entry = Self::read_entry(&path, index)?;
            if entry.date != date {
                return Err(KlogError::CorruptEntry {
                    path,
                    reason: format!("DATE header {} does not match its directory", entry.date),
                });
            }
            entries.push(entry);
        }

        Ok(entries)
    }

    fn new_entry(&self, date: LogDate) -> Result<LogEntry> {
        let index = self.indices(date)?.last().map_or(0, |last| last + 1);
        debug!("New entry for {} at index {}", date, index);
        Ok(LogEntry::new(date, index))
    }

    fn attach_media(&self, entry: &mut LogEntry, source: &Path) -> io::Result<()> {
        let metadata = fs::metadata(source)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", source.display()),
            ));
        }

        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no usable file name", source.display()),
                )
            })?;

        if name.chars().any(char::is_control) || name.trim() != name {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' cannot be stored as a media name", name.escape_debug()),
            ));
        }

        if name == ENTRY_FILE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' is reserved for the entry text", ENTRY_FILE),
            ));
        }

        entry.stage_media(name.to_string(), source.to_path_buf());
        Ok(())
    }

    fn detach_media(&self, entry: &mut LogEntry, position: usize) -> io::Result<String> {
        entry.detach_media(position).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("no attached file number {}", position),
            )
        })
    }

    fn remove(&mut self, entry: &LogEntry) -> Result<bool> {
        let dir = self.root.join(entry.relative_dir());
        if !dir.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(&dir)?;
        self.prune_empty_parents(&dir);
        debug!("Removed {}", dir.display());
        Ok(true)
    }

    fn commit(&mut self, entry: &mut LogEntry) -> Result<bool> {
        let dir = self.root.join(entry.relative_dir());
        fs::create_dir_all(&dir)?;

        let mut changed = false;
        for name in entry.detached_media() {
            if Path::new(name).file_name() != Some(OsStr::new(name)) || name == ENTRY_FILE {
                warn!("Not deleting media '{}' outside of {}", name, dir.display());
                continue;
            }
            match fs::remove_file(dir.join(name)) {
                Ok(()) => {
                    debug!("Deleted {} from {}", name, dir.display());
                    changed = true;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        for staged in entry.staged_media() {
            let target = dir.join(&staged.name);
            if same_file(&staged.source, &target) {
                debug!("{} is already in place", target.display());
                continue;
            }
            fs::copy(&staged.source, &target)?;
            debug!("Copied {} into {}", staged.source.display(), dir.display());
            changed = true;
        }
        entry.clear_pending();

        let path = dir.join(ENTRY_FILE);
        let contents = entry.to_file_contents();
        let current = fs::read_to_string(&path).ok();
        if current.as_deref() != Some(contents.as_str()) {
            Self::write_atomic(&path, &contents)?;
            changed = true;
        }

        Ok(changed)
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
