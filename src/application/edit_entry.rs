//! Edit entry use case: select, edit, detach and attach media, commit

use crate::domain::{annotate, LogDate, LogEntry, MalformedEntry};
use crate::error::{KlogError, Result};
use crate::infrastructure::{ask_yes_no, EntryStore, Prompter, TextEditor, VersionControl};
use std::path::PathBuf;
use tracing::{debug, info};

/// How an edit session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Entry written, committed and (with sync) pushed
    Committed,
    /// Entry written back without any change
    Unchanged,
    /// Entry deleted
    Removed,
    /// User left without changing anything
    Aborted,
}

enum State {
    Select,
    Edit { entry: LogEntry, text: String },
    Retry { entry: LogEntry, text: String, error: MalformedEntry },
    ConfirmDelete { entry: LogEntry, text: String },
    Attach { entry: LogEntry },
    ConfirmCommit { entry: LogEntry },
}

/// Service driving one interactive edit of the entries of a date
pub struct EditEntryService<'a, S, E, P, V>
where
    S: EntryStore,
    E: TextEditor,
    P: Prompter,
    V: VersionControl,
{
    store: &'a mut S,
    editor: &'a E,
    prompter: &'a mut P,
    vcs: &'a V,
    sync: bool,
}

impl<'a, S, E, P, V> EditEntryService<'a, S, E, P, V>
where
    S: EntryStore,
    E: TextEditor,
    P: Prompter,
    V: VersionControl,
{
    /// Create a new edit service. Sync (push after commit) is on by default.
    pub fn new(store: &'a mut S, editor: &'a E, prompter: &'a mut P, vcs: &'a V) -> Self {
        EditEntryService {
            store,
            editor,
            prompter,
            vcs,
            sync: true,
        }
    }

    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Run the session for `date` until the entry is committed, removed or
    /// the user gives up.
    ///
    /// Declining to retry after malformed text is an error
    /// ([`KlogError::MalformedEntry`]); a plain abort is not.
    pub fn execute(&mut self, date: LogDate) -> Result<Outcome> {
        let mut state = State::Select;

        loop {
            state = match state {
                State::Select => match self.select(date)? {
                    Some(entry) => {
                        let text = entry.render();
                        State::Edit { entry, text }
                    }
                    None => return Ok(Outcome::Aborted),
                },

                State::Edit { mut entry, text } => {
                    let edited = self.editor.edit(&text)?;
                    if edited.trim().is_empty() {
                        State::ConfirmDelete {
                            entry,
                            text: edited,
                        }
                    } else {
                        match entry.reload(&edited) {
                            Ok(()) => State::Attach { entry },
                            Err(error) => State::Retry {
                                entry,
                                text: edited,
                                error,
                            },
                        }
                    }
                }

                State::Retry { entry, text, error } => {
                    self.prompter.message(&format!("Invalid entry: {}", error));
                    if !ask_yes_no(&mut *self.prompter, "retry?", false)? {
                        return Err(KlogError::MalformedEntry(error.to_string()));
                    }
                    State::Edit {
                        entry,
                        text: annotate(&text, &error),
                    }
                }

                State::ConfirmDelete { entry, text } => {
                    if ask_yes_no(&mut *self.prompter, "delete this entry?", false)? {
                        return self.remove(&entry);
                    }
                    State::Edit { entry, text }
                }

                State::Attach { mut entry } => {
                    self.detach(&mut entry)?;
                    self.attach(&mut entry)?;
                    State::ConfirmCommit { entry }
                }

                State::ConfirmCommit { mut entry } => {
                    if !ask_yes_no(&mut *self.prompter, "commit?", true)? {
                        return Ok(Outcome::Aborted);
                    }
                    return self.commit(&mut entry);
                }
            };
        }
    }

    /// Pick the entry to edit. `None` means the user chose to exit.
    fn select(&mut self, date: LogDate) -> Result<Option<LogEntry>> {
        let mut entries = self.store.entries_for(date)?;
        if entries.is_empty() {
            debug!("No entries for {}, starting a new one", date);
            return self.store.new_entry(date).map(Some);
        }

        self.prompter.message(&format_choices(date, &entries));

        loop {
            let choice = self.prompter.read_line("> ")?;
            match choice.trim() {
                "x" => return Ok(None),
                "n" => return self.store.new_entry(date).map(Some),
                other => {
                    if let Ok(index) = other.parse::<usize>() {
                        if index < entries.len() {
                            return Ok(Some(entries.swap_remove(index)));
                        }
                    }
                }
            }
            self.prompter
                .message(&format!("invalid choice: '{}'", choice.trim()));
        }
    }

    /// Offer to drop attached files, by their number in the media list
    fn detach(&mut self, entry: &mut LogEntry) -> Result<()> {
        while !entry.media.is_empty()
            && ask_yes_no(&mut *self.prompter, "detach a file?", false)?
        {
            self.prompter.message(&format_media(&entry.media));
            let input = self.prompter.read_line("number: ")?;
            let choice = input.trim();

            let Ok(position) = choice.parse::<usize>() else {
                self.prompter
                    .message(&format!("invalid choice: '{}'", choice));
                continue;
            };
            match self.store.detach_media(entry, position) {
                Ok(name) => self.prompter.message(&format!("detached {}", name)),
                Err(e) => self
                    .prompter
                    .message(&format!("cannot detach {}: {}", choice, e)),
            }
        }
        Ok(())
    }

    fn attach(&mut self, entry: &mut LogEntry) -> Result<()> {
        while ask_yes_no(&mut *self.prompter, "attach a file?", false)? {
            let input = self.prompter.read_line("file: ")?;
            let input = input.trim();
            if input.is_empty() {
                self.prompter.message("no file given");
                continue;
            }

            let path = PathBuf::from(shellexpand::tilde(input).into_owned());
            match self.store.attach_media(entry, &path) {
                Ok(()) => self.prompter.message(&format!("attached {}", path.display())),
                Err(e) => self
                    .prompter
                    .message(&format!("cannot attach {}: {}", input, e)),
            }
        }
        Ok(())
    }

    fn commit(&mut self, entry: &mut LogEntry) -> Result<Outcome> {
        if !self.store.commit(entry)? {
            self.prompter.message("nothing changed");
            return Ok(Outcome::Unchanged);
        }

        self.record(&format!("Modified {}", entry.shortlog()))?;
        Ok(Outcome::Committed)
    }

    fn remove(&mut self, entry: &LogEntry) -> Result<Outcome> {
        if self.store.remove(entry)? {
            self.record(&format!("Removed {}", entry.shortlog()))?;
        } else {
            debug!("Entry {} was never stored", entry.relative_dir().display());
        }
        Ok(Outcome::Removed)
    }

    /// Commit every repository change and push unless sync is off
    fn record(&mut self, message: &str) -> Result<()> {
        if !self.vcs.commit_all(message)? {
            debug!("Repository already up to date");
            return Ok(());
        }

        if self.sync {
            self.vcs.push()?;
        } else {
            info!("Sync disabled, not pushing");
        }
        Ok(())
    }
}

/// Numbered list of the entries of a date plus the new/exit choices
fn format_choices(date: LogDate, entries: &[LogEntry]) -> String {
    let mut output = format!("Entries for {}:\n", date);
    for (i, entry) in entries.iter().enumerate() {
        output.push_str(&format!("[{}] {}\n", i, entry.topic));
    }
    output.push_str("[n] new entry\n");
    output.push_str("[x] exit");
    output
}

fn format_media(media: &[String]) -> String {
    media
        .iter()
        .enumerate()
        .map(|(i, name)| format!("[{}] {}", i, name))
        .collect::<Vec<_>>()
        .join("\n")
}
