//! Infrastructure layer - External I/O and persistence

pub mod config;
pub mod editor;
pub mod git;
pub mod store;
pub mod terminal;

pub use config::Config;
pub use editor::{EditorSession, TextEditor};
pub use git::{GitRepository, VersionControl};
pub use store::{EntryStore, FileSystemStore};
pub use terminal::{ask_yes_no, Prompter, TerminalPrompter};
