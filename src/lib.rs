//! klog - Kitchen log journaling tool
//!
//! Keeps dated log entries as text files in a git repository. An entry for a
//! date is picked or created, edited in the user's editor, optionally gets
//! media files attached, and is committed and pushed to the remote.

pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::KlogError;
