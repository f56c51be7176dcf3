//! External editor integration

use crate::error::{KlogError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Something that lets the user edit a piece of text
pub trait TextEditor {
    /// Hand `text` to the user and return what they saved
    fn edit(&self, text: &str) -> Result<String>;
}

/// Session for editing text in an external editor through a temporary file
#[derive(Debug, Clone)]
pub struct EditorSession {
    command: String,
}

impl EditorSession {
    /// Create a new editor session with the given command
    pub fn new(editor_command: String) -> Self {
        EditorSession {
            command: editor_command,
        }
    }

    /// Editor command from `EDITOR`, then `VISUAL`, then the platform fallback
    pub fn from_env() -> Self {
        let command = std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .ok()
            .filter(|cmd| !cmd.trim().is_empty())
            .unwrap_or_else(|| Self::fallback_editor().to_string());
        EditorSession::new(command)
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    fn fallback_editor() -> &'static str {
        if cfg!(windows) {
            "notepad"
        } else {
            "nano"
        }
    }

    /// Open a file in the editor and wait for it to exit
    pub fn open(&self, file_path: &Path) -> Result<()> {
        let (program, mut args) = self.parse_command();
        args.push(file_path.to_string_lossy().to_string());

        debug!("Running editor: {} {:?}", program, args);

        // On Windows, use cmd /c to ensure .bat and .cmd files are found
        #[cfg(windows)]
        let status = Command::new("cmd")
            .arg("/C")
            .arg(&program)
            .args(&args)
            .status();

        #[cfg(not(windows))]
        let status = Command::new(&program).args(&args).status();

        let status = status.map_err(|e| {
            KlogError::Editor(format!("Failed to launch editor '{}': {}", program, e))
        })?;

        if !status.success() {
            return Err(KlogError::Editor(format!(
                "Editor '{}' exited with {}",
                program, status
            )));
        }

        Ok(())
    }

    /// Parse command into program and arguments
    fn parse_command(&self) -> (String, Vec<String>) {
        let parts: Vec<&str> = self.command.split_whitespace().collect();

        if parts.is_empty() {
            return (Self::fallback_editor().to_string(), vec![]);
        }

        let program = parts[0].to_string();
        let args = parts[1..].iter().map(|s| s.to_string()).collect();

        (program, args)
    }
}

impl TextEditor for EditorSession {
    fn edit(&self, text: &str) -> Result<String> {
        let mut file = tempfile::Builder::new()
            .prefix("klog-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(text.as_bytes())?;
        file.flush()?;

        self.open(file.path())?;

        Ok(fs::read_to_string(file.path())?)
    }
}
