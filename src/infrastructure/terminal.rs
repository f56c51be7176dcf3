//! Terminal prompting

use crate::error::{KlogError, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, BufRead, Write};

/// Interaction with the user
pub trait Prompter {
    /// Show `prompt` and wait for a single key. `None` means Enter.
    fn read_key(&mut self, prompt: &str) -> Result<Option<char>>;

    /// Show `prompt` and read one line, without its line ending
    fn read_line(&mut self, prompt: &str) -> Result<String>;

    /// Print an informational line
    fn message(&mut self, text: &str);
}

/// Raw mode for as long as the guard lives
struct RawModeGuard;

impl RawModeGuard {
    fn acquire() -> Result<Self> {
        terminal::enable_raw_mode()
            .map_err(|e| KlogError::Terminal(format!("cannot enable raw mode: {}", e)))?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Prompter on the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        TerminalPrompter
    }

    fn show(prompt: &str) -> Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;
        Ok(())
    }

    fn wait_for_key() -> Result<Option<char>> {
        let _raw = RawModeGuard::acquire()?;
        loop {
            let ev = event::read()
                .map_err(|e| KlogError::Terminal(format!("cannot read key: {}", e)))?;
            let Event::Key(key) = ev else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(KlogError::Interrupted)
                }
                KeyCode::Enter => return Ok(None),
                KeyCode::Char(c) => return Ok(Some(c)),
                KeyCode::Esc => return Ok(Some('\x1b')),
                _ => continue,
            }
        }
    }
}

impl Prompter for TerminalPrompter {
    fn read_key(&mut self, prompt: &str) -> Result<Option<char>> {
        Self::show(prompt)?;
        let key = Self::wait_for_key();
        // Raw mode is off again here, so a plain newline works
        match &key {
            Ok(Some(c)) if !c.is_control() => println!("{}", c),
            _ => println!(),
        }
        key
    }

    fn read_line(&mut self, prompt: &str) -> Result<String> {
        Self::show(prompt)?;
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(KlogError::Interrupted);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn message(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Ask a yes/no question answered with a single key.
/// Enter picks `default`; other keys ask again.
pub fn ask_yes_no<P: Prompter + ?Sized>(
    prompter: &mut P,
    question: &str,
    default: bool,
) -> Result<bool> {
    let prompt = if default {
        format!("{} [Y/n] ", question)
    } else {
        format!("{} [y/N] ", question)
    };

    loop {
        match prompter.read_key(&prompt)? {
            None => return Ok(default),
            Some('y') | Some('Y') => return Ok(true),
            Some('n') | Some('N') => return Ok(false),
            Some(_) => prompter.message("Please answer y or n."),
        }
    }
}
