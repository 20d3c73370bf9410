//! Yes/no confirmation before destructive sync steps.
//!
//! On a terminal the answer is a single keypress read in raw mode. When
//! stdin is piped a whole line is read instead, and end of input counts as
//! a cancel.

use crate::error::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal;
use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};

/// The user's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
    /// Escape, `q`, Ctrl-C or end of input.
    Cancel,
}

impl Confirmation {
    #[must_use]
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }

    /// Interpret a typed line. Anything unrecognized is a no.
    #[must_use]
    pub fn from_line(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => Self::Yes,
            "q" | "quit" | "esc" => Self::Cancel,
            _ => Self::No,
        }
    }
}

/// Something that can ask the user a yes/no question.
pub trait Prompt {
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn confirm(&mut self, message: &str) -> Result<Confirmation>;
}

/// Answers yes to everything (`--yes`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl Prompt for AutoConfirm {
    fn confirm(&mut self, message: &str) -> Result<Confirmation> {
        tracing::debug!(prompt = message, "Auto-confirmed");
        Ok(Confirmation::Yes)
    }
}

/// Asks on stderr and reads the answer from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, message: &str) -> Result<Confirmation> {
        let mut err = io::stderr();
        write!(err, "{} {} ", message.bold(), "[y/N]".dim())?;
        err.flush()?;

        let answer = if io::stdin().is_terminal() {
            read_key()?
        } else {
            read_line(&mut io::stdin().lock())?
        };

        writeln!(err)?;
        Ok(answer)
    }
}

fn read_line(input: &mut impl BufRead) -> Result<Confirmation> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(Confirmation::Cancel);
    }
    Ok(Confirmation::from_line(&line))
}

/// Restores cooked mode even if reading the key fails.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_key() -> Result<Confirmation> {
    let _guard = RawModeGuard::enable()?;
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        let answer = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Confirmation::Cancel
            }
            KeyCode::Char('y' | 'Y') => Confirmation::Yes,
            KeyCode::Char('n' | 'N') | KeyCode::Enter => Confirmation::No,
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => Confirmation::Cancel,
            _ => continue,
        };
        return Ok(answer);
    }
}

/// Replays a fixed list of answers and records what was asked.
///
/// Runs out of answers as `Cancel`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompt {
    answers: VecDeque<Confirmation>,
    pub asked: Vec<String>,
}

impl ScriptedPrompt {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = Confirmation>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, message: &str) -> Result<Confirmation> {
        self.asked.push(message.to_string());
        Ok(self.answers.pop_front().unwrap_or(Confirmation::Cancel))
    }
}
