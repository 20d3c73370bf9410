//! Shared utilities for `basic_cli`.
//!
//! - Confirmation prompts
//! - Project slug generation

pub mod prompt;

pub use prompt::{AutoConfirm, Confirmation, Prompt, ScriptedPrompt, TerminalPrompt};

/// Derive a project slug from its display name.
///
/// Lowercases, turns spaces into dashes and then keeps only ASCII letters,
/// so the dashes do not survive either: `"My App 2"` becomes `"myapp"`.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(char::is_ascii_alphabetic)
        .collect()
}
