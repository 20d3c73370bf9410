use super::Theme;
use crate::cli::Cli;
use crate::error::Result;
use rich_rust::prelude::*;
use rich_rust::renderables::Renderable;
use std::io::IsTerminal;

/// Central output coordinator that respects json/quiet/plain modes.
pub struct OutputContext {
    console: Console,
    theme: Theme,
    mode: OutputMode,
    width: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Full rich formatting (tables, colors, panels)
    Rich,
    /// Plain text, no ANSI codes (for piping)
    Plain,
    /// JSON output only
    Json,
    /// Minimal output (quiet mode)
    Quiet,
}

impl OutputContext {
    #[must_use]
    pub fn from_args(args: &Cli) -> Self {
        Self::from_flags(args.json, args.quiet, args.no_color)
    }

    #[must_use]
    pub fn from_flags(json: bool, quiet: bool, no_color: bool) -> Self {
        let mode = Self::detect_mode(
            json,
            quiet,
            no_color || std::env::var_os("NO_COLOR").is_some(),
            std::io::stdout().is_terminal(),
        );
        let console = Self::create_console(mode);
        let width = console.width();

        Self {
            console,
            theme: Theme::default(),
            mode,
            width,
        }
    }

    const fn detect_mode(json: bool, quiet: bool, no_color: bool, tty: bool) -> OutputMode {
        if json {
            OutputMode::Json
        } else if quiet {
            OutputMode::Quiet
        } else if no_color || !tty {
            OutputMode::Plain
        } else {
            OutputMode::Rich
        }
    }

    fn create_console(mode: OutputMode) -> Console {
        match mode {
            OutputMode::Rich => Console::new(),
            OutputMode::Plain | OutputMode::Quiet | OutputMode::Json => {
                Console::builder().no_color().force_terminal(false).build()
            }
        }
    }

    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }
    #[must_use]
    pub fn is_rich(&self) -> bool {
        self.mode == OutputMode::Rich
    }
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.mode == OutputMode::Quiet
    }
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.mode == OutputMode::Plain
    }
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }
    #[must_use]
    pub const fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Print markup in rich mode, the text as-is in plain mode.
    pub fn print(&self, content: &str) {
        match self.mode {
            OutputMode::Rich => self.console.print(content),
            OutputMode::Plain => println!("{content}"),
            OutputMode::Quiet | OutputMode::Json => {}
        }
    }

    pub fn render<R: Renderable>(&self, renderable: &R) {
        if self.is_rich() {
            self.console.print_renderable(renderable);
        }
    }

    /// Emit `value` on stdout, only in JSON mode.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialized.
    pub fn json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        if self.is_json() {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(())
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Rich => self.console.print(&format!("[bold green]✓[/] {message}")),
            OutputMode::Plain => println!("✓ {message}"),
            OutputMode::Quiet | OutputMode::Json => {}
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Rich => {
                self.console
                    .print(&format!("[bold yellow]⚠[/] [yellow]{message}[/]"));
            }
            OutputMode::Plain => eprintln!("Warning: {message}"),
            OutputMode::Quiet | OutputMode::Json => {}
        }
    }

    pub fn info(&self, message: &str) {
        match self.mode {
            OutputMode::Rich => self.console.print(&format!("[blue]ℹ[/] {message}")),
            OutputMode::Plain => println!("{message}"),
            OutputMode::Quiet | OutputMode::Json => {}
        }
    }

    /// A follow-up command the user may want to run.
    pub fn hint(&self, command: &str) {
        match self.mode {
            OutputMode::Rich => self.console.print(&format!("  [dim]→[/] [cyan]{command}[/]")),
            OutputMode::Plain => println!("  -> {command}"),
            OutputMode::Quiet | OutputMode::Json => {}
        }
    }

    pub fn newline(&self) {
        if !self.is_quiet() && !self.is_json() {
            println!();
        }
    }
}
