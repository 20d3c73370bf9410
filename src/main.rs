use basic_cli::cli::commands;
use basic_cli::cli::{Cli, Commands};
use basic_cli::config::CliOverrides;
use basic_cli::logging::init_logging;
use basic_cli::output::OutputContext;
use basic_cli::{CliError, StructuredError};
use clap::Parser;
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.json) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = CliOverrides {
        api_url: cli.api_url.clone(),
    };
    let ctx = OutputContext::from_args(&cli);
    let dir = cli.dir.as_deref();

    let result = match cli.command {
        Commands::Login => commands::login::execute(&overrides, &ctx),
        Commands::Logout => commands::logout::execute(&overrides, &ctx),
        Commands::Account => commands::account::execute(&overrides, &ctx),
        Commands::Projects => commands::projects::execute(&overrides, &ctx),
        Commands::Init(ref args) => commands::init::execute(args, dir, &overrides, &ctx),
        Commands::Status => commands::status::execute(dir, &overrides, &ctx),
        Commands::Push(args) => commands::push::execute(args, dir, &overrides, &ctx),
        Commands::Pull(args) => commands::pull::execute(args, dir, &overrides, &ctx),
        Commands::Update => commands::update::execute(&overrides, &ctx),
        Commands::Debug => commands::debug::execute(&overrides, &ctx),
        Commands::Version(args) => commands::version::execute(args, &ctx),
        Commands::Completions(ref args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Report `err` and exit.
///
/// JSON goes to stderr when `--json` is set or stdout is piped, so scripts
/// reading stdout never see a half-formed result.
fn handle_error(err: &CliError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);

    if json_mode || !io::stdout().is_terminal() {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        eprintln!("{}", structured.to_human(io::stderr().is_terminal()));
    }

    std::process::exit(err.exit_code());
}
