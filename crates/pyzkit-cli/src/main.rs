//! pyzkit - Command-line utility for packaging Python applications into
//! executable zipapp archives.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = cli::Cli::parse();

    init_tracing(cli.verbose);
    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);
    let show_spinner = !cli.quiet && !cli.json;

    let result = match &cli.command {
        cli::Commands::CreateArchive(args) => commands::create_archive::execute(args, &*formatter),
        cli::Commands::Pack(args) => commands::pack::execute(args, &*formatter, show_spinner),
        cli::Commands::ShellScript(args) => commands::shell_script::execute(args, &*formatter),
        cli::Commands::Completion { shell } => {
            commands::completion::execute(*shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(error::exit_code(&err));
    }
}

/// Initializes tracing to stderr. `RUST_LOG` wins; otherwise `-v` raises
/// the default level from warnings to debug.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "pyzkit_core=debug,pyzkit_cli=debug"
    } else {
        "pyzkit_core=warn,pyzkit_cli=warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
