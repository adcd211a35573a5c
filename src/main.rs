use anwork_testing::HarnessError;
use anwork_testing::cli::commands;
use anwork_testing::cli::{Cli, Commands};
use anwork_testing::config;
use anwork_testing::logging::init_logging;
use clap::Parser;
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let result = config::load_config(&cli.overrides()).and_then(|config| match &cli.command {
        Commands::Versions => commands::versions::execute(&config, cli.json),
        Commands::Materialize(args) => commands::materialize::execute(args, &config, cli.json),
        Commands::Exec(args) => commands::exec::execute(args, &config, cli.json),
        Commands::Check(args) => commands::check::execute(args, &config, cli.json),
        Commands::Bench(args) => commands::bench::execute(args, &config, cli.json),
    });

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Report `err` on stderr and exit with its kind's code.
///
/// JSON is used with --json or when stdout is not a terminal.
fn handle_error(err: &HarnessError, json_mode: bool) -> ! {
    if json_mode || !io::stdout().is_terminal() {
        let json = err.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        eprintln!("{}", err.to_human());
    }

    std::process::exit(err.kind().exit_code());
}
