use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::FmtSubscriber;

use adc_cli::cli::{Cli, Commands, ReferenceCommands};

mod commands;

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Links(args) => commands::links::handle(args),
        Commands::Reference { command } => match command {
            ReferenceCommands::Check {
                path,
                years,
                format,
            } => commands::reference::check(path, years, *format),
        },
        Commands::Completions { shell, dir } => {
            commands::completions::handle(*shell, dir.as_deref())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so that JSON summaries on stdout stay parseable.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {err}");
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
