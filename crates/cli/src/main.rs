use std::process::ExitCode;

use clap::Parser;
use env_logger::Builder;
use iconsmith_cli::cli::Cli;
use log::error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    Builder::new()
        .filter_level(cli.verbosity.level_filter())
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .init();

    match cli.command.run() {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
