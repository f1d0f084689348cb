mod cli;
mod platform;

use std::process::ExitCode;

use clap::Parser;
use engine_logging::engine_error;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    platform::logging::initialize(cli.log, cli.verbose);

    match platform::run(cli) {
        Ok(code) => code,
        Err(err) => {
            engine_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
