use clap::Parser;
use stockpulse::cli::{Cli, run};
use stockpulse::logging::init_logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}
