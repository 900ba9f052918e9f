use clap::Parser;
use crossterm::style::Stylize;
use dehashed_cli::cli::{self, args::Cli};
use dehashed_cli::utils::logging::init_tracing;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = cli::run_with(cli) {
        eprintln!("{}", format!("Error: {e:#}").red());
        std::process::exit(1);
    }
}
