//! The `dehashed` command line front end.

pub mod args;
pub mod commands;

use crate::config::Config;
use anyhow::{bail, Result};
use args::{Cli, Commands};
use commands::Context;
use tracing::debug;

/// Run the parsed command line. Logging is the caller's business.
pub fn run_with(cli: Cli) -> Result<()> {
    if cli.generate_config {
        return commands::generate_config();
    }

    let Some(command) = cli.command else {
        bail!("No command given. Run with --help for usage.");
    };

    // Config commands must keep working when the file itself is broken.
    let command = match command {
        Commands::Config(command) => return commands::config(command),
        other => other,
    };

    let config = Config::load()?;
    debug!(target: "cli", "loaded config: {:?}", config.masked());

    let ctx = Context {
        config,
        api_key: cli.api_key,
        base_url: cli.base_url,
        timeout: cli.timeout,
    };

    match command {
        Commands::Search(args) => commands::search(&ctx, args),
        Commands::SearchPassword(args) => commands::search_password(&ctx, args),
        Commands::Monitoring(command) => commands::monitoring(&ctx, command),
        Commands::Whois(command) => commands::whois(&ctx, command),
        Commands::Balance => commands::balance(&ctx),
        Commands::Config(command) => commands::config(command),
    }
}
