mod categorizer;
mod cli;
mod currency;
mod error;
mod fmt;
mod importer;
mod models;
mod news;
mod reports;
mod settings;
mod sources;
mod tui;
mod views;

use std::io::IsTerminal;

use clap::Parser;
use env_logger::Env;

use cli::{Cli, Commands, Context};
use error::Result;

fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        config,
        file,
        command,
        ..
    } = cli;

    let command = match command {
        Some(command) => command,
        None if std::io::stdout().is_terminal() => Commands::Dashboard,
        None => Commands::Summary,
    };

    match command {
        Commands::Init {
            data_dir,
            demo,
            force,
        } => cli::init::run(config, data_dir, demo, force),
        Commands::Convert {
            amount,
            base,
            target,
            swap,
        } => cli::convert::run(config, amount, &base, &target, swap),
        Commands::News => cli::news::run(config),
        Commands::Status => cli::status::run(config, file),
        Commands::Summary => cli::report::summary(&Context::load(config, file)?),
        Commands::Top { n } => cli::report::top(&Context::load(config, file)?, n),
        Commands::Categories => cli::report::categories(&Context::load(config, file)?),
        Commands::Budget => cli::report::budget(&Context::load(config, file)?),
        Commands::Savings { income } => cli::report::savings(&Context::load(config, file)?, income),
        Commands::Trend => cli::report::trend(&Context::load(config, file)?),
        Commands::Transactions => cli::report::transactions(&Context::load(config, file)?),
        Commands::Rules => cli::rules::list(&Context::load(config, file)?),
        Commands::Dashboard => cli::dashboard::run(&Context::load(config, file)?),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
