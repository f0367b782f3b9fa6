//! dxdate - diagnosis-date relation extraction CLI
//!
//! # Usage
//!
//! ```bash
//! # Evaluate the proximity baseline on the configured dataset
//! dxdate eval --config dxdate.toml
//!
//! # Tagged entities and proposed relationships for one note
//! dxdate extract "asthma[dx] flared (14/03/2021)[date]"
//!
//! # Normalize dates
//! dxdate parse-date "3rd Feb'23" 2023-02-03 "not a date"
//!
//! # Score saved predictions against gold
//! dxdate score --predictions preds.json --gold gold.json
//! ```

use std::process::ExitCode;

use clap::Parser;

mod cli;

use cli::commands;
use cli::output::color;
use cli::parser::{Cli, Commands};

fn init_logging(verbose: bool, quiet: bool) {
    let default = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result: Result<(), String> = match cli.command {
        Commands::Eval(args) => commands::eval::run(args, cli.quiet),
        Commands::Extract(args) => commands::extract::run(args),
        Commands::ParseDate(args) => commands::parse_date::run(args),
        Commands::Score(args) => commands::score::run(args),
        Commands::Relative(args) => commands::relative::run(args),
        Commands::Config(args) => commands::config::run(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", color("31", "error:"), e);
            ExitCode::FAILURE
        }
    }
}
