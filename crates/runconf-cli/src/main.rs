//! runconf CLI
//!
//! Host for the settings store: reads a settings file, `--set` pairs and the
//! process environment, freezes the result and prints it.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // show installs logging itself once the store is built
        Some(Commands::Show(args)) => commands::run_show(&args, cli.verbose),
        Some(Commands::Keys) => {
            commands::init_logging(cli.verbose)?;
            commands::run_keys()
        }
        Some(Commands::EnvMap) => {
            commands::init_logging(cli.verbose)?;
            commands::run_env_map()
        }
        None => {
            println!("{} run settings", "runconf".green().bold());
            println!();
            println!("Run {} for available commands.", "runconf --help".cyan());
            Ok(())
        }
    }
}
