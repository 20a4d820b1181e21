//! Podgen - pod target installer
//!
//! A command line tool that turns resolved pod targets into build units,
//! per-configuration build settings, and the support files a project consumes.

use clap::Parser;

mod cli;
mod commands;
mod config;
mod error;
mod generator;
mod hash;
mod installer;
mod path_utils;
mod pod;
mod progress;
mod project;
mod sandbox;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Install(args) => commands::install::run(cli.sandbox, args),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
