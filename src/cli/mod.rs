//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - install: Install command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod install;

pub use completions::CompletionsArgs;
pub use install::InstallArgs;

/// Podgen - pod target installer
///
/// Turn resolved pod targets into build units, build settings, and support files.
#[derive(Parser, Debug)]
#[command(
    name = "podgen",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Generator for pod build units and support files",
    long_about = "Podgen reads an install manifest describing resolved pods and produces the \
                  build units, per-configuration build settings, and support files (xcconfig \
                  fragments, module maps, Info.plists, resource and framework scripts) that a \
                  project consumes.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  podgen install                      \x1b[90m# Install from ./podgen.yaml\x1b[0m\n   \
                  podgen install -m ios/podgen.yaml   \x1b[90m# Install from an explicit manifest\x1b[0m\n   \
                  podgen install -s Pods              \x1b[90m# Generate into the Pods sandbox\x1b[0m\n   \
                  podgen completions zsh              \x1b[90m# Generate shell completions\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Sandbox directory holding pod sources and generated files (defaults to current directory)
    #[arg(long, short = 's', global = true, env = "PODGEN_SANDBOX")]
    pub sandbox: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install pod targets from a manifest
    Install(InstallArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
