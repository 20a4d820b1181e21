use clap::Parser;
use std::path::PathBuf;

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install from the default manifest:\n    podgen install\n\n\
                   Install from an explicit manifest:\n    podgen install --manifest ios/podgen.yaml\n\n\
                   Install into a sandbox directory:\n    podgen install --sandbox Pods")]
pub struct InstallArgs {
    /// Manifest path. If not provided, reads podgen.yaml from the sandbox directory
    #[arg(long, short = 'm', value_name = "PATH")]
    pub manifest: Option<PathBuf>,
}
