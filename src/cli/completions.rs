use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    podgen completions bash > ~/.bash_completion.d/podgen\n\n\
                  Generate zsh completions:\n    podgen completions zsh > ~/.zfunc/_podgen\n\n\
                  Generate fish completions:\n    podgen completions fish > ~/.config/fish/completions/podgen.fish\n\n\
                  Generate PowerShell completions:\n    podgen completions powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
